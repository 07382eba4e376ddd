//! # Meteion Protocols
//!
//! Interface definitions shared by every Meteion crate.
//! Contains no transport code - only the contracts between the control
//! plane and the host application it is embedded in.
//!
//! ## Core Traits
//!
//! - [`ChatSender`] - Sends a line of chat text through the host
//! - [`StatusQuery`] - Answers status queries against host state
//! - [`WaymarkPlacer`] - Places field markers
//! - [`HostEvents`] - Event sources the webhook relay subscribes to

pub mod error;
pub mod event;
pub mod host;
pub mod subscription;

pub use error::{ActionError, HostError};
pub use event::{ChatMessage, PartyFinderListing};
pub use host::{ChatSender, HostCapabilities, HostEventHub, HostEvents, StatusQuery, WaymarkPlacer};
pub use subscription::{EventHandler, EventHub, Subscription};
