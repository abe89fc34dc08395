//! The driver: sole owner of attention
//!
//! Every alert and question ends up in one of two attention actions on
//! [`Driver`]. The arbiters decide who gets to call them and when.

mod core;
mod messages;
mod reply;

pub use core::Driver;
pub use messages::{DriverMessage, DriverStats};
pub use reply::{ReplyReceiver, ReplySender, reply_slot};
