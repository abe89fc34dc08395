//! Attention - serialized arbitration of one driver's attention
//!
//! A driver has exactly one unit of attention. The road keeps throwing
//! dangers at them (alerts that must be handled exclusively) while a bored
//! passenger keeps asking questions (requests that wait for a reply). At
//! most one of these is ever being attended to.
//!
//! # Modules
//!
//! - [`arbiter`] - `AttentionArbiter` with mailbox and gate strategies
//! - [`driver`] - the shared driver, its messages and reply slots
//! - [`producer`] - the road and passenger loops
//! - [`trip`] - runs everything together until cancelled
//! - [`status`] - status lines and sinks
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod arbiter;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod driver;
pub mod picker;
pub mod producer;
pub mod status;
pub mod trip;

// Re-export commonly used types
pub use arbiter::{ArbiterError, ArbiterResult, AttentionArbiter, Gate, Mailbox, MailboxHandle, Strategy, create_arbiter};
pub use cancel::CancellationToken;
pub use config::{Config, DriverConfig, DurationRange, PassengerConfig, RoadConfig};
pub use driver::{Driver, DriverMessage, DriverStats, ReplyReceiver, ReplySender, reply_slot};
pub use picker::Picker;
pub use producer::{Passenger, ProducerStats, Road};
pub use status::{AttentionKind, AttentionSpan, ConsoleSink, MemorySink, Phase, StatusLine, StatusSink};
pub use trip::{Trip, TripReport};
