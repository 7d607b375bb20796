//! Reply pipeline for voxbridge.
//!
//! - **Orchestrator**: turns one inbound update into transcript updates, a
//!   completion call, and text plus voice delivery
//! - **Dispatcher**: authenticates webhook deliveries and hands updates to a
//!   bounded, supervised worker pool so the webhook can acknowledge at once
//! - **testing**: recording doubles for every outbound seam, behind the
//!   `testing` feature

pub mod dispatcher;
pub mod error;
pub mod orchestrator;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dispatcher::{DispatchConfig, DispatchHandle, Dispatcher};
pub use error::{DispatchError, RelayError};
pub use orchestrator::{GENERIC_ERROR_REPLY, GREETING, Orchestrator, Outcome, START_COMMAND};
