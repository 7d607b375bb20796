//! Shared result alias.
//!
//! Client traits (completion, delivery, speech, storage) return their crate's
//! plain error enum so callers can match on it and decide whether to degrade.
//! Failures that abort an operation are wrapped in `rootcause::Report<E>` at
//! the point they are propagated, such as the orchestrator's top-level result
//! and server startup.

use rootcause::Report;

/// Result carrying a rootcause report whose context is `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
