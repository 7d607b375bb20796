//! Messaging-platform integration for voxbridge.
//!
//! This crate provides:
//!
//! - **Update**: the inbound webhook payload, reduced to the fields we use
//! - **Delivery**: the outbound seam for text and voice replies
//! - **TelegramClient**: Bot API implementation of `Delivery`, plus webhook
//!   registration

pub mod delivery;
pub mod error;
pub mod telegram;
pub mod update;

pub use delivery::{Delivery, VoiceNote};
pub use error::DeliveryError;
pub use telegram::{DEFAULT_API_BASE, TelegramClient};
pub use update::{Chat, IncomingMessage, Sender, Update};
