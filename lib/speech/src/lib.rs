//! Speech synthesis for voxbridge.
//!
//! Converts reply text into an in-memory audio buffer that can be uploaded
//! as a voice message. Synthesis failures are expected (empty or
//! unspeakable text, upstream errors) and callers treat them as non-fatal.

pub mod error;
pub mod google;
pub mod synthesizer;

pub use error::SynthesisError;
pub use google::{GoogleTranslateTts, SpeechConfig};
pub use synthesizer::SpeechSynthesizer;
