//! Secret handling utilities.
//!
//! Re-exports the secrecy types voxmind wraps its gateway key in.

pub use secrecy::{ExposeSecret, SecretString};
