//! Shared utility helpers.

pub(crate) mod alloc;
pub mod error;

pub use error::{KickerError, KickerResult};
