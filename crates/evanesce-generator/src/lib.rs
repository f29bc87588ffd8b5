//! Identifier generators for new pastes.

pub mod error;
pub mod random;
pub mod seq;

pub use error::Error;
pub use random::{RandomGenerator, RandomSettings};
pub use seq::SeqGenerator;

use evanesce_core::PasteId;

/// Trait for generating paste ids.
///
/// Implementations are pure generators that don't interact with storage.
/// Generation is infallible: an unusable entropy source is a process-level
/// failure, not a per-request error.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<PasteId>;

    /// Generates a value that can be converted into a fresh paste id.
    fn generate(&self) -> Self::Output;
}
