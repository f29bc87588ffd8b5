use crate::Generator;
use evanesce_core::PasteId;
use std::sync::atomic::{AtomicU64, Ordering};

/// A generator producing sequential ids like "p000000", "p000001", etc.
///
/// Ids are predictable, so this generator only suits deployments where
/// guessing an id is harmless, or deterministic setups such as tests. It
/// never repeats within a single instance; distinct nodes need distinct
/// prefixes.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl SeqGenerator {
    /// Creates a sequential generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a sequential generator starting from a specific counter value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    type Output = PasteId;

    fn generate(&self) -> PasteId {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        PasteId::new_unchecked(format!("{}{:06}", self.prefix, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_ids() {
        let generator = SeqGenerator::with_prefix("p");

        assert_eq!(generator.generate().as_str(), "p000000");
        assert_eq!(generator.generate().as_str(), "p000001");
        assert_eq!(generator.generate().as_str(), "p000002");
    }

    #[test]
    fn starts_from_offset() {
        let generator = SeqGenerator::with_offset("node-a-", 1000);

        assert_eq!(generator.generate().as_str(), "node-a-001000");
        assert_eq!(generator.generate().as_str(), "node-a-001001");
    }
}
