use crate::error::Error;
use crate::Generator;
use evanesce_core::PasteId;
use rand::distributions::Distribution;
use rand::rngs::OsRng;
use rand::Rng;
use typed_builder::TypedBuilder;

/// URL-safe alphabet, 64 symbols: `A-Z`, `a-z`, `0-9`, `_` and `-`.
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

const BITS_PER_SYMBOL: u32 = 6;
const MIN_LENGTH: usize = 1;
const MAX_LENGTH: usize = 64;

/// Picks one symbol of [`ALPHABET`] uniformly.
#[derive(Debug, Clone, Copy)]
pub struct UrlSafe;

impl Distribution<char> for UrlSafe {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        ALPHABET[rng.gen_range(0..ALPHABET.len())] as char
    }
}

/// Configures a [`RandomGenerator`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct RandomSettings {
    /// Number of symbols per id, in `1..=64`.
    #[builder(default = 8)]
    pub length: usize,
}

impl Default for RandomSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Generates ids from the operating system's CSPRNG.
///
/// Ids are never checked against storage here. The chance of a clash is a
/// function of the keyspace: each symbol carries 6 bits, so the default
/// 8-symbol id spans 2^48 values, and with `n` live pastes a clash somewhere
/// has probability of roughly `n^2 / 2^49` (about 0.2% at one million
/// pastes, 16% at ten million). Use [`collision_probability`](Self::collision_probability) to
/// size `length` for a deployment.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new(settings: RandomSettings) -> Result<Self, Error> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&settings.length) {
            return Err(Error::InvalidLength {
                length: settings.length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }

        Ok(Self {
            length: settings.length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Size of the id space in bits.
    pub fn keyspace_bits(&self) -> u32 {
        self.length as u32 * BITS_PER_SYMBOL
    }

    /// Birthday-bound probability that at least two of `live` ids coincide.
    pub fn collision_probability(&self, live: u64) -> f64 {
        let n = live as f64;
        let space = 2f64.powi(self.keyspace_bits() as i32);
        let exponent = -(n * (n - 1.0)) / (2.0 * space);
        -exponent.exp_m1()
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            length: RandomSettings::default().length,
        }
    }
}

impl Generator for RandomGenerator {
    type Output = PasteId;

    fn generate(&self) -> PasteId {
        // OsRng panics if the entropy source is unavailable
        let id: String = OsRng.sample_iter(UrlSafe).take(self.length).collect();
        PasteId::new_unchecked(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_length_is_eight() {
        let generator = RandomGenerator::default();
        let id = generator.generate();
        assert_eq!(id.as_str().len(), 8);
        assert_eq!(generator.keyspace_bits(), 48);
    }

    #[test]
    fn configurable_length() {
        let settings = RandomSettings::builder().length(21).build();
        let generator = RandomGenerator::new(settings).unwrap();
        assert_eq!(generator.length(), 21);
        assert_eq!(generator.generate().as_str().len(), 21);
    }

    #[test]
    fn rejects_out_of_range_length() {
        for length in [0, 65] {
            let settings = RandomSettings::builder().length(length).build();
            assert!(matches!(
                RandomGenerator::new(settings),
                Err(Error::InvalidLength { .. })
            ));
        }
    }

    #[test]
    fn ids_are_url_safe() {
        let generator = RandomGenerator::default();
        for _ in 0..1_000 {
            let id = generator.generate();
            let url_safe = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'-';
            assert!(id.as_str().bytes().all(url_safe));
        }
    }

    #[test]
    fn ids_are_distinct() {
        let generator = RandomGenerator::default();
        let ids: HashSet<_> = (0..10_000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn collision_probability_grows_with_population() {
        let generator = RandomGenerator::default();

        assert_eq!(generator.collision_probability(0), 0.0);
        assert_eq!(generator.collision_probability(1), 0.0);

        let million = generator.collision_probability(1_000_000);
        assert!(million > 0.001 && million < 0.003, "{million}");
        assert!(generator.collision_probability(10_000_000) > million);

        let longer = RandomGenerator::new(RandomSettings::builder().length(12).build()).unwrap();
        assert!(longer.collision_probability(1_000_000) < million);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
