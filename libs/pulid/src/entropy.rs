//! Entropy sources for the 10-byte random segment of an identifier.
//!
//! A source is asked for entropy together with the millisecond the new
//! identifier is stamped with, so monotonic sources can keep per-millisecond
//! state. Stateless sources ignore it.

use rand::rngs::{OsRng, ThreadRng};
use rand::{Rng, RngCore, TryRngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::EntropyError;

/// Length of the entropy segment in bytes.
pub const ENTROPY_LEN: usize = 10;

/// Largest value representable by the 80-bit entropy segment.
const ENTROPY_MAX: u128 = (1 << 80) - 1;

/// Something that can fill the entropy segment of a new identifier.
pub trait EntropySource {
    /// Fills `dst` with entropy for an identifier stamped at `ms`.
    fn fill_entropy(&mut self, ms: u64, dst: &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError>;
}

impl<F> EntropySource for F
where
    F: FnMut(u64, &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError>,
{
    fn fill_entropy(&mut self, ms: u64, dst: &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError> {
        self(ms, dst)
    }
}

/// All-zero entropy. Deterministic; useful for fixtures and range bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroEntropy;

impl EntropySource for ZeroEntropy {
    fn fill_entropy(&mut self, _ms: u64, dst: &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError> {
        dst.fill(0);
        Ok(())
    }
}

/// The same caller-chosen bytes on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEntropy(pub [u8; ENTROPY_LEN]);

impl EntropySource for FixedEntropy {
    fn fill_entropy(&mut self, _ms: u64, dst: &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError> {
        *dst = self.0;
        Ok(())
    }
}

/// Fresh random bytes on every call.
#[derive(Debug, Clone)]
pub struct RandomEntropy<R = ThreadRng> {
    rng: R,
}

impl RandomEntropy<ThreadRng> {
    /// Random entropy from the thread-local generator.
    pub fn thread() -> Self {
        Self { rng: rand::rng() }
    }
}

impl<R: RngCore> RandomEntropy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> EntropySource for RandomEntropy<R> {
    fn fill_entropy(&mut self, _ms: u64, dst: &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError> {
        self.rng.fill_bytes(dst);
        Ok(())
    }
}

/// Entropy read directly from the operating system.
///
/// May block until the OS pool is initialised. Failures are reported as
/// [`EntropyError::Source`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_entropy(&mut self, _ms: u64, dst: &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dst)
            .map_err(|e| EntropyError::Source {
                message: e.to_string(),
            })
    }
}

/// Tuning for [`Monotonic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonotonicConfig {
    /// Upper bound of the random increment applied within one millisecond.
    /// `1` yields a plain counter; `0` means the default.
    pub max_increment: u64,
}

impl MonotonicConfig {
    pub const DEFAULT_MAX_INCREMENT: u64 = u32::MAX as u64;

    fn effective_max_increment(&self) -> u64 {
        if self.max_increment == 0 {
            Self::DEFAULT_MAX_INCREMENT
        } else {
            self.max_increment
        }
    }
}

impl Default for MonotonicConfig {
    fn default() -> Self {
        Self {
            max_increment: Self::DEFAULT_MAX_INCREMENT,
        }
    }
}

/// Entropy that strictly increases within a millisecond.
///
/// The first call for a millisecond draws fresh random bytes. Later calls
/// for the same millisecond add a random increment in
/// `[1, max_increment]` to the previous value, treated as an 80-bit
/// unsigned integer, so identifiers sharing a prefix and a millisecond
/// sort in creation order. A different millisecond (forwards or
/// backwards) reseeds.
///
/// Not synchronised; wrap it in a [`Generator`](crate::Generator) to share it.
#[derive(Debug, Clone)]
pub struct Monotonic<R> {
    rng: R,
    max_increment: u64,
    last: Option<(u64, u128)>,
}

impl<R: RngCore> Monotonic<R> {
    pub fn new(rng: R, config: MonotonicConfig) -> Self {
        Self {
            rng,
            max_increment: config.effective_max_increment(),
            last: None,
        }
    }

    /// Monotonic entropy with the default increment bound.
    pub fn with_rng(rng: R) -> Self {
        Self::new(rng, MonotonicConfig::default())
    }

    fn increment(&mut self) -> u64 {
        if self.max_increment == 1 {
            1
        } else {
            1 + self.rng.random_range(0..self.max_increment)
        }
    }

    fn reseed(&mut self, ms: u64, dst: &mut [u8; ENTROPY_LEN]) {
        self.rng.fill_bytes(dst);
        let mut wide = [0u8; 16];
        wide[16 - ENTROPY_LEN..].copy_from_slice(dst);
        self.last = Some((ms, u128::from_be_bytes(wide)));
    }
}

impl<R: RngCore> EntropySource for Monotonic<R> {
    fn fill_entropy(&mut self, ms: u64, dst: &mut [u8; ENTROPY_LEN]) -> Result<(), EntropyError> {
        match self.last {
            Some((last_ms, value)) if last_ms == ms => {
                let next = value + u128::from(self.increment());
                if next > ENTROPY_MAX {
                    warn!(ms, "monotonic entropy exhausted for this millisecond");
                    return Err(EntropyError::MonotonicOverflow);
                }
                self.last = Some((ms, next));
                dst.copy_from_slice(&next.to_be_bytes()[16 - ENTROPY_LEN..]);
            }
            Some((last_ms, _)) => {
                if ms < last_ms {
                    debug!(last_ms, ms, "clock moved backwards, reseeding monotonic entropy");
                }
                self.reseed(ms, dst);
            }
            None => self.reseed(ms, dst),
        }
        Ok(())
    }
}
