//! Clock abstraction and thread-safe identifier generation.
//!
//! [`Generator`] pairs a [`Clock`] with an [`EntropySource`] behind a mutex.
//! The clock is read while the lock is held, so callers that land on the
//! same millisecond are served in lock order and, with a [`Monotonic`]
//! source, receive strictly increasing entropy.
//!
//! [`default_generator`] is the lazily built process-wide instance behind
//! [`Pulid::make`](crate::Pulid::make).

use std::sync::{Mutex, OnceLock, PoisonError};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::entropy::{EntropySource, Monotonic, MonotonicConfig};
use crate::{Pulid, PulidError, MAX_TIMESTAMP_MS};

/// Source of the current Unix time in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        now_ms()
    }
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn now_ms(&self) -> u64 {
        self()
    }
}

/// Current Unix time in milliseconds. Clamped to zero before the epoch.
pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Converts a date-time to Unix milliseconds.
///
/// Fails with `TimestampBeforeEpoch` for times before 1970 and with
/// `TimestampOverflow` past [`MAX_TIMESTAMP_MS`].
pub fn unix_ms(time: DateTime<Utc>) -> Result<u64, PulidError> {
    let millis = time.timestamp_millis();
    let ms = u64::try_from(millis).map_err(|_| PulidError::TimestampBeforeEpoch { millis })?;
    if ms > MAX_TIMESTAMP_MS {
        return Err(PulidError::TimestampOverflow { ms });
    }
    Ok(ms)
}

/// Converts Unix milliseconds to a date-time.
pub fn datetime(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A clock and an entropy source, shareable across threads.
#[derive(Debug)]
pub struct Generator<C, E> {
    clock: C,
    entropy: Mutex<E>,
}

impl<C: Clock, E: EntropySource> Generator<C, E> {
    pub fn new(clock: C, entropy: E) -> Self {
        Self {
            clock,
            entropy: Mutex::new(entropy),
        }
    }

    /// Creates an identifier stamped with the clock's current time.
    pub fn generate<P: AsRef<[u8]>>(&self, prefix: P) -> Result<Pulid, PulidError> {
        let mut entropy = self.entropy.lock().unwrap_or_else(PoisonError::into_inner);
        let ms = self.clock.now_ms();
        Pulid::new(prefix, ms, &mut *entropy)
    }

    /// Creates an identifier stamped with `ms`.
    pub fn generate_at<P: AsRef<[u8]>>(&self, prefix: P, ms: u64) -> Result<Pulid, PulidError> {
        let mut entropy = self.entropy.lock().unwrap_or_else(PoisonError::into_inner);
        Pulid::new(prefix, ms, &mut *entropy)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock, R: rand::RngCore> Generator<C, Monotonic<R>> {
    /// Monotonic generator over the given clock and random source.
    pub fn monotonic(clock: C, rng: R, config: MonotonicConfig) -> Self {
        Self::new(clock, Monotonic::new(rng, config))
    }
}

/// The process-wide generator type.
pub type DefaultGenerator = Generator<SystemClock, Monotonic<StdRng>>;

static DEFAULT_GENERATOR: OnceLock<DefaultGenerator> = OnceLock::new();

/// Returns the process-wide generator: system clock and monotonic entropy
/// seeded from the thread-local generator on first use.
pub fn default_generator() -> &'static DefaultGenerator {
    DEFAULT_GENERATOR.get_or_init(|| {
        debug!("initializing default pulid generator");
        Generator::monotonic(
            SystemClock,
            StdRng::from_rng(&mut rand::rng()),
            MonotonicConfig::default(),
        )
    })
}
