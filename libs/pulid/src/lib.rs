//! # pulid
//!
//! Prefixed ULIDs: compact, sortable, globally unique identifiers that carry
//! a caller-chosen two-byte category prefix.
//!
//! ## Layout
//!
//! An identifier is 18 bytes: the 2-byte prefix, a 48-bit big-endian Unix
//! timestamp in milliseconds, and 80 bits of entropy. The last 16 bytes are
//! a standard ULID.
//!
//! Text form is 28 characters: the prefix verbatim followed by the ULID's
//! 26-character base-32 encoding, e.g. `PR01AN4Z07BY79KA1307SR9X4MV3`.
//!
//! ## Ordering
//!
//! Identifiers compare byte-wise, and the text form preserves that order.
//! The prefix comes first, so identifiers are time-sorted only within a
//! prefix.
//!
//! ## Example
//!
//! ```
//! use pulid::{Pulid, ZeroEntropy};
//!
//! let id = Pulid::new("PR", 1_000_000_000_000, &mut ZeroEntropy)?;
//! assert_eq!(id.to_string(), "PR00X3AAA4000000000000000000");
//!
//! let parsed = Pulid::parse_strict("PR01AN4Z07BY79KA1307SR9X4MV3")?;
//! assert_eq!(parsed.prefix(), "PR");
//!
//! let fresh = Pulid::make("OR");
//! assert!(fresh.timestamp_ms() > 0);
//! # Ok::<(), pulid::PulidError>(())
//! ```

pub mod codec;
mod entropy;
mod error;
mod generator;
mod macros;
#[cfg(feature = "postgres")]
mod postgres;
mod pulid;
mod scan;
mod serialize;

pub use entropy::{
    EntropySource, FixedEntropy, Monotonic, MonotonicConfig, OsEntropy, RandomEntropy,
    ZeroEntropy, ENTROPY_LEN,
};
pub use error::{EntropyError, PulidError};
pub use generator::{
    datetime, default_generator, now_ms, unix_ms, Clock, DefaultGenerator, Generator,
    SystemClock,
};
pub use pulid::{Pulid, BINARY_LEN, ENCODED_LEN, MAX_TIMESTAMP_MS, PREFIX_LEN};
pub use scan::ScanValue;

/// Re-export ulid for consumers that need the embedded ULID directly
pub use ulid::Ulid;

#[doc(hidden)]
pub use serde as __serde;
