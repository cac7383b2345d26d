//! The prefixed identifier value type.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::codec::{self, ULID_ENCODED_LEN, ULID_LEN};
use crate::entropy::{EntropySource, ENTROPY_LEN};
use crate::generator::{self, datetime, unix_ms};
use crate::PulidError;

/// Length of the prefix in bytes.
pub const PREFIX_LEN: usize = 2;

/// Length of the binary encoding.
pub const BINARY_LEN: usize = PREFIX_LEN + ULID_LEN;

/// Length of the text encoding.
pub const ENCODED_LEN: usize = PREFIX_LEN + ULID_ENCODED_LEN;

/// Largest timestamp that fits the 48-bit field.
pub const MAX_TIMESTAMP_MS: u64 = (1 << 48) - 1;

const TIME_START: usize = PREFIX_LEN;
const ENTROPY_START: usize = TIME_START + 6;

/// A prefixed ULID.
///
/// Layout (18 bytes):
///
/// ```text
/// 0      2                8                    18
/// +------+----------------+--------------------+
/// |prefix| timestamp (BE) |      entropy       |
/// +------+----------------+--------------------+
/// ```
///
/// Ordering is byte-wise, so the prefix dominates: identifiers are
/// time-sortable only among those sharing a prefix.
///
/// Text form is 28 characters, e.g. `PR01AN4Z07BY79KA1307SR9X4MV3`: the two
/// prefix bytes verbatim followed by the 26-character encoding of the
/// embedded ULID.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pulid([u8; BINARY_LEN]);

impl Pulid {
    /// The all-zero identifier. Encodes as 28 `'0'` characters.
    pub const NIL: Pulid = Pulid([0; BINARY_LEN]);

    /// Builds an identifier from a prefix, a Unix timestamp in milliseconds
    /// and an entropy source.
    ///
    /// Fails with `PrefixLength` unless the prefix is exactly two bytes,
    /// `TimestampOverflow` if `ms` exceeds [`MAX_TIMESTAMP_MS`], or with
    /// whatever error the entropy source reports.
    pub fn new<P, E>(prefix: P, ms: u64, entropy: &mut E) -> Result<Self, PulidError>
    where
        P: AsRef<[u8]>,
        E: EntropySource + ?Sized,
    {
        let prefix = prefix_array(prefix.as_ref())?;
        check_timestamp(ms)?;

        let mut random = [0u8; ENTROPY_LEN];
        entropy.fill_entropy(ms, &mut random)?;

        let mut bytes = [0u8; BINARY_LEN];
        bytes[..PREFIX_LEN].copy_from_slice(&prefix);
        bytes[TIME_START..ENTROPY_START].copy_from_slice(&ms.to_be_bytes()[2..]);
        bytes[ENTROPY_START..].copy_from_slice(&random);
        Ok(Self(bytes))
    }

    /// Like [`Pulid::new`], taking the timestamp from a date-time.
    pub fn new_at<P, E>(
        prefix: P,
        time: DateTime<Utc>,
        entropy: &mut E,
    ) -> Result<Self, PulidError>
    where
        P: AsRef<[u8]>,
        E: EntropySource + ?Sized,
    {
        Self::new(prefix, unix_ms(time)?, entropy)
    }

    /// Joins a prefix and an existing ULID.
    pub fn from_ulid<P: AsRef<[u8]>>(prefix: P, ulid: Ulid) -> Result<Self, PulidError> {
        let prefix = prefix_array(prefix.as_ref())?;
        Ok(Self::join(&prefix, &ulid.to_bytes()))
    }

    /// Builds an identifier from its raw bytes. Any 18 bytes are accepted.
    pub const fn from_bytes(bytes: [u8; BINARY_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an identifier from a byte slice.
    ///
    /// Fails with `DataSize` unless the slice is exactly 18 bytes. No other
    /// validation is done.
    pub fn from_slice(data: &[u8]) -> Result<Self, PulidError> {
        <[u8; BINARY_LEN]>::try_from(data)
            .map(Self)
            .map_err(|_| PulidError::DataSize {
                expected: BINARY_LEN,
                actual: data.len(),
            })
    }

    /// Builds an identifier stamped with the current time, using the
    /// process-wide monotonic generator. Safe to call concurrently.
    pub fn try_make<P: AsRef<[u8]>>(prefix: P) -> Result<Self, PulidError> {
        generator::default_generator().generate(prefix)
    }

    /// Parses the 28-character text form.
    ///
    /// Fails with `DataSize` on any other length. Characters outside the
    /// alphabet are not rejected; they produce an unspecified identifier.
    /// Use [`Pulid::parse_strict`] for untrusted input.
    ///
    /// Twenty-eight `'0'` characters decode to [`Pulid::NIL`].
    pub fn parse<T: AsRef<[u8]>>(text: T) -> Result<Self, PulidError> {
        let text = text.as_ref();
        if is_nil_text(text) {
            return Ok(Self::NIL);
        }
        let (prefix, encoded) = split_text(text)?;
        Ok(Self::join(&prefix, &codec::decode_lenient(&encoded)))
    }

    /// Parses the 28-character text form, rejecting characters outside the
    /// alphabet (`InvalidCharacter`) and values wider than 128 bits
    /// (`Overflow`). The prefix is taken verbatim, except that 28 `'0'`
    /// characters decode to [`Pulid::NIL`].
    pub fn parse_strict<T: AsRef<[u8]>>(text: T) -> Result<Self, PulidError> {
        let text = text.as_ref();
        if is_nil_text(text) {
            return Ok(Self::NIL);
        }
        let (prefix, encoded) = split_text(text)?;
        let ulid = codec::decode_strict(&encoded).map_err(|e| match e {
            PulidError::InvalidCharacter { position, byte } => PulidError::InvalidCharacter {
                position: position + PREFIX_LEN,
                byte,
            },
            other => other,
        })?;
        Ok(Self::join(&prefix, &ulid))
    }

    /// Returns the raw bytes.
    pub const fn to_bytes(self) -> [u8; BINARY_LEN] {
        self.0
    }

    pub const fn as_bytes(&self) -> &[u8; BINARY_LEN] {
        &self.0
    }

    /// Copies the raw bytes into `dst`, which must be exactly 18 bytes.
    pub fn marshal_binary_to(&self, dst: &mut [u8]) -> Result<(), PulidError> {
        if dst.len() != BINARY_LEN {
            return Err(PulidError::BufferSize {
                expected: BINARY_LEN,
                actual: dst.len(),
            });
        }
        dst.copy_from_slice(&self.0);
        Ok(())
    }

    /// Returns the 28-byte text form.
    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut out = [0u8; ENCODED_LEN];
        self.write_text(&mut out);
        out
    }

    /// Writes the text form into `dst`, which must be exactly 28 bytes.
    pub fn encode_to(&self, dst: &mut [u8]) -> Result<(), PulidError> {
        let actual = dst.len();
        let dst: &mut [u8; ENCODED_LEN] = dst.try_into().map_err(|_| PulidError::BufferSize {
            expected: ENCODED_LEN,
            actual,
        })?;
        self.write_text(dst);
        Ok(())
    }

    fn write_text(&self, dst: &mut [u8; ENCODED_LEN]) {
        if self.is_nil() {
            dst.fill(b'0');
            return;
        }
        dst[..PREFIX_LEN].copy_from_slice(self.prefix_bytes());
        dst[PREFIX_LEN..].copy_from_slice(&codec::encode(&self.ulid_bytes()));
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    pub fn prefix_bytes(&self) -> &[u8] {
        &self.0[..PREFIX_LEN]
    }

    /// Returns the prefix as text. Bytes that are not valid UTF-8 are
    /// replaced with U+FFFD.
    pub fn prefix(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.prefix_bytes())
    }

    /// Returns the prefix if it is valid UTF-8, which is exactly when the
    /// text form is a valid string.
    pub fn prefix_str(&self) -> Option<&str> {
        std::str::from_utf8(self.prefix_bytes()).ok()
    }

    /// Returns the embedded ULID.
    pub fn ulid(&self) -> Ulid {
        Ulid::from_bytes(self.ulid_bytes())
    }

    fn ulid_bytes(&self) -> [u8; ULID_LEN] {
        let mut bytes = [0u8; ULID_LEN];
        bytes.copy_from_slice(&self.0[PREFIX_LEN..]);
        bytes
    }

    /// Returns the Unix timestamp in milliseconds.
    pub fn timestamp_ms(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf[2..].copy_from_slice(&self.0[TIME_START..ENTROPY_START]);
        u64::from_be_bytes(buf)
    }

    /// Returns the timestamp as a date-time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        datetime(self.timestamp_ms())
    }

    /// Rewrites the timestamp. Prefix and entropy are kept.
    pub fn set_timestamp_ms(&mut self, ms: u64) -> Result<(), PulidError> {
        check_timestamp(ms)?;
        self.0[TIME_START..ENTROPY_START].copy_from_slice(&ms.to_be_bytes()[2..]);
        Ok(())
    }

    pub fn entropy(&self) -> &[u8] {
        &self.0[ENTROPY_START..]
    }

    /// Rewrites the entropy, which must be exactly 10 bytes. Prefix and
    /// timestamp are kept.
    pub fn set_entropy(&mut self, entropy: &[u8]) -> Result<(), PulidError> {
        if entropy.len() != ENTROPY_LEN {
            return Err(PulidError::DataSize {
                expected: ENTROPY_LEN,
                actual: entropy.len(),
            });
        }
        self.0[ENTROPY_START..].copy_from_slice(entropy);
        Ok(())
    }

    /// Compares the full 18 bytes as unsigned values. Same as `Ord`.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }

    fn join(prefix: &[u8; PREFIX_LEN], ulid: &[u8; ULID_LEN]) -> Self {
        let mut bytes = [0u8; BINARY_LEN];
        bytes[..PREFIX_LEN].copy_from_slice(prefix);
        bytes[PREFIX_LEN..].copy_from_slice(ulid);
        Self(bytes)
    }
}

// Panicking conveniences over the fallible constructors.
impl Pulid {
    /// [`Pulid::new`], panicking on failure.
    #[track_caller]
    pub fn must_new<P, E>(prefix: P, ms: u64, entropy: &mut E) -> Self
    where
        P: AsRef<[u8]>,
        E: EntropySource + ?Sized,
    {
        must(Self::new(prefix, ms, entropy))
    }

    /// Builds an identifier at `time` using the process-wide monotonic
    /// generator, panicking on failure.
    #[track_caller]
    pub fn must_new_at<P: AsRef<[u8]>>(prefix: P, time: DateTime<Utc>) -> Self {
        must(unix_ms(time).and_then(|ms| generator::default_generator().generate_at(prefix, ms)))
    }

    /// [`Pulid::try_make`], panicking on failure.
    #[track_caller]
    pub fn make<P: AsRef<[u8]>>(prefix: P) -> Self {
        must(Self::try_make(prefix))
    }

    /// [`Pulid::parse`], panicking on failure.
    #[track_caller]
    pub fn must_parse<T: AsRef<[u8]>>(text: T) -> Self {
        must(Self::parse(text))
    }

    /// [`Pulid::parse_strict`], panicking on failure.
    #[track_caller]
    pub fn must_parse_strict<T: AsRef<[u8]>>(text: T) -> Self {
        must(Self::parse_strict(text))
    }
}

#[track_caller]
fn must<T>(result: Result<T, PulidError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("pulid: {e}"),
    }
}

fn prefix_array(prefix: &[u8]) -> Result<[u8; PREFIX_LEN], PulidError> {
    <[u8; PREFIX_LEN]>::try_from(prefix).map_err(|_| PulidError::PrefixLength {
        len: prefix.len(),
    })
}

fn check_timestamp(ms: u64) -> Result<(), PulidError> {
    if ms > MAX_TIMESTAMP_MS {
        return Err(PulidError::TimestampOverflow { ms });
    }
    Ok(())
}

/// The nil text form, which `write_text` emits for [`Pulid::NIL`].
fn is_nil_text(text: &[u8]) -> bool {
    text.len() == ENCODED_LEN && text.iter().all(|&b| b == b'0')
}

fn split_text(text: &[u8]) -> Result<([u8; PREFIX_LEN], [u8; ULID_ENCODED_LEN]), PulidError> {
    if text.len() != ENCODED_LEN {
        return Err(PulidError::DataSize {
            expected: ENCODED_LEN,
            actual: text.len(),
        });
    }
    let mut prefix = [0u8; PREFIX_LEN];
    let mut encoded = [0u8; ULID_ENCODED_LEN];
    prefix.copy_from_slice(&text[..PREFIX_LEN]);
    encoded.copy_from_slice(&text[PREFIX_LEN..]);
    Ok((prefix, encoded))
}

impl fmt::Display for Pulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.encode()))
    }
}

impl fmt::Debug for Pulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pulid").field(&format_args!("{self}")).finish()
    }
}

impl FromStr for Pulid {
    type Err = PulidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Pulid {
    type Error = PulidError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&[u8]> for Pulid {
    type Error = PulidError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(data)
    }
}

impl From<[u8; BINARY_LEN]> for Pulid {
    fn from(bytes: [u8; BINARY_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Pulid> for [u8; BINARY_LEN] {
    fn from(id: Pulid) -> Self {
        id.0
    }
}

impl AsRef<[u8]> for Pulid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
