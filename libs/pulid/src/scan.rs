//! Database adapter surface.
//!
//! [`ScanValue`] mirrors the value kinds a SQL driver hands back for a
//! column. Only the null value, a `Pulid`, text and bytes convert into an
//! identifier; every other kind is reported as `UnrecognizedScanInput`.
//! Identifiers are persisted in their text form.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use crate::{Pulid, PulidError};

/// A driver-level column value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue<'a> {
    Null,
    Pulid(Pulid),
    Text(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl ScanValue<'_> {
    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanValue::Null => "null",
            ScanValue::Pulid(_) => "pulid",
            ScanValue::Text(_) => "text",
            ScanValue::Bytes(_) => "bytes",
            ScanValue::Int(_) => "integer",
            ScanValue::Float(_) => "float",
            ScanValue::Bool(_) => "boolean",
            ScanValue::Timestamp(_) => "timestamp",
        }
    }
}

impl Pulid {
    /// Overwrites `self` from a driver value.
    ///
    /// `Null` leaves `self` untouched. Text is parsed leniently, bytes must
    /// be exactly 18 long. On error `self` is unchanged.
    pub fn scan(&mut self, src: ScanValue<'_>) -> Result<(), PulidError> {
        match src {
            ScanValue::Null => {}
            ScanValue::Pulid(id) => *self = id,
            ScanValue::Text(text) => *self = Pulid::parse(text.as_bytes())?,
            ScanValue::Bytes(bytes) => *self = Pulid::from_slice(&bytes)?,
            other => {
                return Err(PulidError::UnrecognizedScanInput { kind: other.kind() });
            }
        }
        Ok(())
    }

    /// Scans into [`Pulid::NIL`].
    pub fn from_scan(src: ScanValue<'_>) -> Result<Self, PulidError> {
        let mut id = Pulid::NIL;
        id.scan(src)?;
        Ok(id)
    }

    /// The value to persist: the canonical text form, or the 18 raw bytes
    /// when the prefix is not valid UTF-8 and so has no text form.
    pub fn value(&self) -> ScanValue<'static> {
        match self.prefix_str() {
            Some(_) => ScanValue::Text(Cow::Owned(self.to_string())),
            None => ScanValue::Bytes(Cow::Owned(self.to_bytes().to_vec())),
        }
    }
}

impl From<Pulid> for ScanValue<'_> {
    fn from(id: Pulid) -> Self {
        ScanValue::Pulid(id)
    }
}

impl<'a> From<&'a str> for ScanValue<'a> {
    fn from(text: &'a str) -> Self {
        ScanValue::Text(Cow::Borrowed(text))
    }
}

impl From<String> for ScanValue<'_> {
    fn from(text: String) -> Self {
        ScanValue::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a [u8]> for ScanValue<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ScanValue::Bytes(Cow::Borrowed(bytes))
    }
}

impl From<Vec<u8>> for ScanValue<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        ScanValue::Bytes(Cow::Owned(bytes))
    }
}

impl<'a, T: Into<ScanValue<'a>>> From<Option<T>> for ScanValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScanValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "PR01AN4Z07BY79KA1307SR9X4MV3";

    #[test]
    fn test_scan_null_keeps_value() {
        let mut id = Pulid::parse(SAMPLE).unwrap();
        id.scan(ScanValue::Null).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
        assert_eq!(Pulid::from_scan(ScanValue::Null), Ok(Pulid::NIL));
    }

    #[test]
    fn test_scan_text_and_bytes() {
        let expected = Pulid::parse(SAMPLE).unwrap();
        assert_eq!(Pulid::from_scan(SAMPLE.into()), Ok(expected));
        assert_eq!(Pulid::from_scan(SAMPLE.to_string().into()), Ok(expected));
        assert_eq!(
            Pulid::from_scan(expected.as_bytes().as_slice().into()),
            Ok(expected)
        );
        assert_eq!(Pulid::from_scan(expected.into()), Ok(expected));
    }

    #[test]
    fn test_scan_size_errors_leave_value() {
        let mut id = Pulid::parse(SAMPLE).unwrap();
        assert!(id.scan("PR01".into()).unwrap_err().is_size_error());
        assert!(id.scan(vec![1u8; 16].into()).unwrap_err().is_size_error());
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_scan_unrecognized() {
        for (value, kind) in [
            (ScanValue::Int(7), "integer"),
            (ScanValue::Float(1.5), "float"),
            (ScanValue::Bool(true), "boolean"),
            (ScanValue::Timestamp(Utc::now()), "timestamp"),
        ] {
            assert_eq!(
                Pulid::from_scan(value),
                Err(PulidError::UnrecognizedScanInput { kind })
            );
        }
    }

    #[test]
    fn test_scan_option() {
        let missing: Option<&str> = None;
        assert_eq!(Pulid::from_scan(missing.into()), Ok(Pulid::NIL));
        assert_eq!(
            Pulid::from_scan(Some(SAMPLE).into()).unwrap().to_string(),
            SAMPLE
        );
    }

    #[test]
    fn test_value_is_text() {
        let id = Pulid::parse(SAMPLE).unwrap();
        assert_eq!(id.value(), ScanValue::Text(Cow::Borrowed(SAMPLE)));
        assert_eq!(
            Pulid::NIL.value(),
            ScanValue::Text(Cow::Owned("0".repeat(28)))
        );
        assert_eq!(Pulid::from_scan(id.value()), Ok(id));
    }

    #[test]
    fn test_value_with_binary_prefix_scans_back() {
        let mut bytes = [0x11u8; 18];
        bytes[..2].copy_from_slice(&[0xFF, 0xFE]);
        let id = Pulid::from_bytes(bytes);
        let stored = id.value();
        assert_eq!(stored, ScanValue::Bytes(Cow::Owned(bytes.to_vec())));
        assert_eq!(Pulid::from_scan(stored), Ok(id));
    }
}
