//! Structured-data adapter: serde support.
//!
//! Human-readable formats carry the 28-character text form as a string;
//! binary formats, and identifiers whose prefix is not UTF-8, carry the 18
//! raw bytes. Deserialization goes through
//! [`Pulid::scan`], so it accepts the same inputs a database column does.

use std::borrow::Cow;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::{Pulid, ScanValue, BINARY_LEN};

impl Serialize for Pulid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // A prefix that is not UTF-8 has no string form; fall back to bytes.
        if serializer.is_human_readable() && self.prefix_str().is_some() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_bytes(self.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Pulid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(PulidVisitor)
        } else {
            deserializer.deserialize_bytes(PulidVisitor)
        }
    }
}

struct PulidVisitor;

impl PulidVisitor {
    fn scan<E: de::Error>(src: ScanValue<'_>) -> Result<Pulid, E> {
        Pulid::from_scan(src).map_err(E::custom)
    }
}

impl<'de> Visitor<'de> for PulidVisitor {
    type Value = Pulid;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 28-character pulid string or 18 bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Pulid, E> {
        Self::scan(ScanValue::Text(Cow::Borrowed(v)))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Pulid, E> {
        Self::scan(ScanValue::Bytes(Cow::Borrowed(v)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Pulid, A::Error> {
        let mut bytes = Vec::with_capacity(BINARY_LEN);
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Self::scan(ScanValue::Bytes(Cow::Owned(bytes)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Pulid, E> {
        Self::scan(ScanValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Pulid, E> {
        Self::scan(ScanValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Pulid, D::Error> {
        Pulid::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Pulid, E> {
        Self::scan(ScanValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Pulid, E> {
        Self::scan(ScanValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Pulid, E> {
        Self::scan(ScanValue::Int(i64::try_from(v).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Pulid, E> {
        Self::scan(ScanValue::Float(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::value::{BytesDeserializer, Error as ValueError};

    const SAMPLE: &str = "PR01AN4Z07BY79KA1307SR9X4MV3";

    #[test]
    fn test_json_is_quoted_text() {
        let id = Pulid::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let parsed: Pulid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_json_nil() {
        assert_eq!(
            serde_json::to_string(&Pulid::NIL).unwrap(),
            format!("\"{}\"", "0".repeat(28))
        );
        let parsed: Pulid = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Pulid::NIL);
        let parsed: Option<Pulid> = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_json_lowercase() {
        let parsed: Pulid = serde_json::from_str("\"PR01an4z07by79ka1307sr9x4mv3\"").unwrap();
        assert_eq!(parsed.to_string(), SAMPLE);
    }

    #[test]
    fn test_json_rejects_other_types() {
        let err = serde_json::from_str::<Pulid>("42").unwrap_err();
        assert!(err.to_string().contains("cannot scan integer"), "{err}");
        let err = serde_json::from_str::<Pulid>("true").unwrap_err();
        assert!(err.to_string().contains("cannot scan boolean"), "{err}");
        let err = serde_json::from_str::<Pulid>("{}").unwrap_err();
        assert!(err.to_string().contains("pulid"), "{err}");
        let err = serde_json::from_str::<Pulid>("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("bad data size"), "{err}");
    }

    #[test]
    fn test_json_rejects_wrong_length() {
        let err = serde_json::from_str::<Pulid>("\"PR01\"").unwrap_err();
        assert!(err.to_string().contains("bad data size"), "{err}");
    }

    #[test]
    fn test_json_binary_prefix_roundtrip() {
        let mut bytes = [0x22u8; 18];
        bytes[..2].copy_from_slice(&[0xFF, 0xFE]);
        let id = Pulid::from_bytes(bytes);
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with("[255,254,"), "{json}");
        let parsed: Pulid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_bytes() {
        let id = Pulid::parse(SAMPLE).unwrap();
        let de = BytesDeserializer::<ValueError>::new(id.as_bytes());
        assert_eq!(Pulid::deserialize(de).unwrap(), id);

        let de = BytesDeserializer::<ValueError>::new(&[1, 2, 3]);
        assert!(Pulid::deserialize(de).is_err());
    }

    #[test]
    fn test_struct_field() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Order {
            id: Pulid,
            parent: Option<Pulid>,
        }

        let order = Order {
            id: Pulid::parse(SAMPLE).unwrap(),
            parent: None,
        };
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, format!("{{\"id\":\"{SAMPLE}\",\"parent\":null}}"));
        assert_eq!(serde_json::from_str::<Order>(&json).unwrap(), order);
    }
}
