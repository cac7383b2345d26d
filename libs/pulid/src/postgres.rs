//! PostgreSQL column support via sqlx.
//!
//! Identifiers are written as `TEXT`; one whose prefix is not UTF-8 cannot
//! be written. Reading accepts text-like columns (parsed leniently) and
//! `BYTEA` (18 raw bytes); SQL `NULL` reads as [`Pulid::NIL`]. Other column
//! types fail with `UnrecognizedScanInput`.

use std::borrow::Cow;

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type, TypeInfo, ValueRef};
use tracing::debug;

use crate::{Pulid, PulidError, ScanValue};

impl Type<Postgres> for Pulid {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty) || <Vec<u8> as Type<Postgres>>::compatible(ty)
    }
}

impl PgHasArrayType for Pulid {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

impl Encode<'_, Postgres> for Pulid {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        match self.value() {
            ScanValue::Text(text) => <&str as Encode<'_, Postgres>>::encode_by_ref(&&*text, buf),
            _ => Err(format!("{self:?} has a non-UTF-8 prefix and no text form").into()),
        }
    }
}

impl<'r> Decode<'r, Postgres> for Pulid {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.is_null() {
            return Ok(Pulid::NIL);
        }

        let (is_bytes, is_text) = {
            let ty = value.type_info();
            (
                <Vec<u8> as Type<Postgres>>::compatible(&ty),
                <String as Type<Postgres>>::compatible(&ty),
            )
        };

        let src = if is_bytes {
            ScanValue::Bytes(Cow::Borrowed(<&[u8] as Decode<'r, Postgres>>::decode(value)?))
        } else if is_text {
            ScanValue::Text(Cow::Borrowed(<&str as Decode<'r, Postgres>>::decode(value)?))
        } else {
            let type_name = value.type_info().name().to_string();
            debug!(%type_name, "rejecting column type for pulid");
            return Err(Box::new(PulidError::UnrecognizedScanInput {
                kind: "column type",
            }));
        };

        Ok(Pulid::from_scan(src)?)
    }
}
