//! Macro for declaring typed identifiers with a fixed prefix.

/// Declares a newtype around [`Pulid`](crate::Pulid) whose prefix is fixed.
///
/// This generates:
/// - A `PREFIX` constant, checked at compile time to be two bytes
/// - `new()`, `try_make()` and `make()` constructors
/// - `parse()` and `parse_strict()`, which also reject other prefixes
/// - `Display`, `FromStr`, `Serialize` and `Deserialize`
/// - `From<Name> for Pulid` and `TryFrom<Pulid> for Name`
///
/// # Example
///
/// ```
/// pulid::define_pulid!(OrderId, "OR");
///
/// let id = OrderId::make();
/// assert!(id.to_string().starts_with("OR"));
/// let parsed: OrderId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[macro_export]
macro_rules! define_pulid {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Pulid);

        const _: () = assert!(
            $prefix.len() == $crate::PREFIX_LEN,
            "pulid prefixes are exactly two bytes"
        );

        impl $name {
            /// The prefix carried by every identifier of this type.
            pub const PREFIX: &'static str = $prefix;

            /// Creates an identifier at `ms` with entropy from `entropy`.
            pub fn new<E>(ms: u64, entropy: &mut E) -> Result<Self, $crate::PulidError>
            where
                E: $crate::EntropySource + ?Sized,
            {
                $crate::Pulid::new(Self::PREFIX, ms, entropy).map(Self)
            }

            /// Creates an identifier from the process-wide generator.
            pub fn try_make() -> Result<Self, $crate::PulidError> {
                $crate::Pulid::try_make(Self::PREFIX).map(Self)
            }

            /// Like `try_make`, panicking on failure.
            #[must_use]
            pub fn make() -> Self {
                Self($crate::Pulid::make(Self::PREFIX))
            }

            #[must_use]
            pub const fn pulid(&self) -> $crate::Pulid {
                self.0
            }

            #[must_use]
            pub fn timestamp_ms(&self) -> u64 {
                self.0.timestamp_ms()
            }

            /// Parses the text form leniently and checks the prefix.
            pub fn parse(s: &str) -> Result<Self, $crate::PulidError> {
                Self::try_from($crate::Pulid::parse(s)?)
            }

            /// Parses the text form strictly and checks the prefix.
            pub fn parse_strict(s: &str) -> Result<Self, $crate::PulidError> {
                Self::try_from($crate::Pulid::parse_strict(s)?)
            }
        }

        impl ::std::convert::TryFrom<$crate::Pulid> for $name {
            type Error = $crate::PulidError;

            fn try_from(id: $crate::Pulid) -> Result<Self, Self::Error> {
                if id.prefix_bytes() != Self::PREFIX.as_bytes() {
                    return Err($crate::PulidError::PrefixMismatch {
                        expected: Self::PREFIX,
                        actual: id.prefix().into_owned(),
                    });
                }
                Ok(Self(id))
            }
        }

        impl ::std::convert::From<$name> for $crate::Pulid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::PulidError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                $crate::__serde::Serialize::serialize(&self.0, serializer)
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let id =
                    <$crate::Pulid as $crate::__serde::Deserialize>::deserialize(deserializer)?;
                Self::try_from(id).map_err($crate::__serde::de::Error::custom)
            }
        }

        impl AsRef<$crate::Pulid> for $name {
            fn as_ref(&self) -> &$crate::Pulid {
                &self.0
            }
        }
    };
}
