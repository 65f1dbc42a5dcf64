//! Serde utilities for server payload quirks.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

/// Module to handle optional ids that the server sends as empty strings.
///
/// Direct and group channels carry `team_id: ""`, root posts carry
/// `root_id: ""`. Both map to `None`.
pub mod empty_string_as_none {
    use super::{Deserialize, Deserializer, Serializer};

    /// Serializes `None` as an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<str>,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(v.as_ref()),
            None => serializer.serialize_str(""),
        }
    }

    /// Deserializes an optional id, treating `""` and `null` as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a string nor null.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: From<String>,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.is_empty()).map(T::from))
    }
}

/// Module to handle booleans stored as `"true"` / `"false"` strings.
///
/// Preference values are always strings on the wire, but hand-written
/// snapshots tend to use real booleans.
pub mod bool_from_str {
    use super::{de, fmt, Deserializer, Serializer, Visitor};

    /// Serializes a bool as `"true"` or `"false"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    /// Deserializes a bool from a string or a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a boolean or a boolean string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BoolOrStringVisitor;

        impl Visitor<'_> for BoolOrStringVisitor {
            type Value = bool;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a boolean or the string \"true\"/\"false\"")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match value {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    other => Err(de::Error::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(BoolOrStringVisitor)
    }
}
