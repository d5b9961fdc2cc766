//! Wire models exchanged with the management agent.

use crate::error::Result;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

const POWERED_ON_FIELD: &str = "PoweredOn";

/// Power state reported by `GET /status`.
///
/// Decoding is lenient: a `null` document or a `null`/missing `PoweredOn`
/// reads as `false`, the key matches case-insensitively, the last
/// occurrence of a repeated key wins and unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerStatus {
    /// Whether the machine is currently powered on
    #[serde(rename = "PoweredOn")]
    pub powered_on: bool,
}

impl PowerStatus {
    /// Decode the first JSON value in `body`.
    ///
    /// Bytes following the first complete value are not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the body is empty, is not JSON, is
    /// neither an object nor `null`, or `PoweredOn` is not a boolean.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_slice(body);
        Ok(Self::deserialize(&mut deserializer)?)
    }
}

impl<'de> Deserialize<'de> for PowerStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PowerStatusVisitor)
    }
}

struct PowerStatusVisitor;

impl<'de> Visitor<'de> for PowerStatusVisitor {
    type Value = PowerStatus;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a power status object or null")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(PowerStatus::default())
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(PowerStatus::default())
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut status = PowerStatus::default();

        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case(POWERED_ON_FIELD) {
                // null leaves the previous value in place
                if let Some(powered_on) = map.next_value::<Option<bool>>()? {
                    status.powered_on = powered_on;
                }
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(status)
    }
}
