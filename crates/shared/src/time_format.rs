//! Serde helpers for wall-clock values.

/// Serializes a `NaiveTime` as `HH:MM` and parses it back with the same rules
/// as [`crate::validation::parse_time_of_day`].
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        crate::validation::parse_time_of_day(&raw).map_err(|e| {
            serde::de::Error::custom(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid time of day".to_string()),
            )
        })
    }
}
