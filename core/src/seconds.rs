//! Serde adapter that stores [`Duration`] values as float seconds.

use std::time::Duration;

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

pub(crate) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.as_secs_f64())
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(D::Error::custom(format!(
            "expected a non-negative number of seconds, found {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(D::Error::custom)
}
