//! Serialize a [`Duration`] the way load-test scripts write them (`30s`, `1m`, `1m30s`).
use serde::Serializer;
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // humantime separates units with spaces, scripts don't.
    let compact = humantime::format_duration(*duration).to_string().replace(' ', "");
    serializer.serialize_str(&compact)
}
