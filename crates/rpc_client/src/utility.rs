//! Wire helpers shared by the models and the clients.

use base64::{engine::general_purpose, Engine as _};

/// Serde adapter for byte fields the daemon encodes as standard base64
pub mod base64_bytes {
    use super::*;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(D::Error::custom)
    }
}

/// Serde adapter for optional base64 byte fields
pub mod base64_bytes_opt {
    use super::*;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&general_purpose::STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|value| {
                general_purpose::STANDARD
                    .decode(value.as_bytes())
                    .map_err(D::Error::custom)
            })
            .transpose()
    }
}

/// Encodes key material for display
pub fn encode_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Sums every sample of a counter in Prometheus text exposition format.
///
/// Labelled series (`name{peer="a"} 3`) are added up; comments, other
/// metrics and unparsable values are ignored. Returns `None` when the
/// counter does not appear at all.
pub fn prometheus_counter(exposition: &str, name: &str) -> Option<u64> {
    let mut total: Option<f64> = None;
    for line in exposition.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix(name) else {
            continue;
        };
        let rest = if let Some(labelled) = rest.strip_prefix('{') {
            match labelled.split_once('}') {
                Some((_, after)) => after,
                None => continue,
            }
        } else if rest.starts_with(char::is_whitespace) {
            rest
        } else {
            // A longer metric name sharing the prefix
            continue;
        };
        let Some(value) = rest.split_whitespace().next() else {
            continue;
        };
        if let Ok(value) = value.parse::<f64>() {
            if value.is_finite() && value >= 0.0 {
                *total.get_or_insert(0.0) += value;
            }
        }
    }
    total.map(|value| value as u64)
}
