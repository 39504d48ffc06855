//! Record encoding for the durable store.
//!
//! Every stored value is a JSON document wrapped in a small envelope that
//! carries a format version:
//!
//! ```json
//! {"version": 1, "data": [ ... ]}
//! ```
//!
//! Unknown fields are ignored on decode and optional fields have defaults, so
//! records written by older builds keep decoding when fields are added.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current record format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

// The version is informational for now; decoding only needs `data`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Encode a value for storage under `key`.
///
/// # Errors
///
/// Returns [`Error::Encode`] if serialization fails.
pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(&EnvelopeRef {
        version: FORMAT_VERSION,
        data: value,
    })
    .map_err(|source| Error::Encode {
        key: key.to_string(),
        source,
    })
}

/// Decode a value previously produced by [`encode`].
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are not a record of the expected shape.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice::<Envelope<T>>(bytes)
        .map(|envelope| envelope.data)
        .map_err(|source| Error::Decode {
            key: key.to_string(),
            source,
        })
}
