//! Inline Datum Codec
//!
//! Records attached to outputs travel as CBOR bytes. Any transaction author
//! can attach arbitrary bytes to an output they propose, so decoding happens
//! inside validation and a failed decode is a shape error, never a panic.

use crate::errors::{StakeError, StakeResult};
use crate::Vec;
use serde::{de::DeserializeOwned, Serialize};

/// Encode a record to inline-datum bytes.
pub fn encode<T: Serialize>(record: &T) -> StakeResult<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(record, &mut bytes).map_err(|_| StakeError::DatumEncoding)?;
    Ok(bytes)
}

/// Decode inline-datum bytes into a record.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StakeResult<T> {
    ciborium::de::from_reader(bytes).map_err(|_| StakeError::MalformedDatum)
}
