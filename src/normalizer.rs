//! Event normalization.
//!
//! Converts a [`RawEvent`] into a persistence-ready [`EventRecord`]. Every
//! integer return value, top-level or nested, becomes its exact base-10
//! string via `U256`/`I256` decimal rendering — there is no floating-point
//! intermediate anywhere on this path, so full 256-bit precision survives.
//! A value the decoder marked unrepresentable fails the whole record with
//! an `Encoding` error; callers drop and log it rather than coercing.

use crate::error::IndexerError;
use crate::events::{EventRecord, RawEvent, RawValue};
use chrono::Utc;
use ethers::types::I256;
use serde_json::{Map, Value};

/// Normalize a raw event into an [`EventRecord`].
pub fn normalize(raw: &RawEvent) -> Result<EventRecord, IndexerError> {
    let mut values = Map::with_capacity(raw.return_values.len());
    for (name, value) in &raw.return_values {
        let json = normalize_value(value).map_err(|kind| {
            IndexerError::Encoding(format!(
                "unrepresentable {} value in field '{}' of {} at block {}",
                kind, name, raw.kind, raw.block_number
            ))
        })?;
        values.insert(name.clone(), json);
    }

    Ok(EventRecord {
        transaction_hash: raw.transaction_hash.clone(),
        block_number: raw.block_number,
        event: raw.kind,
        return_values: Value::Object(values),
        message: raw.message.clone(),
        ingested_at: Utc::now(),
    })
}

/// Render one decoded value as JSON. Integers become exact decimal strings,
/// addresses and byte values 0x-prefixed hex. Errors carry the offending
/// token kind.
fn normalize_value(value: &RawValue) -> Result<Value, &'static str> {
    match value {
        RawValue::Address(a) => Ok(Value::String(format!("{:?}", a))),
        RawValue::Uint(u) => Ok(Value::String(u.to_string())),
        RawValue::Int(raw) => Ok(Value::String(I256::from_raw(*raw).to_string())),
        RawValue::Bool(b) => Ok(Value::Bool(*b)),
        RawValue::String(s) => Ok(Value::String(s.clone())),
        RawValue::Bytes(b) | RawValue::FixedBytes(b) => {
            Ok(Value::String(format!("0x{}", hex::encode(b))))
        }
        RawValue::Array(items) | RawValue::Tuple(items) => items
            .iter()
            .map(normalize_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        RawValue::Unsupported(kind) => Err(kind),
    }
}
