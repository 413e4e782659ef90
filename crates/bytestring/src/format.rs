//! Byte-string layout constants and overflow-checked size computation.

use item::{Item, MetricsError, Property, Result, Value};

/// The only encoding version currently defined.
pub const ENCODING_VERSION: u16 = 0;

/// Largest value a 16-bit length field can carry.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// `total_size` + `header_size` + `version` + `key_size`.
pub(crate) const FIXED_PREFIX_BYTES: usize = 4 + 4 + 2 + 2;

/// `pid` + `uid` + `timestamp`.
pub(crate) const IDENTITY_BYTES: usize = 4 + 4 + 8;

pub(crate) const PROP_COUNT_BYTES: usize = 4;

/// `record_len` + `type`.
pub(crate) const PROP_RECORD_OVERHEAD: usize = 2 + 1;

/// Size of `s` once written as a NUL-terminated field.
///
/// Text with an interior NUL cannot round-trip through a NUL-terminated
/// field and is rejected; text that would not fit a 16-bit length is an
/// overflow.
pub(crate) fn cstring_size(what: &'static str, s: &str) -> Result<usize> {
    if s.as_bytes().contains(&0) {
        return Err(MetricsError::InvalidArgument(format!(
            "{} contains an interior NUL",
            what
        )));
    }
    let size = s.len() + 1;
    if size > MAX_FIELD_LEN {
        return Err(MetricsError::Overflow {
            what,
            size,
            limit: MAX_FIELD_LEN,
        });
    }
    Ok(size)
}

fn payload_size(value: &Value) -> Result<usize> {
    Ok(match value {
        Value::None => 0,
        Value::Int32(_) => 4,
        Value::Int64(_) | Value::Double(_) => 8,
        Value::Rate(..) => 8 + 8,
        Value::CString(s) => cstring_size("property value", s)?,
    })
}

/// Encoded size of one property record, length field included.
///
/// # Errors
///
/// `Overflow` if the record does not fit its 16-bit length field.
pub fn prop_record_size(prop: &Property) -> Result<u16> {
    let name = cstring_size("property name", prop.name())?;
    let payload = payload_size(prop.value())?;
    let size = PROP_RECORD_OVERHEAD
        .checked_add(name)
        .and_then(|s| s.checked_add(payload))
        .unwrap_or(usize::MAX);
    u16::try_from(size).map_err(|_| MetricsError::Overflow {
        what: "property record",
        size,
        limit: MAX_FIELD_LEN,
    })
}

/// Offset of the `prop_count` field for an item with this key.
pub(crate) fn header_size(key: &str) -> Result<u32> {
    let key_size = cstring_size("key", key)?;
    // key_size <= u16::MAX, so this cannot leave u32 range
    Ok((FIXED_PREFIX_BYTES + key_size + IDENTITY_BYTES) as u32)
}

/// Total encoded size of `item`, computed with checked arithmetic.
///
/// # Errors
///
/// `Overflow` if the key, any property record, or the total does not fit the
/// field that carries it.
pub fn encoded_size(item: &Item) -> Result<u32> {
    let mut size = header_size(item.key())?
        .checked_add(PROP_COUNT_BYTES as u32)
        .ok_or_else(total_overflow)?;
    for prop in item.props().iter_named() {
        let record = prop_record_size(prop)?;
        size = size.checked_add(u32::from(record)).ok_or_else(total_overflow)?;
    }
    Ok(size)
}

fn total_overflow() -> MetricsError {
    MetricsError::Overflow {
        what: "item",
        size: usize::MAX,
        limit: u32::MAX as usize,
    }
}
