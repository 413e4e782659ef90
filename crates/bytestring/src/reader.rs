use std::io;

use byteorder::{LittleEndian, ReadBytesExt};
use item::{Item, MetricsError, PropType, Result, Value};
use tracing::{debug, warn};

use crate::format::ENCODING_VERSION;

/// Rebuilds an [`Item`] from a byte-string buffer.
///
/// Every read is bounds-checked. The header is validated before any property
/// is looked at:
///
/// - `total_size` must not exceed `buf.len()`,
/// - `key_size` must equal the NUL-terminated key length,
/// - `header_size` must not exceed `total_size` nor fall inside the fixed header,
/// - the version must be one this reader understands.
///
/// Property records are read from `buf[..total_size]`; each declared
/// `record_len` must match the bytes the record actually occupies.
/// Properties with an empty name are skipped; a repeated name overwrites the
/// earlier value.
///
/// # Errors
///
/// `Malformed` for truncation or inconsistent fields, `Unsupported` for an
/// unknown version or type tag. A single bad property fails the whole decode
/// and no partial item is returned.
pub fn read_from_byte_string(buf: &[u8]) -> Result<Item> {
    decode(buf).inspect_err(|e| warn!(len = buf.len(), "rejecting byte-string item: {}", e))
}

fn decode(buf: &[u8]) -> Result<Item> {
    let mut r = buf;
    let total_size = r.read_u32::<LittleEndian>().map_err(truncated("total size"))?;
    let header_size = r.read_u32::<LittleEndian>().map_err(truncated("header size"))?;
    let version = r.read_u16::<LittleEndian>().map_err(truncated("version"))?;
    let key_size = r.read_u16::<LittleEndian>().map_err(truncated("key size"))?;
    let key = read_cstring(&mut r, "key")?;
    let pid = r.read_i32::<LittleEndian>().map_err(truncated("pid"))?;
    let uid = r.read_i32::<LittleEndian>().map_err(truncated("uid"))?;
    let timestamp = r.read_i64::<LittleEndian>().map_err(truncated("timestamp"))?;

    let total_size = total_size as usize;
    let header_size = header_size as usize;
    if total_size > buf.len() {
        return Err(MetricsError::Malformed(format!(
            "total size {} exceeds buffer length {}",
            total_size,
            buf.len()
        )));
    }
    if key.len() + 1 != usize::from(key_size) {
        return Err(MetricsError::Malformed(format!(
            "key size field {} does not match key length {}",
            key_size,
            key.len() + 1
        )));
    }
    if header_size > total_size {
        return Err(MetricsError::Malformed(format!(
            "header size {} exceeds total size {}",
            header_size, total_size
        )));
    }
    if version != ENCODING_VERSION {
        return Err(MetricsError::Unsupported(format!("encoding version {}", version)));
    }

    let pos = buf.len() - r.len();
    if pos > header_size {
        return Err(MetricsError::Malformed(format!(
            "fixed header ends at {} past declared header size {}",
            pos, header_size
        )));
    }
    if pos < header_size {
        debug!(pos, header_size, "skipping unknown header bytes");
    }

    let mut r = &buf[header_size..total_size];
    let prop_count = r.read_u32::<LittleEndian>().map_err(truncated("property count"))?;

    let mut item = Item::new(key);
    item.set_pid(pid).set_uid(uid as u32).set_timestamp(timestamp);
    for i in 0..prop_count {
        read_property(&mut r, &mut item)
            .inspect_err(|_| debug!(index = i, prop_count, "cannot read property"))?;
    }
    Ok(item)
}

fn read_property(r: &mut &[u8], item: &mut Item) -> Result<()> {
    let start = r.len();
    let record_len = r.read_u16::<LittleEndian>().map_err(truncated("record length"))?;
    let code = r.read_u8().map_err(truncated("property type"))?;
    let name = read_cstring(r, "property name")?;
    let ty = PropType::from_code(i32::from(code))
        .ok_or_else(|| MetricsError::Unsupported(format!("property type {} for '{}'", code, name)))?;

    let value = match ty {
        PropType::None => Value::None,
        PropType::Int32 => Value::Int32(r.read_i32::<LittleEndian>().map_err(truncated("int32"))?),
        PropType::Int64 => Value::Int64(r.read_i64::<LittleEndian>().map_err(truncated("int64"))?),
        PropType::Double => {
            Value::Double(r.read_f64::<LittleEndian>().map_err(truncated("double"))?)
        }
        PropType::Rate => {
            let n = r.read_i64::<LittleEndian>().map_err(truncated("rate numerator"))?;
            let d = r.read_i64::<LittleEndian>().map_err(truncated("rate denominator"))?;
            Value::Rate(n, d)
        }
        PropType::CString => Value::CString(read_cstring(r, "property value")?),
    };

    let consumed = start - r.len();
    if consumed != usize::from(record_len) {
        return Err(MetricsError::Malformed(format!(
            "property '{}' declares {} bytes but occupies {}",
            name, record_len, consumed
        )));
    }

    if !name.is_empty() {
        item.props_mut().find_or_allocate(&name)?.set(value);
    }
    Ok(())
}

/// Reads bytes up to and including the next NUL, advancing `r` past it.
fn read_cstring(r: &mut &[u8], what: &str) -> Result<String> {
    let nul = r
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| MetricsError::Malformed(format!("{} is not NUL-terminated", what)))?;
    let s = std::str::from_utf8(&r[..nul])
        .map_err(|e| MetricsError::Malformed(format!("{} is not valid UTF-8: {}", what, e)))?
        .to_string();
    *r = &r[nul + 1..];
    Ok(s)
}

fn truncated(what: &'static str) -> impl Fn(io::Error) -> MetricsError {
    move |e| MetricsError::Malformed(format!("truncated reading {}: {}", what, e))
}
