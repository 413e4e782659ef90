use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use item::{Item, MetricsError, Property, Result, Value};
use tracing::warn;

use crate::format::{self, ENCODING_VERSION};

/// Serializes `item` into a freshly allocated byte-string buffer.
///
/// The full size is computed up front (overflow-checked), exactly that many
/// bytes are allocated, and fields are written left to right. The write cursor
/// must land exactly on the end of the buffer.
///
/// Properties with an empty name are not encoded.
///
/// # Errors
///
/// - `Overflow` if the key, a property record, or the total is too large.
/// - `InvalidArgument` if any text contains an interior NUL.
/// - `ResourceExhausted` if the buffer cannot be allocated.
///
/// No buffer is returned on failure.
pub fn write_to_byte_string(item: &Item) -> Result<Vec<u8>> {
    let header_size = format::header_size(item.key())?;
    let total_size = format::encoded_size(item).inspect_err(|e| {
        warn!(key = item.key(), "cannot size item for encoding: {}", e);
    })?;
    let planned = total_size as usize;

    let mut buf = Vec::new();
    buf.try_reserve_exact(planned)
        .map_err(|e| MetricsError::ResourceExhausted(e.to_string()))?;
    buf.resize(planned, 0);

    let remaining = {
        let mut w: &mut [u8] = &mut buf;
        write_header(&mut w, item, total_size, header_size).map_err(overran)?;
        let count = item.props().iter_named().count() as u32;
        w.write_u32::<LittleEndian>(count).map_err(overran)?;
        for prop in item.props().iter_named() {
            write_property(&mut w, prop)?;
        }
        w.len()
    };

    if remaining != 0 {
        warn!(
            wrote = planned - remaining,
            planned, "byte-string encoder left the buffer partially filled"
        );
        return Err(MetricsError::Malformed(format!(
            "encoder wrote {} of {} planned bytes",
            planned - remaining,
            planned
        )));
    }
    Ok(buf)
}

fn write_header<W: Write>(w: &mut W, item: &Item, total_size: u32, header_size: u32) -> io::Result<()> {
    w.write_u32::<LittleEndian>(total_size)?;
    w.write_u32::<LittleEndian>(header_size)?;
    w.write_u16::<LittleEndian>(ENCODING_VERSION)?;
    // size checked by header_size()
    w.write_u16::<LittleEndian>((item.key().len() + 1) as u16)?;
    write_cstring(w, item.key())?;
    w.write_i32::<LittleEndian>(item.pid())?;
    w.write_i32::<LittleEndian>(item.uid() as i32)?;
    w.write_i64::<LittleEndian>(item.timestamp())?;
    Ok(())
}

fn write_property<W: Write>(w: &mut W, prop: &Property) -> Result<()> {
    let record_len = format::prop_record_size(prop)?;
    write_record(w, record_len, prop).map_err(overran)
}

fn write_record<W: Write>(w: &mut W, record_len: u16, prop: &Property) -> io::Result<()> {
    w.write_u16::<LittleEndian>(record_len)?;
    w.write_u8(prop.prop_type().code())?;
    write_cstring(w, prop.name())?;
    match prop.value() {
        Value::None => {}
        Value::Int32(v) => w.write_i32::<LittleEndian>(*v)?,
        Value::Int64(v) => w.write_i64::<LittleEndian>(*v)?,
        Value::Double(v) => w.write_f64::<LittleEndian>(*v)?,
        Value::Rate(n, d) => {
            w.write_i64::<LittleEndian>(*n)?;
            w.write_i64::<LittleEndian>(*d)?;
        }
        Value::CString(s) => write_cstring(w, s)?,
    }
    Ok(())
}

fn write_cstring<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    w.write_all(s.as_bytes())?;
    w.write_u8(0)
}

fn overran(e: io::Error) -> MetricsError {
    MetricsError::Malformed(format!("encoder overran the planned buffer: {}", e))
}
