use item::{Item, MetricsError, PropType, Property, Result, Value};
use tracing::warn;

use crate::container::Parcel;

/// The only parcel layout version currently defined.
pub const PARCEL_VERSION: i32 = 0;

/// Appends `item` to `parcel`.
///
/// Properties with an empty name are not written.
///
/// # Errors
///
/// - `Unsupported` if the item holds a `None`-typed property.
/// - `InvalidArgument` if any text contains an interior NUL.
/// - `Overflow` if the property count does not fit an `i32`.
///
/// On failure the parcel is rolled back to its size before the call.
pub fn write_to_parcel(item: &Item, parcel: &mut Parcel) -> Result<()> {
    let start = parcel.data_size();
    parcel.write_i32(PARCEL_VERSION);
    let result = write_v0(item, parcel);
    if let Err(e) = &result {
        warn!(key = item.key(), "cannot write item to parcel: {}", e);
        parcel.truncate(start);
    }
    result
}

fn write_v0(item: &Item, parcel: &mut Parcel) -> Result<()> {
    parcel.write_cstring(item.key())?;
    parcel.write_i32(item.pid());
    parcel.write_i32(item.uid() as i32);
    parcel.write_cstring(item.pkg_name())?;
    parcel.write_i64(item.pkg_version_code());
    parcel.write_i64(item.timestamp());

    let count = item.props().iter_named().count();
    let count = i32::try_from(count).map_err(|_| MetricsError::Overflow {
        what: "property count",
        size: count,
        limit: i32::MAX as usize,
    })?;
    parcel.write_i32(count);
    for prop in item.props().iter_named() {
        write_property(prop, parcel)?;
    }
    Ok(())
}

fn write_property(prop: &Property, parcel: &mut Parcel) -> Result<()> {
    if let Value::None = prop.value() {
        return Err(MetricsError::Unsupported(format!(
            "none-typed property '{}' in a parcel",
            prop.name()
        )));
    }
    parcel.write_cstring(prop.name())?;
    parcel.write_i32(i32::from(prop.prop_type().code()));
    match prop.value() {
        Value::Int32(v) => parcel.write_i32(*v),
        Value::Int64(v) => parcel.write_i64(*v),
        Value::Double(v) => parcel.write_f64(*v),
        Value::Rate(n, d) => {
            parcel.write_i64(*n);
            parcel.write_i64(*d);
        }
        Value::CString(s) => parcel.write_cstring(s)?,
        Value::None => {}
    }
    Ok(())
}

/// Reads one item from `parcel` at its current position.
///
/// # Errors
///
/// `Unsupported` for an unknown version or property type, `Malformed` for a
/// negative count or truncated data. On failure the read position is restored
/// and no partial item is returned.
pub fn read_from_parcel(parcel: &mut Parcel) -> Result<Item> {
    let start = parcel.data_position();
    let result = parcel.read_i32().and_then(|version| match version {
        PARCEL_VERSION => read_v0(parcel),
        other => Err(MetricsError::Unsupported(format!("parcel version {}", other))),
    });
    if let Err(e) = &result {
        warn!(pos = start, "cannot read item from parcel: {}", e);
        parcel.set_data_position(start);
    }
    result
}

fn read_v0(parcel: &mut Parcel) -> Result<Item> {
    let mut item = Item::new(parcel.read_cstring()?);
    item.set_pid(parcel.read_i32()?);
    item.set_uid(parcel.read_i32()? as u32);
    item.set_pkg_name(parcel.read_cstring()?);
    item.set_pkg_version_code(parcel.read_i64()?);
    item.set_timestamp(parcel.read_i64()?);

    let count = parcel.read_i32()?;
    if count < 0 {
        return Err(MetricsError::Malformed(format!(
            "negative property count {}",
            count
        )));
    }
    for _ in 0..count {
        let (name, value) = read_property(parcel)?;
        if !name.is_empty() {
            item.props_mut().find_or_allocate(&name)?.set(value);
        }
    }
    Ok(item)
}

fn read_property(parcel: &mut Parcel) -> Result<(String, Value)> {
    let name = parcel.read_cstring()?;
    let code = parcel.read_i32()?;
    let value = match PropType::from_code(code) {
        Some(PropType::Int32) => Value::Int32(parcel.read_i32()?),
        Some(PropType::Int64) => Value::Int64(parcel.read_i64()?),
        Some(PropType::Double) => Value::Double(parcel.read_f64()?),
        Some(PropType::Rate) => {
            let n = parcel.read_i64()?;
            let d = parcel.read_i64()?;
            Value::Rate(n, d)
        }
        Some(PropType::CString) => Value::CString(parcel.read_cstring()?),
        Some(PropType::None) | None => {
            return Err(MetricsError::Unsupported(format!(
                "property type {} for '{}'",
                code, name
            )))
        }
    };
    Ok((name, value))
}
