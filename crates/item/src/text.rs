//! Bounded textual form of an item, for logs and dumps.
//!
//! ```text
//! [version:key:pid:uid:timestamp:pkg_name:prop_count:name=value:name=value:...]
//! ```
//!
//! Each property renders as `name=value:` (rates as `name=num/den:`, doubles in
//! C `%e` notation). A rendered property never exceeds
//! `MAX_PROPERTY_STRING_SIZE - 1` bytes; anything longer is truncated. This is
//! the only place truncation is allowed, the binary codecs never truncate.

use std::fmt;

use crate::property::Property;
use crate::value::Value;
use crate::Item;

/// Size bound for one rendered property, including a terminator slot.
pub const MAX_PROPERTY_STRING_SIZE: usize = 4096;

pub const PROTO_V0: i32 = 0;
pub const PROTO_V1: i32 = 1;
pub const PROTO_LAST: i32 = PROTO_V1;

/// Formats a double the way C's `%e` does: six fraction digits and a signed,
/// at least two digit exponent (`1.500000e+00`).
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.6e}", v);
    let parsed = s
        .split_once('e')
        .and_then(|(mantissa, exp)| exp.parse::<i32>().ok().map(|exp| (mantissa, exp)));
    match parsed {
        Some((mantissa, exp)) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s,
    }
}

/// Cuts `s` to at most `max` bytes without splitting a character.
fn truncate_to(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

fn render_property(prop: &Property) -> String {
    let name = prop.name();
    let mut out = match prop.value() {
        Value::Int32(v) => format!("{}={}:", name, v),
        Value::Int64(v) => format!("{}={}:", name, v),
        Value::Double(v) => format!("{}={}:", name, format_double(*v)),
        Value::Rate(n, d) => format!("{}={}/{}:", name, n, d),
        Value::CString(s) => format!("{}={}:", name, s),
        Value::None => String::new(),
    };
    truncate_to(&mut out, MAX_PROPERTY_STRING_SIZE - 1);
    out
}

impl Item {
    /// Renders the item using the given protocol version in the header.
    pub fn to_string_version(&self, version: i32) -> String {
        let mut header = format!(
            "[{}:{}:{}:{}:{}:{}:{}:",
            version,
            self.key(),
            self.pid(),
            self.uid() as i32,
            self.timestamp(),
            self.pkg_name(),
            self.prop_count()
        );
        truncate_to(&mut header, MAX_PROPERTY_STRING_SIZE - 1);

        let mut result = header;
        for prop in self.props().iter() {
            result.push_str(&render_property(prop));
        }
        result.push(']');
        result
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_version(PROTO_LAST))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_property(self))
    }
}
