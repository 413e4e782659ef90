//! Property payloads.
//!
//! [`Value`] is the tagged union carried by every [`Property`](crate::Property).
//! The type tag is derived from the variant, so the tag and the payload can
//! never disagree, and a `CString` payload is released as soon as the value
//! is replaced.

use std::fmt;

/// Wire type tag of a property value.
///
/// The numeric codes are shared by the byte-string and parcel encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropType {
    None = 0,
    Int32 = 1,
    Int64 = 2,
    Double = 3,
    CString = 4,
    Rate = 5,
}

impl PropType {
    /// Returns the wire code for this type.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Maps a wire code back to a type, `None` if the code is unknown.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PropType::None),
            1 => Some(PropType::Int32),
            2 => Some(PropType::Int64),
            3 => Some(PropType::Double),
            4 => Some(PropType::CString),
            5 => Some(PropType::Rate),
            _ => None,
        }
    }

    /// Short lowercase name, used by diagnostics and the shell.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PropType::None => "none",
            PropType::Int32 => "int32",
            PropType::Int64 => "int64",
            PropType::Double => "double",
            PropType::CString => "string",
            PropType::Rate => "rate",
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The payload of a property.
///
/// `Rate` holds `(numerator, denominator)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Int32(i32),
    Int64(i64),
    Double(f64),
    Rate(i64, i64),
    CString(String),
}

impl Value {
    /// Returns the type tag matching the current variant.
    #[must_use]
    pub fn prop_type(&self) -> PropType {
        match self {
            Value::None => PropType::None,
            Value::Int32(_) => PropType::Int32,
            Value::Int64(_) => PropType::Int64,
            Value::Double(_) => PropType::Double,
            Value::Rate(..) => PropType::Rate,
            Value::CString(_) => PropType::CString,
        }
    }

    #[must_use]
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rate(&self) -> Option<(i64, i64)> {
        match self {
            Value::Rate(n, d) => Some((*n, *d)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::CString(s) => Some(s),
            _ => None,
        }
    }

    /// Accumulates `other` into `self`.
    ///
    /// When both values share a numeric type the payloads are summed (integers
    /// wrap, a rate sums numerator and denominator independently). Any other
    /// combination replaces `self` with `other`.
    pub fn accumulate(&mut self, other: Value) {
        match (self, other) {
            (Value::Int32(a), Value::Int32(b)) => *a = a.wrapping_add(b),
            (Value::Int64(a), Value::Int64(b)) => *a = a.wrapping_add(b),
            (Value::Double(a), Value::Double(b)) => *a += b,
            (Value::Rate(an, ad), Value::Rate(bn, bd)) => {
                *an = an.wrapping_add(bn);
                *ad = ad.wrapping_add(bd);
            }
            (slot, other) => *slot = other,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<(i64, i64)> for Value {
    fn from((n, d): (i64, i64)) -> Self {
        Value::Rate(n, d)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::CString(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::CString(v)
    }
}
