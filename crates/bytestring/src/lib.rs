//! # Byte-String Codec
//!
//! The primary wire format for moving an [`item::Item`] across a process
//! boundary: a single flat buffer with explicit lengths throughout and no
//! padding.
//!
//! ## Layout (version 0)
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ HEADER                                                       │
//! │                                                              │
//! │ total_size (u32) | header_size (u32) | version (u16 = 0)     │
//! │ key_size (u16, includes NUL) | key bytes | NUL               │
//! │ pid (i32) | uid (i32) | timestamp (i64)                      │
//! │ [optional padding up to header_size]                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │ prop_count (u32)                                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │ PROPERTY RECORDS (prop_count times)                          │
//! │                                                              │
//! │ record_len (u16) | type (u8) | name bytes | NUL | payload    │
//! │                                                              │
//! │ record_len counts the whole record, its own two bytes        │
//! │ included.                                                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Payloads by type:
//!
//! | Type    | Code | Payload                               |
//! |---------|------|---------------------------------------|
//! | None    | 0    | (empty)                               |
//! | Int32   | 1    | i32                                   |
//! | Int64   | 2    | i64                                   |
//! | Double  | 3    | f64 (IEEE 754)                        |
//! | CString | 4    | bytes + NUL                           |
//! | Rate    | 5    | numerator (i64) + denominator (i64)   |
//!
//! `header_size` marks where `prop_count` begins. A reader skips any bytes
//! between the end of the fixed header and `header_size`, which leaves room
//! for future header fields.
//!
//! ## Example
//!
//! ```rust
//! use item::Item;
//!
//! let mut it = Item::new("codec.example");
//! it.set_int64("bytes", 4096).unwrap();
//!
//! let buf = bytestring::write_to_byte_string(&it).unwrap();
//! let back = bytestring::read_from_byte_string(&buf).unwrap();
//! assert_eq!(back, it);
//! ```

mod format;
mod reader;
mod writer;

pub use format::{encoded_size, prop_record_size, ENCODING_VERSION, MAX_FIELD_LEN};
pub use reader::read_from_byte_string;
pub use writer::write_to_byte_string;

#[cfg(test)]
mod tests;
