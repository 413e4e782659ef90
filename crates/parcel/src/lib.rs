//! # Parcel Codec
//!
//! The secondary wire format for an [`item::Item`]: a versioned sequence of
//! fields written into a [`Parcel`], the flat container handed to an IPC
//! transport.
//!
//! ## Parcel conventions
//!
//! - `i32`, `i64`, `f64` are little-endian and written as-is.
//! - A C string is its bytes plus a NUL, zero-padded to a 4-byte boundary.
//!
//! ## Item layout (version 0)
//!
//! ```text
//! version (i32 = 0)
//! key (cstring) | pid (i32) | uid (i32)
//! pkg_name (cstring) | pkg_version_code (i64) | timestamp (i64)
//! count (i32)
//! count × [ name (cstring) | type (i32) | payload ]
//! ```
//!
//! Payloads: Int32 → i32, Int64 → i64, Double → f64, Rate → i64 + i64,
//! CString → cstring. A `None` property has no parcel form and fails to encode.
//!
//! ## Example
//!
//! ```rust
//! use item::Item;
//! use parcel::Parcel;
//!
//! let mut it = Item::new("parcel.example");
//! it.set_pkg_name("com.example").set_pkg_version_code(3);
//! it.set_double("ratio", 0.5).unwrap();
//!
//! let mut p = Parcel::new();
//! parcel::write_to_parcel(&it, &mut p).unwrap();
//! p.set_data_position(0);
//! assert_eq!(parcel::read_from_parcel(&mut p).unwrap(), it);
//! ```

mod codec;
mod container;

pub use codec::{read_from_parcel, write_to_parcel, PARCEL_VERSION};
pub use container::Parcel;

#[cfg(test)]
mod tests;
