//! # Item - self-describing metrics record
//!
//! An [`Item`] is a key, a handful of identity fields (pid, uid, package name
//! and version code, timestamp) and a bag of uniquely named, typed
//! [`Property`] values kept in a [`PropertyStore`].
//!
//! Items are built incrementally, optionally merged with another item, then
//! handed to one of the wire codecs (`bytestring`, `parcel`) for transport.
//!
//! ## Concurrency
//!
//! Items carry no internal synchronization. One owner mutates an item, after
//! which it may be shared read-only (for encoding or submission).
//!
//! ## Example
//!
//! ```rust
//! use item::Item;
//!
//! let mut it = Item::new("audio.track");
//! it.set_pid(42).set_uid(1000).set_timestamp(123);
//! it.set_int32("channels", 2).unwrap();
//! it.set_cstring("encoding", "pcm16").unwrap();
//! assert_eq!(it.get_int32("channels"), Some(2));
//! assert_eq!(it.prop_count(), 2);
//! ```

mod error;
mod property;
mod store;
mod text;
mod value;

pub use error::{MetricsError, Result};
pub use property::Property;
pub use store::{PropertyStore, GROW_STEP};
pub use text::{format_double, MAX_PROPERTY_STRING_SIZE, PROTO_LAST, PROTO_V0, PROTO_V1};
pub use value::{PropType, Value};

/// The top-level metrics record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    key: String,
    pid: i32,
    uid: u32,
    pkg_name: String,
    pkg_version_code: i64,
    timestamp: i64,
    props: PropertyStore,
}

impl Item {
    /// Creates an item with the given key (possibly empty) and no properties.
    pub fn new<K: Into<String>>(key: K) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key<K: Into<String>>(&mut self, key: K) -> &mut Self {
        self.key = key.into();
        self
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn set_pid(&mut self, pid: i32) -> &mut Self {
        self.pid = pid;
        self
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn set_uid(&mut self, uid: u32) -> &mut Self {
        self.uid = uid;
        self
    }

    pub fn pkg_name(&self) -> &str {
        &self.pkg_name
    }

    pub fn set_pkg_name<S: Into<String>>(&mut self, pkg_name: S) -> &mut Self {
        self.pkg_name = pkg_name.into();
        self
    }

    pub fn pkg_version_code(&self) -> i64 {
        self.pkg_version_code
    }

    pub fn set_pkg_version_code(&mut self, code: i64) -> &mut Self {
        self.pkg_version_code = code;
        self
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, ts: i64) -> &mut Self {
        self.timestamp = ts;
        self
    }

    pub fn props(&self) -> &PropertyStore {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut PropertyStore {
        &mut self.props
    }

    pub fn prop_count(&self) -> usize {
        self.props.len()
    }

    pub fn has_prop(&self, name: &str) -> bool {
        self.props.find_index(name).is_some()
    }

    pub fn get_prop(&self, name: &str) -> Option<&Property> {
        self.props.find(name)
    }

    // ---- setters ----

    /// Sets `name` to `value`, replacing whatever the property held before.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, `ResourceExhausted` if the store
    /// cannot grow.
    pub fn set_value<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<&mut Self> {
        self.props.find_or_allocate(name)?.set(value);
        Ok(self)
    }

    pub fn set_int32(&mut self, name: &str, value: i32) -> Result<&mut Self> {
        self.set_value(name, value)
    }

    pub fn set_int64(&mut self, name: &str, value: i64) -> Result<&mut Self> {
        self.set_value(name, value)
    }

    pub fn set_double(&mut self, name: &str, value: f64) -> Result<&mut Self> {
        self.set_value(name, value)
    }

    pub fn set_rate(&mut self, name: &str, count: i64, duration: i64) -> Result<&mut Self> {
        self.set_value(name, (count, duration))
    }

    pub fn set_cstring(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        self.set_value(name, value)
    }

    // ---- accumulators ----

    /// Adds `value` to an existing property of the same type, or sets it.
    pub fn add_value<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<&mut Self> {
        self.props.find_or_allocate(name)?.add(value);
        Ok(self)
    }

    pub fn add_int32(&mut self, name: &str, value: i32) -> Result<&mut Self> {
        self.add_value(name, value)
    }

    pub fn add_int64(&mut self, name: &str, value: i64) -> Result<&mut Self> {
        self.add_value(name, value)
    }

    pub fn add_double(&mut self, name: &str, value: f64) -> Result<&mut Self> {
        self.add_value(name, value)
    }

    pub fn add_rate(&mut self, name: &str, count: i64, duration: i64) -> Result<&mut Self> {
        self.add_value(name, (count, duration))
    }

    // ---- getters ----

    pub fn get_int32(&self, name: &str) -> Option<i32> {
        self.get_prop(name).and_then(|p| p.value().as_int32())
    }

    pub fn get_int64(&self, name: &str) -> Option<i64> {
        self.get_prop(name).and_then(|p| p.value().as_int64())
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.get_prop(name).and_then(|p| p.value().as_double())
    }

    pub fn get_rate(&self, name: &str) -> Option<(i64, i64)> {
        self.get_prop(name).and_then(|p| p.value().as_rate())
    }

    pub fn get_cstring(&self, name: &str) -> Option<&str> {
        self.get_prop(name).and_then(|p| p.value().as_str())
    }

    // ---- removal ----

    /// Removes `name`; see [`PropertyStore::remove`] for ordering caveats.
    pub fn remove_prop(&mut self, name: &str) -> bool {
        self.props.remove(name)
    }

    /// Removes the listed properties. Returns the number removed.
    pub fn filter<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        self.props.filter(names)
    }

    /// Removes every property not listed. Returns the number removed.
    pub fn filter_not<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        self.props.filter_not(names)
    }

    /// Resets the key and drops every property. Identity fields are kept.
    pub fn clear(&mut self) {
        self.key.clear();
        self.props.clear();
    }

    /// Merges `incoming` into `self`.
    ///
    /// The result is the union of both property sets; on a name collision the
    /// incoming value wins. If `self` has no key it adopts the incoming one.
    /// Properties of `self` absent from `incoming` are kept, and incoming
    /// properties with an empty name are skipped.
    ///
    /// # Errors
    ///
    /// `ResourceExhausted` if the store cannot grow. Properties merged before
    /// the failure stay merged.
    pub fn merge(&mut self, incoming: &Item) -> Result<()> {
        if self.key.is_empty() {
            self.key.clone_from(&incoming.key);
        }
        for iprop in incoming.props.iter() {
            if iprop.name().is_empty() {
                continue;
            }
            self.props.find_or_allocate(iprop.name())?.assign_from(iprop);
        }
        Ok(())
    }
}
