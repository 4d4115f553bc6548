//! The substitution mapping handed to the renderer.
//!
//! A [`Stash`] maps placeholder names to [`Value`]s:
//!
//! - [`Value::Text`] - written as-is
//! - [`Value::Bytes`] - written as-is, no UTF-8 requirement
//! - [`Value::Producer`] - a closure run at render time
//!
//! Producers receive the output sink, the placeholder name and mutable access
//! to the stash that is being rendered, so a producer may add or replace
//! entries that later placeholders pick up. When several producers mutate the
//! same entries, do not depend on the order in which they run.
//!
//! ```rust
//! use std::io::Write;
//! use stitch::templating::{Stash, Value};
//!
//! let mut stash = Stash::new();
//! stash.insert("title", "Hello");
//! stash.insert("year", Value::producer(|w, _tag, stash| {
//!     stash.insert("footer_note", "generated");
//!     w.write(b"2024")
//! }));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Signature of a deferred placeholder producer.
///
/// Returns the number of bytes written to the sink.
pub type ProducerFn = dyn Fn(&mut dyn Write, &str, &mut Stash) -> io::Result<usize> + Send + Sync;

/// A value substituted for a placeholder.
#[derive(Clone)]
pub enum Value {
    /// Literal text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Deferred producer evaluated while rendering
    Producer(Arc<ProducerFn>),
}

impl Value {
    /// Wrap a closure as a deferred producer.
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Write, &str, &mut Stash) -> io::Result<usize> + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(f))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Placeholder name → value mapping owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct Stash {
    values: HashMap<String, Value>,
}

impl Stash {
    /// Create an empty stash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Look up an entry.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Text of an entry, if it is [`Value::Text`].
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Remove an entry.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Whether an entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Add all entries of `other`, overriding existing keys.
    pub fn merge<I, K, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in other {
            self.values.insert(name.into(), value.into());
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the stash is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Write the value of `name` to `out`.
    ///
    /// Returns `Ok(None)` when there is no such entry. Producers are called
    /// with mutable access to this stash.
    pub(crate) fn write_value(&mut self, name: &str, out: &mut dyn Write) -> io::Result<Option<usize>> {
        let producer = match self.values.get(name) {
            None => return Ok(None),
            Some(Value::Text(text)) => {
                out.write_all(text.as_bytes())?;
                return Ok(Some(text.len()));
            }
            Some(Value::Bytes(bytes)) => {
                out.write_all(bytes)?;
                return Ok(Some(bytes.len()));
            }
            Some(Value::Producer(producer)) => Arc::clone(producer),
        };
        producer(out, name, self).map(Some)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Stash {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut stash = Self::new();
        stash.merge(iter);
        stash
    }
}
