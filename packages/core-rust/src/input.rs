//! Multi-value operation inputs.
//!
//! An [`Input`] is either a materialized, reference-counted list of values that
//! copies share, or a one-shot stream that can be consumed exactly once and
//! therefore cannot be cloned.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

type BoxedIter<T> = Box<dyn Iterator<Item = T> + Send>;

/// Ordered sequence of input values for a multi-input operation.
pub enum Input<T> {
    /// Materialized values, shared between shallow clones.
    Values(Arc<Vec<T>>),
    /// A stream consumed by the first handler that drains it.
    Streamed(Mutex<Option<BoxedIter<T>>>),
}

impl<T> Input<T> {
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        Self::Values(Arc::new(values.into_iter().collect()))
    }

    pub fn streamed(iter: impl Iterator<Item = T> + Send + 'static) -> Self {
        Self::Streamed(Mutex::new(Some(Box::new(iter))))
    }

    /// Materialized values, or `None` for streamed input.
    #[must_use]
    pub fn values(&self) -> Option<&[T]> {
        match self {
            Self::Values(values) => Some(values.as_slice()),
            Self::Streamed(_) => None,
        }
    }

    #[must_use]
    pub fn is_streamed(&self) -> bool {
        matches!(self, Self::Streamed(_))
    }

    /// Copies the input. Materialized values are shared; streams cannot be copied.
    ///
    /// Returns `None` for streamed input.
    #[must_use]
    pub fn try_clone(&self) -> Option<Self> {
        match self {
            Self::Values(values) => Some(Self::Values(Arc::clone(values))),
            Self::Streamed(_) => None,
        }
    }
}

impl<T: Clone> Input<T> {
    /// Takes every value out of the input.
    ///
    /// Materialized values are copied and remain available; a stream is consumed
    /// and yields `None` on any later call.
    pub fn drain(&self) -> Option<Vec<T>> {
        match self {
            Self::Values(values) => Some(values.as_ref().clone()),
            Self::Streamed(stream) => stream.lock().take().map(Iterator::collect),
        }
    }
}

impl<T> From<Vec<T>> for Input<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Values(Arc::new(values))
    }
}

impl<T: fmt::Debug> fmt::Debug for Input<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values(values) => f.debug_list().entries(values.iter()).finish(),
            Self::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

/// Materialized inputs compare by value; a stream only equals itself.
impl<T: PartialEq> PartialEq for Input<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Values(a), Self::Values(b)) => a == b,
            (Self::Streamed(a), Self::Streamed(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }
}

impl<T: Serialize> Serialize for Input<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Values(values) => values.as_slice().serialize(serializer),
            Self::Streamed(_) => Err(serde::ser::Error::custom(
                "streamed input cannot be serialized",
            )),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Input<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}
