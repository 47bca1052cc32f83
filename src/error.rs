use std::{fmt, ops::Deref, sync::Arc};

use thiserror::Error;

/// Errors raised by the local caches. These signal caller mistakes (mutating a
/// list that was never loaded, or indexing past its end) and are returned to
/// the caller instead of being published as state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cannot {op} todo: todo list has not been loaded")]
    Uninitialized { op: &'static str },
    #[error("index {index} is out of bounds for a todo list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// A remote failure as published in state. Cheap to clone so every subscriber
/// can hold the same error.
#[derive(Clone)]
pub struct RemoteError(Arc<anyhow::Error>);

impl From<anyhow::Error> for RemoteError {
    fn from(err: anyhow::Error) -> Self { Self(Arc::new(err)) }
}

impl Deref for RemoteError {
    type Target = anyhow::Error;
    fn deref(&self) -> &anyhow::Error { &self.0 }
}

impl fmt::Debug for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(&*self.0, f) }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&*self.0, f) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_error_messages() {
        let err = CacheError::Uninitialized { op: "update" };
        assert_eq!(err.to_string(), "cannot update todo: todo list has not been loaded");
        let err = CacheError::IndexOutOfBounds { index: 5, len: 3 };
        assert_eq!(err.to_string(), "index 5 is out of bounds for a todo list of length 3");
    }

    #[test]
    fn remote_error_clones_share_source() {
        let err = RemoteError::from(anyhow::anyhow!("connection reset"));
        let copy = err.clone();
        assert_eq!(copy.to_string(), "connection reset");
        assert!(Arc::ptr_eq(&err.0, &copy.0));
    }
}
