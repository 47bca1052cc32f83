//! Observable load state published by the repository.
//!
//! Each stream is backed by a `tokio::sync::watch` channel, so a fresh
//! subscriber always sees the latest value before any later update.
//! Publication is a partial merge: a [`StatePatch`] only touches the fields
//! it sets.

use tokio::sync::watch;

use super::todo::Todo;
use crate::error::RemoteError;

#[derive(Debug, Clone)]
pub struct LoadState<T> {
    pub loading: bool,
    pub error: Option<RemoteError>,
    /// `None` until the first load; distinct from an empty collection.
    pub data: Option<T>,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self { Self { loading: false, error: None, data: None } }
}

impl<T> LoadState<T> {
    pub fn apply(&mut self, patch: StatePatch<T>) {
        if let Some(loading) = patch.loading { self.loading = loading; }
        if let Some(error) = patch.error { self.error = error; }
        if let Some(data) = patch.data { self.data = data; }
    }
}

pub type TodoListState = LoadState<Vec<Todo>>;
pub type TodoState = LoadState<Todo>;

/// Partial update of a [`LoadState`]. Unset fields keep their current value.
#[derive(Debug, Clone)]
pub struct StatePatch<T> {
    loading: Option<bool>,
    error: Option<Option<RemoteError>>,
    data: Option<Option<T>>,
}

impl<T> Default for StatePatch<T> {
    fn default() -> Self { Self { loading: None, error: None, data: None } }
}

impl<T> StatePatch<T> {
    pub fn new() -> Self { Self::default() }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    pub fn error(mut self, error: RemoteError) -> Self {
        self.error = Some(Some(error));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    pub fn data(mut self, data: Option<T>) -> Self {
        self.data = Some(data);
        self
    }
}

pub type StateReceiver<T> = watch::Receiver<LoadState<T>>;

/// Latest-value state holder with replay-on-subscribe semantics.
#[derive(Debug)]
pub struct StateStream<T> {
    tx: watch::Sender<LoadState<T>>,
}

impl<T> Default for StateStream<T> {
    fn default() -> Self {
        let (tx, _) = watch::channel(LoadState::default());
        Self { tx }
    }
}

impl<T> StateStream<T> {
    pub fn subscribe(&self) -> StateReceiver<T> { self.tx.subscribe() }

    /// Merges `patch` into the current value and notifies subscribers. The
    /// value is updated even when nobody is subscribed.
    pub fn publish(&self, patch: StatePatch<T>) { self.tx.send_modify(|state| state.apply(patch)); }
}

impl<T: Clone> StateStream<T> {
    pub fn current(&self) -> LoadState<T> { self.tx.borrow().clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_merges_only_set_fields() {
        let mut state: LoadState<Vec<i32>> = LoadState::default();
        state.apply(StatePatch::new().data(Some(vec![1, 2])));
        state.apply(StatePatch::new().loading(true));
        assert!(state.loading);
        assert_eq!(state.data, Some(vec![1, 2]));
        assert!(state.error.is_none());

        state.apply(StatePatch::new().loading(false).error(anyhow::anyhow!("boom").into()));
        assert_eq!(state.data, Some(vec![1, 2]));
        assert_eq!(state.error.as_ref().map(ToString::to_string).as_deref(), Some("boom"));

        state.apply(StatePatch::new().clear_error());
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn late_subscriber_sees_latest_value() {
        let stream: StateStream<Todo> = StateStream::default();
        stream.publish(StatePatch::new().loading(true));
        stream.publish(StatePatch::new().data(Some(Todo::new(3, "Late"))).loading(false));

        let rx = stream.subscribe();
        let state = rx.borrow().clone();
        assert!(!state.loading);
        assert_eq!(state.data.map(|t| t.id.0), Some(3));
    }

    #[tokio::test]
    async fn subscriber_is_notified_of_changes() {
        let stream: StateStream<Vec<Todo>> = StateStream::default();
        let mut rx = stream.subscribe();
        stream.publish(StatePatch::new().loading(true));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().loading);
        assert!(stream.current().loading);
    }
}
