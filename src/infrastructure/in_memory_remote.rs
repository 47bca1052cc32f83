use std::{
    collections::HashSet,
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    remote::RemoteTodoDataSource,
    todo::{Todo, TodoId},
};

/// Remote operations, used to script failures and to inspect call history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp { GetAll, GetById, Create, Update, Reorder, Delete }

impl RemoteOp {
    pub const ALL: [RemoteOp; 6] = [Self::GetAll, Self::GetById, Self::Create, Self::Update, Self::Reorder, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetAll => "get_all",
            Self::GetById => "get_by_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Reorder => "reorder",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RemoteOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown remote operation {s:?}"))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InMemoryRemoteError {
    #[error("{0} failed: injected failure")]
    Injected(RemoteOp),
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("todo {0} already exists")]
    AlreadyExists(TodoId),
    #[error("index {index} is out of bounds for {len} todos")]
    OutOfBounds { index: usize, len: usize },
}

#[derive(Default)]
struct Backend {
    todos: Vec<Todo>,
    fail_once: HashSet<RemoteOp>,
    fail_always: HashSet<RemoteOp>,
    calls: Vec<RemoteOp>,
}

/// Process-local stand-in for the todo backend.
///
/// Keeps an ordered list with the same semantics a server would apply, and
/// can be told to fail selected operations or to add latency. Clones share
/// the same backend, so a test can keep a handle after giving one away.
#[derive(Clone, Default)]
pub struct InMemoryRemoteTodoDataSource {
    backend: Arc<Mutex<Backend>>,
    latency: Duration,
}

impl InMemoryRemoteTodoDataSource {
    pub fn new() -> Self { Self::default() }

    pub fn seeded(todos: Vec<Todo>) -> Self {
        let remote = Self::new();
        remote.lock().todos = todos;
        remote
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The next call of `op` fails; later calls succeed again.
    pub fn fail_next(&self, op: RemoteOp) { self.lock().fail_once.insert(op); }

    pub fn fail_always(&self, op: RemoteOp) { self.lock().fail_always.insert(op); }

    pub fn recover(&self) {
        let mut backend = self.lock();
        backend.fail_once.clear();
        backend.fail_always.clear();
    }

    pub fn todos(&self) -> Vec<Todo> { self.lock().todos.clone() }

    pub fn calls(&self) -> Vec<RemoteOp> { self.lock().calls.clone() }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        // Backend state stays consistent even if a holder panicked.
        self.backend.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulates the round-trip, records the call, then runs `apply` against
    /// the backend unless a failure is scripted for `op`.
    async fn call<T>(&self, op: RemoteOp, apply: impl FnOnce(&mut Vec<Todo>) -> Result<T, InMemoryRemoteError>) -> Result<T> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut backend = self.lock();
        backend.calls.push(op);
        if backend.fail_once.remove(&op) || backend.fail_always.contains(&op) {
            tracing::debug!(%op, "injecting remote failure");
            return Err(InMemoryRemoteError::Injected(op).into());
        }
        Ok(apply(&mut backend.todos)?)
    }
}

#[async_trait]
impl RemoteTodoDataSource for InMemoryRemoteTodoDataSource {
    async fn get_all_todos(&self) -> Result<Vec<Todo>> {
        self.call(RemoteOp::GetAll, |todos| Ok(todos.clone())).await
    }

    async fn get_todo_by_id(&self, id: TodoId) -> Result<Option<Todo>> {
        self.call(RemoteOp::GetById, |todos| Ok(todos.iter().find(|t| t.id == id).cloned())).await
    }

    async fn create_todo(&self, todo: Todo) -> Result<()> {
        self.call(RemoteOp::Create, |todos| {
            if todos.iter().any(|t| t.id == todo.id) {
                return Err(InMemoryRemoteError::AlreadyExists(todo.id));
            }
            todos.push(todo);
            Ok(())
        })
        .await
    }

    async fn update_todo(&self, todo: Todo) -> Result<()> {
        self.call(RemoteOp::Update, |todos| {
            let slot = todos.iter_mut().find(|t| t.id == todo.id).ok_or(InMemoryRemoteError::NotFound(todo.id))?;
            *slot = todo;
            Ok(())
        })
        .await
    }

    async fn reorder_todo(&self, from: usize, to: usize) -> Result<()> {
        self.call(RemoteOp::Reorder, |todos| {
            let len = todos.len();
            if let Some(index) = [from, to].into_iter().find(|&i| i >= len) {
                return Err(InMemoryRemoteError::OutOfBounds { index, len });
            }
            let todo = todos.remove(from);
            todos.insert(to, todo);
            Ok(())
        })
        .await
    }

    async fn delete_todo(&self, id: TodoId) -> Result<()> {
        self.call(RemoteOp::Delete, |todos| {
            let index = todos.iter().position(|t| t.id == id).ok_or(InMemoryRemoteError::NotFound(id))?;
            todos.remove(index);
            Ok(())
        })
        .await
    }
}
