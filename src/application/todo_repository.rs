//! Repository that keeps the local caches and the remote backend in step.
//!
//! Mutations are applied to the local caches and published first, then sent
//! to the remote. When the remote rejects a mutation the error is published
//! and the whole list is reloaded from the remote, which discards whatever
//! optimistic change was made.
//!
//! Operations are serialized through a repository-wide mutation gate, held
//! from the first local mutation until the remote call (and any recovery
//! reload) has finished.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::domain::{
    remote::RemoteTodoDataSource,
    repository::TodoRepository,
    state::{StatePatch, StateReceiver, StateStream},
    todo::{Todo, TodoId},
};
use crate::error::{CacheError, RemoteError};
use crate::infrastructure::{
    local_todo::{LocalTodoDataSource, LocalTodoDataSourceImpl},
    local_todo_list::{LocalTodoListDataSource, LocalTodoListDataSourceImpl},
};

struct Caches<L, LL> {
    current: L,
    list: LL,
}

pub struct TodoRepositoryImpl<R, L = LocalTodoDataSourceImpl, LL = LocalTodoListDataSourceImpl>
where
    R: RemoteTodoDataSource,
    L: LocalTodoDataSource,
    LL: LocalTodoListDataSource,
{
    remote: R,
    caches: Mutex<Caches<L, LL>>,
    list_state: StateStream<Vec<Todo>>,
    todo_state: StateStream<Todo>,
    gate: AsyncMutex<()>,
}

impl<R: RemoteTodoDataSource> TodoRepositoryImpl<R> {
    pub fn new(remote: R) -> Self {
        Self::with_local_sources(remote, LocalTodoDataSourceImpl::new(), LocalTodoListDataSourceImpl::new())
    }
}

impl<R, L, LL> TodoRepositoryImpl<R, L, LL>
where
    R: RemoteTodoDataSource,
    L: LocalTodoDataSource,
    LL: LocalTodoListDataSource,
{
    pub fn with_local_sources(remote: R, current: L, list: LL) -> Self {
        Self {
            remote,
            caches: Mutex::new(Caches { current, list }),
            list_state: StateStream::default(),
            todo_state: StateStream::default(),
            gate: AsyncMutex::new(()),
        }
    }

    pub fn remote(&self) -> &R { &self.remote }

    fn caches(&self) -> MutexGuard<'_, Caches<L, LL>> {
        self.caches.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn list_snapshot(caches: &Caches<L, LL>) -> Option<Vec<Todo>> {
        caches.list.get_todo_list().map(<[Todo]>::to_vec)
    }

    fn publish_list(&self, list: Option<Vec<Todo>>) {
        debug!(len = list.as_ref().map(Vec::len), "publishing todo list");
        self.list_state.publish(StatePatch::new().data(list));
    }

    /// Fetches the authoritative list and refreshes both caches from it.
    async fn reload_list(&self) {
        self.list_state.publish(StatePatch::new().loading(true).clear_error());

        let todos = match self.remote.get_all_todos().await {
            Ok(todos) => todos,
            Err(err) => {
                warn!(error = %err, "failed to load todos");
                self.list_state.publish(StatePatch::new().loading(false).error(RemoteError::from(err)));
                return;
            }
        };

        let refreshed_current = {
            let mut caches = self.caches();
            let current_id = caches.current.get_todo().map(|t| t.id);
            let fresh = current_id.and_then(|id| todos.iter().find(|t| t.id == id).cloned());
            let changed = match fresh {
                Some(fresh) if caches.current.get_todo() != Some(&fresh) => caches.current.set_todo_if_matches_current_id(fresh),
                _ => false,
            };
            caches.list.set_todo_list(Some(todos.clone()));
            changed.then(|| caches.current.get_todo().cloned())
        };
        if let Some(current) = refreshed_current {
            self.todo_state.publish(StatePatch::new().data(current));
        }
        debug!(count = todos.len(), "loaded todos");
        self.list_state.publish(StatePatch::new().data(Some(todos)).loading(false));
    }

    /// Sends an already-applied optimistic mutation to the remote and runs
    /// the shared failure policy.
    async fn confirm(&self, op: &'static str, outcome: anyhow::Result<()>) {
        match outcome {
            Ok(()) => {
                debug!(op, "remote confirmed mutation");
                self.list_state.publish(StatePatch::new().loading(false));
            }
            Err(err) => {
                warn!(op, error = %err, "remote rejected mutation, reloading todos");
                self.list_state.publish(StatePatch::new().loading(false).error(RemoteError::from(err)));
                self.reload_list().await;
            }
        }
    }
}

#[async_trait]
impl<R, L, LL> TodoRepository for TodoRepositoryImpl<R, L, LL>
where
    R: RemoteTodoDataSource,
    L: LocalTodoDataSource,
    LL: LocalTodoListDataSource,
{
    fn todo_list_state(&self) -> StateReceiver<Vec<Todo>> { self.list_state.subscribe() }

    fn todo_state(&self) -> StateReceiver<Todo> { self.todo_state.subscribe() }

    async fn load_all_todos(&self) {
        let _gate = self.gate.lock().await;
        self.reload_list().await;
    }

    async fn load_todo_by_id(&self, id: TodoId) {
        let _gate = self.gate.lock().await;
        self.todo_state.publish(StatePatch::new().loading(true));
        match self.remote.get_todo_by_id(id).await {
            Ok(todo) => {
                let current = {
                    let mut caches = self.caches();
                    caches.current.set_todo(todo);
                    caches.current.get_todo().cloned()
                };
                debug!(%id, found = current.is_some(), "loaded todo");
                self.todo_state.publish(StatePatch::new().data(current).loading(false));
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to load todo");
                self.todo_state.publish(StatePatch::new().loading(false).error(RemoteError::from(err)));
            }
        }
    }

    async fn create(&self, todo: Todo) -> Result<(), CacheError> {
        let _gate = self.gate.lock().await;
        let list = {
            let mut caches = self.caches();
            if caches.list.get_todo_list().is_some_and(|todos| todos.iter().any(|t| t.id == todo.id)) {
                warn!(id = %todo.id, "created todo is already in the local list");
            }
            caches.list.create_todo(todo.clone());
            Self::list_snapshot(&caches)
        };
        self.publish_list(list);
        self.list_state.publish(StatePatch::new().loading(true));

        let outcome = self.remote.create_todo(todo).await;
        self.confirm("create", outcome).await;
        Ok(())
    }

    async fn update(&self, todo: Todo) -> Result<(), CacheError> {
        let _gate = self.gate.lock().await;
        let (list, current) = {
            let mut caches = self.caches();
            if !caches.list.update_todo(todo.clone())? {
                warn!(id = %todo.id, "updated todo is not in the local list");
            }
            let current = caches
                .current
                .set_todo_if_matches_current_id(todo.clone())
                .then(|| caches.current.get_todo().cloned());
            (Self::list_snapshot(&caches), current)
        };
        self.publish_list(list);
        if let Some(current) = current {
            self.todo_state.publish(StatePatch::new().data(current));
        }
        self.list_state.publish(StatePatch::new().loading(true));

        let outcome = self.remote.update_todo(todo).await;
        self.confirm("update", outcome).await;
        Ok(())
    }

    async fn reorder(&self, from: usize, to: usize) -> Result<(), CacheError> {
        let _gate = self.gate.lock().await;
        let list = {
            let mut caches = self.caches();
            caches.list.reorder_todo(from, to)?;
            Self::list_snapshot(&caches)
        };
        self.publish_list(list);
        self.list_state.publish(StatePatch::new().loading(true));

        let outcome = self.remote.reorder_todo(from, to).await;
        self.confirm("reorder", outcome).await;
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), CacheError> {
        let _gate = self.gate.lock().await;
        let (list, current_cleared) = {
            let mut caches = self.caches();
            if !caches.list.delete_todo(id)? {
                warn!(%id, "deleted todo is not in the local list");
            }
            let cleared = caches.current.delete_todo_if_matches_current_id(id);
            (Self::list_snapshot(&caches), cleared)
        };
        self.publish_list(list);
        if current_cleared {
            self.todo_state.publish(StatePatch::new().data(None));
        }
        self.list_state.publish(StatePatch::new().loading(true));

        let outcome = self.remote.delete_todo(id).await;
        self.confirm("delete", outcome).await;
        Ok(())
    }
}
