use async_trait::async_trait;

use super::state::StateReceiver;
use super::todo::{Todo, TodoId};
use crate::error::CacheError;

/// UI-facing surface of the data layer.
///
/// Remote failures never come back through these methods; they are published
/// on the state streams. Only local cache misuse is returned as an error.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    fn todo_list_state(&self) -> StateReceiver<Vec<Todo>>;
    fn todo_state(&self) -> StateReceiver<Todo>;

    async fn load_all_todos(&self);
    async fn load_todo_by_id(&self, id: TodoId);
    async fn create(&self, todo: Todo) -> Result<(), CacheError>;
    async fn update(&self, todo: Todo) -> Result<(), CacheError>;
    async fn reorder(&self, from: usize, to: usize) -> Result<(), CacheError>;
    async fn delete(&self, id: TodoId) -> Result<(), CacheError>;
}
