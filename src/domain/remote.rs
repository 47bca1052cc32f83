use async_trait::async_trait;

use super::todo::{Todo, TodoId};

/// Backend contract consumed by the repository. Every call may fail with a
/// transport or server error, reported as an opaque `anyhow::Error`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteTodoDataSource: Send + Sync + 'static {
    async fn get_all_todos(&self) -> anyhow::Result<Vec<Todo>>;
    async fn get_todo_by_id(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    async fn create_todo(&self, todo: Todo) -> anyhow::Result<()>;
    async fn update_todo(&self, todo: Todo) -> anyhow::Result<()>;
    async fn reorder_todo(&self, from: usize, to: usize) -> anyhow::Result<()>;
    async fn delete_todo(&self, id: TodoId) -> anyhow::Result<()>;
}
