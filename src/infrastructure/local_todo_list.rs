use crate::domain::todo::{Todo, TodoId};
use crate::error::CacheError;

/// In-memory holder of the full todo collection, in display order.
///
/// `None` means the list was never loaded. Mutators that can fail check this
/// (and any index bounds) before touching the list.
pub trait LocalTodoListDataSource: Send + 'static {
    fn get_todo_list(&self) -> Option<&[Todo]>;
    fn set_todo_list(&mut self, todos: Option<Vec<Todo>>);
    /// Appends, initializing an empty list first if needed.
    fn create_todo(&mut self, todo: Todo);
    /// Replaces the entry with the same id in place. `Ok(false)` if absent.
    fn update_todo(&mut self, todo: Todo) -> Result<bool, CacheError>;
    fn reorder_todo(&mut self, from: usize, to: usize) -> Result<(), CacheError>;
    /// Removes the entry with `id`. `Ok(false)` if absent.
    fn delete_todo(&mut self, id: TodoId) -> Result<bool, CacheError>;
}

#[derive(Debug, Default)]
pub struct LocalTodoListDataSourceImpl {
    todos: Option<Vec<Todo>>,
}

impl LocalTodoListDataSourceImpl {
    pub fn new() -> Self { Self::default() }

    fn loaded(&mut self, op: &'static str) -> Result<&mut Vec<Todo>, CacheError> {
        self.todos.as_mut().ok_or(CacheError::Uninitialized { op })
    }
}

impl LocalTodoListDataSource for LocalTodoListDataSourceImpl {
    fn get_todo_list(&self) -> Option<&[Todo]> { self.todos.as_deref() }

    fn set_todo_list(&mut self, todos: Option<Vec<Todo>>) { self.todos = todos; }

    fn create_todo(&mut self, todo: Todo) { self.todos.get_or_insert_with(Vec::new).push(todo); }

    fn update_todo(&mut self, todo: Todo) -> Result<bool, CacheError> {
        let todos = self.loaded("update")?;
        match todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => { *slot = todo; Ok(true) }
            None => Ok(false),
        }
    }

    fn reorder_todo(&mut self, from: usize, to: usize) -> Result<(), CacheError> {
        let todos = self.loaded("reorder")?;
        let len = todos.len();
        for index in [from, to] {
            if index >= len { return Err(CacheError::IndexOutOfBounds { index, len }); }
        }
        let todo = todos.remove(from);
        todos.insert(to, todo);
        Ok(())
    }

    fn delete_todo(&mut self, id: TodoId) -> Result<bool, CacheError> {
        let todos = self.loaded("delete")?;
        match todos.iter().position(|t| t.id == id) {
            Some(index) => { todos.remove(index); Ok(true) }
            None => Ok(false),
        }
    }
}
