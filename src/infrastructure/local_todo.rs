use crate::domain::todo::{Todo, TodoId};

/// In-memory holder of the "current" todo shown in a detail view.
pub trait LocalTodoDataSource: Send + 'static {
    fn get_todo(&self) -> Option<&Todo>;
    fn set_todo(&mut self, todo: Option<Todo>);
    /// Replaces the held todo only when it has the same id as `todo`.
    /// Returns whether a replacement happened.
    fn set_todo_if_matches_current_id(&mut self, todo: Todo) -> bool;
    /// Clears the held todo only when its id is `id`.
    fn delete_todo_if_matches_current_id(&mut self, id: TodoId) -> bool;
}

#[derive(Debug, Default)]
pub struct LocalTodoDataSourceImpl {
    todo: Option<Todo>,
}

impl LocalTodoDataSourceImpl {
    pub fn new() -> Self { Self::default() }

    fn holds(&self, id: TodoId) -> bool { self.todo.as_ref().is_some_and(|t| t.id == id) }
}

impl LocalTodoDataSource for LocalTodoDataSourceImpl {
    fn get_todo(&self) -> Option<&Todo> { self.todo.as_ref() }

    fn set_todo(&mut self, todo: Option<Todo>) { self.todo = todo; }

    fn set_todo_if_matches_current_id(&mut self, todo: Todo) -> bool {
        if !self.holds(todo.id) { return false; }
        self.todo = Some(todo);
        true
    }

    fn delete_todo_if_matches_current_id(&mut self, id: TodoId) -> bool {
        if !self.holds(id) { return false; }
        self.todo = None;
        true
    }
}
