//! Client-side data layer for a todo app: local caches, a remote data source
//! contract, and a repository that applies changes optimistically while
//! publishing observable load state.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::todo_repository::TodoRepositoryImpl;
pub use domain::{
    remote::RemoteTodoDataSource,
    repository::TodoRepository,
    state::{LoadState, StatePatch, StateReceiver, StateStream, TodoListState, TodoState},
    todo::{Todo, TodoId, TodoStatus},
};
pub use error::{CacheError, RemoteError};
