pub mod in_memory_remote;
pub mod local_todo;
pub mod local_todo_list;
