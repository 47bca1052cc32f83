use std::sync::Arc;

use todo_data::{
    Todo, TodoId, TodoRepository, TodoRepositoryImpl, TodoStatus,
    config::DemoConfig,
    domain::state::StateReceiver,
    infrastructure::in_memory_remote::InMemoryRemoteTodoDataSource,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = DemoConfig::from_env()?;
    tracing::info!(?config, "starting todo demo");

    let seed = (1..=config.seed_count as i64).map(|id| Todo::new(id, format!("Seeded todo #{id}"))).collect();
    let remote = InMemoryRemoteTodoDataSource::seeded(seed).with_latency(config.remote_latency);
    for op in &config.fail_once {
        remote.fail_next(*op);
    }
    let repo = Arc::new(TodoRepositoryImpl::new(remote));

    let list_watcher = tokio::spawn(watch_list(repo.todo_list_state()));
    let todo_watcher = tokio::spawn(watch_todo(repo.todo_state()));

    tokio::select! {
        res = run_session(repo.as_ref(), config.seed_count as i64) => res?,
        _ = shutdown_signal() => {}
    }

    list_watcher.abort();
    todo_watcher.abort();
    let final_list = repo.todo_list_state().borrow().data.clone().unwrap_or_default();
    tracing::info!(todos = %serde_json::to_string(&final_list)?, "final todo list");
    tracing::info!(remote_calls = ?repo.remote().calls(), "done");
    Ok(())
}

/// A short scripted session touching every repository operation.
async fn run_session<R: TodoRepository>(repo: &R, seed_count: i64) -> anyhow::Result<()> {
    repo.load_all_todos().await;
    repo.load_todo_by_id(TodoId(1)).await;

    let new_id = seed_count + 1;
    repo.create(Todo::new(new_id, "Try the optimistic repository").with_description("created from the demo")).await?;

    let current = repo.todo_state().borrow().data.clone();
    if let Some(first) = current {
        repo.update(first.edited(format!("{} (done)", first.title), TodoStatus::Done)).await?;
    }

    let len = repo.todo_list_state().borrow().data.as_ref().map_or(0, Vec::len);
    if len >= 2 {
        repo.reorder(len - 1, 0).await?;
    }
    repo.delete(TodoId(new_id)).await?;
    Ok(())
}

async fn watch_list(mut rx: StateReceiver<Vec<Todo>>) {
    loop {
        {
            let state = rx.borrow_and_update();
            let ids: Vec<i64> = state.data.iter().flatten().map(|t| t.id.0).collect();
            tracing::info!(loading = state.loading, error = ?state.error.as_ref().map(ToString::to_string), ?ids, "todo list state");
        }
        if rx.changed().await.is_err() { break; }
    }
}

async fn watch_todo(mut rx: StateReceiver<Todo>) {
    loop {
        {
            let state = rx.borrow_and_update();
            let title = state.data.as_ref().map(|t| t.title.as_str());
            tracing::info!(loading = state.loading, error = ?state.error.as_ref().map(ToString::to_string), ?title, "current todo state");
        }
        if rx.changed().await.is_err() { break; }
    }
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
