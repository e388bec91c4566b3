//! Todo list in the terminal.
//!
//! ```text
//! TODO_STORAGE_BACKEND=memory cargo run -p todo-app
//! ```

use std::sync::Arc;
use tasklist::{TodoEnvironment, TodoStore};
use tasklist_core::environment::SystemClock;
use tasklist_remote::HttpTodoSource;
use todo_app::{Config, Repl};
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they do not interleave with the prompt
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=info,todo_app=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let backend = config.storage.backend();
    info!(
        backend = backend.name(),
        remote = %config.remote.url,
        "Starting todo app"
    );

    let storage = backend.open().await?;
    let source = Arc::new(HttpTodoSource::new(
        config.remote.url.clone(),
        config.remote.timeout(),
    )?);
    let env = TodoEnvironment::new(storage, source, Arc::new(SystemClock))
        .with_storage_key(config.storage.key.clone())
        .with_fetch_retry(config.remote.retry_policy());
    let store = TodoStore::new(env);

    // Save failures happen in the background; surface them as they arrive
    let mut events = store.subscribe();
    let warnings = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(warning) = event.warning() {
                        eprintln!("warning: {warning} (your change is kept in memory)");
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Warning listener lagged");
                },
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut repl = Repl::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    let result = repl.session(&store, config.shutdown_timeout()).await;
    warnings.abort();
    result?;
    info!("Goodbye");
    Ok(())
}
