//! Interactive session over any line-based input.
//!
//! The REPL owns the confirmation step for destructive commands: `clear` and
//! `reload` only reach the store after an explicit `y`.

use crate::command::{Command, ParseError, HELP};
use crate::render::{render_list, render_status, render_warnings};
use std::io::Write;
use std::time::Duration;
use tasklist::{TodoError, TodoStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Line-oriented session
pub struct Repl<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Repl<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Read commands from `input`, write responses to `out`
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    /// Give back the writer
    pub fn into_output(self) -> W {
        self.out
    }

    /// Start, run until `quit` or end of input, then close the store
    ///
    /// The store is closed however the session ends, so pending writes are
    /// flushed even after an I/O error.
    ///
    /// # Errors
    ///
    /// Returns the session's I/O error if there was one, otherwise the error
    /// from closing the store.
    pub async fn session(
        &mut self,
        store: &TodoStore,
        shutdown_timeout: Duration,
    ) -> anyhow::Result<()> {
        let session = async {
            self.start(store).await?;
            self.run(store).await
        }
        .await;
        let closed = store.close(shutdown_timeout).await;

        if let Err(err) = &session {
            tracing::error!(error = %err, "Session ended on an error");
        }
        session?;
        closed?;
        Ok(())
    }

    /// Initialize the store and show the list or the error with its retry hint
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the output fails.
    pub async fn start(&mut self, store: &TodoStore) -> anyhow::Result<()> {
        writeln!(self.out, "Loading todos...")?;
        if let Err(err) = store.init().await {
            tracing::warn!(error = %err, "Initial load failed");
        }
        self.show(store).await
    }

    /// Run until `quit` or end of input
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run(&mut self, store: &TodoStore) -> anyhow::Result<()> {
        while let Some(line) = self.prompt("> ").await? {
            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(store, command).await?,
                Err(ParseError::Empty) => {},
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }
        Ok(())
    }

    async fn execute(&mut self, store: &TodoStore, command: Command) -> anyhow::Result<()> {
        let result = match command {
            Command::List => Ok(()),
            Command::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(());
            },
            Command::Warnings => {
                let warnings = store.warnings().await;
                write!(self.out, "{}", render_warnings(&warnings))?;
                return Ok(());
            },
            Command::Add(text) => store.add(&text).await.map(|_| ()),
            Command::Toggle(id) => store.toggle(id).await,
            Command::Delete(id) => store.delete(id).await,
            Command::Retry => {
                if let Err(err) = store.retry().await {
                    tracing::warn!(error = %err, "Retry failed");
                }
                return self.show(store).await;
            },
            Command::Dismiss => store.dismiss_warnings().await,
            Command::Clear => {
                if !self.confirm("Delete every todo? This cannot be undone.").await? {
                    writeln!(self.out, "Cancelled.")?;
                    return Ok(());
                }
                store.clear_all().await
            },
            Command::Reload => {
                if !self.confirm("Replace your todos with the remote list? Local changes are lost.").await? {
                    writeln!(self.out, "Cancelled.")?;
                    return Ok(());
                }
                writeln!(self.out, "Fetching...")?;
                store.reload_from_remote().await
            },
            Command::Quit => return Ok(()),
        };

        if let Err(err) = result {
            self.report(&err)?;
            if matches!(err, TodoError::Validation(_) | TodoError::NotReady(_)) {
                return Ok(());
            }
        }
        self.show(store).await
    }

    async fn show(&mut self, store: &TodoStore) -> anyhow::Result<()> {
        match render_status(&store.status().await) {
            Some(message) => writeln!(self.out, "{message}")?,
            None => write!(self.out, "{}", render_list(&store.todos().await))?,
        }
        Ok(())
    }

    fn report(&mut self, err: &TodoError) -> std::io::Result<()> {
        match err {
            TodoError::Validation(message) => writeln!(self.out, "{message}. Please enter some text."),
            other => writeln!(self.out, "Error: {other}"),
        }
    }

    async fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        let answer = self.prompt(&format!("{question} [y/N] ")).await?;
        Ok(answer.is_some_and(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes")))
    }

    async fn prompt(&mut self, text: &str) -> anyhow::Result<Option<String>> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(self.lines.next_line().await?)
    }
}
