//! Text rendering of store state.

use std::fmt::Write;
use tasklist::{StoreStatus, TodoError, TodoItem};

/// `Total: n | Done: m` header plus one line per item
#[must_use]
pub fn render_list(todos: &[TodoItem]) -> String {
    let done = todos.iter().filter(|t| t.completed).count();
    let mut out = format!("Total: {} | Done: {}\n", todos.len(), done);

    if todos.is_empty() {
        out.push_str("  (no todos; add one with `add <text>`)\n");
        return out;
    }

    for todo in todos {
        let mark = if todo.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "  [{mark}] #{:<14} {}", todo.id.get(), todo.text);
    }
    out
}

/// What to show instead of the list while it is not usable
#[must_use]
pub fn render_status(status: &StoreStatus) -> Option<String> {
    match status {
        StoreStatus::Ready => None,
        StoreStatus::Loading => Some("Loading todos...".to_string()),
        StoreStatus::Error(err) => Some(format!(
            "{err}\nType `retry` to try again, or `quit` to exit."
        )),
    }
}

/// One line per warning, numbered
#[must_use]
pub fn render_warnings(warnings: &[TodoError]) -> String {
    if warnings.is_empty() {
        return "No warnings.\n".to_string();
    }
    let mut out = String::new();
    for (i, warning) in warnings.iter().enumerate() {
        let _ = writeln!(out, "  {}. {warning}", i + 1);
    }
    out.push_str("Type `dismiss` to clear.\n");
    out
}
