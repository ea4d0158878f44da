use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::table::display_cell;

/// Creates a progress bar for `len` items, or a hidden one when `visible` is
/// false.
pub fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Reads a cell as search text: null and blank cells have none.
pub fn cell_text(value: &Value) -> Option<String> {
    let text = display_cell(value);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Converts an optional identifier into a table cell.
pub fn id_cell(id: &Option<String>) -> Value {
    match id {
        Some(id) => Value::String(id.clone()),
        None => Value::Null,
    }
}
