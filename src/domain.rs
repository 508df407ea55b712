use std::io::{Error, ErrorKind};
use std::time::Duration;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::table_state::PageSize;

#[derive(Debug, Error)]
pub enum UViewError {
    #[error("io error: {0}")]
    IoError(Error),
    #[error("invalid json: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown record {0}")]
    UnknownRecord(String),
}

impl From<Error> for UViewError {
    fn from(err: Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => UViewError::FileNotFound,
            ErrorKind::PermissionDenied => UViewError::PermissionDenied,
            _ => UViewError::IoError(err),
        }
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct UViewConfig {
    /// Milliseconds the controller waits for a terminal event per loop iteration.
    pub event_poll_time: u64,
    /// Artificial latency before a new page slice is shown.
    pub loading_delay: Duration,
    pub page_size: PageSize,
    pub max_column_width: usize,
    /// Terminal width from which the sidebar is forced closed.
    pub sidebar_breakpoint: usize,
}

impl Default for UViewConfig {
    fn default() -> Self {
        UViewConfig {
            event_poll_time: 50,
            loading_delay: Duration::from_millis(200),
            page_size: PageSize::Ten,
            max_column_width: 32,
            sidebar_breakpoint: 160,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    Tick,
    Resize(usize, usize),
    MoveUp,
    MoveDown,
    PreviousPage,
    NextPage,
    FirstPage,
    LastPage,
    OpenGroupFilter,
    ToggleColumnFilter(usize),
    TogglePageSizeMenu,
    OpenRowActions,
    ToggleSidebar,
    Click(u16, u16),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
q          quit
?          show this help
j/k        move row selection
h/l        previous / next page
g/G        first / last page
f          filter panel (all fields)
1..6       filter popover of a column
s          items per page
a, Enter   row actions
Esc        close popup / back to the users list
b          toggle sidebar

In filter popups: type to edit, Up/Down to change field,
Left/Right to cycle choices, Enter to filter, Ctrl-r to reset.";
