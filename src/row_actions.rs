use ratatui::crossterm::event::{KeyCode, KeyEvent};

use crate::popover::{ClickAwayListeners, Popover};

#[derive(Debug, Clone, PartialEq)]
pub struct RowAction<A> {
    pub label: String,
    pub icon: Option<&'static str>,
    pub action: A,
}

impl<A> RowAction<A> {
    pub fn new(label: &str, icon: Option<&'static str>, action: A) -> Self {
        RowAction {
            label: label.to_string(),
            icon,
            action,
        }
    }
}

/// Dropdown of actions bound to one row. Clicking an item hands its payload back
/// to the caller and closes the dropdown.
#[derive(Debug)]
pub struct RowActionMenu<A> {
    actions: Vec<RowAction<A>>,
    popover: Popover,
    highlighted: usize,
}

impl<A: Clone> RowActionMenu<A> {
    pub fn new(actions: Vec<RowAction<A>>) -> Self {
        RowActionMenu {
            actions,
            popover: Popover::default(),
            highlighted: 0,
        }
    }

    pub fn actions(&self) -> &[RowAction<A>] {
        &self.actions
    }

    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn toggle(&mut self, listeners: &ClickAwayListeners) {
        self.popover.toggle(listeners);
        self.highlighted = 0;
    }

    pub fn close(&mut self) {
        self.popover.close();
    }

    pub fn click(&mut self, idx: usize) -> Option<A> {
        if !self.is_open() {
            return None;
        }
        let action = self.actions.get(idx)?.action.clone();
        self.popover.close();
        Some(action)
    }

    pub fn key(&mut self, key: KeyEvent) -> Option<A> {
        let count = self.actions.len();
        if count == 0 {
            self.close();
            return None;
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.highlighted = (self.highlighted + 1) % count;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.highlighted = (self.highlighted + count - 1) % count;
                None
            }
            KeyCode::Enter => self.click(self.highlighted),
            KeyCode::Esc => {
                self.close();
                None
            }
            _ => None,
        }
    }

    pub fn click_outside(&mut self, column: u16, row: u16) -> bool {
        self.popover.click_outside(column, row)
    }
}
