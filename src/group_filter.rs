use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::trace;

use crate::filter::FilterMap;
use crate::inputter::{InputResult, Inputter};
use crate::popover::{ClickAwayListeners, Popover};
use crate::table_state::FilterCommand;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text { placeholder: String },
    Select { options: Vec<String> },
    Date,
}

/// One editable filter value, shown in a column popover or in the group filter panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterField {
    pub label: String,
    pub name: String,
    pub kind: FieldKind,
}

impl FilterField {
    pub fn text(label: &str, name: &str, placeholder: &str) -> Self {
        FilterField {
            label: label.to_string(),
            name: name.to_string(),
            kind: FieldKind::Text {
                placeholder: placeholder.to_string(),
            },
        }
    }

    pub fn select(label: &str, name: &str, options: Vec<String>) -> Self {
        FilterField {
            label: label.to_string(),
            name: name.to_string(),
            kind: FieldKind::Select { options },
        }
    }

    pub fn date(label: &str, name: &str) -> Self {
        FilterField {
            label: label.to_string(),
            name: name.to_string(),
            kind: FieldKind::Date,
        }
    }

    pub fn placeholder(&self) -> &str {
        match &self.kind {
            FieldKind::Text { placeholder } if !placeholder.is_empty() => placeholder,
            FieldKind::Text { .. } => &self.label,
            FieldKind::Select { .. } => "Select",
            FieldKind::Date => "YYYY-MM-DD",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Set(String),
    Apply,
    Reset,
    Close,
    Nothing,
}

#[derive(Debug, Default)]
pub struct FieldEditor {
    input: Inputter,
}

impl FieldEditor {
    pub fn focus(&mut self, current: &str) {
        self.input.set(current);
    }

    pub fn curser_pos(&self) -> usize {
        self.input.curser_pos()
    }

    pub fn key(&mut self, field: &FilterField, current: &str, key: KeyEvent) -> FieldOutcome {
        match &field.kind {
            FieldKind::Select { options } => Self::select_key(options, current, key),
            FieldKind::Text { .. } | FieldKind::Date => match self.input.read(key) {
                InputResult::Edited(value) => FieldOutcome::Set(value),
                InputResult::Finished => FieldOutcome::Apply,
                InputResult::Reset => FieldOutcome::Reset,
                InputResult::Canceled => FieldOutcome::Close,
                InputResult::Ignored => FieldOutcome::Nothing,
            },
        }
    }

    // Cycles through "" (unset) followed by the options.
    fn select_key(options: &[String], current: &str, key: KeyEvent) -> FieldOutcome {
        let choices = options.len() + 1;
        let idx = options
            .iter()
            .position(|o| o == current)
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = match key.code {
            KeyCode::Right | KeyCode::Char(' ') => (idx + 1) % choices,
            KeyCode::Left => (idx + choices - 1) % choices,
            _ => {
                return match Inputter::default().read(key) {
                    InputResult::Finished => FieldOutcome::Apply,
                    InputResult::Reset => FieldOutcome::Reset,
                    InputResult::Canceled => FieldOutcome::Close,
                    _ => FieldOutcome::Nothing,
                };
            }
        };
        match next {
            0 => FieldOutcome::Set(String::new()),
            n => FieldOutcome::Set(options[n - 1].clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFocus {
    Field(usize),
    ResetButton,
    FilterButton,
}

/// Filter panel holding every filter field at once. Edits are pending until the
/// Filter button applies them, Reset clears all of them.
#[derive(Debug, Default)]
pub struct GroupFilter {
    fields: Vec<FilterField>,
    popover: Popover,
    focus: usize,
    editor: FieldEditor,
}

impl GroupFilter {
    #[cfg(test)]
    pub fn new(fields: Vec<FilterField>) -> Self {
        GroupFilter {
            fields,
            ..Default::default()
        }
    }

    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    pub fn set_fields(&mut self, fields: Vec<FilterField>) {
        self.fields = fields;
        self.focus = std::cmp::min(self.focus, self.fields.len() + 1);
    }

    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn editor(&self) -> &FieldEditor {
        &self.editor
    }

    pub fn focus(&self) -> GroupFocus {
        match self.focus {
            f if f < self.fields.len() => GroupFocus::Field(f),
            f if f == self.fields.len() => GroupFocus::ResetButton,
            _ => GroupFocus::FilterButton,
        }
    }

    pub fn toggle(&mut self, listeners: &ClickAwayListeners, filters: &FilterMap) {
        if self.is_open() {
            self.popover.close();
        } else {
            self.popover.open(listeners);
            self.move_focus(0, filters);
        }
    }

    pub fn click_outside(&mut self, column: u16, row: u16) -> bool {
        self.popover.click_outside(column, row)
    }

    fn move_focus(&mut self, focus: usize, filters: &FilterMap) {
        self.focus = focus;
        if let Some(field) = self.fields.get(focus) {
            self.editor.focus(filters.get(&field.name).unwrap_or_default());
        }
    }

    pub fn key(&mut self, key: KeyEvent, filters: &FilterMap) -> Option<FilterCommand> {
        let stops = self.fields.len() + 2;
        match key.code {
            KeyCode::Down | KeyCode::Tab => {
                self.move_focus((self.focus + 1) % stops, filters);
                return None;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.move_focus((self.focus + stops - 1) % stops, filters);
                return None;
            }
            _ => {}
        }

        let outcome = match self.focus() {
            GroupFocus::Field(idx) => {
                let field = &self.fields[idx];
                let current = filters.get(&field.name).unwrap_or_default();
                match self.editor.key(field, current, key) {
                    FieldOutcome::Set(value) => {
                        return Some(FilterCommand::Set {
                            name: field.name.clone(),
                            value,
                        });
                    }
                    other => other,
                }
            }
            GroupFocus::ResetButton | GroupFocus::FilterButton => match key.code {
                KeyCode::Enter if self.focus() == GroupFocus::ResetButton => FieldOutcome::Reset,
                KeyCode::Enter => FieldOutcome::Apply,
                KeyCode::Esc => FieldOutcome::Close,
                _ => FieldOutcome::Nothing,
            },
        };
        trace!("Group filter outcome {:?}", outcome);

        match outcome {
            FieldOutcome::Apply => {
                self.popover.close();
                Some(FilterCommand::Apply)
            }
            FieldOutcome::Reset => {
                self.popover.close();
                Some(FilterCommand::ResetAll)
            }
            FieldOutcome::Close => {
                self.popover.close();
                None
            }
            FieldOutcome::Set(_) | FieldOutcome::Nothing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MatchRule;
    use crate::inputter::tests::key;
    use ratatui::crossterm::event::KeyModifiers;

    fn fields() -> Vec<FilterField> {
        vec![
            FilterField::text("Username", "username", "User"),
            FilterField::select(
                "Status",
                "status",
                vec!["Active".into(), "Inactive".into()],
            ),
        ]
    }

    fn filters() -> FilterMap {
        FilterMap::new()
            .field("username", "username", MatchRule::Contains)
            .field("status", "status", MatchRule::Exact)
    }

    fn open_panel(listeners: &ClickAwayListeners) -> GroupFilter {
        let mut panel = GroupFilter::new(fields());
        panel.toggle(listeners, &filters());
        panel
    }

    #[test]
    fn typing_sets_the_focused_field() {
        let listeners = ClickAwayListeners::default();
        let mut panel = open_panel(&listeners);
        assert_eq!(
            panel.key(key(KeyCode::Char('j')), &filters()),
            Some(FilterCommand::Set {
                name: "username".into(),
                value: "j".into()
            })
        );
        assert!(panel.is_open());
    }

    #[test]
    fn select_fields_cycle_through_unset_and_options() {
        let listeners = ClickAwayListeners::default();
        let mut panel = open_panel(&listeners);
        let mut f = filters();
        panel.key(key(KeyCode::Down), &f);
        assert_eq!(panel.focus(), GroupFocus::Field(1));

        let set = |cmd: Option<FilterCommand>| match cmd {
            Some(FilterCommand::Set { value, .. }) => value,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(set(panel.key(key(KeyCode::Right), &f)), "Active");
        f.set("status", "Inactive");
        assert_eq!(set(panel.key(key(KeyCode::Right), &f)), "");
        assert_eq!(set(panel.key(key(KeyCode::Left), &f)), "Active");
    }

    #[test]
    fn buttons_apply_and_reset_then_close() {
        let listeners = ClickAwayListeners::default();
        let mut panel = open_panel(&listeners);
        panel.key(key(KeyCode::Up), &filters());
        assert_eq!(panel.focus(), GroupFocus::FilterButton);
        assert_eq!(panel.key(key(KeyCode::Enter), &filters()), Some(FilterCommand::Apply));
        assert!(!panel.is_open());
        assert!(!listeners.is_listening());

        let mut panel = open_panel(&listeners);
        panel.key(key(KeyCode::Up), &filters());
        panel.key(key(KeyCode::Up), &filters());
        assert_eq!(panel.focus(), GroupFocus::ResetButton);
        assert_eq!(
            panel.key(key(KeyCode::Enter), &filters()),
            Some(FilterCommand::ResetAll)
        );
        assert!(!panel.is_open());
    }

    #[test]
    fn enter_and_ctrl_r_in_a_field_act_on_the_whole_panel() {
        let listeners = ClickAwayListeners::default();
        let mut panel = open_panel(&listeners);
        assert_eq!(panel.key(key(KeyCode::Enter), &filters()), Some(FilterCommand::Apply));

        let mut panel = open_panel(&listeners);
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(panel.key(ctrl_r, &filters()), Some(FilterCommand::ResetAll));

        let mut panel = open_panel(&listeners);
        assert_eq!(panel.key(key(KeyCode::Esc), &filters()), None);
        assert!(!panel.is_open());
    }
}
