use std::fmt;

use ratatui::crossterm::event::KeyEvent;
use ratatui::text::Line;

use crate::filter::FilterMap;
use crate::group_filter::{FieldEditor, FieldOutcome, FilterField};
use crate::popover::{ClickAwayListeners, Popover};
use crate::record::Record;
use crate::table_state::FilterCommand;

pub const ACTION_TRIGGER: &str = "⋮";
pub const NO_DATA: &str = "No data";

pub type CellRenderer<T> = Box<dyn Fn(&T) -> Line<'static>>;

pub enum ColumnKind<T> {
    Accessor { field: String },
    Custom { renderer: CellRenderer<T> },
    /// Row action menu trigger, has no header and no value.
    Action,
}

impl<T> fmt::Debug for ColumnKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Accessor { field } => write!(f, "Accessor({field})"),
            ColumnKind::Custom { .. } => write!(f, "Custom"),
            ColumnKind::Action => write!(f, "Action"),
        }
    }
}

/// Inline filter of a column: the field it edits and the popover it lives in.
#[derive(Debug)]
pub struct ColumnFilter {
    pub field: FilterField,
    popover: Popover,
    editor: FieldEditor,
}

impl ColumnFilter {
    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    pub fn editor(&self) -> &FieldEditor {
        &self.editor
    }
}

#[derive(Debug)]
pub struct ColumnDescriptor<T> {
    pub header: Option<String>,
    pub kind: ColumnKind<T>,
    pub filter: Option<ColumnFilter>,
}

impl<T: Record> ColumnDescriptor<T> {
    pub fn accessor(header: &str, field: &str) -> Self {
        ColumnDescriptor {
            header: Some(header.to_string()),
            kind: ColumnKind::Accessor {
                field: field.to_string(),
            },
            filter: None,
        }
    }

    pub fn custom(header: &str, renderer: impl Fn(&T) -> Line<'static> + 'static) -> Self {
        ColumnDescriptor {
            header: Some(header.to_string()),
            kind: ColumnKind::Custom {
                renderer: Box::new(renderer),
            },
            filter: None,
        }
    }

    pub fn action() -> Self {
        ColumnDescriptor {
            header: None,
            kind: ColumnKind::Action,
            filter: None,
        }
    }

    pub fn with_filter(mut self, field: FilterField) -> Self {
        self.filter = Some(ColumnFilter {
            field,
            popover: Popover::default(),
            editor: FieldEditor::default(),
        });
        self
    }

    pub fn is_filterable(&self) -> bool {
        self.filter.is_some()
    }

    pub fn is_filter_open(&self) -> bool {
        self.filter.as_ref().is_some_and(|f| f.popover.is_open())
    }

    pub fn toggle_filter(&mut self, listeners: &ClickAwayListeners, filters: &FilterMap) {
        if let Some(filter) = self.filter.as_mut() {
            if filter.popover.is_open() {
                filter.popover.close();
            } else {
                filter.popover.open(listeners);
                filter
                    .editor
                    .focus(filters.get(&filter.field.name).unwrap_or_default());
            }
        }
    }

    /// Apply hook of the popover: applies all pending filters and closes.
    pub fn filter_apply(&mut self) -> Option<FilterCommand> {
        let filter = self.filter.as_mut()?;
        filter.popover.close();
        Some(FilterCommand::Apply)
    }

    /// Reset hook of the popover: clears this column's field, re-applies and closes.
    pub fn filter_reset(&mut self) -> Option<FilterCommand> {
        let filter = self.filter.as_mut()?;
        filter.popover.close();
        Some(FilterCommand::ResetField(filter.field.name.clone()))
    }

    pub fn filter_key(&mut self, key: KeyEvent, filters: &FilterMap) -> Option<FilterCommand> {
        let filter = self.filter.as_mut()?;
        let current = filters.get(&filter.field.name).unwrap_or_default();
        match filter.editor.key(&filter.field, current, key) {
            FieldOutcome::Set(value) => Some(FilterCommand::Set {
                name: filter.field.name.clone(),
                value,
            }),
            FieldOutcome::Apply => self.filter_apply(),
            FieldOutcome::Reset => self.filter_reset(),
            FieldOutcome::Close => {
                filter.popover.close();
                None
            }
            FieldOutcome::Nothing => None,
        }
    }

    pub fn click_outside(&mut self, column: u16, row: u16) -> bool {
        self.filter
            .as_mut()
            .is_some_and(|f| f.popover.click_outside(column, row))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub filterable: bool,
    pub filter_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    /// One full width row with a spinner.
    Loading,
    /// One full width "No data" row.
    Empty,
    Rows(Vec<Vec<Line<'static>>>),
}

pub fn render_header<T: Record>(
    columns: &[ColumnDescriptor<T>],
    show_individual_filters: bool,
) -> Vec<HeaderCell> {
    columns
        .iter()
        .map(|c| {
            let filterable = show_individual_filters && c.header.is_some() && c.is_filterable();
            HeaderCell {
                label: c.header.clone().unwrap_or_default(),
                filterable,
                filter_open: filterable && c.is_filter_open(),
            }
        })
        .collect()
}

pub fn render_cell<T: Record>(column: &ColumnDescriptor<T>, record: &T) -> Line<'static> {
    match &column.kind {
        ColumnKind::Custom { renderer } => renderer(record),
        ColumnKind::Accessor { field } => Line::from(record.field(field).unwrap_or_default()),
        ColumnKind::Action => Line::from(ACTION_TRIGGER),
    }
}

pub fn render_body<T: Record>(
    columns: &[ColumnDescriptor<T>],
    records: &[&T],
    loading: bool,
) -> TableBody {
    if loading {
        TableBody::Loading
    } else if records.is_empty() {
        TableBody::Empty
    } else {
        TableBody::Rows(
            records
                .iter()
                .map(|record| columns.iter().map(|c| render_cell(c, *record)).collect())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MatchRule;
    use crate::inputter::tests::key;
    use crate::users::tests::user;
    use crate::users::{Status, User};
    use ratatui::crossterm::event::KeyCode;

    fn columns() -> Vec<ColumnDescriptor<User>> {
        vec![
            ColumnDescriptor::accessor("Username", "username")
                .with_filter(FilterField::text("Username", "username", "User")),
            ColumnDescriptor::accessor("Nickname", "nickname"),
            ColumnDescriptor::custom("Status", |u: &User| Line::from(format!("[{}]", u.status)))
                .with_filter(FilterField::select(
                    "Status",
                    "status",
                    Status::ALL.iter().map(|s| s.to_string()).collect(),
                )),
            ColumnDescriptor::action(),
        ]
    }

    fn filters() -> FilterMap {
        FilterMap::new()
            .field("username", "username", MatchRule::Contains)
            .field("status", "status", MatchRule::Exact)
    }

    fn text(line: &Line) -> String {
        line.to_string()
    }

    #[test]
    fn cells_dispatch_on_the_column_kind() {
        let u = user("7", "Lendsqr", "Debby", Status::Pending);
        let cells: Vec<String> = columns().iter().map(|c| text(&render_cell(c, &u))).collect();
        assert_eq!(cells, vec!["Debby", "", "[Pending]", ACTION_TRIGGER]);
    }

    #[test]
    fn body_rows_have_one_cell_per_column() {
        let a = user("1", "Lendsqr", "JohnDoe", Status::Active);
        let b = user("2", "Irorun", "JaneSmith", Status::Inactive);
        match render_body(&columns(), &[&a, &b], false) {
            TableBody::Rows(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(rows.iter().all(|r| r.len() == 4));
                assert_eq!(text(&rows[1][0]), "JaneSmith");
            }
            other => panic!("expected rows, got {other:?}"),
        }
        assert_eq!(render_body(&columns(), &[&a], true), TableBody::Loading);
        assert_eq!(render_body::<User>(&columns(), &[], false), TableBody::Empty);
    }

    #[test]
    fn header_shows_filter_triggers_only_on_filterable_columns() {
        let header = render_header(&columns(), true);
        let flags: Vec<bool> = header.iter().map(|h| h.filterable).collect();
        assert_eq!(flags, vec![true, false, true, false]);
        assert_eq!(header[3].label, "");
        assert!(render_header(&columns(), false).iter().all(|h| !h.filterable));
    }

    #[test]
    fn column_popovers_open_and_close_independently() {
        let listeners = ClickAwayListeners::default();
        let f = filters();
        let mut cols = columns();
        cols[0].toggle_filter(&listeners, &f);
        cols[2].toggle_filter(&listeners, &f);
        assert!(cols[0].is_filter_open() && cols[2].is_filter_open());
        assert_eq!(listeners.active(), 2);

        cols[0].toggle_filter(&listeners, &f);
        assert!(!cols[0].is_filter_open());
        assert!(cols[2].is_filter_open());

        cols[1].toggle_filter(&listeners, &f);
        assert!(!cols[1].is_filter_open());
        assert_eq!(listeners.active(), 1);
    }

    #[test]
    fn apply_and_reset_hooks_close_the_popover() {
        let listeners = ClickAwayListeners::default();
        let f = filters();
        let mut cols = columns();
        cols[2].toggle_filter(&listeners, &f);
        assert_eq!(
            cols[2].filter_reset(),
            Some(FilterCommand::ResetField("status".into()))
        );
        assert!(!cols[2].is_filter_open());

        cols[0].toggle_filter(&listeners, &f);
        assert_eq!(
            cols[0].filter_key(key(KeyCode::Char('x')), &f),
            Some(FilterCommand::Set {
                name: "username".into(),
                value: "x".into()
            })
        );
        assert_eq!(cols[0].filter_key(key(KeyCode::Enter), &f), Some(FilterCommand::Apply));
        assert!(!listeners.is_listening());
        assert_eq!(cols[3].filter_apply(), None);
    }

    #[test]
    fn outside_click_closes_without_a_command() {
        let listeners = ClickAwayListeners::default();
        let mut cols = columns();
        cols[0].toggle_filter(&listeners, &filters());
        if let Some(filter) = &cols[0].filter {
            filter.popover().set_area(ratatui::layout::Rect::new(0, 2, 30, 5));
        }
        assert!(!cols[0].click_outside(3, 3));
        assert!(cols[0].click_outside(50, 3));
        assert!(!cols[0].is_filter_open());
    }
}
