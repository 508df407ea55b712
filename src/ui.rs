use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::columns::{ColumnKind, HeaderCell, NO_DATA, TableBody, render_body, render_header};
use crate::filter::FilterMap;
use crate::group_filter::{FieldEditor, FieldKind, FilterField, GroupFocus};
use crate::model::{Modus, Model};
use crate::pagination::{PAGE_SIZE_LABEL, PageButton, PageItem};
use crate::popover::Popover;
use crate::record::Record;
use crate::router::Route;
use crate::table_state::PageSize;
use crate::users::{Status, User};

pub const SIDEBAR_WIDTH: u16 = 26;
const STATS_HEIGHT: u16 = 3;
const FILTER_BAR_HEIGHT: u16 = 1;
const PAGINATION_HEIGHT: u16 = 1;
const STATUSLINE_HEIGHT: u16 = 1;
const COLUMN_SPACING: u16 = 1;
const ACTION_COLUMN_WIDTH: u16 = 3;
const FILTER_POPOVER_WIDTH: u16 = 32;
const GROUP_FILTER_WIDTH: u16 = 38;
const ROW_MENU_WIDTH: u16 = 22;
const STATUS_MESSAGE_FADE: Duration = Duration::from_secs(5);
const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

const ACCENT: Color = Color::Cyan;
const LABEL: Color = Color::DarkGray;

const SIDEBAR_LINKS: [(&str, &[&str]); 4] = [
    ("", &["Switch Organization ▾", "Dashboard"]),
    (
        "CUSTOMERS",
        &[
            "Users",
            "Guarantors",
            "Loans",
            "Decision Models",
            "Savings",
            "Loan Requests",
            "Whitelist",
            "Karma",
        ],
    ),
    (
        "BUSINESSES",
        &[
            "Organization",
            "Loan Products",
            "Savings Products",
            "Fees and Charges",
            "Transactions",
            "Services",
        ],
    ),
    ("SETTINGS", &["Preferences", "Fees and Pricing", "Audit Logs"]),
];

pub fn status_style(status: Status) -> Style {
    match status {
        Status::Active => Style::new().fg(Color::Green),
        Status::Inactive => Style::new().fg(Color::Gray),
        Status::Pending => Style::new().fg(Color::Yellow),
        Status::Blacklisted => Style::new().fg(Color::Red),
    }
}

fn bordered_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(LABEL))
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(rect);
    rect
}

/// Draws a popover at `rect` (kept inside `bounds`) and records where it ended up.
fn draw_popover<'a>(
    frame: &mut Frame,
    popover: &Popover,
    rect: Rect,
    bounds: Rect,
    content: impl Into<Text<'a>>,
    title: &'a str,
) {
    let rect = rect.clamp(bounds);
    popover.set_area(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(content).block(bordered_block(title).border_style(Style::new().fg(ACCENT))),
        rect,
    );
}

fn field_line(field: &FilterField, value: &str, focused: bool) -> Line<'static> {
    let shown = if value.is_empty() {
        Span::styled(field.placeholder().to_string(), Style::new().fg(LABEL))
    } else {
        Span::raw(value.to_string())
    };
    let mut spans = match field.kind {
        FieldKind::Select { .. } => vec![Span::raw("◀ "), shown, Span::raw(" ▶")],
        FieldKind::Text { .. } | FieldKind::Date => vec![shown],
    };
    if focused {
        spans.insert(0, Span::styled("› ", Style::new().fg(ACCENT)));
    } else {
        spans.insert(0, Span::raw("  "));
    }
    Line::from(spans)
}

fn buttons_line(reset_focused: bool, filter_focused: bool) -> Line<'static> {
    let button = |label: &'static str, focused: bool| {
        let style = if focused {
            Style::new().fg(Color::Black).bg(ACCENT)
        } else {
            Style::new().fg(ACCENT)
        };
        Span::styled(label, style)
    };
    Line::from(vec![
        Span::raw("  "),
        button("[ Reset ]", reset_focused),
        Span::raw(" "),
        button("[ Filter ]", filter_focused),
    ])
}

fn cursor_hint(editor: &FieldEditor, field: &FilterField) -> Option<usize> {
    match field.kind {
        FieldKind::Select { .. } => None,
        FieldKind::Text { .. } | FieldKind::Date => Some(editor.curser_pos()),
    }
}

/// Where the table ended up on screen, used to anchor popovers.
struct TableLayout {
    /// Header cell of every column.
    columns: Vec<Rect>,
    first_row_y: u16,
    /// Rows scrolled out above the first drawn row.
    offset: usize,
}

pub struct TableUI {
    started: Instant,
}

impl Default for TableUI {
    fn default() -> Self {
        TableUI {
            started: Instant::now(),
        }
    }
}

impl TableUI {
    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let [body, statusline] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUSLINE_HEIGHT)])
                .areas(frame.area());

        let main = if model.sidebar_visible() {
            let [sidebar, main] =
                Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                    .areas(body);
            self.draw_sidebar(frame, sidebar);
            main
        } else {
            body
        };

        match model.route() {
            Route::Users => self.draw_users(frame, main, model),
            Route::UserDetails(_) => draw_details(frame, main, model.detail_user().as_ref()),
        }
        self.draw_statusline(frame, statusline, model);

        if model.modus() == Modus::Popup {
            self.draw_popup(frame, model.popup_message());
        }
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for (section, links) in SIDEBAR_LINKS {
            if !section.is_empty() {
                lines.push(Line::raw(""));
                lines.push(Line::styled(section, Style::new().fg(LABEL)));
            }
            for link in links {
                if *link == "Users" {
                    lines.push(Line::styled(
                        format!("▌ {link}"),
                        Style::new().fg(ACCENT).add_modifier(Modifier::BOLD),
                    ));
                } else {
                    lines.push(Line::raw(format!("  {link}")));
                }
            }
        }
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::RIGHT)),
            area,
        );
    }

    fn draw_users(&self, frame: &mut Frame, area: Rect, model: &Model) {
        let [stats, filter_bar, table_area, pagination] = Layout::vertical([
            Constraint::Length(STATS_HEIGHT),
            Constraint::Length(FILTER_BAR_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(PAGINATION_HEIGHT),
        ])
        .areas(area);

        self.draw_stats(frame, stats, model);
        self.draw_filter_bar(frame, filter_bar, model);
        let layout = self.draw_table(frame, table_area, model);
        self.draw_pagination(frame, pagination, model);

        // Popovers go last so they are drawn on top of the table.
        let bounds = area;
        for (idx, column) in model.columns().iter().enumerate() {
            if let (Some(filter), Some(anchor)) = (&column.filter, layout.columns.get(idx))
                && column.is_filter_open()
            {
                let value = model.table().filters().get(&filter.field.name).unwrap_or_default();
                let rect = Rect::new(anchor.x, anchor.y + 1, FILTER_POPOVER_WIDTH, 6);
                let content = vec![
                    Line::raw(""),
                    field_line(&filter.field, value, true),
                    Line::raw(""),
                    buttons_line(false, false),
                ];
                draw_popover(frame, filter.popover(), rect, bounds, content, &filter.field.label);
                if let Some(pos) = cursor_hint(filter.editor(), &filter.field) {
                    let area = filter.popover().area();
                    frame.set_cursor_position((area.x + 3 + pos as u16, area.y + 2));
                }
            }
        }
        self.draw_row_menus(frame, &layout, bounds, model);
        if model.group_filter().is_open() {
            self.draw_group_filter(frame, table_area, bounds, model);
        }
        if model.size_menu().is_open() {
            let rect = Rect::new(
                pagination.x + "Showing ".len() as u16,
                pagination.y.saturating_sub(PageSize::ALL.len() as u16 + 2),
                10,
                PageSize::ALL.len() as u16 + 2,
            );
            let highlighted = model.size_menu().highlighted();
            let lines: Vec<Line> = PageSize::ALL
                .iter()
                .map(|size| {
                    let label = format!(" {} ", size.value());
                    if *size == highlighted {
                        Line::styled(label, Style::new().reversed())
                    } else {
                        Line::raw(label)
                    }
                })
                .collect();
            draw_popover(frame, model.size_menu().popover(), rect, bounds, lines, "");
        }
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect, model: &Model) {
        let stats = model.stats();
        let boxes = [
            ("USERS", stats.total, ACCENT),
            ("ACTIVE USERS", stats.active, Color::Green),
            ("PENDING", stats.pending, Color::Yellow),
            ("BLACKLISTED", stats.blacklisted, Color::Red),
        ];
        let areas = Layout::horizontal([Constraint::Fill(1); 4]).split(area);
        for ((title, value, color), rect) in boxes.into_iter().zip(areas.iter()) {
            frame.render_widget(
                Paragraph::new(Line::styled(
                    value.to_string(),
                    Style::new().fg(color).add_modifier(Modifier::BOLD),
                ))
                .block(bordered_block(title)),
                *rect,
            );
        }
    }

    fn draw_filter_bar(&self, frame: &mut Frame, area: Rect, model: &Model) {
        let table = model.table();
        let mut spans = vec![
            Span::styled("Users", Style::new().bold()),
            Span::styled("  [f] Filter", Style::new().fg(ACCENT)),
        ];
        if table.filters().is_active() {
            spans.push(Span::styled(
                format!("  {} of {} users match", table.total(), table.source().len()),
                Style::new().fg(LABEL),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn header_line(&self, idx: usize, cell: &HeaderCell) -> Line<'static> {
        let mut spans = vec![Span::styled(cell.label.to_uppercase(), Style::new().bold())];
        if cell.filterable {
            let style = if cell.filter_open {
                Style::new().fg(Color::Black).bg(ACCENT)
            } else {
                Style::new().fg(LABEL)
            };
            spans.push(Span::styled(format!(" ≡{}", idx + 1), style));
        }
        Line::from(spans)
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, model: &Model) -> TableLayout {
        let block = bordered_block("");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = model.columns();
        let data_columns = columns
            .iter()
            .filter(|c| !matches!(c.kind, ColumnKind::Action))
            .count()
            .max(1) as u16;
        let spacing = COLUMN_SPACING * (columns.len() as u16).saturating_sub(1);
        let data_width = std::cmp::min(
            model.config().max_column_width as u16,
            inner.width.saturating_sub(ACTION_COLUMN_WIDTH + spacing) / data_columns,
        );
        let widths: Vec<Constraint> = columns
            .iter()
            .map(|c| match c.kind {
                ColumnKind::Action => Constraint::Length(ACTION_COLUMN_WIDTH),
                _ => Constraint::Length(data_width),
            })
            .collect();

        let header: Vec<Line> = render_header(columns, true)
            .iter()
            .enumerate()
            .map(|(idx, cell)| self.header_line(idx, cell))
            .collect();
        let table = model.table();
        let visible = table.visible_records();
        let body = render_body(columns, &visible, table.is_loading());

        let rows: Vec<Row> = match &body {
            TableBody::Rows(rows) => rows
                .iter()
                .map(|cells| Row::new(cells.iter().cloned().map(Cell::from)))
                .collect(),
            TableBody::Loading | TableBody::Empty => Vec::new(),
        };
        let widget = Table::new(rows, widths.clone())
            .header(Row::new(header.into_iter().map(Cell::from)))
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .row_highlight_style(Style::new().bg(Color::DarkGray));
        let mut state = TableState::default();
        if matches!(body, TableBody::Rows(_)) {
            state.select(Some(model.selected_row()));
        }
        frame.render_stateful_widget(widget, inner, &mut state);

        let message = match body {
            TableBody::Loading => Some(format!("{} Loading ...", self.spinner())),
            TableBody::Empty => Some(NO_DATA.to_string()),
            TableBody::Rows(_) => None,
        };
        if let Some(message) = message {
            let below_header = Rect {
                y: inner.y.saturating_add(1),
                height: inner.height.saturating_sub(1),
                ..inner
            };
            frame.render_widget(
                Paragraph::new(message).alignment(Alignment::Center),
                centered_rect(below_header, inner.width, 1),
            );
        }

        TableLayout {
            columns: Layout::horizontal(widths)
                .flex(Flex::Start)
                .spacing(COLUMN_SPACING)
                .split(inner)
                .iter()
                .map(|r| Rect { height: 1, ..*r })
                .collect(),
            first_row_y: inner.y + 1,
            offset: state.offset(),
        }
    }

    fn draw_row_menus(&self, frame: &mut Frame, layout: &TableLayout, bounds: Rect, model: &Model) {
        let Some(action) = layout.columns.last() else {
            return;
        };
        for (i, user) in model.table().visible_records().iter().enumerate() {
            let Some(menu) = model.row_menu(&user.id()) else {
                continue;
            };
            if !menu.is_open() || i < layout.offset {
                continue;
            }
            let y = layout.first_row_y + (i - layout.offset) as u16;
            let rect = Rect::new(
                (action.x + action.width).saturating_sub(ROW_MENU_WIDTH),
                y + 1,
                ROW_MENU_WIDTH,
                menu.actions().len() as u16 + 2,
            );
            let lines: Vec<Line> = menu
                .actions()
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let label = format!(" {} {}", item.icon.unwrap_or(" "), item.label);
                    if idx == menu.highlighted() {
                        Line::styled(label, Style::new().reversed())
                    } else {
                        Line::raw(label)
                    }
                })
                .collect();
            draw_popover(frame, menu.popover(), rect, bounds, lines, "");
        }
    }

    fn draw_group_filter(&self, frame: &mut Frame, table_area: Rect, bounds: Rect, model: &Model) {
        let group = model.group_filter();
        let filters: &FilterMap = model.table().filters();
        let focus = group.focus();
        let mut lines: Vec<Line> = Vec::new();
        let mut cursor = None;
        for (idx, field) in group.fields().iter().enumerate() {
            let focused = focus == GroupFocus::Field(idx);
            lines.push(Line::styled(field.label.clone(), Style::new().fg(LABEL)));
            lines.push(field_line(field, filters.get(&field.name).unwrap_or_default(), focused));
            if focused {
                cursor = cursor_hint(group.editor(), field).map(|pos| (pos, lines.len()));
            }
        }
        lines.push(Line::raw(""));
        lines.push(buttons_line(
            focus == GroupFocus::ResetButton,
            focus == GroupFocus::FilterButton,
        ));
        let rect = Rect::new(
            table_area.x + 1,
            table_area.y + 1,
            GROUP_FILTER_WIDTH,
            lines.len() as u16 + 2,
        );
        draw_popover(frame, group.popover(), rect, bounds, lines, "Filter");
        if let Some((pos, line)) = cursor {
            let area = group.popover().area();
            frame.set_cursor_position((area.x + 3 + pos as u16, area.y + line as u16));
        }
    }

    fn draw_pagination(&self, frame: &mut Frame, area: Rect, model: &Model) {
        let view = model.pagination();
        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);

        let showing = Line::from(vec![
            Span::raw(view.showing_text()),
            Span::styled(format!("  [s] {PAGE_SIZE_LABEL}"), Style::new().fg(LABEL)),
        ]);
        frame.render_widget(Paragraph::new(showing), left);

        let arrow = |label: &'static str, enabled: bool| {
            if enabled {
                Span::styled(label, Style::new().fg(ACCENT))
            } else {
                Span::styled(label, Style::new().fg(LABEL))
            }
        };
        let mut parts = vec![(Some(PageButton::Previous), arrow("‹", view.previous_enabled))];
        for item in &view.items {
            let span = match item {
                PageItem::Page(idx) if *idx == view.page_index => {
                    Span::styled(item.label(), Style::new().bold())
                }
                PageItem::Page(_) => Span::styled(item.label(), Style::new().fg(LABEL)),
                PageItem::Ellipsis => Span::raw(item.label()),
            };
            let button = matches!(item, PageItem::Page(_)).then_some(PageButton::Item(*item));
            parts.push((None, Span::raw(" ")));
            parts.push((button, span));
        }
        parts.push((None, Span::raw(" ")));
        parts.push((Some(PageButton::Next), arrow("›", view.next_enabled)));

        // Right aligned, so lay the buttons out by hand to know where they land.
        let total: u16 = parts.iter().map(|(_, span)| span.width() as u16).sum();
        let start = right.x + right.width.saturating_sub(total);
        let mut x = start;
        let mut areas = Vec::new();
        for (button, span) in &parts {
            let width = span.width() as u16;
            if let Some(button) = button {
                let area = Rect::new(x, right.y, width, 1).intersection(right);
                if !area.is_empty() {
                    areas.push((*button, area));
                }
            }
            x = x.saturating_add(width);
        }
        model.page_buttons().set_areas(areas);

        let line = Line::from(parts.into_iter().map(|(_, span)| span).collect::<Vec<_>>());
        frame.render_widget(
            Paragraph::new(line),
            Rect {
                x: start,
                width: right.right().saturating_sub(start),
                ..right
            },
        );
    }

    fn draw_statusline(&self, frame: &mut Frame, area: Rect, model: &Model) {
        let [message, keys] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(20)]).areas(area);
        let style = if model.last_status_message_update().elapsed() > STATUS_MESSAGE_FADE {
            Style::new().fg(LABEL)
        } else {
            Style::new()
        };
        frame.render_widget(
            Paragraph::new(model.status_message().to_string()).style(style),
            message,
        );
        frame.render_widget(
            Paragraph::new("? help  q quit")
                .alignment(Alignment::Right)
                .style(Style::new().fg(LABEL)),
            keys,
        );
    }

    fn draw_popup(&self, frame: &mut Frame, message: &str) {
        let text = Text::from(message.to_string());
        let width = text.width() as u16 + 4;
        let height = text.height() as u16 + 2;
        let rect = centered_rect(frame.area(), width, height);
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(text).block(bordered_block("Help")), rect);
    }

    fn spinner(&self) -> &'static str {
        let frame = self.started.elapsed().as_millis() / 100;
        SPINNER[frame as usize % SPINNER.len()]
    }
}

fn section(title: &str, pairs: &[(&str, &str)]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        title.to_string(),
        Style::new().add_modifier(Modifier::BOLD),
    )];
    for (label, value) in pairs {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<24}", label.to_uppercase()), Style::new().fg(LABEL)),
            Span::raw(value.to_string()),
        ]));
    }
    lines.push(Line::raw(""));
    lines
}

pub fn draw_details(frame: &mut Frame, area: Rect, user: Option<&User>) {
    let [back, rest] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
    frame.render_widget(
        Paragraph::new(Line::styled("← Back to Users (Esc)", Style::new().fg(LABEL))),
        back,
    );

    let Some(user) = user else {
        frame.render_widget(
            Paragraph::new("User not found").alignment(Alignment::Center),
            centered_rect(rest, rest.width, 1),
        );
        return;
    };

    let [header, body] =
        Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(rest);
    let name = if user.personal_info.full_name.is_empty() {
        user.username.clone()
    } else {
        user.personal_info.full_name.clone()
    };
    let header_lines = vec![
        Line::from(vec![
            Span::styled(name, Style::new().bold()),
            Span::raw("   "),
            Span::styled(user.status.to_string(), status_style(user.status)),
        ]),
        Line::styled(format!("{}  ·  {}", user.username, user.id), Style::new().fg(LABEL)),
        Line::from(vec![
            Span::styled(format!("₦{}", user.account_balance), Style::new().bold()),
            Span::raw(format!("   {}/{}", user.account_number, user.bank_name)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(header_lines).block(bordered_block("User Details")),
        header,
    );

    let p = &user.personal_info;
    let e = &user.education_employment;
    let s = &user.socials;
    let g = &user.guarantor;
    let mut lines = section(
        "Personal Information",
        &[
            ("Full Name", p.full_name.as_str()),
            ("Phone Number", p.phone_number.as_str()),
            ("Email Address", p.email_address.as_str()),
            ("BVN", p.bvn.as_str()),
            ("Gender", p.gender.as_str()),
            ("Marital Status", p.marital_status.as_str()),
            ("Children", p.children.as_str()),
            ("Type of Residence", p.type_of_residence.as_str()),
        ],
    );
    lines.extend(section(
        "Education and Employment",
        &[
            ("Level of Education", e.level_of_education.as_str()),
            ("Employment Status", e.employment_status.as_str()),
            ("Sector of Employment", e.sector_of_employment.as_str()),
            ("Duration of Employment", e.duration_of_employment.as_str()),
            ("Office Email", e.office_email.as_str()),
            ("Monthly Income", e.monthly_income.as_str()),
            ("Loan Repayment", e.loan_repayment.as_str()),
        ],
    ));
    lines.extend(section(
        "Socials",
        &[
            ("Twitter", s.twitter.as_str()),
            ("Facebook", s.facebook.as_str()),
            ("Instagram", s.instagram.as_str()),
        ],
    ));
    lines.extend(section(
        "Guarantor",
        &[
            ("Full Name", g.full_name.as_str()),
            ("Phone Number", g.phone_number.as_str()),
            ("Email Address", g.email_address.as_str()),
            ("Relationship", g.relationship.as_str()),
        ],
    ));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(bordered_block("")),
        body,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, UViewConfig};
    use crate::inputter::tests::key;
    use crate::store::MemoryStore;
    use crate::users::{generate_users, load_users};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyCode;
    use std::path::Path;

    fn model(users: Vec<User>) -> Model {
        let config = UViewConfig::default().with_loading_delay(Duration::ZERO);
        let mut model = Model::new(config, users, Box::new(MemoryStore::default()));
        model.update(Some(Message::Resize(150, 40)));
        model.update(Some(Message::Tick));
        model
    }

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(150, 40)).unwrap();
        let ui = TableUI::default();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        screen(&terminal)
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn users_page_shows_headers_rows_and_paging() {
        let users = load_users(Path::new("tests/fixtures/users.json")).unwrap();
        let screen = render(&model(users));
        assert!(screen.contains("ORGANIZATION"));
        assert!(screen.contains("DATE JOINED"));
        assert!(screen.contains("JohnDoe"));
        assert!(screen.contains("Dec 1, 2023, 7:30 AM"));
        assert!(screen.contains("Showing 10 out of 3"));
        assert!(!screen.contains(NO_DATA));
    }

    #[test]
    fn empty_source_shows_no_data() {
        let screen = render(&model(Vec::new()));
        assert!(screen.contains(NO_DATA));
        assert!(screen.contains("Showing 10 out of 0"));
    }

    #[test]
    fn loading_replaces_the_rows_with_a_spinner() {
        let config = UViewConfig::default().with_loading_delay(Duration::from_secs(60));
        let m = Model::new(config, generate_users(5), Box::new(MemoryStore::default()));
        let screen = render(&m);
        assert!(screen.contains("Loading ..."));
        assert!(!screen.contains(&m.table().source()[0].username));
    }

    #[test]
    fn drawn_popovers_record_their_area() {
        let mut m = model(generate_users(12));
        m.update(Some(Message::ToggleColumnFilter(2)));
        let screen = render(&m);
        assert!(screen.contains("[ Filter ]"));

        let area = m.columns()[1]
            .filter
            .as_ref()
            .map(|f| f.popover().area())
            .unwrap();
        assert!(area.width > 0 && area.height > 0);
        m.update(Some(Message::Click(area.x + 1, area.y + 1)));
        assert!(m.columns()[1].is_filter_open());
        m.update(Some(Message::Click(0, 39)));
        assert!(!m.columns()[1].is_filter_open());
    }

    #[test]
    fn drawn_page_buttons_can_be_clicked() {
        let mut m = model(generate_users(50));
        let screen = render(&m);
        assert!(screen.contains("‹ 1 2 ... 5 ›"));

        let page_two = m
            .page_buttons()
            .area(PageButton::Item(PageItem::Page(1)))
            .unwrap();
        m.update(Some(Message::Click(page_two.x, page_two.y)));
        m.update(Some(Message::Tick));
        assert_eq!(m.table().page_index(), 1);

        render(&m);
        let next = m.page_buttons().area(PageButton::Next).unwrap();
        m.update(Some(Message::Click(next.x, next.y)));
        assert_eq!(m.table().page_index(), 2);
    }

    #[test]
    fn group_filter_lists_every_field() {
        let mut m = model(generate_users(12));
        m.update(Some(Message::OpenGroupFilter));
        m.update(Some(Message::RawKey(key(KeyCode::Right))));
        let screen = render(&m);
        for label in ["Organization", "Username", "Email", "Phone Number", "Date", "Status"] {
            assert!(screen.contains(label), "missing {label}");
        }
        assert!(screen.contains("[ Reset ]"));
    }

    #[test]
    fn detail_view_shows_sections_or_not_found() {
        let mut terminal = Terminal::new(TestBackend::new(100, 50)).unwrap();
        let users = generate_users(1);
        terminal
            .draw(|f| draw_details(f, f.area(), users.first()))
            .unwrap();
        let shown = screen(&terminal);
        for title in ["Personal Information", "Education and Employment", "Socials", "Guarantor"] {
            assert!(shown.contains(title), "missing {title}");
        }

        terminal.draw(|f| draw_details(f, f.area(), None)).unwrap();
        assert!(screen(&terminal).contains("User not found"));
    }

    #[test]
    fn help_popup_is_drawn_over_the_table() {
        let mut m = model(generate_users(3));
        m.update(Some(Message::Help));
        let screen = render(&m);
        assert!(screen.contains("Help"));
        assert!(screen.contains("show this help"));
    }
}
