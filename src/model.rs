use ratatui::crossterm::event::KeyEvent;
use ratatui::text::{Line, Span};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace};

use crate::columns::ColumnDescriptor;
use crate::date::format_user_date;
use crate::domain::{HELP_TEXT, Message, UViewConfig, UViewError};
use crate::filter::{FilterMap, MatchRule};
use crate::group_filter::{FilterField, GroupFilter};
use crate::pagination::{PageButtons, PageSizeMenu, PaginationView};
use crate::popover::ClickAwayListeners;
use crate::record::{Record, RecordId};
use crate::router::{Route, Router};
use crate::row_actions::{RowAction, RowActionMenu};
use crate::store::RecordStore;
use crate::table_state::{
    DeferredCommit, FilterCommand, PageRequest, TableEvent, TableViewState,
};
use crate::ui::status_style;
use crate::users::{Status as UserStatus, User};

/// Organizations offered by the organization column popover.
pub const COLUMN_ORGANIZATIONS: [&str; 3] = ["Lendsqr", "Irorun", "Lendstar"];
/// Number of organizations the group filter offers, taken from the records.
const GROUP_ORGANIZATIONS: usize = 5;

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    Table,
    Details,
    Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    ViewDetails(RecordId),
    Blacklist(RecordId),
    Activate(RecordId),
}

/// The popover raw key events are routed to.
#[derive(Debug, Clone, PartialEq)]
enum Overlay {
    GroupFilter,
    ColumnFilter(usize),
    PageSizeMenu,
    RowActions(RecordId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub blacklisted: usize,
}

impl UserStats {
    fn from_users(users: &[User]) -> Self {
        let count = |status: UserStatus| users.iter().filter(|u| u.status == status).count();
        UserStats {
            total: users.len(),
            active: count(UserStatus::Active),
            pending: count(UserStatus::Pending),
            blacklisted: count(UserStatus::Blacklisted),
        }
    }
}

#[derive(Debug, Default)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    /// Sidebar opened on a narrow terminal. Wide terminals always show it.
    pub sidebar_open: bool,
}

pub fn user_filters() -> FilterMap {
    FilterMap::new()
        .field("organization", "organization", MatchRule::Contains)
        .field("username", "username", MatchRule::Contains)
        .field("email", "email", MatchRule::Contains)
        .field("phone", "phone", MatchRule::Contains)
        .field("date", "createdAt", MatchRule::SameDay)
        .field("status", "status", MatchRule::Exact)
}

fn status_options() -> Vec<String> {
    UserStatus::ALL.iter().map(|s| s.to_string()).collect()
}

/// The first distinct organizations in record order.
fn organization_options(users: &[User]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for user in users {
        if options.len() == GROUP_ORGANIZATIONS {
            break;
        }
        if !user.organization.is_empty() && !options.contains(&user.organization) {
            options.push(user.organization.clone());
        }
    }
    options
}

pub fn group_filter_fields(users: &[User]) -> Vec<FilterField> {
    vec![
        FilterField::select("Organization", "organization", organization_options(users)),
        FilterField::text("Username", "username", "User"),
        FilterField::text("Email", "email", "Email"),
        FilterField::text("Phone Number", "phone", "Phone Number"),
        FilterField::date("Date", "date"),
        FilterField::select("Status", "status", status_options()),
    ]
}

pub fn user_columns() -> Vec<ColumnDescriptor<User>> {
    vec![
        ColumnDescriptor::accessor("Organization", "organization").with_filter(
            FilterField::select(
                "Organization",
                "organization",
                COLUMN_ORGANIZATIONS.iter().map(|o| o.to_string()).collect(),
            ),
        ),
        ColumnDescriptor::accessor("Username", "username")
            .with_filter(FilterField::text("Username", "username", "User")),
        ColumnDescriptor::accessor("Email", "email")
            .with_filter(FilterField::text("Email", "email", "Email")),
        ColumnDescriptor::accessor("Phone Number", "phone")
            .with_filter(FilterField::text("Phone Number", "phone", "Phone Number")),
        ColumnDescriptor::custom("Date Joined", |u: &User| {
            Line::from(format_user_date(&u.created_at))
        })
        .with_filter(FilterField::date("Date", "date")),
        ColumnDescriptor::custom("Status", |u: &User| {
            Line::from(Span::styled(u.status.to_string(), status_style(u.status)))
        })
        .with_filter(FilterField::select("Status", "status", status_options())),
        ColumnDescriptor::action(),
    ]
}

fn user_actions(id: &RecordId) -> Vec<RowAction<UserAction>> {
    vec![
        RowAction::new("View Details", Some("◉"), UserAction::ViewDetails(id.clone())),
        RowAction::new("Blacklist User", Some("✗"), UserAction::Blacklist(id.clone())),
        RowAction::new("Activate User", Some("✓"), UserAction::Activate(id.clone())),
    ]
}

pub struct Model {
    config: UViewConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    table: TableViewState<User>,
    columns: Vec<ColumnDescriptor<User>>,
    group_filter: GroupFilter,
    size_menu: PageSizeMenu,
    page_buttons: PageButtons,
    row_menus: HashMap<RecordId, RowActionMenu<UserAction>>,
    focus: Option<Overlay>,
    listeners: ClickAwayListeners,
    deferred: DeferredCommit,
    store: Box<dyn RecordStore<User>>,
    router: Router,
    stats: UserStats,
    selected_row: usize,
    uilayout: UILayout,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn new(config: UViewConfig, users: Vec<User>, store: Box<dyn RecordStore<User>>) -> Self {
        let table = TableViewState::new(Arc::new(Vec::new()), user_filters(), config.page_size);
        let mut model = Model {
            config,
            status: Status::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            table,
            columns: user_columns(),
            group_filter: GroupFilter::default(),
            size_menu: PageSizeMenu::default(),
            page_buttons: PageButtons::default(),
            row_menus: HashMap::new(),
            focus: None,
            listeners: ClickAwayListeners::default(),
            deferred: DeferredCommit::default(),
            store,
            router: Router::default(),
            stats: UserStats::default(),
            selected_row: 0,
            uilayout: UILayout::default(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        info!("Starting with {} users", users.len());
        model.set_status_message(format!("Loaded {} users", users.len()));
        model.set_source(Arc::new(users));
        model
    }

    // Accessors used by the drawing code

    pub fn modus(&self) -> Modus {
        self.modus
    }

    pub fn config(&self) -> &UViewConfig {
        &self.config
    }

    pub fn table(&self) -> &TableViewState<User> {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDescriptor<User>] {
        &self.columns
    }

    pub fn group_filter(&self) -> &GroupFilter {
        &self.group_filter
    }

    pub fn size_menu(&self) -> &PageSizeMenu {
        &self.size_menu
    }

    pub fn row_menu(&self, id: &RecordId) -> Option<&RowActionMenu<UserAction>> {
        self.row_menus.get(id)
    }

    pub fn pagination(&self) -> PaginationView {
        PaginationView::new(
            self.table.page_index(),
            self.table.page_size(),
            self.table.total(),
        )
    }

    pub fn page_buttons(&self) -> &PageButtons {
        &self.page_buttons
    }

    pub fn stats(&self) -> UserStats {
        self.stats
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    #[cfg(test)]
    pub fn layout(&self) -> &UILayout {
        &self.uilayout
    }

    pub fn sidebar_visible(&self) -> bool {
        self.uilayout.sidebar_open || self.uilayout.width >= self.config.sidebar_breakpoint
    }

    pub fn route(&self) -> &Route {
        self.router.current()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn last_status_message_update(&self) -> Instant {
        self.last_status_message_update
    }

    pub fn popup_message(&self) -> &str {
        HELP_TEXT
    }

    /// The user the detail view shows, read back from the record store.
    pub fn detail_user(&self) -> Option<User> {
        let Route::UserDetails(id) = self.router.current() else {
            return None;
        };
        match self.store.get_by_id(id) {
            Ok(user) => user,
            Err(e) => {
                error!("Reading user {id} from the store failed: {e}");
                None
            }
        }
    }

    /// True while an open popover consumes key events.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::Table && self.focus.is_some()
    }

    pub fn quit(&mut self) {
        trace!("Quit");
        self.status = Status::Quitting;
    }

    pub fn update(&mut self, message: Option<Message>) {
        let Some(msg) = message else {
            return;
        };
        if msg != Message::Tick {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
        }
        match msg {
            Message::Tick => self.tick_at(Instant::now()),
            Message::Resize(width, height) => self.ui_resize(width, height),
            Message::Click(column, row) => self.click(column, row),
            msg => match self.modus {
                Modus::Table => match msg {
                    Message::Quit => self.quit(),
                    Message::Help => self.show_help(),
                    Message::Exit => self.exit(),
                    Message::MoveUp => self.move_selection_up(),
                    Message::MoveDown => self.move_selection_down(),
                    Message::PreviousPage => self.request_page(PaginationView::previous),
                    Message::NextPage => self.request_page(PaginationView::next),
                    Message::FirstPage => self.request_page(PaginationView::first),
                    Message::LastPage => self.request_page(PaginationView::last),
                    Message::OpenGroupFilter => self.toggle_group_filter(),
                    Message::ToggleColumnFilter(n) => self.toggle_column_filter(n),
                    Message::TogglePageSizeMenu => self.toggle_page_size_menu(),
                    Message::OpenRowActions | Message::Enter => self.toggle_row_actions(),
                    Message::ToggleSidebar => self.toggle_sidebar(),
                    Message::RawKey(key) => self.raw_input(key),
                    _ => (),
                },
                Modus::Details => match msg {
                    Message::Quit => self.quit(),
                    Message::Help => self.show_help(),
                    Message::Exit => self.exit(),
                    Message::ToggleSidebar => self.toggle_sidebar(),
                    _ => (),
                },
                Modus::Popup => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
            },
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    fn set_source(&mut self, users: Arc<Vec<User>>) {
        self.stats = UserStats::from_users(&users);
        self.group_filter.set_fields(group_filter_fields(&users));
        self.dispatch(TableEvent::SourceRecordsChanged(users));
    }

    fn dispatch(&mut self, event: TableEvent<User>) {
        let table = std::mem::take(&mut self.table);
        self.table = table.update(event);
        if let Some(seq) = self.table.pending_commit() {
            self.deferred
                .schedule(seq, Instant::now(), self.config.loading_delay);
        }

        let visible: Vec<RecordId> = self
            .table
            .visible_records()
            .iter()
            .map(|u| u.id())
            .collect();
        self.row_menus.retain(|id, _| visible.contains(id));
        self.selected_row = std::cmp::min(self.selected_row, visible.len().saturating_sub(1));
        self.refocus();
    }

    fn tick_at(&mut self, now: Instant) {
        if let Some(seq) = self.deferred.poll(now) {
            trace!("Committing slice {seq}");
            self.dispatch(TableEvent::CommitSlice(seq));
        }
    }

    fn filter_command(&mut self, command: FilterCommand) {
        debug!("Filter command {:?}", command);
        let applied = !matches!(command, FilterCommand::Set { .. });
        self.dispatch(command.into());
        if applied {
            self.set_status_message(format!(
                "{} of {} users match",
                self.table.total(),
                self.table.source().len()
            ));
        }
    }

    fn request_page(&mut self, request: impl Fn(&PaginationView) -> Option<PageRequest>) {
        match request(&self.pagination()) {
            Some(req) => {
                trace!("Page request {:?}", req);
                self.dispatch(req.into());
            }
            None => trace!("Page request ignored"),
        }
    }

    fn move_selection_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        let rows = self.table.visible_records().len();
        self.selected_row = std::cmp::min(self.selected_row + 1, rows.saturating_sub(1));
    }

    fn selected_id(&self) -> Option<RecordId> {
        self.table
            .visible_records()
            .get(self.selected_row)
            .map(|u| u.id())
    }

    fn overlay_is_open(&self, overlay: &Overlay) -> bool {
        match overlay {
            Overlay::GroupFilter => self.group_filter.is_open(),
            Overlay::ColumnFilter(idx) => self.columns.get(*idx).is_some_and(|c| c.is_filter_open()),
            Overlay::PageSizeMenu => self.size_menu.is_open(),
            Overlay::RowActions(id) => self.row_menus.get(id).is_some_and(|m| m.is_open()),
        }
    }

    /// Keeps the focused popover if it is still open, otherwise moves focus to
    /// any other open one.
    fn refocus(&mut self) {
        if self.focus.as_ref().is_some_and(|o| self.overlay_is_open(o)) {
            return;
        }
        let columns = (0..self.columns.len()).map(Overlay::ColumnFilter);
        let menus = self.row_menus.keys().cloned().map(Overlay::RowActions);
        self.focus = [Overlay::GroupFilter, Overlay::PageSizeMenu]
            .into_iter()
            .chain(columns)
            .chain(menus)
            .find(|o| self.overlay_is_open(o));
    }

    fn focus_on(&mut self, overlay: Overlay) {
        if self.overlay_is_open(&overlay) {
            self.focus = Some(overlay);
        }
        self.refocus();
    }

    fn toggle_group_filter(&mut self) {
        self.group_filter.toggle(&self.listeners, self.table.filters());
        self.focus_on(Overlay::GroupFilter);
    }

    /// `n` counts columns from one, as printed in the header.
    fn toggle_column_filter(&mut self, n: usize) {
        let idx = n.saturating_sub(1);
        if !self.columns.get(idx).is_some_and(|c| c.is_filterable()) {
            self.set_status_message(format!("Column {n} has no filter"));
            return;
        }
        self.columns[idx].toggle_filter(&self.listeners, self.table.filters());
        self.focus_on(Overlay::ColumnFilter(idx));
    }

    fn toggle_page_size_menu(&mut self) {
        self.size_menu
            .toggle(&self.listeners, self.table.page_size());
        self.focus_on(Overlay::PageSizeMenu);
    }

    fn toggle_row_actions(&mut self) {
        let Some(id) = self.selected_id() else {
            trace!("No row selected");
            return;
        };
        self.row_menus
            .entry(id.clone())
            .or_insert_with(|| RowActionMenu::new(user_actions(&id)))
            .toggle(&self.listeners);
        self.focus_on(Overlay::RowActions(id));
    }

    fn toggle_sidebar(&mut self) {
        self.uilayout.sidebar_open = !self.uilayout.sidebar_open;
        trace!("Sidebar open: {}", self.uilayout.sidebar_open);
    }

    fn raw_input(&mut self, key: KeyEvent) {
        let Some(overlay) = self.focus.clone() else {
            return;
        };
        match overlay {
            Overlay::GroupFilter => {
                if let Some(command) = self.group_filter.key(key, self.table.filters()) {
                    self.filter_command(command);
                }
            }
            Overlay::ColumnFilter(idx) => {
                let command = self
                    .columns
                    .get_mut(idx)
                    .and_then(|c| c.filter_key(key, self.table.filters()));
                if let Some(command) = command {
                    self.filter_command(command);
                }
            }
            Overlay::PageSizeMenu => {
                if let Some(request) = self.size_menu.key(key) {
                    self.dispatch(request.into());
                }
            }
            Overlay::RowActions(id) => {
                let action = self.row_menus.get_mut(&id).and_then(|m| m.key(key));
                if let Some(action) = action {
                    self.user_action(action);
                }
            }
        }
        self.refocus();
    }

    fn click(&mut self, column: u16, row: u16) {
        if !self.listeners.is_listening() {
            self.click_page_button(column, row);
            return;
        }
        let mut closed = 0;
        closed += usize::from(self.group_filter.click_outside(column, row));
        closed += usize::from(self.size_menu.click_outside(column, row));
        for c in self.columns.iter_mut() {
            closed += usize::from(c.click_outside(column, row));
        }
        for m in self.row_menus.values_mut() {
            closed += usize::from(m.click_outside(column, row));
        }
        debug!("Click at {column},{row} closed {closed} popovers");
        self.refocus();
    }

    fn click_page_button(&mut self, column: u16, row: u16) {
        if self.modus != Modus::Table {
            return;
        }
        if let Some(button) = self.page_buttons.hit(column, row) {
            debug!("Clicked {}", button.name());
            self.request_page(|view| view.press(button));
        }
    }

    fn user_action(&mut self, action: UserAction) {
        info!("User action {:?}", action);
        let result = match &action {
            UserAction::ViewDetails(id) => self.view_details(id),
            UserAction::Blacklist(id) => self.change_user_status(id, UserStatus::Blacklisted),
            UserAction::Activate(id) => self.change_user_status(id, UserStatus::Active),
        };
        if let Err(e) = result {
            error!("{:?} failed: {e}", action);
            self.set_status_message(format!("Error: {e}"));
        }
    }

    fn find_user(&self, id: &RecordId) -> Result<User, UViewError> {
        self.table
            .source()
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or_else(|| UViewError::UnknownRecord(id.to_string()))
    }

    fn view_details(&mut self, id: &RecordId) -> Result<(), UViewError> {
        let user = self.find_user(id)?;
        self.store.save(user)?;
        self.router.navigate(&Route::UserDetails(id.clone()).path());
        self.previous_modus = self.modus;
        self.modus = Modus::Details;
        Ok(())
    }

    fn change_user_status(&mut self, id: &RecordId, status: UserStatus) -> Result<(), UViewError> {
        let mut users = self.table.source().as_ref().clone();
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| UViewError::UnknownRecord(id.to_string()))?;
        user.status = status;
        let message = format!("{} is now {}", user.username, status);
        self.store.save(user.clone())?;
        self.set_source(Arc::new(users));
        self.set_status_message(message);
        Ok(())
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout.width = width;
        self.uilayout.height = height;
        if width >= self.config.sidebar_breakpoint && self.uilayout.sidebar_open {
            debug!("Closing sidebar on a wide terminal");
            self.uilayout.sidebar_open = false;
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::Table => {
                // Nothing todo, there is no exit from the users list, only quit
            }
            Modus::Details => {
                self.router.back();
                self.previous_modus = Modus::Details;
                self.modus = Modus::Table;
            }
            Modus::Popup => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::Popup;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputter::tests::key;
    use crate::store::MemoryStore;
    use crate::table_state::PageSize;
    use crate::users::generate_users;
    use crate::users::tests::user;
    use ratatui::crossterm::event::KeyCode;
    use std::time::Duration;

    fn model(users: Vec<User>) -> Model {
        let config = UViewConfig::default().with_loading_delay(Duration::ZERO);
        let mut model = Model::new(config, users, Box::new(MemoryStore::default()));
        model.tick_at(Instant::now());
        model
    }

    fn send(model: &mut Model, msg: Message) {
        model.update(Some(msg));
        model.tick_at(Instant::now());
    }

    fn type_text(model: &mut Model, text: &str) {
        for c in text.chars() {
            send(model, Message::RawKey(key(KeyCode::Char(c))));
        }
    }

    fn usernames(model: &Model) -> Vec<String> {
        model
            .table()
            .visible_records()
            .iter()
            .map(|u| u.username.clone())
            .collect()
    }

    fn two_users() -> Vec<User> {
        vec![
            user("1", "Lendsqr", "JohnDoe", UserStatus::Active),
            user("2", "Irorun", "JaneSmith", UserStatus::Inactive),
        ]
    }

    #[test]
    fn mount_shows_the_spinner_until_the_first_commit() {
        let config = UViewConfig::default().with_loading_delay(Duration::from_millis(200));
        let mut m = Model::new(config, two_users(), Box::new(MemoryStore::default()));
        assert!(m.table().is_loading());
        m.tick_at(Instant::now());
        assert!(m.table().is_loading());
        m.tick_at(Instant::now() + Duration::from_millis(250));
        assert!(!m.table().is_loading());
        assert_eq!(m.stats().total, 2);
    }

    #[test]
    fn status_filter_through_the_group_panel() {
        let mut m = model(two_users());
        send(&mut m, Message::OpenGroupFilter);
        assert!(m.raw_keyevents());
        // Focus the status field, the last of six.
        for _ in 0..5 {
            send(&mut m, Message::RawKey(key(KeyCode::Down)));
        }
        send(&mut m, Message::RawKey(key(KeyCode::Right)));
        assert_eq!(m.table().filters().get("status"), Some("Active"));
        assert_eq!(usernames(&m).len(), 2, "edits stay pending until applied");

        send(&mut m, Message::RawKey(key(KeyCode::Enter)));
        assert_eq!(usernames(&m), vec!["JohnDoe"]);
        assert!(!m.raw_keyevents());
        assert_eq!(m.pagination().items.len(), 1);
    }

    #[test]
    fn column_reset_keeps_other_filters() {
        let mut m = model(vec![
            user("1", "Lendsqr", "JohnDoe", UserStatus::Active),
            user("2", "Irorun", "JohnBull", UserStatus::Inactive),
            user("3", "Irorun", "JaneSmith", UserStatus::Active),
        ]);
        send(&mut m, Message::ToggleColumnFilter(2));
        type_text(&mut m, "John");
        send(&mut m, Message::RawKey(key(KeyCode::Enter)));
        assert_eq!(usernames(&m), vec!["JohnDoe", "JohnBull"]);

        send(&mut m, Message::ToggleColumnFilter(6));
        send(&mut m, Message::RawKey(key(KeyCode::Right)));
        send(&mut m, Message::RawKey(key(KeyCode::Enter)));
        assert_eq!(usernames(&m), vec!["JohnDoe"]);

        send(&mut m, Message::ToggleColumnFilter(6));
        let ctrl_r = KeyEvent::new(
            KeyCode::Char('r'),
            ratatui::crossterm::event::KeyModifiers::CONTROL,
        );
        send(&mut m, Message::RawKey(ctrl_r));
        assert_eq!(m.table().filters().get("username"), Some("John"));
        assert_eq!(m.table().filters().get("status"), Some(""));
        assert_eq!(usernames(&m), vec!["JohnDoe", "JohnBull"]);
    }

    #[test]
    fn page_size_change_returns_to_the_first_page() {
        let mut m = model(generate_users(100));
        send(&mut m, Message::NextPage);
        send(&mut m, Message::NextPage);
        assert_eq!(m.table().page_index(), 2);

        send(&mut m, Message::TogglePageSizeMenu);
        send(&mut m, Message::RawKey(key(KeyCode::Down)));
        send(&mut m, Message::RawKey(key(KeyCode::Enter)));
        assert_eq!(m.table().page_size(), PageSize::TwentyFive);
        assert_eq!(m.table().page_index(), 0);
        assert_eq!(m.pagination().page_count, 4);

        send(&mut m, Message::LastPage);
        assert_eq!(m.table().page_index(), 3);
        send(&mut m, Message::NextPage);
        assert_eq!(m.table().page_index(), 3);
    }

    #[test]
    fn clicking_a_page_button_selects_that_page() {
        use crate::pagination::{PageButton, PageItem};
        use ratatui::layout::Rect;

        let mut m = model(generate_users(50));
        m.page_buttons().set_areas(vec![
            (PageButton::Previous, Rect::new(100, 30, 1, 1)),
            (PageButton::Item(PageItem::Page(1)), Rect::new(104, 30, 1, 1)),
            (PageButton::Next, Rect::new(110, 30, 1, 1)),
        ]);
        send(&mut m, Message::Click(104, 30));
        assert_eq!(m.table().page_index(), 1);
        send(&mut m, Message::Click(110, 30));
        assert_eq!(m.table().page_index(), 2);
        send(&mut m, Message::Click(100, 30));
        assert_eq!(m.table().page_index(), 1);

        // An open popover takes the click instead.
        send(&mut m, Message::TogglePageSizeMenu);
        send(&mut m, Message::Click(110, 30));
        assert!(!m.size_menu().is_open());
        assert_eq!(m.table().page_index(), 1);
    }

    #[test]
    fn empty_source_disables_paging() {
        let mut m = model(Vec::new());
        let view = m.pagination();
        assert_eq!(view.total, 0);
        assert!(!view.previous_enabled && !view.next_enabled);
        send(&mut m, Message::NextPage);
        send(&mut m, Message::OpenRowActions);
        assert_eq!(m.table().page_index(), 0);
        assert!(!m.raw_keyevents());
    }

    #[test]
    fn stale_commit_keeps_loading() {
        let mut m = model(generate_users(30));
        send(&mut m, Message::NextPage);
        let table = std::mem::take(&mut m.table);
        let table = table.update(TableEvent::SetPageIndex(2));
        let latest = table.pending_commit().unwrap();
        let table = table.update(TableEvent::CommitSlice(latest - 1));
        assert!(table.is_loading());
    }

    #[test]
    fn blacklist_updates_the_list_and_the_store() {
        let mut m = model(two_users());
        send(&mut m, Message::MoveDown);
        send(&mut m, Message::OpenRowActions);
        assert!(m.raw_keyevents());
        send(&mut m, Message::RawKey(key(KeyCode::Down)));
        send(&mut m, Message::RawKey(key(KeyCode::Enter)));

        let jane = &m.table().source()[1];
        assert_eq!(jane.status, UserStatus::Blacklisted);
        assert_eq!(m.stats().blacklisted, 1);
        assert!(m.status_message().contains("JaneSmith"));
        assert!(!m.raw_keyevents());
    }

    #[test]
    fn view_details_navigates_and_back_returns() {
        let mut m = model(two_users());
        send(&mut m, Message::Enter);
        send(&mut m, Message::RawKey(key(KeyCode::Enter)));
        assert_eq!(m.modus(), Modus::Details);
        assert_eq!(m.route(), &Route::UserDetails(RecordId::from("1")));
        assert_eq!(m.detail_user().map(|u| u.username), Some("JohnDoe".to_string()));

        send(&mut m, Message::Exit);
        assert_eq!(m.modus(), Modus::Table);
        assert_eq!(m.route(), &Route::Users);
        assert_eq!(m.detail_user(), None);
    }

    #[test]
    fn outside_click_closes_every_open_popover() {
        let mut m = model(two_users());
        send(&mut m, Message::ToggleColumnFilter(1));
        send(&mut m, Message::TogglePageSizeMenu);
        assert_eq!(m.listeners.active(), 2);
        send(&mut m, Message::Click(200, 200));
        assert_eq!(m.listeners.active(), 0);
        assert!(!m.raw_keyevents());
    }

    #[test]
    fn action_column_has_no_filter() {
        let mut m = model(two_users());
        send(&mut m, Message::ToggleColumnFilter(7));
        assert!(!m.raw_keyevents());
        assert_eq!(m.status_message(), "Column 7 has no filter");
    }

    #[test]
    fn wide_terminals_close_the_sidebar() {
        let mut m = model(two_users());
        send(&mut m, Message::Resize(80, 40));
        send(&mut m, Message::ToggleSidebar);
        assert!(m.sidebar_visible());
        send(&mut m, Message::Resize(200, 40));
        assert!(!m.layout().sidebar_open);
        assert!(m.sidebar_visible());
        send(&mut m, Message::Resize(80, 40));
        assert!(!m.sidebar_visible());
    }

    #[test]
    fn group_organizations_come_from_the_records() {
        let users = generate_users(20);
        let fields = group_filter_fields(&users);
        let labels: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Organization", "Username", "Email", "Phone Number", "Date", "Status"]
        );
        match &fields[0].kind {
            crate::group_filter::FieldKind::Select { options } => {
                assert_eq!(options.len(), 5);
                assert_eq!(options[0], users[0].organization);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
