use std::cell::RefCell;

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Position, Rect};

use crate::popover::{ClickAwayListeners, Popover};
use crate::table_state::{PageRequest, PageSize, page_count};

pub const PAGE_SIZE_LABEL: &str = "Items per page";
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    /// Non interactive marker for a run of hidden pages.
    Ellipsis,
}

impl PageItem {
    pub fn label(&self) -> String {
        match self {
            PageItem::Page(idx) => (idx + 1).to_string(),
            PageItem::Ellipsis => ELLIPSIS.to_string(),
        }
    }

    /// Accessible name of a page button, e.g. `Page 2` for index 1.
    pub fn name(&self) -> Option<String> {
        match self {
            PageItem::Page(idx) => Some(format!("Page {}", idx + 1)),
            PageItem::Ellipsis => None,
        }
    }
}

/// A clickable part of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Previous,
    Item(PageItem),
    Next,
}

impl PageButton {
    pub fn name(&self) -> String {
        match self {
            PageButton::Previous => "Previous".to_string(),
            PageButton::Next => "Next".to_string(),
            PageButton::Item(item) => item.name().unwrap_or_else(|| ELLIPSIS.to_string()),
        }
    }
}

/// Where the pagination buttons were last drawn.
#[derive(Debug, Default)]
pub struct PageButtons {
    areas: RefCell<Vec<(PageButton, Rect)>>,
}

impl PageButtons {
    pub fn set_areas(&self, areas: Vec<(PageButton, Rect)>) {
        *self.areas.borrow_mut() = areas;
    }

    #[cfg(test)]
    pub fn area(&self, button: PageButton) -> Option<Rect> {
        self.areas
            .borrow()
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, area)| *area)
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<PageButton> {
        self.areas
            .borrow()
            .iter()
            .find(|(_, area)| area.contains(Position::new(column, row)))
            .map(|(button, _)| *button)
    }
}

/// First and last page, the pages next to the current one, and one ellipsis per
/// run of hidden pages.
pub fn page_window(page_index: usize, page_count: usize) -> Vec<PageItem> {
    if page_count == 0 {
        return Vec::new();
    }
    let last = page_count - 1;
    let current = std::cmp::min(page_index, last);
    let mut pages = vec![0, last];
    pages.extend(current.saturating_sub(1)..=std::cmp::min(current + 1, last));
    pages.sort_unstable();
    pages.dedup();

    let mut items = Vec::with_capacity(pages.len() * 2);
    let mut previous: Option<usize> = None;
    for page in pages {
        if previous.is_some_and(|p| page > p + 1) {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}

/// Everything the pagination bar shows for one table state.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationView {
    pub page_index: usize,
    pub page_size: PageSize,
    pub total: usize,
    pub page_count: usize,
    pub items: Vec<PageItem>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationView {
    pub fn new(page_index: usize, page_size: PageSize, total: usize) -> Self {
        let page_count = page_count(total, page_size);
        PaginationView {
            page_index,
            page_size,
            total,
            page_count,
            items: page_window(page_index, page_count),
            previous_enabled: page_index > 0,
            next_enabled: page_index + 1 < page_count,
        }
    }

    pub fn showing_text(&self) -> String {
        format!("Showing {} out of {}", self.page_size.value(), self.total)
    }

    fn clamp(&self, idx: usize) -> usize {
        std::cmp::min(idx, self.page_count.saturating_sub(1))
    }

    pub fn previous(&self) -> Option<PageRequest> {
        self.previous_enabled
            .then(|| PageRequest::SetPageIndex(self.clamp(self.page_index - 1)))
    }

    pub fn next(&self) -> Option<PageRequest> {
        self.next_enabled
            .then(|| PageRequest::SetPageIndex(self.clamp(self.page_index + 1)))
    }

    pub fn first(&self) -> Option<PageRequest> {
        self.previous_enabled.then_some(PageRequest::SetPageIndex(0))
    }

    pub fn last(&self) -> Option<PageRequest> {
        self.next_enabled
            .then(|| PageRequest::SetPageIndex(self.page_count - 1))
    }

    pub fn click(&self, item: PageItem) -> Option<PageRequest> {
        match item {
            PageItem::Page(idx) => Some(PageRequest::SetPageIndex(self.clamp(idx))),
            PageItem::Ellipsis => None,
        }
    }

    pub fn press(&self, button: PageButton) -> Option<PageRequest> {
        match button {
            PageButton::Previous => self.previous(),
            PageButton::Next => self.next(),
            PageButton::Item(item) => self.click(item),
        }
    }

    /// Looks up a page button by its accessible name.
    #[cfg(test)]
    pub fn button(&self, name: &str) -> Option<PageItem> {
        self.items
            .iter()
            .copied()
            .find(|item| item.name().as_deref() == Some(name))
    }
}

/// The page size dropdown.
#[derive(Debug, Default)]
pub struct PageSizeMenu {
    popover: Popover,
    highlighted: usize,
}

impl PageSizeMenu {
    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    pub fn highlighted(&self) -> PageSize {
        PageSize::ALL[self.highlighted]
    }

    pub fn toggle(&mut self, listeners: &ClickAwayListeners, current: PageSize) {
        self.popover.toggle(listeners);
        self.highlighted = PageSize::ALL
            .iter()
            .position(|s| *s == current)
            .unwrap_or(0);
    }

    pub fn select(&mut self, size: PageSize) -> PageRequest {
        self.popover.close();
        PageRequest::SetPageSize(size)
    }

    pub fn key(&mut self, key: KeyEvent) -> Option<PageRequest> {
        let options = PageSize::ALL.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.highlighted = (self.highlighted + 1) % options;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.highlighted = (self.highlighted + options - 1) % options;
                None
            }
            KeyCode::Enter => Some(self.select(self.highlighted())),
            KeyCode::Esc => {
                self.popover.close();
                None
            }
            _ => None,
        }
    }

    pub fn click_outside(&mut self, column: u16, row: u16) -> bool {
        self.popover.click_outside(column, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputter::tests::key;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn fifty_records_make_five_pages() {
        let view = PaginationView::new(0, PageSize::Ten, 50);
        assert_eq!(view.page_count, 5);
        assert!(!view.previous_enabled);
        assert!(view.next_enabled);
        assert_eq!(view.next(), Some(PageRequest::SetPageIndex(1)));
        assert_eq!(view.previous(), None);

        let page_two = view.button("Page 2").unwrap();
        assert_eq!(view.click(page_two), Some(PageRequest::SetPageIndex(1)));
        assert!(view.button("Page 1").is_some());
    }

    #[test]
    fn pressed_buttons_follow_the_arrows_and_pages() {
        let view = PaginationView::new(2, PageSize::Ten, 50);
        assert_eq!(view.press(PageButton::Previous), Some(PageRequest::SetPageIndex(1)));
        assert_eq!(view.press(PageButton::Next), Some(PageRequest::SetPageIndex(3)));
        assert_eq!(
            view.press(PageButton::Item(Page(9))),
            Some(PageRequest::SetPageIndex(4))
        );
        assert_eq!(view.press(PageButton::Item(Ellipsis)), None);
        assert_eq!(PageButton::Item(Page(1)).name(), "Page 2");
    }

    #[test]
    fn recorded_buttons_are_hit_by_position() {
        let buttons = PageButtons::default();
        let two = PageButton::Item(Page(1));
        buttons.set_areas(vec![
            (PageButton::Previous, Rect::new(10, 5, 1, 1)),
            (two, Rect::new(14, 5, 1, 1)),
        ]);
        assert_eq!(buttons.hit(14, 5), Some(two));
        assert_eq!(buttons.hit(10, 5), Some(PageButton::Previous));
        assert_eq!(buttons.hit(12, 5), None);
        assert_eq!(buttons.area(two), Some(Rect::new(14, 5, 1, 1)));
        buttons.set_areas(Vec::new());
        assert_eq!(buttons.hit(14, 5), None);
    }

    #[test]
    fn no_records_disable_both_directions() {
        let view = PaginationView::new(0, PageSize::Ten, 0);
        assert_eq!(view.page_count, 0);
        assert!(view.items.is_empty());
        assert!(!view.previous_enabled && !view.next_enabled);
        assert_eq!(view.showing_text(), "Showing 10 out of 0");
    }

    #[test]
    fn window_collapses_gaps_into_single_ellipses() {
        assert_eq!(page_window(0, 1), vec![Page(0)]);
        assert_eq!(page_window(0, 3), vec![Page(0), Page(1), Page(2)]);
        assert_eq!(page_window(0, 10), vec![Page(0), Page(1), Ellipsis, Page(9)]);
        assert_eq!(
            page_window(5, 10),
            vec![Page(0), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(9)]
        );
        assert_eq!(
            page_window(3, 10),
            vec![Page(0), Ellipsis, Page(2), Page(3), Page(4), Ellipsis, Page(9)]
        );
        assert_eq!(page_window(9, 10), vec![Page(0), Ellipsis, Page(8), Page(9)]);
    }

    #[test]
    fn window_always_contains_first_and_last_page() {
        for count in 1..25 {
            for idx in 0..count {
                let items = page_window(idx, count);
                assert_eq!(items.first(), Some(&Page(0)));
                assert_eq!(items.last(), Some(&Page(count - 1)));
                assert!(items.contains(&Page(idx)));
                assert!(!items.windows(2).any(|w| w[0] == Ellipsis && w[1] == Ellipsis));
            }
        }
    }

    #[test]
    fn last_page_disables_next() {
        let view = PaginationView::new(4, PageSize::Ten, 50);
        assert!(!view.next_enabled);
        assert_eq!(view.previous(), Some(PageRequest::SetPageIndex(3)));
        assert_eq!(view.first(), Some(PageRequest::SetPageIndex(0)));
        assert_eq!(view.click(Ellipsis), None);
    }

    #[test]
    fn size_menu_selects_and_closes() {
        let listeners = ClickAwayListeners::default();
        let mut menu = PageSizeMenu::default();
        menu.toggle(&listeners, PageSize::Ten);
        assert!(menu.is_open());
        menu.key(key(KeyCode::Down));
        assert_eq!(menu.highlighted(), PageSize::TwentyFive);
        assert_eq!(
            menu.key(key(KeyCode::Enter)),
            Some(PageRequest::SetPageSize(PageSize::TwentyFive))
        );
        assert!(!menu.is_open());
        assert!(!listeners.is_listening());
    }
}
