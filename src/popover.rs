use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use ratatui::layout::{Position, Rect};
use tracing::trace;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: BTreeSet<u64>,
}

/// Listeners for clicks outside of open popovers. Every open popover holds one
/// `ListenerGuard`, the controller only routes mouse clicks while any is held.
#[derive(Debug, Clone, Default)]
pub struct ClickAwayListeners {
    inner: Rc<RefCell<Registry>>,
}

impl ClickAwayListeners {
    pub fn register(&self) -> ListenerGuard {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.active.insert(id);
        trace!("Registered click-away listener {id}");
        ListenerGuard {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    pub fn active(&self) -> usize {
        self.inner.borrow().active.len()
    }

    pub fn is_listening(&self) -> bool {
        self.active() > 0
    }
}

#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().active.remove(&self.id);
            trace!("Released click-away listener {}", self.id);
        }
    }
}

/// Open/closed state of a dropdown. The area is recorded by the drawing code so an
/// outside click can be detected.
#[derive(Debug, Default)]
pub struct Popover {
    guard: Option<ListenerGuard>,
    area: Cell<Rect>,
}

impl Popover {
    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    pub fn open(&mut self, listeners: &ClickAwayListeners) {
        if self.guard.is_none() {
            self.guard = Some(listeners.register());
        }
    }

    pub fn close(&mut self) {
        self.guard = None;
        self.area.set(Rect::default());
    }

    pub fn toggle(&mut self, listeners: &ClickAwayListeners) {
        if self.is_open() {
            self.close();
        } else {
            self.open(listeners);
        }
    }

    pub fn set_area(&self, area: Rect) {
        self.area.set(area);
    }

    pub fn area(&self) -> Rect {
        self.area.get()
    }

    /// Closes the popover if it is open and `(column, row)` lies outside of it.
    pub fn click_outside(&mut self, column: u16, row: u16) -> bool {
        if self.is_open() && !self.area.get().contains(Position::new(column, row)) {
            self.close();
            true
        } else {
            false
        }
    }
}
