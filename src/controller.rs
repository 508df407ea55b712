use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, UViewConfig, UViewError};
use crate::model::Model;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind,
};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &UViewConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// Waits for one terminal event. Without one the model still gets a `Tick`
    /// so deferred work can finish.
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, UViewError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(Some(Message::Tick));
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key(key, model.raw_keyevents())
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                Some(Message::Click(mouse.column, mouse.row))
            }
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => Some(Message::Tick),
        };
        Ok(message)
    }

    fn handle_key(&self, key: KeyEvent, raw: bool) -> Option<Message> {
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc | KeyCode::Backspace => Some(Message::Exit),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::PreviousPage),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::NextPage),
            KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::Char('f') => Some(Message::OpenGroupFilter),
            KeyCode::Char(c @ '1'..='9') => c
                .to_digit(10)
                .map(|n| Message::ToggleColumnFilter(n as usize)),
            KeyCode::Char('s') => Some(Message::TogglePageSizeMenu),
            KeyCode::Char('a') => Some(Message::OpenRowActions),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Char('b') => Some(Message::ToggleSidebar),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputter::tests::key;

    #[test]
    fn keys_map_to_messages() {
        let controller = Controller::new(&UViewConfig::default());
        let map = |code| controller.handle_key(key(code), false);
        assert_eq!(map(KeyCode::Char('q')), Some(Message::Quit));
        assert_eq!(map(KeyCode::Char('l')), Some(Message::NextPage));
        assert_eq!(map(KeyCode::Char('G')), Some(Message::LastPage));
        assert_eq!(map(KeyCode::Char('3')), Some(Message::ToggleColumnFilter(3)));
        assert_eq!(map(KeyCode::Backspace), Some(Message::Exit));
        assert_eq!(map(KeyCode::Char('z')), None);
    }

    #[test]
    fn open_popovers_receive_raw_keys() {
        let controller = Controller::new(&UViewConfig::default());
        let q = key(KeyCode::Char('q'));
        assert_eq!(controller.handle_key(q, true), Some(Message::RawKey(q)));
    }
}
