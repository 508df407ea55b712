use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line editor for filter values. The cursor counts characters, not bytes.
#[derive(Default, Debug)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputResult {
    Edited(String),
    Finished,
    Reset,
    Canceled,
    Ignored,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        let result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputResult::Finished,
            (KeyCode::Esc, _) => InputResult::Canceled,
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => InputResult::Reset,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear();
                InputResult::Edited(String::new())
            }
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => {
                self.curser_pos = 0;
                InputResult::Ignored
            }
            (KeyCode::End, _) => {
                self.curser_pos = self.len();
                InputResult::Ignored
            }
            (KeyCode::Char(chr), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert(chr),
            _ => InputResult::Ignored,
        };
        trace!("Input {:?} => {:?}", key.code, result);
        result
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = self.len();
    }

    #[cfg(test)]
    pub fn value(&self) -> &str {
        &self.current_input
    }

    pub fn curser_pos(&self) -> usize {
        self.curser_pos
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn edited(&self) -> InputResult {
        InputResult::Edited(self.current_input.clone())
    }

    fn insert(&mut self, chr: char) -> InputResult {
        let pos = self.bytepos(self.curser_pos);
        self.current_input.insert(pos, chr);
        self.curser_pos += 1;
        self.edited()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos == 0 {
            return InputResult::Ignored;
        }
        self.curser_pos -= 1;
        let pos = self.bytepos(self.curser_pos);
        self.current_input.remove(pos);
        self.edited()
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos >= self.len() {
            return InputResult::Ignored;
        }
        let pos = self.bytepos(self.curser_pos);
        self.current_input.remove(pos);
        self.edited()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        InputResult::Ignored
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.len() {
            self.curser_pos += 1;
        }
        InputResult::Ignored
    }

    fn bytepos(&self, char_pos: usize) -> usize {
        self.current_input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
