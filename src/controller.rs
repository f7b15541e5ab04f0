use std::time::Duration;
use tracing::trace;

use crate::domain::{HrConfig, HrError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &HrConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, HrError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key, model.raw_keyevents()));
        }
        Ok(None)
    }

    /// While text is being edited every key is forwarded as is.
    pub fn handle_key(&self, key: KeyEvent, raw: bool) -> Option<Message> {
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Left, _) => Some(Message::MoveLeft),
            (KeyCode::Right, _) => Some(Message::MoveRight),
            (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => Some(Message::NextPage),
            (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => Some(Message::PrevPage),
            (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(Message::FirstPage),
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(Message::LastPage),
            (KeyCode::Char('s'), _) => Some(Message::ToggleSort),
            (KeyCode::Char('S'), _) => Some(Message::ToggleSortMulti),
            (KeyCode::Char('x'), _) => Some(Message::ClearSort),
            (KeyCode::Char('h'), _) => Some(Message::HideColumn),
            (KeyCode::Char('v'), _) => Some(Message::ShowAllColumns),
            (KeyCode::Char('/'), _) => Some(Message::EditFilter),
            (KeyCode::Char('c'), _) => Some(Message::ClearFilter),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller {
        Controller::new(&HrConfig::default())
    }

    #[test]
    fn maps_bindings() {
        let c = controller();
        assert_eq!(c.handle_key(KeyCode::Char('q').into(), false), Some(Message::Quit));
        assert_eq!(c.handle_key(KeyCode::PageDown.into(), false), Some(Message::NextPage));
        assert_eq!(
            c.handle_key(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT), false),
            Some(Message::ToggleSortMulti)
        );
        assert_eq!(
            c.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
            Some(Message::Quit)
        );
        assert_eq!(c.handle_key(KeyCode::Char('z').into(), false), None);
    }

    #[test]
    fn editing_forwards_raw_keys() {
        let key: KeyEvent = KeyCode::Char('q').into();
        assert_eq!(controller().handle_key(key, true), Some(Message::RawKey(key)));
    }
}
