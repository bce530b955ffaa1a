use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{EventHandler, SessionEvent};

/// Records every event it sees. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: SessionEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Number of preview exports seen so far
    pub fn preview_count(&self) -> usize {
        self.events.borrow().iter().filter(|event| event.is_preview()).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &SessionEvent) {
        self.push(event.clone());
    }
}
