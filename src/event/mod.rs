mod bus;
mod events;
mod handlers;

pub use bus::EventBus;
pub use events::{AssetKind, SessionEvent};
pub use handlers::EventLog;

pub trait EventHandler {
    fn handle_event(&mut self, event: &SessionEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&SessionEvent),
{
    fn handle_event(&mut self, event: &SessionEvent) {
        self(event)
    }
}
