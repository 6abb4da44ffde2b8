use crate::{input::events::ViewerEvent, prelude::HashMap};
use std::collections::VecDeque;

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&ViewerEvent) + Send + Sync>;

/// Queue of viewer events waiting for the host
///
/// Events are buffered as they are produced and handed over in order by
/// [`drain`](Self::drain). Listeners registered with [`on`](Self::on) see
/// each event as it is drained.
#[derive(Default)]
pub struct EventQueue {
    /// Event listeners by event name
    listeners: HashMap<&'static str, Vec<EventCallback>>,
    queue: VecDeque<ViewerEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events named `event_name` (see
    /// [`ViewerEvent::name`])
    pub fn on<F>(&mut self, event_name: &'static str, callback: F)
    where
        F: Fn(&ViewerEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_name)
            .or_default()
            .push(Box::new(callback));
    }

    pub fn emit(&mut self, event: ViewerEvent) {
        log::debug!("viewer event: {}", event.name());
        self.queue.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = ViewerEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Hands over all queued events, oldest first
    pub fn drain(&mut self) -> Vec<ViewerEvent> {
        let events: Vec<_> = self.queue.drain(..).collect();
        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.name()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }
        events
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
