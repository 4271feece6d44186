use callscope_core::{CallGraph, FunctionRef};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};

pub mod state;

pub use state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipInfo {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // ========================================================================
    // Data Events
    // ========================================================================
    /// A call graph was loaded; `source` names where it came from.
    CallGraphLoaded {
        source: String,
        graph: CallGraph,
    },
    /// The analyzer (or loading) failed. The current graph stays.
    UpstreamFailed {
        message: String,
    },

    // ========================================================================
    // Selection Events
    // ========================================================================
    FileSelected {
        path: String,
    },
    FunctionSelected {
        function: FunctionRef,
    },
    /// A node in the graph view was clicked (or the inspection closed).
    NodeInspected {
        function: Option<String>,
    },

    // ========================================================================
    // Sidebar Events
    // ========================================================================
    SearchChanged {
        query: String,
    },
    FolderToggled {
        path: String,
        expanded: bool,
    },

    // ========================================================================
    // Layout / Notice Events
    // ========================================================================
    LinkDistanceChanged {
        distance: f32,
    },
    NoticeDismissed,
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Event bus has no receiver; event dropped");
        }
    }

    /// Dispatch all pending events to a listener, in publish order.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<Event>);

    impl EventListener for Recorder {
        fn handle_event(&mut self, event: &Event) {
            self.0.push(event.clone());
        }
    }

    #[test]
    fn test_event_bus_publish_receive() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        sender
            .send(Event::FunctionSelected {
                function: FunctionRef::new("a.py", "foo"),
            })
            .unwrap();

        match receiver.recv().unwrap() {
            Event::FunctionSelected { function } => {
                assert_eq!(function.to_string(), "a.py:foo");
            }
            other => panic!("Expected FunctionSelected, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_preserves_order_and_drains() {
        let bus = EventBus::new();
        bus.publish(Event::SearchChanged {
            query: "sa".to_string(),
        });
        bus.publish(Event::SearchChanged {
            query: "save".to_string(),
        });
        bus.publish(Event::NoticeDismissed);

        let mut recorder = Recorder(Vec::new());
        bus.dispatch_to(&mut recorder);
        assert_eq!(recorder.0.len(), 3);
        assert_eq!(
            recorder.0[1],
            Event::SearchChanged {
                query: "save".to_string()
            }
        );
        assert_eq!(recorder.0[2], Event::NoticeDismissed);

        bus.dispatch_to(&mut recorder);
        assert_eq!(recorder.0.len(), 3);
    }

    #[test]
    fn test_events_serialize() {
        let event = Event::FolderToggled {
            path: "src/app".to_string(),
            expanded: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
