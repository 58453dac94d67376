//! Event collectors used by the public API and by AI-mode stabilization.

use match3_core::{Event, EventCollector};

/// Appends every event it is given to an in-memory buffer.
///
/// Used by the per-tick public API, whose caller wants to know what happened.
#[derive(Clone, Debug, Default)]
pub struct BufferedCollector {
    events: Vec<Event>,
}

impl BufferedCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events collected so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and returns all collected events, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl EventCollector for BufferedCollector {
    fn collect(&mut self, event: Event) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_core::EventKind;

    #[test]
    fn buffered_collector_retains_events_in_order() {
        let mut collector = BufferedCollector::new();
        collector.collect(Event::new(0, 0.0, EventKind::ObjectiveCompleted));
        collector.collect(Event::new(1, 0.1, EventKind::ObjectiveCompleted));
        assert_eq!(collector.events().len(), 2);
        let drained = collector.drain();
        assert_eq!(drained.len(), 2);
        assert!(collector.events().is_empty());
    }
}
