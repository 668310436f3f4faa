//! StageSink: where the engine sends its events

use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::StageEvent;

/// Receiver for the engine's event stream
///
/// Emission is synchronous and in order. A sink must not block on
/// presentation; it queues and returns.
pub trait StageSink {
    fn emit(&mut self, event: StageEvent);
}

/// Boxed sink for dynamic dispatch
pub type BoxedStageSink = Box<dyn StageSink + Send>;

impl<S: StageSink + ?Sized> StageSink for Box<S> {
    fn emit(&mut self, event: StageEvent) {
        (**self).emit(event);
    }
}

impl<S: StageSink + ?Sized> StageSink for &mut S {
    fn emit(&mut self, event: StageEvent) {
        (**self).emit(event);
    }
}

/// Shared sink: the engine owns one handle, the caller keeps another
impl<S: StageSink + ?Sized> StageSink for Arc<Mutex<S>> {
    fn emit(&mut self, event: StageEvent) {
        self.lock().emit(event);
    }
}

impl StageSink for Vec<StageEvent> {
    fn emit(&mut self, event: StageEvent) {
        self.push(event);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StageSink for NullSink {
    fn emit(&mut self, _event: StageEvent) {}
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(StageEvent)> StageSink for FnSink<F> {
    fn emit(&mut self, event: StageEvent) {
        (self.0)(event);
    }
}

/// Collects events for later inspection
#[derive(Debug, Clone, Default)]
pub struct StageCollector {
    events: Vec<StageEvent>,
}

impl StageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }

    /// Take all collected events, leaving the collector empty
    pub fn drain(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events whose stage has the given type name
    pub fn of_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .collect()
    }

    pub fn count(&self, type_name: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl StageSink for StageCollector {
    fn emit(&mut self, event: StageEvent) {
        log::trace!("stage {} #{}", event.type_name(), event.sequence);
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;

    #[test]
    fn test_collector_filters_by_type() {
        let mut collector = StageCollector::new();
        collector.emit(StageEvent::new(Stage::BetChanged { bet: 1.0 }, 0));
        collector.emit(StageEvent::new(Stage::BetChanged { bet: 2.0 }, 1));
        collector.emit(StageEvent::new(
            Stage::SpinStart {
                bet: 2.0,
                free_spin: false,
            },
            0,
        ));

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.count("BET_CHANGED"), 2);
        assert_eq!(collector.of_type("SPIN_START").len(), 1);

        let drained = collector.drain();
        assert_eq!(drained.len(), 3);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_fn_sink_and_boxed_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = FnSink(|e: StageEvent| seen.push(e.sequence));
            sink.emit(StageEvent::new(Stage::BetChanged { bet: 1.0 }, 7));
        }
        assert_eq!(seen, vec![7]);

        let mut boxed: BoxedStageSink = Box::new(NullSink);
        boxed.emit(StageEvent::new(Stage::BetChanged { bet: 1.0 }, 0));
    }

    #[test]
    fn test_shared_collector() {
        let shared = Arc::new(Mutex::new(StageCollector::new()));
        let mut handle: BoxedStageSink = Box::new(shared.clone());
        handle.emit(StageEvent::new(Stage::BetChanged { bet: 3.0 }, 0));
        assert_eq!(shared.lock().count("BET_CHANGED"), 1);
    }
}
