use crate::sinks::ExecutionMetricsSink;
use std::time::Instant;

/// An RAII timer that reports an item's latency to the execution sink when dropped.
pub struct ItemLatencyTimer<'a> {
    sink: &'a dyn ExecutionMetricsSink,
    start: Instant,
}

impl<'a> ItemLatencyTimer<'a> {
    /// Starts timing against `sink`.
    pub fn new(sink: &'a dyn ExecutionMetricsSink) -> Self {
        Self { sink, start: Instant::now() }
    }
}

impl Drop for ItemLatencyTimer<'_> {
    fn drop(&mut self) {
        self.sink.observe_item_latency(self.start.elapsed().as_secs_f64());
    }
}
