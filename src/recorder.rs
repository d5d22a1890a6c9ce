use crate::config::TracerConfig;
use crate::sink::{BufferSink, Line, Sink, TraceEvent};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Counts resource cells handed out and given back.
#[derive(Debug, Default)]
pub struct HeapStats {
    allocated: Cell<usize>,
    freed: Cell<usize>,
}

impl HeapStats {
    pub fn allocated(&self) -> usize {
        self.allocated.get()
    }

    pub fn freed(&self) -> usize {
        self.freed.get()
    }

    pub fn live(&self) -> usize {
        self.allocated.get() - self.freed.get()
    }
}

/// Shared handle every traced value carries: where lines go, plus heap accounting.
#[derive(Clone)]
pub struct Recorder {
    sink: Rc<dyn Sink>,
    heap: Rc<HeapStats>,
    sentinel: i32,
    moved_tag: Rc<str>,
}

impl Recorder {
    pub fn new(sink: Rc<dyn Sink>, config: &TracerConfig) -> Self {
        Recorder {
            sink,
            heap: Rc::new(HeapStats::default()),
            sentinel: config.sentinel,
            moved_tag: Rc::from(config.moved_tag.as_str()),
        }
    }

    /// A recorder writing into a fresh [`BufferSink`] with default settings.
    pub fn buffered() -> (Self, BufferSink) {
        let buffer = BufferSink::new();
        let recorder = Recorder::new(Rc::new(buffer.clone()), &TracerConfig::default());
        (recorder, buffer)
    }

    pub fn event(&self, event: TraceEvent) {
        self.sink.record(&Line::Event(event));
    }

    pub fn banner(&self, text: impl Into<String>) {
        self.sink.record(&Line::banner(text));
    }

    pub fn note(&self, text: impl Into<String>) {
        self.sink.record(&Line::note(text));
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.sink.flush()
    }

    pub fn heap(&self) -> &HeapStats {
        &self.heap
    }

    pub fn sentinel(&self) -> i32 {
        self.sentinel
    }

    pub fn moved_tag(&self) -> &str {
        &self.moved_tag
    }

    pub(crate) fn allocate(&self, value: i32) -> ResourceCell {
        self.heap.allocated.set(self.heap.allocated.get() + 1);
        let cell = ResourceCell {
            value: Box::new(value),
            heap: Rc::clone(&self.heap),
        };
        tracing::debug!(addr = ?cell.addr(), value, "allocated resource cell");
        cell
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("heap", &self.heap)
            .field("sentinel", &self.sentinel)
            .finish_non_exhaustive()
    }
}

/// One owned heap integer. Freed exactly once, when the cell is dropped.
pub struct ResourceCell {
    value: Box<i32>,
    heap: Rc<HeapStats>,
}

impl ResourceCell {
    pub fn get(&self) -> i32 {
        *self.value
    }

    pub fn get_mut(&mut self) -> &mut i32 {
        &mut *self.value
    }

    /// Address of the heap allocation, for identity checks.
    pub fn addr(&self) -> *const i32 {
        &*self.value as *const i32
    }
}

impl Drop for ResourceCell {
    fn drop(&mut self) {
        self.heap.freed.set(self.heap.freed.get() + 1);
        tracing::debug!(addr = ?self.addr(), "freed resource cell");
    }
}

impl fmt::Debug for ResourceCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceCell").field(&self.value).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_are_counted() {
        let (recorder, _buffer) = Recorder::buffered();
        let a = recorder.allocate(1);
        let b = recorder.allocate(2);
        assert_eq!(recorder.heap().allocated(), 2);
        assert_eq!(recorder.heap().live(), 2);

        drop(a);
        assert_eq!(recorder.heap().freed(), 1);
        assert_eq!(b.get(), 2);
        drop(b);
        assert_eq!(recorder.heap().live(), 0);
    }

    #[test]
    fn test_recorder_forwards_lines() {
        let (recorder, buffer) = Recorder::buffered();
        recorder.banner("🚀 Exercise 1.1");
        recorder.note("...end of scope");
        assert_eq!(buffer.snapshot(), vec!["🚀 Exercise 1.1", "...end of scope"]);
    }

    #[test]
    fn test_config_values_are_carried() {
        let config = TracerConfig {
            sentinel: 9,
            moved_tag: " <moved>".to_string(),
            ..TracerConfig::default()
        };
        let recorder = Recorder::new(Rc::new(BufferSink::new()), &config);
        assert_eq!(recorder.sentinel(), 9);
        assert_eq!(recorder.moved_tag(), " <moved>");
    }
}
