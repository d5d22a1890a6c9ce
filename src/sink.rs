use colored::Colorize;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Which special member function produced a trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Constructor,
    Destructor,
    CopyConstructor,
    CopyAssignment,
    MoveConstructor,
    MoveAssignment,
}

impl Lifecycle {
    pub fn label(&self) -> &'static str {
        match self {
            Lifecycle::Constructor => "Constructor",
            Lifecycle::Destructor => "Destructor",
            Lifecycle::CopyConstructor => "COPY CONSTRUCTOR",
            Lifecycle::CopyAssignment => "COPY ASSIGNMENT",
            Lifecycle::MoveConstructor => "MOVE CONSTRUCTOR",
            Lifecycle::MoveAssignment => "MOVE ASSIGNMENT",
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, Lifecycle::CopyConstructor | Lifecycle::CopyAssignment)
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Lifecycle::MoveConstructor | Lifecycle::MoveAssignment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEvent {
    pub instance: String,
    pub op: Lifecycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TraceEvent {
    pub fn new(instance: impl Into<String>, op: Lifecycle) -> Self {
        TraceEvent {
            instance: instance.into(),
            op,
            source: None,
        }
    }

    pub fn from_source(instance: impl Into<String>, op: Lifecycle, source: impl Into<String>) -> Self {
        TraceEvent {
            instance: instance.into(),
            op,
            source: Some(source.into()),
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.instance, self.op.label())?;
        if let Some(source) = &self.source {
            write!(f, " from {}", source)?;
        }
        Ok(())
    }
}

/// One line of trace output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Line {
    /// Lifecycle event of a traced value.
    Event(TraceEvent),
    /// Scenario header, preceded by a blank line on terminals.
    Banner { text: String },
    /// Harness narration such as "...end of scope".
    Note { text: String },
}

impl Line {
    pub fn banner(text: impl Into<String>) -> Self {
        Line::Banner { text: text.into() }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Line::Note { text: text.into() }
    }

    pub fn as_event(&self) -> Option<&TraceEvent> {
        match self {
            Line::Event(event) => Some(event),
            _ => None,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Event(event) => write!(f, "{}", event),
            Line::Banner { text } | Line::Note { text } => f.write_str(text),
        }
    }
}

/// Destination for trace lines.
///
/// Tracers emit from `Drop`, so sinks are shared behind `Rc` and take `&self`.
pub trait Sink {
    fn record(&self, line: &Line);

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Wraps a writer and stops writing after the first failure.
///
/// Tracers emit from `Drop`, where an error has nowhere to go, so the first
/// failure is logged once and every later line is discarded.
struct LatchedWriter<W: Write> {
    out: RefCell<W>,
    failed: Cell<bool>,
}

impl<W: Write> LatchedWriter<W> {
    fn new(out: W) -> Self {
        LatchedWriter {
            out: RefCell::new(out),
            failed: Cell::new(false),
        }
    }

    fn write_with<F>(&self, write: F)
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        if self.failed.get() {
            return;
        }
        if let Err(err) = write(&mut *self.out.borrow_mut()) {
            self.failed.set(true);
            tracing::warn!(%err, "trace output failed, discarding further lines");
        }
    }

    fn flush(&self) -> io::Result<()> {
        if self.failed.get() {
            return Ok(());
        }
        self.out.borrow_mut().flush()
    }

    fn has_failed(&self) -> bool {
        self.failed.get()
    }

    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

/// Human-readable terminal output.
pub struct StdoutSink<W: Write = io::Stdout> {
    out: LatchedWriter<W>,
    indent: usize,
    color: bool,
}

impl StdoutSink<io::Stdout> {
    pub fn stdout(indent: usize, color: bool) -> Self {
        StdoutSink::new(io::stdout(), indent, color)
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn new(out: W, indent: usize, color: bool) -> Self {
        StdoutSink {
            out: LatchedWriter::new(out),
            indent,
            color,
        }
    }

    pub fn has_failed(&self) -> bool {
        self.out.has_failed()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn paint(&self, event: &TraceEvent) -> String {
        let text = event.to_string();
        if !self.color {
            return text;
        }
        match event.op {
            Lifecycle::Constructor => text.green().to_string(),
            Lifecycle::Destructor => text.red().to_string(),
            Lifecycle::CopyConstructor | Lifecycle::CopyAssignment => text.yellow().to_string(),
            Lifecycle::MoveConstructor | Lifecycle::MoveAssignment => text.cyan().to_string(),
        }
    }
}

impl Default for StdoutSink<io::Stdout> {
    fn default() -> Self {
        StdoutSink::stdout(2, true)
    }
}

impl<W: Write> Sink for StdoutSink<W> {
    fn record(&self, line: &Line) {
        let rendered = match line {
            Line::Event(event) => format!("{}{}\n", " ".repeat(self.indent), self.paint(event)),
            Line::Banner { text } if self.color => format!("\n{}\n", text.bold()),
            Line::Banner { text } => format!("\n{}\n", text),
            Line::Note { text } => format!("{}\n", text),
        };
        self.out.write_with(|out| out.write_all(rendered.as_bytes()));
    }

    fn flush(&self) -> io::Result<()> {
        self.out.flush()
    }
}

/// In-memory sink; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    lines: Rc<RefCell<Vec<Line>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<Line> {
        self.lines.borrow().clone()
    }

    /// Rendered lines without indentation or colour.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.borrow().iter().map(|line| line.to_string()).collect()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|line| line.as_event().cloned())
            .collect()
    }

    pub fn count(&self, op: Lifecycle) -> usize {
        self.lines
            .borrow()
            .iter()
            .filter_map(Line::as_event)
            .filter(|event| event.op == op)
            .count()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Sink for BufferSink {
    fn record(&self, line: &Line) {
        self.lines.borrow_mut().push(line.clone());
    }
}

/// Newline-delimited JSON, one object per line.
pub struct JsonSink<W: Write> {
    out: LatchedWriter<W>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        JsonSink {
            out: LatchedWriter::new(out),
        }
    }

    pub fn has_failed(&self) -> bool {
        self.out.has_failed()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> Sink for JsonSink<W> {
    fn record(&self, line: &Line) {
        self.out.write_with(|out| {
            serde_json::to_writer(&mut *out, line)?;
            out.write_all(b"\n")
        });
    }

    fn flush(&self) -> io::Result<()> {
        self.out.flush()
    }
}
