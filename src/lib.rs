//! Copy and move semantics, made observable.
//!
//! A [`Tracer`] owns one heap cell and reports every special member function
//! that touches it. Scenarios script the classic rule-of-five exercises and
//! write their trace through a [`Sink`].

pub mod config;
pub mod container;
pub mod error;
pub mod frame;
pub mod recorder;
pub mod scenario;
pub mod sink;
pub mod strings;
pub mod tracer;

pub use config::{ElisionMode, OutputFormat, TracerConfig};
pub use container::TraceVec;
pub use error::{Error, Result};
pub use frame::{Frame, Slot};
pub use recorder::{HeapStats, Recorder};
pub use scenario::{Runner, Scenario};
pub use sink::{BufferSink, JsonSink, Lifecycle, Line, Sink, StdoutSink, TraceEvent};
pub use tracer::{Relocate, State, Tracer};
