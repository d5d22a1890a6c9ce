//! The instrumented resource-owning value.
//!
//! Rust moves are bitwise and silent, so the C++ special member functions map
//! onto explicit operations:
//!
//! | C++                          | here                       |
//! |------------------------------|----------------------------|
//! | `Tracer t("x")`              | [`Tracer::new`]            |
//! | `~Tracer()`                  | `Drop`                     |
//! | `Tracer b = a`               | `Clone::clone`             |
//! | `b = a`                      | [`Tracer::copy_assign`]    |
//! | `Tracer b = std::move(a)`    | [`Tracer::take`]           |
//! | `b = std::move(a)`           | [`Tracer::move_assign`]    |
//!
//! A moved-from tracer stays alive: it keeps a tagged name and no resource,
//! and still reports its destructor.

use crate::config::ElisionMode;
use crate::recorder::{Recorder, ResourceCell};
use crate::sink::{Lifecycle, TraceEvent};
use std::fmt;

/// Types a growable container may relocate by moving.
///
/// `NOTHROW_MOVE` plays the part of `noexcept` on a move constructor: a
/// container only relocates through [`Relocate::relocate`] when it is `true`,
/// and falls back to `Clone` otherwise.
pub trait Relocate: Sized {
    const NOTHROW_MOVE: bool;

    /// Move-constructs a new value out of `self`, leaving `self` moved-from.
    fn relocate(&mut self) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Constructed,
    MovedFrom,
}

#[derive(Debug)]
pub struct Tracer {
    name: String,
    resource: Option<ResourceCell>,
    recorder: Recorder,
}

impl Tracer {
    pub fn new(name: impl Into<String>, recorder: &Recorder) -> Self {
        let name = name.into();
        let resource = Some(recorder.allocate(recorder.sentinel()));
        recorder.event(TraceEvent::new(&name, Lifecycle::Constructor));
        Tracer {
            name,
            resource,
            recorder: recorder.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name is only a label; changing it has no lifecycle effect.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn resource(&self) -> Option<i32> {
        self.resource.as_ref().map(ResourceCell::get)
    }

    pub fn resource_mut(&mut self) -> Option<&mut i32> {
        self.resource.as_mut().map(ResourceCell::get_mut)
    }

    pub fn resource_addr(&self) -> Option<*const i32> {
        self.resource.as_ref().map(ResourceCell::addr)
    }

    pub fn state(&self) -> State {
        if self.resource.is_some() {
            State::Constructed
        } else {
            State::MovedFrom
        }
    }

    pub fn is_moved_from(&self) -> bool {
        self.state() == State::MovedFrom
    }

    /// Copy assignment. The new cell is allocated before the old one is freed.
    pub fn copy_assign(&mut self, other: &Tracer) {
        self.recorder.event(TraceEvent::from_source(
            &self.name,
            Lifecycle::CopyAssignment,
            &other.name,
        ));
        let fresh = other.duplicate_resource(&self.recorder);
        self.resource = fresh;
        self.name.clone_from(&other.name);
    }

    /// Move construction: steals the resource and leaves `self` moved-from.
    pub fn take(&mut self) -> Tracer {
        let original = self.name.clone();
        let resource = self.resource.take();
        self.mark_moved(&original);
        self.recorder.event(TraceEvent::from_source(
            &original,
            Lifecycle::MoveConstructor,
            &original,
        ));
        Tracer {
            name: original,
            resource,
            recorder: self.recorder.clone(),
        }
    }

    /// Move assignment. Our old resource is freed, `other` becomes moved-from.
    pub fn move_assign(&mut self, other: &mut Tracer) {
        let original = other.name.clone();
        self.recorder.event(TraceEvent::from_source(
            &self.name,
            Lifecycle::MoveAssignment,
            &original,
        ));
        self.resource = other.resource.take();
        other.mark_moved(&original);
        self.name = original;
    }

    fn mark_moved(&mut self, original: &str) {
        self.name = format!("{}{}", original, self.recorder.moved_tag());
    }

    // Copying a moved-from tracer copies its absence.
    fn duplicate_resource(&self, recorder: &Recorder) -> Option<ResourceCell> {
        self.resource
            .as_ref()
            .map(|cell| recorder.allocate(cell.get()))
    }
}

impl Clone for Tracer {
    fn clone(&self) -> Self {
        let resource = self.duplicate_resource(&self.recorder);
        self.recorder.event(TraceEvent::from_source(
            &self.name,
            Lifecycle::CopyConstructor,
            &self.name,
        ));
        Tracer {
            name: self.name.clone(),
            resource,
            recorder: self.recorder.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.copy_assign(source);
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        self.recorder
            .event(TraceEvent::new(&self.name, Lifecycle::Destructor));
    }
}

impl Relocate for Tracer {
    const NOTHROW_MOVE: bool = true;

    fn relocate(&mut self) -> Self {
        self.take()
    }
}

impl fmt::Display for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl ElisionMode {
    /// Hands a value back from a factory the way the chosen elision rules would.
    ///
    /// With elision disabled the value is relocated once into the caller's
    /// slot and the local it came from is destroyed.
    pub fn return_value<T: Relocate>(self, mut value: T) -> T {
        match self {
            ElisionMode::Guaranteed => value,
            ElisionMode::Disabled => value.relocate(),
        }
    }
}
