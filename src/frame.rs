use crate::recorder::Recorder;
use crate::tracer::Tracer;
use std::ops::Index;

/// Handle to a tracer declared in a [`Frame`]. Only meaningful for the frame
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot(usize);

/// A block scope of named locals.
///
/// Locals are addressed by slot, so `a = a` can be written down and is
/// guarded. Dropping the frame destroys locals last-declared first.
pub struct Frame {
    recorder: Recorder,
    locals: Vec<Tracer>,
}

impl Frame {
    pub fn new(recorder: &Recorder) -> Self {
        Frame {
            recorder: recorder.clone(),
            locals: Vec::new(),
        }
    }

    /// `Tracer name("name");`
    pub fn declare(&mut self, name: &str) -> Slot {
        let tracer = Tracer::new(name, &self.recorder);
        self.adopt(tracer)
    }

    /// Binds an already constructed value, e.g. a factory result.
    pub fn adopt(&mut self, tracer: Tracer) -> Slot {
        self.locals.push(tracer);
        Slot(self.locals.len() - 1)
    }

    /// `Tracer b = a;`
    ///
    /// # Panics
    ///
    /// Panics if `src` was issued by a different frame.
    pub fn copy_construct(&mut self, src: Slot) -> Slot {
        let copy = self.locals[src.0].clone();
        self.adopt(copy)
    }

    /// `Tracer b = std::move(a);`
    ///
    /// # Panics
    ///
    /// Panics if `src` was issued by a different frame.
    pub fn move_construct(&mut self, src: Slot) -> Slot {
        let moved = self.locals[src.0].take();
        self.adopt(moved)
    }

    /// `dst = src;` Returns `false` for self-assignment, which does nothing.
    ///
    /// # Panics
    ///
    /// Panics if `dst` or `src` was issued by a different frame.
    pub fn copy_assign(&mut self, dst: Slot, src: Slot) -> bool {
        match self.pair_mut(dst, src) {
            Some((target, source)) => {
                target.copy_assign(source);
                true
            }
            None => false,
        }
    }

    /// `dst = std::move(src);` Returns `false` for self-assignment, which does nothing.
    ///
    /// # Panics
    ///
    /// Panics if `dst` or `src` was issued by a different frame.
    pub fn move_assign(&mut self, dst: Slot, src: Slot) -> bool {
        match self.pair_mut(dst, src) {
            Some((target, source)) => {
                target.move_assign(source);
                true
            }
            None => false,
        }
    }

    /// # Panics
    ///
    /// Panics if `slot` was issued by a different frame.
    pub fn get(&self, slot: Slot) -> &Tracer {
        &self.locals[slot.0]
    }

    /// # Panics
    ///
    /// Panics if `slot` was issued by a different frame.
    pub fn get_mut(&mut self, slot: Slot) -> &mut Tracer {
        &mut self.locals[slot.0]
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    fn pair_mut(&mut self, dst: Slot, src: Slot) -> Option<(&mut Tracer, &mut Tracer)> {
        if dst == src {
            tracing::debug!(slot = dst.0, "self-assignment skipped");
            return None;
        }
        if dst.0 < src.0 {
            let (head, tail) = self.locals.split_at_mut(src.0);
            Some((&mut head[dst.0], &mut tail[0]))
        } else {
            let (head, tail) = self.locals.split_at_mut(dst.0);
            Some((&mut tail[0], &mut head[src.0]))
        }
    }
}

impl Index<Slot> for Frame {
    type Output = Tracer;

    fn index(&self, slot: Slot) -> &Tracer {
        self.get(slot)
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        while let Some(local) = self.locals.pop() {
            drop(local);
        }
    }
}
