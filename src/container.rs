use crate::tracer::Relocate;
use std::slice;

/// A growable sequence that relocates like `std::vector`.
///
/// When the buffer is full, inserting constructs the new element first, then
/// relocates every existing element into the new buffer (by move when
/// `T::NOTHROW_MOVE`, by copy otherwise), then destroys the old elements in
/// order.
#[derive(Debug)]
pub struct TraceVec<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> TraceVec<T> {
    pub fn new() -> Self {
        TraceVec {
            items: Vec::new(),
            capacity: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Erases the element at `index`, destroying it. Capacity is kept.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        drop(self.items.remove(index));
        true
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Destroys all elements front to back. Capacity is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Relocate + Clone> TraceVec<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut vec = TraceVec::new();
        vec.reserve(capacity);
        vec
    }

    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity {
            self.reallocate(capacity, None);
        }
    }

    /// `push_back(const T&)`: the element is copy-constructed into the buffer.
    pub fn push_copy(&mut self, value: &T) {
        let copy = value.clone();
        self.place(copy);
    }

    /// `push_back(T&&)`: the element is move-constructed into the buffer and
    /// the temporary is destroyed once the insertion is complete.
    pub fn push(&mut self, mut temporary: T) {
        let moved = temporary.relocate();
        self.place(moved);
        drop(temporary);
    }

    /// `emplace_back`: the element is constructed directly in the buffer.
    pub fn emplace<F: FnOnce() -> T>(&mut self, make: F) {
        self.place(make());
    }

    fn place(&mut self, value: T) {
        if self.items.len() < self.capacity {
            self.items.push(value);
        } else {
            let grown = (self.capacity * 2).max(1);
            self.reallocate(grown, Some(value));
        }
    }

    fn reallocate(&mut self, capacity: usize, pending: Option<T>) {
        tracing::debug!(
            from = self.capacity,
            to = capacity,
            relocate_by_move = T::NOTHROW_MOVE,
            "reallocating buffer"
        );
        let mut old = std::mem::take(&mut self.items);
        let mut fresh = Vec::with_capacity(capacity);
        for item in old.iter_mut() {
            let relocated = if T::NOTHROW_MOVE {
                item.relocate()
            } else {
                item.clone()
            };
            fresh.push(relocated);
        }
        fresh.extend(pending);
        self.items = fresh;
        self.capacity = capacity;
        drop(old);
    }
}

impl<T> Default for TraceVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a TraceVec<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Recorder;
    use crate::sink::Lifecycle;
    use crate::tracer::Tracer;

    /// A tracer whose move is not declared non-failing.
    #[derive(Clone)]
    struct Fragile(Tracer);

    impl Relocate for Fragile {
        const NOTHROW_MOVE: bool = false;

        fn relocate(&mut self) -> Self {
            Fragile(self.0.take())
        }
    }

    #[test]
    fn test_reallocation_moves_existing_elements() {
        let (recorder, buffer) = Recorder::buffered();
        let mut vec = TraceVec::with_capacity(4);
        for i in 0..4 {
            vec.emplace(|| Tracer::new(format!("v{i}"), &recorder));
        }
        buffer.clear();

        vec.emplace(|| Tracer::new("v4", &recorder));

        assert_eq!(vec.len(), 5);
        assert_eq!(vec.capacity(), 8);
        assert_eq!(buffer.count(Lifecycle::MoveConstructor), 4);
        assert_eq!(buffer.count(Lifecycle::CopyConstructor), 0);
        assert_eq!(buffer.count(Lifecycle::Destructor), 4);
        assert_eq!(
            buffer.snapshot(),
            vec![
                "v4: Constructor",
                "v0: MOVE CONSTRUCTOR from v0",
                "v1: MOVE CONSTRUCTOR from v1",
                "v2: MOVE CONSTRUCTOR from v2",
                "v3: MOVE CONSTRUCTOR from v3",
                "v0 [moved]: Destructor",
                "v1 [moved]: Destructor",
                "v2 [moved]: Destructor",
                "v3 [moved]: Destructor",
            ]
        );
        let names: Vec<&str> = vec.iter().map(Tracer::name).collect();
        assert_eq!(names, vec!["v0", "v1", "v2", "v3", "v4"]);
        assert_eq!(recorder.heap().live(), 5);
    }

    #[test]
    fn test_fallible_move_relocates_by_copy() {
        let (recorder, buffer) = Recorder::buffered();
        let mut vec = TraceVec::with_capacity(2);
        vec.emplace(|| Fragile(Tracer::new("a", &recorder)));
        vec.emplace(|| Fragile(Tracer::new("b", &recorder)));
        buffer.clear();

        vec.emplace(|| Fragile(Tracer::new("c", &recorder)));

        assert_eq!(buffer.count(Lifecycle::CopyConstructor), 2);
        assert_eq!(buffer.count(Lifecycle::MoveConstructor), 0);
        assert_eq!(
            buffer.snapshot()[3..].to_vec(),
            vec!["a: Destructor", "b: Destructor"]
        );
        assert_eq!(recorder.heap().live(), 3);
    }

    #[test]
    fn test_push_copy_and_push_temporary() {
        let (recorder, buffer) = Recorder::buffered();
        let t1 = Tracer::new("t1", &recorder);
        let mut vec = TraceVec::new();

        vec.push_copy(&t1);
        vec.push(Tracer::new("temp", &recorder));

        assert_eq!(
            buffer.snapshot(),
            vec![
                "t1: Constructor",
                "t1: COPY CONSTRUCTOR from t1",
                "temp: Constructor",
                "temp: MOVE CONSTRUCTOR from temp",
                "t1: MOVE CONSTRUCTOR from t1",
                "t1 [moved]: Destructor",
                "temp [moved]: Destructor",
            ]
        );
        assert_eq!(vec.capacity(), 2);
    }

    #[test]
    fn test_remove_destroys_only_that_element() {
        let (recorder, buffer) = Recorder::buffered();
        let mut vec = TraceVec::with_capacity(3);
        for name in ["a", "b", "c"] {
            vec.emplace(|| Tracer::new(name, &recorder));
        }
        buffer.clear();

        assert!(vec.remove(1));
        assert!(!vec.remove(5));
        assert_eq!(buffer.snapshot(), vec!["b: Destructor"]);
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.capacity(), 3);
    }

    #[test]
    fn test_drop_destroys_front_to_back() {
        let (recorder, buffer) = Recorder::buffered();
        {
            let mut vec = TraceVec::with_capacity(2);
            vec.emplace(|| Tracer::new("x", &recorder));
            vec.emplace(|| Tracer::new("y", &recorder));
            buffer.clear();
        }
        assert_eq!(buffer.snapshot(), vec!["x: Destructor", "y: Destructor"]);
        assert_eq!(recorder.heap().live(), 0);
    }

    #[test]
    fn test_reserve_never_shrinks() {
        let mut vec: TraceVec<Fragile> = TraceVec::with_capacity(4);
        vec.reserve(2);
        assert_eq!(vec.capacity(), 4);
        assert!(vec.is_empty());
    }
}
