//! Shallow versus deep copies of a heap string buffer.

use crate::recorder::Recorder;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Copies share one buffer, as a member-wise pointer copy would.
///
/// Writes through any copy are visible through all of them. The buffer is
/// released once, when the last copy goes away.
pub struct NaiveString {
    data: Rc<RefCell<Vec<u8>>>,
    recorder: Recorder,
}

impl NaiveString {
    pub fn new(initial: &str, recorder: &Recorder) -> Self {
        recorder.note(format!("Constructor called for '{}'", initial));
        NaiveString {
            data: Rc::new(RefCell::new(initial.as_bytes().to_vec())),
            recorder: recorder.clone(),
        }
    }

    /// Overwrites one byte. Out-of-range indexes are ignored.
    pub fn set_byte(&mut self, index: usize, byte: u8) {
        if let Some(slot) = self.data.borrow_mut().get_mut(index) {
            *slot = byte;
        }
    }

    /// Number of values sharing this buffer.
    pub fn owners(&self) -> usize {
        Rc::strong_count(&self.data)
    }

    pub fn shares_buffer_with(&self, other: &NaiveString) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Clone for NaiveString {
    fn clone(&self) -> Self {
        self.recorder.note("Shallow copy constructor called.");
        NaiveString {
            data: Rc::clone(&self.data),
            recorder: self.recorder.clone(),
        }
    }
}

impl fmt::Display for NaiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.data.borrow()))
    }
}

impl Drop for NaiveString {
    fn drop(&mut self) {
        self.recorder.note(format!("Destructor called for '{}'", self));
        if Rc::strong_count(&self.data) == 1 {
            tracing::debug!("naive string buffer released");
        }
    }
}

/// Every copy owns its own buffer.
pub struct BetterString {
    data: Vec<u8>,
    recorder: Recorder,
}

impl BetterString {
    pub fn new(initial: &str, recorder: &Recorder) -> Self {
        recorder.note(format!("Constructor called for '{}'", initial));
        BetterString {
            data: initial.as_bytes().to_vec(),
            recorder: recorder.clone(),
        }
    }

    pub fn set_byte(&mut self, index: usize, byte: u8) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = byte;
        }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }
}

impl Clone for BetterString {
    fn clone(&self) -> Self {
        self.recorder.note("Deep copy constructor called.");
        BetterString {
            data: self.data.clone(),
            recorder: self.recorder.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.recorder.note("Deep copy assignment called.");
        self.data.clone_from(&source.data);
    }
}

impl fmt::Display for BetterString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.data))
    }
}

impl Drop for BetterString {
    fn drop(&mut self) {
        self.recorder.note(format!("Destructor called for '{}'", self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_copy_aliases_buffer() {
        let (recorder, buffer) = Recorder::buffered();
        let str1 = NaiveString::new("Hello", &recorder);
        let mut str2 = str1.clone();

        str2.set_byte(0, b'J');

        assert!(str1.shares_buffer_with(&str2));
        assert_eq!(str1.to_string(), "Jello");
        assert_eq!(str1.owners(), 2);
        drop(str2);
        assert_eq!(str1.owners(), 1);
        assert_eq!(
            buffer.snapshot(),
            vec![
                "Constructor called for 'Hello'",
                "Shallow copy constructor called.",
                "Destructor called for 'Jello'",
            ]
        );
    }

    #[test]
    fn test_better_copy_is_independent() {
        let (recorder, _buffer) = Recorder::buffered();
        let str1 = BetterString::new("Hello", &recorder);
        let mut str2 = str1.clone();

        str2.set_byte(0, b'J');

        assert_ne!(str1.as_ptr(), str2.as_ptr());
        assert_eq!(str1.to_string(), "Hello");
        assert_eq!(str2.to_string(), "Jello");
    }

    #[test]
    fn test_better_clone_from_is_assignment() {
        let (recorder, buffer) = Recorder::buffered();
        let source = BetterString::new("abc", &recorder);
        let mut target = BetterString::new("xyz", &recorder);
        target.clone_from(&source);

        assert_eq!(target.to_string(), "abc");
        assert_eq!(buffer.snapshot()[2], "Deep copy assignment called.");
    }

    #[test]
    fn test_set_byte_out_of_range_is_ignored() {
        let (recorder, _buffer) = Recorder::buffered();
        let mut s = BetterString::new("ab", &recorder);
        s.set_byte(10, b'z');
        assert_eq!(s.to_string(), "ab");
    }
}
