//! Builder-style assembly of [`Value`] trees: a small state machine
//! (`ExpectValue`, `ExpectKey`, `InArray`, `InObject`) enforced at
//! runtime with clear panics, since Rust's type system doesn't cheaply
//! express the full transition table for a fluent `&mut self` builder.

use super::value::{Object, Value};

enum Frame {
    Object(Object),
    Array(Vec<Value>),
}

/// Assembles a [`Value`] one call at a time. Every method panics if
/// called in a state that would produce a malformed tree (e.g. `key()`
/// outside an object, `end_array()` while inside an object) — these are
/// programmer errors in the caller, not data errors, so a panic with a
/// clear message is the right signal.
#[derive(Default)]
pub struct Builder {
    stack: Vec<Frame>,
    pending_key: Option<String>,
    root: Option<Value>,
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_dict(&mut self) -> &mut Self {
        self.stack.push(Frame::Object(Vec::new()));
        self
    }

    pub fn start_array(&mut self) -> &mut Self {
        self.stack.push(Frame::Array(Vec::new()));
        self
    }

    pub fn key(&mut self, key: impl Into<String>) -> &mut Self {
        assert!(matches!(self.stack.last(), Some(Frame::Object(_))), "key() called outside an object");
        assert!(self.pending_key.is_none(), "key() called twice without an intervening value");
        self.pending_key = Some(key.into());
        self
    }

    pub fn value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.push_value(value.into());
        self
    }

    pub fn end_dict(&mut self) -> &mut Self {
        let Some(Frame::Object(entries)) = self.stack.pop() else {
            panic!("end_dict() called outside an object");
        };
        self.push_value(Value::Object(entries));
        self
    }

    pub fn end_array(&mut self) -> &mut Self {
        let Some(Frame::Array(items)) = self.stack.pop() else {
            panic!("end_array() called outside an array");
        };
        self.push_value(Value::Array(items));
        self
    }

    /// Finalizes the tree. Panics if any container was left open.
    #[must_use]
    pub fn build(&mut self) -> Value {
        assert!(self.stack.is_empty(), "build() called with unclosed containers");
        self.root.take().expect("build() called before any value was set")
    }

    fn push_value(&mut self, value: Value) {
        match self.stack.last_mut() {
            Some(Frame::Object(entries)) => {
                let key = self.pending_key.take().expect("value() called in an object without a preceding key()");
                entries.push((key, value));
            }
            Some(Frame::Array(items)) => items.push(value),
            None => {
                assert!(self.root.is_none(), "build root value already set");
                self.root = Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_structure() {
        let mut b = Builder::new();
        let value = b
            .start_dict()
            .key("name")
            .value("stop")
            .key("buses")
            .start_array()
            .value("1")
            .value("2")
            .end_array()
            .end_dict()
            .build();

        assert_eq!(value.get("name").unwrap().as_str(), Some("stop"));
        let buses = value.get("buses").unwrap().as_array().unwrap();
        assert_eq!(buses.len(), 2);
    }

    #[test]
    #[should_panic(expected = "key() called outside an object")]
    fn key_outside_object_panics() {
        let mut b = Builder::new();
        b.start_array().key("oops");
    }
}
