//! A small, self-contained JSON implementation: a variant-typed
//! [`Value`], a recursive-descent [`parse`], a [`write`] serializer, and
//! a fluent [`Builder`].
//!
//! This is the one data format in the engine that does not reach for an
//! ecosystem crate — a plain tagged-sum value tree, built and read by
//! hand rather than through `serde_json`'s `serde::Deserialize`-driven
//! model.

mod builder;
mod parser;
mod value;
mod writer;

pub use builder::Builder;
pub use parser::parse;
pub use value::{Object, Value};
pub use writer::write;
