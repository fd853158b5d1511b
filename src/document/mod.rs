//! Core document tree types.

pub mod node;

pub use node::{DocNumber, DocValue};
