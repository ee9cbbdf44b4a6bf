//! Sentinel Tools: name-addressed callables with JSON-schema parameters.
//!
//! The analysis stage invokes tools by name; each tool describes its
//! accepted parameters with a JSON schema so callers (and the API's tool
//! listing) can introspect them.

mod builtin;
mod registry;

pub use builtin::builtin_tools;
pub use registry::{Tool, ToolDescription, ToolError, ToolRegistry};
