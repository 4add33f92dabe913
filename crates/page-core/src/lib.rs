//! Page state primitives for the editor workspace: an in-memory document
//! model with stylesheets, an editable region, and instrumentation that
//! records every mutation applied by the edit agent.

pub mod document;
pub mod events;

pub use document::{PageAccessError, PageDocument, StyleSheet};
pub use events::{PageEvent, PageInstrumentation, PageMutation};
