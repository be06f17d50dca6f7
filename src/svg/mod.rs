//! SVG template documents
//!
//! Templates are parsed with `roxmltree` and copied into an owned arena that
//! can be edited in place: text replaced, elements appended, the viewport
//! resized. Nodes are looked up through a label index built once per load.

mod document;
pub mod style;
mod transform;
mod writer;

pub use document::{Document, Element, NodeId, NodeKind, Viewport};
pub use transform::Transform;
pub use writer::{XML_DECLARATION, to_string_pretty};
