pub mod document;
pub mod indentation;

pub use document::{Document, DocumentError, LineEnding};
pub use indentation::{detect_indentation, Indentation};
