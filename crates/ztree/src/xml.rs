//! XML tree model, parser and writer

pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Attributes, Document, Element};
pub use parser::{Config, Parser};
pub use writer::{element_to_string, write_element, write_element_to_path, DEFAULT_ENCODING};
