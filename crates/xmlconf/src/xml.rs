//! Element tree engine backed by quick-xml

pub mod model;
pub mod reader;
pub mod writer;

pub use model::Element;
pub use reader::{read_tree, read_tree_from};
pub use writer::write_tree;
