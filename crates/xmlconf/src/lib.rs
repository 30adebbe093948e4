//! xmlconf - XML backend for generic configuration containers
//!
//! Reads an XML document into the same ordered, nested [`Container`] shape
//! used by the JSON/YAML/INI backends of a configuration system, and writes
//! such a container back out as XML. Attributes, text and children of a node
//! are kept under reserved keys (`@attrs`, `@text`, `@children` by default).
//!
//! # Quick Start
//!
//! ```
//! use xmlconf::{Backend, XmlBackend};
//! # fn main() -> Result<(), xmlconf::Error> {
//! let backend = XmlBackend::new();
//! let data = backend.loads(br#"<a x="1"><b>hi</b></a>"#)?;
//! let x = data
//!     .get("a")
//!     .and_then(|a| a.as_mapping())
//!     .and_then(|a| a.get("@attrs"))
//!     .and_then(|attrs| attrs.as_mapping())
//!     .and_then(|attrs| attrs.get("x"))
//!     .and_then(|x| x.as_str());
//! assert_eq!(x, Some("1"));
//!
//! let xml = backend.dumps(&data)?;
//! assert!(xml.starts_with(br#"<?xml version="1.0" encoding="UTF-8"?>"#));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{Config, SpecialKeys, DEFAULT_PREFIX, MAX_DEPTH};

pub mod value;
pub use value::{Container, Scalar, Value};

pub mod xml;
pub use xml::Element;

pub mod convert;
pub use convert::{container_to_tree, tree_to_container};

pub mod backend;
pub use backend::{find_by_path, find_by_type, Backend, XmlBackend};

/// Parse XML bytes with the default prefix
pub fn loads(content: &[u8]) -> Result<Container> {
    XmlBackend::new().loads(content)
}

/// Parse an XML file with the default prefix
pub fn load(path: impl AsRef<std::path::Path>) -> Result<Container> {
    XmlBackend::new().load(path.as_ref())
}

/// Serialize a container to XML bytes with the default prefix
pub fn dumps(data: &Container) -> Result<Vec<u8>> {
    XmlBackend::new().dumps(data)
}

/// Serialize a container into an XML file with the default prefix
pub fn dump(data: &Container, path: impl AsRef<std::path::Path>) -> Result<()> {
    XmlBackend::new().dump(data, path.as_ref())
}
