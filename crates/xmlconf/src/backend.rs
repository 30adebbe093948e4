//! Backend adapter exposing load/dump entry points to a configuration loader

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::config::Config;
use crate::convert::{container_to_tree, tree_to_container};
use crate::error::{Error, Result};
use crate::value::Container;
use crate::xml::{read_tree, read_tree_from, write_tree, Element};

/// A format backend that converts between serialized data and a [`Container`]
pub trait Backend: Send + Sync {
    /// Format identity used for lookup, e.g. `"xml"`
    fn kind(&self) -> &'static str;

    /// File extensions (without the dot) handled by this backend
    fn extensions(&self) -> &'static [&'static str];

    /// Parse in-memory content
    fn loads(&self, content: &[u8]) -> Result<Container>;

    /// Parse the file at `path`
    fn load(&self, path: &Path) -> Result<Container>;

    /// Serialize to bytes
    fn dumps(&self, data: &Container) -> Result<Vec<u8>>;

    /// Serialize into the file at `path`, creating or truncating it
    fn dump(&self, data: &Container, path: &Path) -> Result<()>;

    /// Returns true if `path` has one of [`Backend::extensions`] (ignoring case)
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// XML backend
#[derive(Clone, Debug, Default)]
pub struct XmlBackend {
    config: Config,
}

impl XmlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn to_tree(&self, data: &Container) -> Result<Element> {
        container_to_tree(data, &self.config.keys())?.ok_or(Error::NoRootElement)
    }
}

impl Backend for XmlBackend {
    fn kind(&self) -> &'static str {
        "xml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xml"]
    }

    fn loads(&self, content: &[u8]) -> Result<Container> {
        let root = read_tree(content)?;
        Ok(tree_to_container(Some(&root), &self.config.keys()))
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<Container> {
        let file = File::open(path)?;
        let root = read_tree_from(BufReader::new(file))?;
        debug!(root = %root.tag, "loaded xml");
        Ok(tree_to_container(Some(&root), &self.config.keys()))
    }

    fn dumps(&self, data: &Container) -> Result<Vec<u8>> {
        let tree = self.to_tree(data)?;
        let mut buf = Vec::new();
        write_tree(&tree, &mut buf)?;
        Ok(buf)
    }

    #[instrument(skip(self, data, path), fields(path = %path.display()))]
    fn dump(&self, data: &Container, path: &Path) -> Result<()> {
        let tree = self.to_tree(data)?;
        let mut out = BufWriter::new(File::create(path)?);
        write_tree(&tree, &mut out)?;
        out.flush()?;
        debug!(root = %tree.tag, "dumped xml");
        Ok(())
    }
}

/// Find a backend by its format identity
pub fn find_by_type(kind: &str, config: &Config) -> Option<Box<dyn Backend>> {
    backends(config)
        .into_iter()
        .find(|backend| backend.kind().eq_ignore_ascii_case(kind))
}

/// Find a backend by the extension of `path`
pub fn find_by_path(path: &Path, config: &Config) -> Option<Box<dyn Backend>> {
    backends(config)
        .into_iter()
        .find(|backend| backend.handles(path))
}

fn backends(config: &Config) -> Vec<Box<dyn Backend>> {
    let xml: Box<dyn Backend> = Box::new(XmlBackend::with_config(config.clone()));
    vec![xml]
}
