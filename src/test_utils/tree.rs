//! Temporary template trees.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::TemplatesConfig;
use crate::templating::Templates;

/// Builder for a [`TemplateTree`].
pub struct TemplateTreeBuilder {
    temp_dir: TempDir,
    files: Vec<(String, String)>,
}

impl TemplateTreeBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            files: Vec::new(),
        })
    }

    /// Add a file, relative to the tree root.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Add several files, relative to the tree root.
    pub fn with_files(mut self, files: &[(&str, &str)]) -> Self {
        for (path, content) in files {
            self.files.push(((*path).to_string(), (*content).to_string()));
        }
        self
    }

    /// Add several files below `dir`.
    pub fn with_files_in(mut self, dir: &str, files: &[(&str, &str)]) -> Self {
        for (path, content) in files {
            self.files.push((format!("{dir}/{path}"), (*content).to_string()));
        }
        self
    }

    pub fn build(self) -> Result<TemplateTree> {
        let tree = TemplateTree {
            temp_dir: self.temp_dir,
        };
        for (path, content) in &self.files {
            tree.write(path, content)?;
        }
        Ok(tree)
    }
}

/// Template files laid out in a temporary directory, removed on drop.
pub struct TemplateTree {
    temp_dir: TempDir,
}

impl TemplateTree {
    /// The tree root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a file or directory in the tree.
    pub fn join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Create or overwrite a file, creating parent directories.
    pub fn write(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<()> {
        let full_path = self.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full_path, content)?;
        Ok(())
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(std::fs::read_to_string(self.join(path))?)
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.join(path).exists()
    }

    /// Default configuration rooted at the tree.
    pub fn config(&self) -> TemplatesConfig {
        TemplatesConfig::new(self.path())
    }

    /// Default configuration with the given subdirectories as roots, in order.
    pub fn config_with_roots(&self, roots: &[&str]) -> TemplatesConfig {
        TemplatesConfig::with_roots(roots.iter().map(|root| self.join(root)))
    }

    /// A template set with the default configuration.
    pub async fn templates(&self) -> Result<Templates> {
        Ok(Templates::new(self.config()).await?)
    }
}
