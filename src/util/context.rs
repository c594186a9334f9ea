//! Global context for sinth operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::registry::{INDEX_FILE, REGISTRY_DIR};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config file (~/.sinth/config.toml), if a home dir exists
    global_config: Option<PathBuf>,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            global_config: global_config_path(),
            verbose: false,
            color: true,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use a specific global config file instead of ~/.sinth/config.toml.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Global config file location, if a home directory exists.
    pub fn global_config(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    /// Merged configuration for a project directory.
    pub fn config_for(&self, project_root: &Path) -> Config {
        let global = self.global_config.as_deref().unwrap_or(Path::new(""));
        load_config(global, &project_config_path(project_root))
    }

    /// Merged configuration for the working directory.
    pub fn config(&self) -> Config {
        self.config_for(&self.cwd)
    }

    /// Resolve the registry root.
    ///
    /// Order: the explicit argument, `registry.root` from config, the nearest
    /// ancestor of cwd containing `registry/index.json`, then cwd itself.
    pub fn registry_root(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return self.absolute(path);
        }

        if let Some(root) = self.config().registry.root {
            return self.absolute(&root);
        }

        self.find_registry_root()
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Search upward from cwd for a directory containing `registry/index.json`.
    pub fn find_registry_root(&self) -> Option<PathBuf> {
        let mut current = self.cwd.clone();
        loop {
            if current.join(REGISTRY_DIR).join(INDEX_FILE).is_file() {
                return Some(current);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
