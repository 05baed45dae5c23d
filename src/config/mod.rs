//! Process configuration: workspace root, cache directory, thread count and
//! extra scanner excludes, loaded from `shopware-lsp.toml`, `SHOPWARE_LSP_`-
//! prefixed environment variables, and built-in defaults, in that order of
//! increasing precedence.

use std::path::Path;
use std::path::PathBuf;

use config::Config;
use config::ConfigBuilder;
use config::Environment;
use config::File;
use config::FileFormat;
use config::Value;
use config::ValueKind;
use config::builder::BuilderState;
use serde::Deserialize;
use serde::Serialize;

use crate::consts::CONFIGURATION_FILE;
use crate::consts::CURRENT_DIR;
use crate::consts::DEFAULT_CACHE_DIRNAME;
use crate::consts::ENVIRONMENT_PREFIX;
use crate::consts::LOGICAL_CPUS;
use crate::error::Error;

/// Configuration for a single `shopware-lsp` process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// The workspace root to index and watch.
    pub workspace: PathBuf,

    /// Where the fact stores and cache-version marker live. Defaults to
    /// `<workspace>/.shopware-lsp`.
    pub cache_dir: PathBuf,

    /// The number of rayon worker threads to use for scanning.
    pub threads: usize,

    /// Directories, relative to `workspace`, to skip in addition to the
    /// scanner's fixed exclusion rules (`.git`, `vendor`, `node_modules`, ...).
    #[serde(default)]
    pub extra_excludes: Vec<String>,
}

impl Configuration {
    /// Loads the configuration for `workspace`, layering `shopware-lsp.toml`,
    /// `SHOPWARE_LSP_`-prefixed environment variables, and the given
    /// command-line overrides over the built-in defaults.
    pub fn load(workspace: Option<PathBuf>, threads: Option<usize>) -> Result<Self, Error> {
        let root = workspace.unwrap_or_else(|| CURRENT_DIR.clone());

        let builder = Config::builder()
            .add_source(File::with_name(CONFIGURATION_FILE).required(false).format(FileFormat::Toml))
            .add_source(Environment::with_prefix(ENVIRONMENT_PREFIX).try_parsing(true).list_separator(","));

        tracing::debug!("loading configuration from sources");

        let mut this = Self::from_root(root).configure(builder)?.build()?.try_deserialize::<Self>()?;

        if let Some(threads) = threads {
            this.threads = threads;
        }

        this.normalize()?;

        Ok(this)
    }

    /// The built-in defaults for a workspace rooted at `root`.
    pub fn from_root(root: PathBuf) -> Self {
        let cache_dir = root.join(DEFAULT_CACHE_DIRNAME);

        Self { workspace: root, cache_dir, threads: *LOGICAL_CPUS, extra_excludes: Vec::new() }
    }

    pub fn from_workspace(root: PathBuf) -> Self {
        Self::from_root(root)
    }
}

trait ConfigurationEntry {
    fn configure<St: BuilderState>(self, builder: ConfigBuilder<St>) -> Result<ConfigBuilder<St>, Error>;

    fn normalize(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl ConfigurationEntry for Configuration {
    fn configure<St: BuilderState>(self, builder: ConfigBuilder<St>) -> Result<ConfigBuilder<St>, Error> {
        tracing::trace!("configuring configuration entry");

        let builder = builder
            .set_default("workspace", Value::new(None, ValueKind::String(path_to_string(&self.workspace))))?
            .set_default("cache_dir", Value::new(None, ValueKind::String(path_to_string(&self.cache_dir))))?
            .set_default("threads", Value::new(None, ValueKind::U64(self.threads as u64)))?
            .set_default("extra_excludes", Value::new(None, ValueKind::Array(Vec::new())))?;

        Ok(builder)
    }

    fn normalize(&mut self) -> Result<(), Error> {
        if self.threads == 0 {
            tracing::info!("thread configuration is zero, using the number of logical CPUs: {}", *LOGICAL_CPUS);

            self.threads = *LOGICAL_CPUS;
        } else {
            tracing::debug!("configuration specifies {} threads", self.threads);
        }

        Ok(())
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
