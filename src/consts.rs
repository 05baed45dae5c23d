//! Process-wide constants.

use std::path::PathBuf;
use std::sync::LazyLock;

pub const BIN: &str = "shopware-lsp";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bumped whenever the on-disk fact store layout changes incompatibly.
/// [`shopware_lsp_orchestrator::cache_version::CacheVersionManager`] wipes the
/// cache directory whenever the version recorded on disk doesn't match this.
pub const SCHEMA_VERSION: u32 = 1;

pub const CONFIGURATION_FILE: &str = "shopware-lsp.toml";
pub const ENVIRONMENT_PREFIX: &str = "SHOPWARE_LSP";
pub const LOG_ENVIRONMENT_VARIABLE: &str = "SHOPWARE_LSP_LOG";
pub const DEFAULT_CACHE_DIRNAME: &str = ".shopware-lsp";

pub static CURRENT_DIR: LazyLock<PathBuf> =
    LazyLock::new(|| std::env::current_dir().expect("failed to determine current working directory"));

pub static LOGICAL_CPUS: LazyLock<usize> = LazyLock::new(num_cpus::get);

/// Stamped into a newly authored `{# shopware-block: HASH@VERSION #}`
/// comment (`shopware/twig/extendBlock`) when the vendored framework
/// checkout's `vendor/framework/composer.json` has no readable `version`
/// field — an unreleased dev checkout, most likely.
pub const FRAMEWORK_VERSION_FALLBACK: &str = "dev-main";
