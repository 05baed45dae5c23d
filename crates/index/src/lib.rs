//! Domain indexers: service/DI config, routes, Twig templates and blocks,
//! snippets, feature flags, extensions, theme config, admin components, and
//! an on-demand icon provider.
//!
//! Each indexer owns its own [`shopware_lsp_database::FactStore`]s under a
//! shared cache directory and implements [`shopware_lsp_database::Indexer`]
//! so the scanner and watcher in `shopware-lsp-database` can drive them
//! without knowing anything about PHP, Twig, or Shopware's DI config format.
//! [`IndexerSet::build`] constructs one of each, registers them with a
//! [`shopware_lsp_database::Registry`], and keeps typed handles around so
//! LSP feature providers can query a specific indexer's facts directly
//! instead of downcasting trait objects.

pub mod admin_component;
pub mod error;
pub mod extension;
pub mod feature_flag;
pub mod icon;
pub mod json_tree;
pub mod locale;
pub mod model;
pub mod route;
pub mod service;
pub mod snippet;
pub mod snippet_usage;
pub mod theme_config;
pub mod twig;

use std::path::Path;
use std::sync::Arc;

use shopware_lsp_database::Registry;

pub use admin_component::AdminComponentIndexer;
pub use error::IndexError;
pub use extension::ExtensionIndexer;
pub use feature_flag::FeatureFlagIndexer;
pub use icon::IconEntry;
pub use icon::IconProvider;
pub use route::RouteIndexer;
pub use route::RouteUsageIndexer;
pub use service::ServiceIndexer;
pub use snippet::SnippetIndexer;
pub use snippet_usage::SnippetUsageIndexer;
pub use theme_config::ThemeConfigIndexer;
pub use twig::TwigIndexer;

/// Every registered domain indexer, opened under one cache directory, kept
/// both as trait objects (for the scanner's `Registry`) and as typed `Arc`
/// handles (for feature providers that need a specific indexer's facts).
pub struct IndexerSet {
    pub registry: Registry,
    pub service: Arc<ServiceIndexer>,
    pub route: Arc<RouteIndexer>,
    pub route_usage: Arc<RouteUsageIndexer>,
    pub twig: Arc<TwigIndexer>,
    pub snippet: Arc<SnippetIndexer>,
    pub snippet_usage: Arc<SnippetUsageIndexer>,
    pub feature_flag: Arc<FeatureFlagIndexer>,
    pub extension: Arc<ExtensionIndexer>,
    pub theme_config: Arc<ThemeConfigIndexer>,
    pub admin_component: Arc<AdminComponentIndexer>,
}

impl IndexerSet {
    /// Opens every domain indexer's stores under `cache_dir` and registers
    /// them with a fresh [`Registry`] in a fixed order (service, route,
    /// twig, snippet, feature flag, extension, theme config, admin
    /// component) so log output and scan order are stable across runs.
    pub fn build(cache_dir: &Path) -> Result<Self, IndexError> {
        let service = Arc::new(ServiceIndexer::open(cache_dir)?);
        let route = Arc::new(RouteIndexer::open(cache_dir)?);
        let route_usage = Arc::new(RouteUsageIndexer::open(cache_dir)?);
        let twig = Arc::new(TwigIndexer::open(cache_dir)?);
        let snippet = Arc::new(SnippetIndexer::open(cache_dir)?);
        let snippet_usage = Arc::new(SnippetUsageIndexer::open(cache_dir)?);
        let feature_flag = Arc::new(FeatureFlagIndexer::open(cache_dir)?);
        let extension = Arc::new(ExtensionIndexer::open(cache_dir)?);
        let theme_config = Arc::new(ThemeConfigIndexer::open(cache_dir)?);
        let admin_component = Arc::new(AdminComponentIndexer::open(cache_dir)?);

        let mut registry = Registry::new();
        registry.register(Box::new(ArcIndexer(service.clone())));
        registry.register(Box::new(ArcIndexer(route.clone())));
        registry.register(Box::new(ArcIndexer(route_usage.clone())));
        registry.register(Box::new(ArcIndexer(twig.clone())));
        registry.register(Box::new(ArcIndexer(snippet.clone())));
        registry.register(Box::new(ArcIndexer(snippet_usage.clone())));
        registry.register(Box::new(ArcIndexer(feature_flag.clone())));
        registry.register(Box::new(ArcIndexer(extension.clone())));
        registry.register(Box::new(ArcIndexer(theme_config.clone())));
        registry.register(Box::new(ArcIndexer(admin_component.clone())));

        Ok(Self {
            registry,
            service,
            route,
            route_usage,
            twig,
            snippet,
            snippet_usage,
            feature_flag,
            extension,
            theme_config,
            admin_component,
        })
    }

    pub fn close_all(&self) -> Result<(), IndexError> {
        self.registry.close_all().map_err(IndexError::from)
    }

    pub fn clear_all(&self) -> Result<(), IndexError> {
        self.registry.clear_all().map_err(IndexError::from)
    }
}

/// Forwards [`shopware_lsp_database::Indexer`] to an `Arc`-held indexer so
/// the same instance can be registered with the scanner and kept as a typed
/// handle on [`IndexerSet`].
struct ArcIndexer<T>(Arc<T>);

impl<T: shopware_lsp_database::Indexer> shopware_lsp_database::Indexer for ArcIndexer<T> {
    fn id(&self) -> &'static str {
        self.0.id()
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.0.extensions()
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn shopware_lsp_database::AnyTree) -> Result<(), shopware_lsp_database::DatabaseError> {
        self.0.ingest(path, source, tree)
    }

    fn forget_files(&self, paths: &[std::path::PathBuf]) -> Result<(), shopware_lsp_database::DatabaseError> {
        self.0.forget_files(paths)
    }

    fn clear(&self) -> Result<(), shopware_lsp_database::DatabaseError> {
        self.0.clear()
    }

    fn close(&self) -> Result<(), shopware_lsp_database::DatabaseError> {
        self.0.close()
    }
}
