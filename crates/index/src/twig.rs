//! Twig indexer: template files (blocks, extends targets, logical paths),
//! block content hashes, version comments, and — for templates recognized as
//! "storefront originals" — the baseline block-hash store plugin overrides
//! are compared against. Also recovers `TwigFunction`/`TwigFilter` facts from
//! PHP classes extending `AbstractExtension`.
//!
//! Grounded on `shopware-lsp-syntax::twig::TwigTree` for block/extends/call/
//! version-comment spans; this indexer's job is purely to turn those spans
//! into the persisted facts (hash the body, resolve the logical path, pair a
//! version comment with the block it precedes).

use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use sha2::Digest;
use sha2::Sha256;
use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::twig::TwigTree;

use crate::model::TwigBlock;
use crate::model::TwigBlockHash;
use crate::model::TwigFile;
use crate::model::TwigFilter;
use crate::model::TwigFunction;
use crate::model::TwigFunctionParameter;
use crate::model::VersionComment;

/// Templates under these path fragments are not indexed: the administration
/// bundle ships its own Vue templates under `app/administration` that are
/// not part of the storefront inheritance tree, fixtures are test data, and
/// `.phpdoc/template` is generated documentation scaffolding.
const EXCLUDED_FRAGMENTS: &[&str] = &["Resources/app/administration", "Migration/Fixtures", ".phpdoc/template"];

/// The vendored storefront views directory: block hashes recorded here are
/// the baseline a plugin's `{% sw_extends %}` override is diffed against.
const STOREFRONT_ORIGINAL_PREFIX: &str = "vendor/framework/storefront/Resources/views/";

static BLOCK_WITH_PRECEDING_VERSION_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{#\s*shopware-block:\s*([a-f0-9]+)@([\w.\-]+)\s*#\}\s*\{%-?\s*block\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid regex")
});

static CLASS_EXTENDS_ABSTRACT_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class\s+\w+\s+extends\s+AbstractExtension").expect("valid regex"));

static NEW_TWIG_CALLABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"new\s+Twig(Function|Filter)\s*\(\s*['"]([^'"]+)['"]\s*,\s*\[\s*\$this\s*,\s*['"]([^'"]+)['"]\s*\]"#)
        .expect("valid regex")
});

pub struct TwigIndexer {
    files: FactStore<TwigFile>,
    blocks: FactStore<TwigBlock>,
    block_hashes: FactStore<TwigBlockHash>,
    functions: FactStore<TwigFunction>,
    filters: FactStore<TwigFilter>,
}

impl TwigIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            files: FactStore::open(&cache_dir.join("twig_file.index"))?,
            blocks: FactStore::open(&cache_dir.join("twig_block.index"))?,
            block_hashes: FactStore::open(&cache_dir.join("twig_block_hash.index"))?,
            functions: FactStore::open(&cache_dir.join("twig_function.index"))?,
            filters: FactStore::open(&cache_dir.join("twig_filter.index"))?,
        })
    }

    pub fn files(&self) -> &FactStore<TwigFile> {
        &self.files
    }

    pub fn blocks(&self) -> &FactStore<TwigBlock> {
        &self.blocks
    }

    pub fn block_hashes(&self) -> &FactStore<TwigBlockHash> {
        &self.block_hashes
    }

    pub fn functions(&self) -> &FactStore<TwigFunction> {
        &self.functions
    }

    pub fn filters(&self) -> &FactStore<TwigFilter> {
        &self.filters
    }

    fn ingest_twig(&self, path: &Path, source: &str, tree: &TwigTree) -> Result<(), DatabaseError> {
        let path_string = path.to_string_lossy().into_owned();
        let bytes = source.as_bytes();

        let mut block_rows = Vec::with_capacity(tree.blocks.len());
        let mut block_hash_rows = Vec::new();

        let is_storefront_original = path_string.contains(STOREFRONT_ORIGINAL_PREFIX);

        for block in &tree.blocks {
            let body = bytes.get(block.body_span.start..block.body_span.end).unwrap_or_default();
            let hash = hex_sha256(body);
            let text = String::from_utf8_lossy(body).into_owned();

            let version_comment = preceding_version_comment(source, block.name_span.start, &block.name);

            block_rows.push((
                block.name.clone(),
                TwigBlock { name: block.name.clone(), line: block.start_line as u32, hash: hash.clone(), text: text.clone(), version_comment },
            ));

            if is_storefront_original {
                let relative_path = path_string
                    .split_once(STOREFRONT_ORIGINAL_PREFIX)
                    .map(|(_, rest)| rest.to_string())
                    .unwrap_or_else(|| path_string.clone());

                block_hash_rows.push((
                    block.name.clone(),
                    TwigBlockHash {
                        block_name: block.name.clone(),
                        relative_path,
                        absolute_path: path_string.clone(),
                        hash,
                        text,
                    },
                ));
            }
        }

        self.blocks.put_batch(path, block_rows)?;
        self.block_hashes.put_batch(path, block_hash_rows)?;

        let logical_path = logical_path_of(&path_string);
        let bundle = bundle_of(&path_string);
        let block_names = tree.blocks.iter().map(|block| block.name.clone()).collect();
        let (extends, extends_line) = match &tree.extends {
            Some(extends_node) => (Some(extends_node.target.clone()), Some(line_of(source, extends_node.span.start))),
            None => (None, None),
        };

        self.files.put(
            path,
            logical_path.clone(),
            TwigFile { absolute_path: path_string, logical_path, bundle, block_names, extends, extends_line },
        )
    }

    fn ingest_abstract_extension(&self, path: &Path, source: &str) -> Result<(), DatabaseError> {
        if !CLASS_EXTENDS_ABSTRACT_EXTENSION.is_match(source) {
            return Ok(());
        }

        let mut function_rows = Vec::new();
        let mut filter_rows = Vec::new();

        for captures in NEW_TWIG_CALLABLE.captures_iter(source) {
            let kind = &captures[1];
            let name = captures[2].to_string();
            let method = captures[3].to_string();
            let line = line_of(source, captures.get(0).unwrap().start());
            let parameters = method_parameters(source, &method);

            match kind {
                "Function" => {
                    let usage = format!("{{{{ {}({}) }}}}", name, parameter_names(&parameters));
                    function_rows.push((
                        name.clone(),
                        TwigFunction { name, method, parameters, source_path: path.to_string_lossy().into_owned(), line, usage },
                    ));
                }
                "Filter" => {
                    let usage = format!("{{{{ value|{name} }}}}");
                    filter_rows.push((
                        name.clone(),
                        TwigFilter { name, method, parameters, source_path: path.to_string_lossy().into_owned(), line, usage },
                    ));
                }
                _ => {}
            }
        }

        self.functions.put_batch(path, function_rows)?;
        self.filters.put_batch(path, filter_rows)
    }
}

impl Indexer for TwigIndexer {
    fn id(&self) -> &'static str {
        "twig"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["twig", "php"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.files.delete_path(path)?;
        self.blocks.delete_path(path)?;
        self.block_hashes.delete_path(path)?;
        self.functions.delete_path(path)?;
        self.filters.delete_path(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("twig") => {
                let path_string = path.to_string_lossy();
                if EXCLUDED_FRAGMENTS.iter().any(|fragment| path_string.contains(fragment)) {
                    return Ok(());
                }

                let Some(twig_tree) = tree.as_any().downcast_ref::<TwigTree>() else {
                    return Ok(());
                };

                self.ingest_twig(path, source, twig_tree)
            }
            Some("php") => self.ingest_abstract_extension(path, source),
            _ => Ok(()),
        }
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.files.delete_paths(paths)?;
        self.blocks.delete_paths(paths)?;
        self.block_hashes.delete_paths(paths)?;
        self.functions.delete_paths(paths)?;
        self.filters.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.files.clear()?;
        self.blocks.clear()?;
        self.block_hashes.clear()?;
        self.functions.clear()?;
        self.filters.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.files.close()?;
        self.blocks.close()?;
        self.block_hashes.close()?;
        self.functions.close()?;
        self.filters.close()
    }
}

/// Pairs a block with the `{# shopware-block: HASH@VERSION #}` comment
/// immediately preceding its opening tag, if any, by requiring the comment's
/// regex match and the block's tag to be contiguous (only whitespace between
/// `#}` and `{% block NAME`) and the captured name to match.
fn preceding_version_comment(source: &str, block_name_start: usize, block_name: &str) -> Option<VersionComment> {
    BLOCK_WITH_PRECEDING_VERSION_COMMENT.captures_iter(source).find_map(|captures| {
        let whole = captures.get(0)?;
        let captured_name = &captures[3];
        if captured_name != block_name {
            return None;
        }

        // The match ends right at the block's name; accept it as "preceding"
        // this occurrence if the name's start falls within the matched span.
        if whole.end() < block_name_start || whole.end() > block_name_start + block_name.len() + 1 {
            return None;
        }

        Some(VersionComment { hash: captures[1].to_string(), version: captures[2].to_string(), line: line_of(source, whole.start()) })
    })
}

/// `Resources/app/storefront/.../SomeBundle/Resources/views/...` → `SomeBundle`.
/// Templates outside a `Resources/` tree (shouldn't normally occur) fall back
/// to the immediate parent directory name.
fn bundle_of(path: &str) -> String {
    if let Some(index) = path.find("/Resources/") {
        let before = &path[..index];
        before.rsplit('/').next().unwrap_or(before).to_string()
    } else {
        path.rsplit('/').nth(1).unwrap_or("unknown").to_string()
    }
}

/// Strip the prefix up to and including `Resources/views/`, then prepend
/// `@Storefront/`. Paths without `Resources/views` fall back to `@Storefront/<raw>`.
fn logical_path_of(path: &str) -> String {
    const MARKER: &str = "Resources/views/";
    match path.find(MARKER) {
        Some(index) => format!("@Storefront/{}", &path[index + MARKER.len()..]),
        None => format!("@Storefront/{path}"),
    }
}

/// Recovers the parameter list of `method` by locating `function method(...)`
/// elsewhere in the source and splitting its signature on commas. Each
/// parameter may carry a type hint and a default value (marking it optional).
fn method_parameters(source: &str, method: &str) -> Vec<TwigFunctionParameter> {
    static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\s*\(([^)]*)\)").expect("valid regex"));
    static PARAMETER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?:(\??[\w\\]+)\s+)?\$(\w+)(\s*=\s*[^,]+)?").expect("valid regex"));

    let Some(captures) = SIGNATURE.captures_iter(source).find(|c| &c[1] == method) else {
        return Vec::new();
    };

    PARAMETER
        .captures_iter(&captures[2])
        .map(|parameter| TwigFunctionParameter {
            name: parameter[2].to_string(),
            r#type: parameter.get(1).map(|m| m.as_str().to_string()),
            optional: parameter.get(3).is_some(),
        })
        .collect()
}

fn parameter_names(parameters: &[TwigFunctionParameter]) -> String {
    parameters.iter().map(|parameter| parameter.name.as_str()).collect::<Vec<_>>().join(", ")
}

fn hex_sha256(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn line_of(source: &str, byte_offset: usize) -> u32 {
    memchr::memchr_iter(b'\n', source.as_bytes().get(..byte_offset).unwrap_or_default()).count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopware_lsp_syntax::twig::parse as parse_twig;

    #[test]
    fn hashes_block_body_by_byte_span() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = TwigIndexer::open(dir.path()).unwrap();

        let source = "{% block x %}{% endblock %}";
        let tree = parse_twig(source).unwrap();
        indexer.ingest_twig(Path::new("vendor/framework/storefront/Resources/views/a.html.twig"), source, &tree).unwrap();

        let blocks = indexer.blocks.values("x");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].hash, hex_sha256(b""));
    }

    proptest::proptest! {
        /// Two byte-identical block bodies always hash equal, and hashing is
        /// idempotent — the invariant the plugin-override diffing in
        /// `block_hashes` relies on to detect an unmodified storefront block.
        #[test]
        fn identical_byte_spans_hash_equal(bytes: Vec<u8>) {
            proptest::prop_assert_eq!(hex_sha256(&bytes), hex_sha256(&bytes.clone()));
            proptest::prop_assert_eq!(hex_sha256(&bytes), hex_sha256(&bytes));
        }
    }

    #[test]
    fn storefront_original_populates_block_hash_store() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = TwigIndexer::open(dir.path()).unwrap();

        let source = "{% block x %}{% endblock %}";
        let tree = parse_twig(source).unwrap();
        indexer.ingest_twig(Path::new("vendor/framework/storefront/Resources/views/a.html.twig"), source, &tree).unwrap();

        let hashes = indexer.block_hashes.values("x");
        assert_eq!(hashes.len(), 1);
        assert_eq!(hashes[0].relative_path, "a.html.twig");
    }

    #[test]
    fn plugin_override_does_not_populate_block_hash_store() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = TwigIndexer::open(dir.path()).unwrap();

        let source = r#"{% sw_extends "@Storefront/a.html.twig" %}
{% block x %}Y{% endblock %}"#;
        let tree = parse_twig(source).unwrap();
        indexer.ingest_twig(Path::new("plugins/P/Resources/views/a.html.twig"), source, &tree).unwrap();

        assert!(indexer.block_hashes.values("x").is_empty());
        assert_eq!(indexer.files.values("@Storefront/a.html.twig").len(), 1);
    }

    #[test]
    fn parses_version_comment_preceding_block() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = TwigIndexer::open(dir.path()).unwrap();

        let source = "{# shopware-block: deadbeef@6.6.0.0 #}\n{% block y %}body{% endblock %}";
        let tree = parse_twig(source).unwrap();
        indexer.ingest_twig(Path::new("plugins/P/Resources/views/a.html.twig"), source, &tree).unwrap();

        let blocks = indexer.blocks.values("y");
        assert_eq!(blocks.len(), 1);
        let comment = blocks[0].version_comment.as_ref().unwrap();
        assert_eq!(comment.hash, "deadbeef");
        assert_eq!(comment.version, "6.6.0.0");
    }

    #[test]
    fn logical_path_strips_resources_views_prefix() {
        assert_eq!(
            logical_path_of("plugins/P/Resources/views/storefront/page/a.html.twig"),
            "@Storefront/storefront/page/a.html.twig"
        );
        assert_eq!(logical_path_of("weird/path/a.html.twig"), "@Storefront/weird/path/a.html.twig");
    }

    #[test]
    fn extracts_twig_function_from_abstract_extension() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = TwigIndexer::open(dir.path()).unwrap();

        let source = r#"<?php
class PriceExtension extends AbstractExtension {
    public function getFunctions(): array {
        return [
            new TwigFunction('sw_price', [$this, 'formatPrice']),
        ];
    }

    public function formatPrice(float $price, ?string $currency = null) {}
}
"#;
        indexer.ingest_abstract_extension(Path::new("PriceExtension.php"), source).unwrap();

        let functions = indexer.functions.values("sw_price");
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].method, "formatPrice");
        assert_eq!(functions[0].parameters.len(), 2);
        assert!(functions[0].parameters[1].optional);
    }
}
