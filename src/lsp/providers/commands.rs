//! `workspace/executeCommand`: dispatches the custom commands the server
//! advertises in `initialize`'s `ExecuteCommandOptions` — force reindexing,
//! listing extensions, snippet discovery/creation/listing for the
//! storefront and administration scopes, and the two Twig block-override
//! commands (`extendBlock`, `getBlockDiff`).

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use shopware_lsp_index::model::Extension;
use shopware_lsp_index::model::ExtensionKind;
use shopware_lsp_index::model::Snippet;
use shopware_lsp_syntax::twig;
use tower_lsp::lsp_types::ExecuteCommandParams;
use tower_lsp::lsp_types::Url;

use crate::consts::FRAMEWORK_VERSION_FALLBACK;
use crate::error::Error;
use crate::lsp::providers::ProviderContext;
use crate::lsp::providers::diagnostics::diagnostics;
use crate::lsp::providers::path_to_uri;

pub async fn execute_command(ctx: &ProviderContext, params: ExecuteCommandParams) -> Result<Option<serde_json::Value>, Error> {
    match params.command.as_str() {
        "shopware/forceReindex" => Ok(Some(force_reindex(ctx))),
        "shopware/extension/all" => Ok(Some(extension_all(ctx))),
        "shopware/snippet/storefront/getPossibleSnippetFiles" => Ok(Some(possible_snippet_files(ctx, Scope::Storefront))),
        "shopware/snippet/administration/getPossibleSnippetFiles" => Ok(Some(possible_snippet_files(ctx, Scope::Administration))),
        "shopware/snippet/storefront/create" => create_snippet(ctx, &params.arguments).await,
        "shopware/snippet/administration/create" => create_snippet(ctx, &params.arguments).await,
        "shopware/snippet/storefront/all" => Ok(Some(snippet_all(ctx, Scope::Storefront))),
        "shopware/snippet/administration/all" => Ok(Some(snippet_all(ctx, Scope::Administration))),
        "shopware/twig/extendBlock" => extend_block(ctx, &params.arguments).await,
        "shopware/twig/getBlockDiff" => get_block_diff(ctx, &params.arguments),
        other => {
            tracing::warn!(command = other, "unknown custom command");
            Ok(None)
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: &[serde_json::Value]) -> Result<T, Error> {
    let value = arguments.first().cloned().unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(value)?)
}

fn force_reindex(ctx: &ProviderContext) -> serde_json::Value {
    let orchestrator = ctx.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(error) = orchestrator.force_reindex().await {
            tracing::error!(%error, "force reindex failed");
        }
    });

    serde_json::json!({ "message": "Force reindexing started" })
}

fn extension_all(ctx: &ProviderContext) -> serde_json::Value {
    let extensions: Vec<_> = ctx
        .indexers()
        .extension
        .extensions()
        .all_values()
        .into_iter()
        .map(|extension| {
            serde_json::json!({
                "Name": extension.name,
                "Type": match extension.kind {
                    ExtensionKind::Bundle => "bundle",
                    ExtensionKind::App => "app",
                },
                "Path": extension.root_path,
            })
        })
        .collect();

    serde_json::Value::Array(extensions)
}

#[derive(Clone, Copy)]
enum Scope {
    Storefront,
    Administration,
}

impl Scope {
    fn store<'a>(&self, ctx: &'a ProviderContext) -> &'a shopware_lsp_database::FactStore<Snippet> {
        match self {
            Scope::Storefront => ctx.indexers().snippet.storefront(),
            Scope::Administration => ctx.indexers().snippet.administration(),
        }
    }

    /// The canonical on-disk path an extension's snippet file for `locale`
    /// would live at, whether or not it has been created yet.
    fn candidate_path(&self, extension: &Extension, locale: &str) -> String {
        let root = extension.root_path.trim_end_matches('/');
        match self {
            Scope::Storefront => {
                format!("{root}/Resources/snippet/{}/storefront.{locale}.json", locale.replace('-', "_"))
            }
            Scope::Administration => format!("{root}/Resources/app/administration/snippet/{locale}.json"),
        }
    }
}

/// Discovers the snippet files a key could be added to: one candidate per
/// known extension crossed with every locale already seen in this scope,
/// marking whether the file exists yet (`value: true`) or would need to be
/// seeded (`value: false`).
fn possible_snippet_files(ctx: &ProviderContext, scope: Scope) -> serde_json::Value {
    let mut locales: Vec<String> = scope.store(ctx).all_values().into_iter().map(|snippet| snippet.locale).collect();
    locales.sort_unstable();
    locales.dedup();

    let extensions = ctx.indexers().extension.extensions().all_values();

    let mut paths = Vec::with_capacity(extensions.len() * locales.len());
    for extension in &extensions {
        for locale in &locales {
            let path = scope.candidate_path(extension, locale);
            let exists = Path::new(&path).is_file();
            paths.push(serde_json::json!({ "path": path, "name": locale, "value": exists }));
        }
    }

    serde_json::json!({ "paths": paths })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSnippetArgs {
    paths: Vec<String>,
    key: String,
    value: String,
    text_uri: Url,
}

/// Inserts `key`/`value` into every selected JSON file (creating the file
/// and its parent directories if it doesn't exist yet), reindexes them, and
/// republishes diagnostics for the document that invoked the command.
async fn create_snippet(ctx: &ProviderContext, arguments: &[serde_json::Value]) -> Result<Option<serde_json::Value>, Error> {
    let args: CreateSnippetArgs = parse_args(arguments)?;

    let mut touched = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut root = if path.is_file() {
            let existing = fs::read_to_string(&path)?;
            serde_json::from_str(&existing).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
        } else {
            serde_json::Value::Object(Default::default())
        };

        if !root.is_object() {
            root = serde_json::Value::Object(Default::default());
        }
        let object = root.as_object_mut().expect("just normalized to an object");
        set_dotted_key(object, &args.key, args.value.clone());

        fs::write(&path, serde_json::to_string_pretty(&root)?)?;
        touched.push(path);
    }

    ctx.orchestrator.index_files(touched).await?;

    let diagnostics = diagnostics(ctx, &args.text_uri).await;
    ctx.client.publish_diagnostics(args.text_uri, diagnostics, None).await;

    Ok(None)
}

fn set_dotted_key(root: &mut serde_json::Map<String, serde_json::Value>, dotted_key: &str, value: String) {
    let mut parts = dotted_key.split('.').peekable();
    let mut current = root;

    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), serde_json::Value::String(value));
            return;
        }

        let entry = current.entry(part.to_string()).or_insert_with(|| serde_json::Value::Object(Default::default()));
        if !entry.is_object() {
            *entry = serde_json::Value::Object(Default::default());
        }
        current = entry.as_object_mut().expect("just normalized to an object");
    }
}

fn snippet_all(ctx: &ProviderContext, scope: Scope) -> serde_json::Value {
    let mut snippets = scope.store(ctx).all_values();
    snippets.sort_by(|a, b| a.key.cmp(&b.key));

    let flattened: Vec<_> =
        snippets.into_iter().map(|snippet| serde_json::json!({ "key": snippet.key, "text": snippet.text, "file": snippet.file })).collect();

    serde_json::Value::Array(flattened)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendBlockArgs {
    text_uri: Url,
    block_name: String,
    extension: String,
}

/// Computes the mirror path for `blockName` under `extension`'s storefront
/// views, creates the directory structure and an `sw_extends` stub if the
/// mirror file doesn't exist yet, and appends the block (preceded by a
/// `{# shopware-block: HASH@VERSION #}` comment when the original's hash is
/// known). Reindexes the written file so the new block is queryable right
/// away.
async fn extend_block(ctx: &ProviderContext, arguments: &[serde_json::Value]) -> Result<Option<serde_json::Value>, Error> {
    let args: ExtendBlockArgs = parse_args(arguments)?;

    let Some(extension) = ctx.indexers().extension.extensions().values(&args.extension).into_iter().next() else {
        return Ok(Some(failure("extension.not_found", &format!("unknown extension `{}`", args.extension))));
    };

    let Ok(source_path) = args.text_uri.to_file_path() else {
        return Ok(Some(failure("invalid_uri", "textUri is not a file URI")));
    };

    let source_path_string = source_path.to_string_lossy().into_owned();
    let Some(source_file) =
        ctx.indexers().twig.files().all_values().into_iter().find(|file| file.absolute_path == source_path_string)
    else {
        return Ok(Some(failure("not_a_storefront_view", "source file is not an indexed Twig view")));
    };

    let relative = source_file.logical_path.strip_prefix("@Storefront/").unwrap_or(&source_file.logical_path);
    let mirror_path = PathBuf::from(format!("{}/{}", extension.storefront_views_path(), relative));

    if let Ok(existing) = fs::read_to_string(&mirror_path) {
        if twig::parse(&existing).ok().is_some_and(|tree| tree.block(&args.block_name).is_some()) {
            return Ok(Some(failure("block.already_exists", &format!("`{}` already has block `{}`", mirror_path.display(), args.block_name))));
        }
    }

    let original_hash =
        ctx.indexers().twig.block_hashes().values(&args.block_name).into_iter().find(|hash| hash.relative_path == relative).map(|hash| hash.hash);

    let mut addition = String::new();
    if let Some(hash) = original_hash {
        let version = framework_version(ctx.orchestrator.root());
        addition.push_str(&format!("{{# shopware-block: {hash}@{version} #}}\n"));
    }
    addition.push_str(&format!("{{% block {} %}}\n{{% endblock %}}\n", args.block_name));

    let file_existed = mirror_path.is_file();
    let mut contents = if file_existed {
        fs::read_to_string(&mirror_path)?
    } else {
        if let Some(parent) = mirror_path.parent() {
            fs::create_dir_all(parent)?;
        }
        format!("{{% sw_extends '{}' %}}\n\n", source_file.logical_path)
    };

    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    let inserted_line = contents.matches('\n').count() as u32 + 1;
    contents.push('\n');
    contents.push_str(&addition);

    fs::write(&mirror_path, &contents)?;
    ctx.orchestrator.index_files(vec![mirror_path.clone()]).await?;

    let Some(uri) = path_to_uri(&mirror_path) else {
        return Ok(Some(failure("invalid_uri", "mirror path is not representable as a file URI")));
    };

    Ok(Some(serde_json::json!({ "uri": uri, "line": inserted_line })))
}

fn failure(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({ "code": code, "message": message })
}

/// Reads `vendor/framework/composer.json`'s `version` field, falling back to
/// [`FRAMEWORK_VERSION_FALLBACK`] when the file is missing, unreadable, or
/// has no version recorded (an unreleased dev checkout).
fn framework_version(workspace_root: &Path) -> String {
    let composer_json = workspace_root.join("vendor/framework/composer.json");

    fs::read_to_string(composer_json)
        .ok()
        .and_then(|contents| serde_json::from_str::<serde_json::Value>(&contents).ok())
        .and_then(|value| value.get("version").and_then(|version| version.as_str()).map(str::to_string))
        .unwrap_or_else(|| FRAMEWORK_VERSION_FALLBACK.to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockDiffArgs {
    text_uri: Url,
    block_name: String,
}

/// Compares the override's currently indexed block content against the
/// original, fetched at the version recorded in the block's
/// `{# shopware-block #}` comment via `git show`, with an HTTPS fallback.
fn get_block_diff(ctx: &ProviderContext, arguments: &[serde_json::Value]) -> Result<Option<serde_json::Value>, Error> {
    let args: BlockDiffArgs = parse_args(arguments)?;

    let Ok(path) = args.text_uri.to_file_path() else {
        return Ok(Some(failure("invalid_uri", "textUri is not a file URI")));
    };

    let Some(block) = ctx.indexers().twig.blocks().values_for_path(&path).into_iter().find(|block| block.name == args.block_name) else {
        return Ok(Some(failure("block.not_found", &format!("block `{}` is not indexed", args.block_name))));
    };

    let Some(version_comment) = &block.version_comment else {
        return Ok(Some(failure("block.no_version_comment", "block has no shopware-block version comment to diff against")));
    };

    let Some(file) = ctx.indexers().twig.files().values_for_path(&path).into_iter().next() else {
        return Ok(Some(failure("not_a_storefront_view", "file is not an indexed Twig view")));
    };

    let Some(extends) = &file.extends else {
        return Ok(Some(failure("not_an_override", "file does not `sw_extends` a storefront original")));
    };

    let relative = extends.strip_prefix("@Storefront/").unwrap_or(extends);
    let repo = ctx.orchestrator.root().join("vendor/framework/storefront");
    let original_source = crate::utils::git::show(&repo, &version_comment.version, &format!("Resources/views/{relative}"))?;

    let original_block_text = twig::parse(&original_source)
        .ok()
        .and_then(|tree| tree.block(&args.block_name).map(|node| node.body_span.clone()))
        .and_then(|span| original_source.get(span.start..span.end).map(str::to_string))
        .unwrap_or(original_source);

    Ok(Some(serde_json::json!({
        "original": original_block_text,
        "current": block.text,
        "originalVersion": version_comment.version,
    })))
}
