//! The payload types every domain indexer stores, one [`shopware_lsp_database::FactStore`]
//! (or a handful of them) per type. Each derives `bincode::{Encode, Decode}`
//! for the on-disk format and `serde::{Serialize, Deserialize}` so the same
//! value can also travel over `workspace/executeCommand` JSON results without
//! a second, hand-written mapping.

use bincode::Decode;
use bincode::Encode;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Service {
    pub id: String,
    pub class: String,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
    pub path: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ServiceAlias {
    pub alias_id: String,
    pub target: String,
    pub path: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Route {
    pub name: String,
    pub methods: Vec<String>,
    pub path: String,
    pub controller: String,
    pub parameters: Vec<String>,
    pub source_path: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct RouteUsage {
    pub route_name: String,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TwigFile {
    pub absolute_path: String,
    pub logical_path: String,
    pub bundle: String,
    pub block_names: Vec<String>,
    pub extends: Option<String>,
    pub extends_line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct VersionComment {
    pub hash: String,
    pub version: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TwigBlock {
    pub name: String,
    pub line: u32,
    pub hash: String,
    pub text: String,
    pub version_comment: Option<VersionComment>,
}

/// Only recorded for templates recognized as storefront originals — the
/// baseline a plugin's override is diffed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TwigBlockHash {
    pub block_name: String,
    pub relative_path: String,
    pub absolute_path: String,
    pub hash: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TwigFunctionParameter {
    pub name: String,
    pub r#type: Option<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TwigFunction {
    pub name: String,
    pub method: String,
    pub parameters: Vec<TwigFunctionParameter>,
    pub source_path: String,
    pub line: u32,
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TwigFilter {
    pub name: String,
    pub method: String,
    pub parameters: Vec<TwigFunctionParameter>,
    pub source_path: String,
    pub line: u32,
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Snippet {
    pub key: String,
    pub text: String,
    pub locale: String,
    pub file: String,
    pub line: u32,
}

/// A call-site reference to a snippet key: a PHP `$this->trans(...)` or
/// admin `this.$t(...)`/`this.$tc(...)` call, the snippet equivalent of
/// [`RouteUsage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SnippetUsage {
    pub key: String,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct FeatureFlag {
    pub name: String,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum ExtensionKind {
    Bundle,
    App,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Extension {
    pub name: String,
    pub kind: ExtensionKind,
    pub root_path: String,
    pub meta: Option<ExtensionMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ExtensionMeta {
    pub label: String,
    pub description: String,
    pub author: String,
    pub copyright: String,
    pub version: String,
    pub license: String,
}

impl Extension {
    /// `Resources/views`, rooted at the extension's bundle class file's
    /// parent rather than `root_path` itself, since `root_path` may point at
    /// the class file and not its containing directory.
    pub fn storefront_views_path(&self) -> String {
        let base = self.root_path.trim_end_matches('/');
        format!("{base}/Resources/views")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ThemeConfigField {
    pub key: String,
    pub labels: Vec<(String, String)>,
    pub r#type: String,
    pub default: Option<String>,
    pub block: Option<String>,
    pub order: Option<i64>,
    pub scss: bool,
    pub source_path: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct VueComponentProp {
    pub name: String,
    pub r#type: Option<String>,
    pub required: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct VueComponent {
    pub name: String,
    pub parent: Option<String>,
    pub props: Vec<VueComponentProp>,
    pub emits: Vec<String>,
    pub methods: Vec<String>,
    pub computed: Vec<String>,
    pub slots: Vec<String>,
    pub defining_path: String,
    pub registration_path: String,
}
