//! Service indexer: framework dependency-injection config (`services.xml`,
//! `services.yaml`) mapping a service id to its class, tags, and aliases.
//!
//! Grounded on `shopware-lsp-syntax`'s `xml`/`yaml` node-shape helpers: every
//! fact is read directly off the parsed tree (element attributes and child
//! elements for XML, mapping pairs for YAML) rather than a line-oriented scan
//! of the source text, so line numbers come from the node's own span and
//! nesting (e.g. a `<tag>` that happens to share an ancestor with an
//! unrelated `<service>`) can't be misattributed.

use std::path::Path;
use std::path::PathBuf;

use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::patterns;
use shopware_lsp_syntax::tree::GrammarTree;
use shopware_lsp_syntax::xml;
use shopware_lsp_syntax::yaml;
use tree_sitter::Node;

use crate::model::Service;
use crate::model::ServiceAlias;

pub struct ServiceIndexer {
    services: FactStore<Service>,
    aliases: FactStore<ServiceAlias>,
}

impl ServiceIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            services: FactStore::open(&cache_dir.join("services.db"))?,
            aliases: FactStore::open(&cache_dir.join("service_alias.db"))?,
        })
    }

    pub fn services(&self) -> &FactStore<Service> {
        &self.services
    }

    pub fn aliases(&self) -> &FactStore<ServiceAlias> {
        &self.aliases
    }

    fn ingest_xml(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();
        let mut services = Vec::new();
        let mut alias_rows = Vec::new();

        for element in xml::elements_by_name(tree.root_node(), "service", bytes) {
            let Some(id) = xml::attribute_value(&element, bytes, "id") else { continue };
            let line = element.start_position().row as u32 + 1;

            if let Some(alias) = xml::attribute_value(&element, bytes, "alias") {
                alias_rows.push((
                    id.clone(),
                    ServiceAlias { alias_id: id, target: alias, path: path.to_string_lossy().into_owned(), line },
                ));
                continue;
            }

            let Some(class) = xml::attribute_value(&element, bytes, "class") else { continue };
            let tags = xml::child_elements(&element, "tag", bytes)
                .into_iter()
                .filter_map(|tag| xml::attribute_value(&tag, bytes, "name"))
                .collect();
            let dependencies = patterns::find_xml_service_arguments(element, bytes).into_iter().map(|(_, id)| id).collect();

            services.push((id.clone(), Service { id, class, tags, dependencies, path: path.to_string_lossy().into_owned(), line }));
        }

        self.services.put_batch(path, services)?;
        self.aliases.put_batch(path, alias_rows)
    }

    fn ingest_yaml(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();
        let mut services = Vec::new();
        let mut alias_rows = Vec::new();

        let services_value = yaml::root_mapping(tree.root_node())
            .and_then(|root_mapping| yaml::direct_value(root_mapping, bytes, "services"))
            .filter(is_mapping);

        if let Some(services_value) = services_value {
            for pair in yaml::mapping_pairs(services_value) {
                let Some(key_node) = yaml::pair_key(&pair) else { continue };
                let id = yaml::scalar_text(&key_node, bytes);
                let line = key_node.start_position().row as u32 + 1;
                let Some(value) = yaml::pair_value(&pair).map(yaml::unwrap_node) else { continue };

                if !is_mapping(&value) {
                    // Bare `My\Class: ~` shorthand: the class defaults to the id.
                    services.push((
                        id.clone(),
                        Service {
                            id: id.clone(),
                            class: id,
                            tags: Vec::new(),
                            dependencies: Vec::new(),
                            path: path.to_string_lossy().into_owned(),
                            line,
                        },
                    ));
                    continue;
                }

                if let Some(alias) = yaml::direct_value(value, bytes, "alias") {
                    alias_rows.push((
                        id.clone(),
                        ServiceAlias {
                            alias_id: id,
                            target: yaml::scalar_text(&alias, bytes),
                            path: path.to_string_lossy().into_owned(),
                            line,
                        },
                    ));
                    continue;
                }

                let class = yaml::direct_value(value, bytes, "class").map(|node| yaml::scalar_text(&node, bytes)).unwrap_or_else(|| id.clone());
                let tags = yaml::direct_value(value, bytes, "tags").map(|tags_node| tag_names(tags_node, bytes)).unwrap_or_default();
                let dependencies = yaml::direct_value(value, bytes, "arguments")
                    .map(|arguments| {
                        yaml::flow_scalars(arguments, bytes).into_iter().filter_map(|argument| argument.strip_prefix('@').map(str::to_string)).collect()
                    })
                    .unwrap_or_default();

                services.push((id.clone(), Service { id, class, tags, dependencies, path: path.to_string_lossy().into_owned(), line }));
            }
        }

        self.services.put_batch(path, services)?;
        self.aliases.put_batch(path, alias_rows)
    }
}

fn is_mapping(node: &Node) -> bool {
    matches!(node.kind(), "block_mapping" | "flow_mapping")
}

/// Every tag's `name` entry under a `tags:` sequence, whether each entry is
/// written in block (`- name: x`) or flow (`- { name: x }`) style.
fn tag_names(tags_node: Node, source: &[u8]) -> Vec<String> {
    yaml::find_pairs_by_key(tags_node, source, "name")
        .into_iter()
        .filter_map(|pair| yaml::pair_value(&pair).map(yaml::unwrap_node))
        .map(|value| yaml::scalar_text(&value, source))
        .collect()
}

impl Indexer for ServiceIndexer {
    fn id(&self) -> &'static str {
        "service"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xml", "yml", "yaml"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.services.delete_path(path)?;
        self.aliases.delete_path(path)?;

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("xml") => self.ingest_xml(path, source, &grammar_tree.tree),
            Some("yml" | "yaml") => self.ingest_yaml(path, source, &grammar_tree.tree),
            _ => Ok(()),
        }
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.services.delete_paths(paths)?;
        self.aliases.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.services.clear()?;
        self.aliases.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.services.close()?;
        self.aliases.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_xml::LANGUAGE_XML.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "xml", tree }
    }

    fn yaml_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_yaml::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "yaml", tree }
    }

    #[test]
    fn indexes_xml_service_with_tags_and_alias() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = ServiceIndexer::open(dir.path()).unwrap();

        let xml = r#"<container>
    <service id="Shopware\Storefront\Page\PageLoader" class="Shopware\Storefront\Page\PageLoaderImpl">
        <tag name="shopware.page_loader"/>
        <argument type="service" id="Shopware\Storefront\Page\GenericPageLoader"/>
    </service>
    <service id="page_loader" alias="Shopware\Storefront\Page\PageLoader"/>
</container>"#;

        let tree = xml_tree(xml);
        indexer.ingest(Path::new("services.xml"), xml, &tree).unwrap();

        let services = indexer.services.values("Shopware\\Storefront\\Page\\PageLoader");
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].tags, vec!["shopware.page_loader"]);
        assert_eq!(services[0].dependencies, vec!["Shopware\\Storefront\\Page\\GenericPageLoader".to_string()]);
        assert_eq!(services[0].line, 2);

        let aliases = indexer.aliases.values("page_loader");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].target, "Shopware\\Storefront\\Page\\PageLoader");
    }

    #[test]
    fn indexes_yaml_service_with_tags_and_alias() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = ServiceIndexer::open(dir.path()).unwrap();

        let yaml = "services:\n    My\\Class:\n        class: My\\ClassImpl\n        tags:\n            - { name: my.tag }\n        arguments: ['@My\\Dependency']\n    my_alias:\n        alias: My\\Class\n";

        let tree = yaml_tree(yaml);
        indexer.ingest(Path::new("services.yaml"), yaml, &tree).unwrap();

        let services = indexer.services.values("My\\Class");
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].class, "My\\ClassImpl");
        assert_eq!(services[0].tags, vec!["my.tag"]);
        assert_eq!(services[0].dependencies, vec!["My\\Dependency".to_string()]);

        let aliases = indexer.aliases.values("my_alias");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].target, "My\\Class");
    }
}
