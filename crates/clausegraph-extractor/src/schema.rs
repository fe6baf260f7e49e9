//! Schema registry: document types by name
//!
//! Every document type is pure data. The built-in types ship as TOML files
//! embedded in the crate; more can be registered at runtime without code
//! changes anywhere in the pipeline.

use crate::error::ExtractorError;
use clausegraph_domain::DocumentTypeConfig;
use std::collections::BTreeMap;
use tracing::debug;

const BUILTIN_SCHEMAS: [(&str, &str); 3] = [
    ("rental.toml", include_str!("../schemas/rental.toml")),
    ("loan.toml", include_str!("../schemas/loan.toml")),
    ("terms_of_service.toml", include_str!("../schemas/terms_of_service.toml")),
];

/// Registry of document type configurations, keyed by type name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: BTreeMap<String, DocumentTypeConfig>,
}

impl SchemaRegistry {
    /// Registry with no document types
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in `rental`, `loan` and `terms_of_service` types
    pub fn builtin() -> Result<Self, ExtractorError> {
        let mut registry = Self::empty();
        for (file, source) in BUILTIN_SCHEMAS {
            registry
                .register_toml(source)
                .map_err(|e| ExtractorError::Schema(format!("{}: {}", file, e)))?;
        }
        Ok(registry)
    }

    /// Register a document type, replacing any type with the same name
    pub fn register(&mut self, config: DocumentTypeConfig) -> Result<(), ExtractorError> {
        config.validate().map_err(ExtractorError::Schema)?;
        debug!(
            document_type = %config.name,
            categories = config.categories.len(),
            relations = config.relations.len(),
            "Registered document type"
        );
        self.types.insert(config.name.clone(), config);
        Ok(())
    }

    /// Parse and register a document type from TOML
    pub fn register_toml(&mut self, source: &str) -> Result<(), ExtractorError> {
        let config: DocumentTypeConfig =
            toml::from_str(source).map_err(|e| ExtractorError::Schema(format!("Failed to parse TOML: {}", e)))?;
        self.register(config)
    }

    /// Look up the configuration of a document type
    pub fn get_config(&self, document_type: &str) -> Result<&DocumentTypeConfig, ExtractorError> {
        self.types
            .get(document_type)
            .ok_or_else(|| ExtractorError::UnknownDocumentType(document_type.to_string()))
    }

    /// Registered document type names, sorted
    pub fn document_types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// All registered configurations, sorted by name
    pub fn configs(&self) -> impl Iterator<Item = &DocumentTypeConfig> {
        self.types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types() {
        let registry = SchemaRegistry::builtin().unwrap();
        let names: Vec<_> = registry.document_types().collect();
        assert_eq!(names, vec!["loan", "rental", "terms_of_service"]);
    }

    #[test]
    fn test_builtin_vocabularies() {
        let registry = SchemaRegistry::builtin().unwrap();

        let rental = registry.get_config("rental").unwrap();
        assert_eq!(rental.pass_count, 3);
        assert!(rental
            .rules_between("refund_condition", "security_deposit")
            .any(|r| r.relation_type == "refunded_under"));

        let loan = registry.get_config("loan").unwrap();
        assert!(loan
            .rules_between("obligation", "security")
            .any(|r| r.relation_type == "secured_by"));

        let tos = registry.get_config("terms_of_service").unwrap();
        assert_eq!(tos.reference_attributes, vec!["refers_to".to_string()]);
    }

    #[test]
    fn test_unknown_type() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert!(matches!(
            registry.get_config("employment"),
            Err(ExtractorError::UnknownDocumentType(name)) if name == "employment"
        ));
    }

    #[test]
    fn test_register_new_type_from_toml() {
        let mut registry = SchemaRegistry::builtin().unwrap();
        registry
            .register_toml(
                r#"
                name = "employment"
                instruction = "Extract employment clauses."
                categories = ["compensation", "non_compete"]
                max_chunk_chars = 1500
                pass_count = 2
                worker_concurrency = 2
                "#,
            )
            .unwrap();

        let config = registry.get_config("employment").unwrap();
        assert_eq!(config.overlap_chars, 200);
        assert_eq!(registry.document_types().count(), 4);
    }

    #[test]
    fn test_invalid_type_rejected() {
        let mut registry = SchemaRegistry::empty();
        let err = registry
            .register_toml(
                r#"
                name = "broken"
                instruction = "x"
                categories = ["a"]
                max_chunk_chars = 100
                overlap_chars = 60
                pass_count = 1
                worker_concurrency = 1
                "#,
            )
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Schema(_)));
        assert!(registry.get_config("broken").is_err());
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let mut registry = SchemaRegistry::empty();
        assert!(matches!(
            registry.register_toml("name = "),
            Err(ExtractorError::Schema(_))
        ));
    }
}
