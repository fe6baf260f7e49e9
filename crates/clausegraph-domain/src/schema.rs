//! Document type configuration - what to extract and how, held as data

use crate::Attributes;
use serde::{Deserialize, Serialize};

fn default_reference_attributes() -> Vec<String> {
    vec!["refers_to".to_string()]
}

fn default_overlap_chars() -> usize {
    200
}

/// Extraction configuration for one document category
///
/// Everything that differs between document types lives here. The
/// pipeline never branches on the document type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTypeConfig {
    /// Registry key (e.g. "rental", "loan", "terms_of_service")
    pub name: String,

    /// Human readable description
    #[serde(default)]
    pub description: String,

    /// Extraction instruction handed to the model
    pub instruction: String,

    /// Clause categories the model may emit
    pub categories: Vec<String>,

    /// Few-shot examples
    #[serde(default)]
    pub examples: Vec<FewShotExample>,

    /// Relation vocabulary: category pairs known to relate
    #[serde(default)]
    pub relations: Vec<RelationRule>,

    /// Attribute keys whose values cross-reference another clause
    #[serde(default = "default_reference_attributes")]
    pub reference_attributes: Vec<String>,

    /// Maximum chunk size in bytes
    pub max_chunk_chars: usize,

    /// Bytes shared between neighbouring chunks
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,

    /// Independent extraction passes per chunk
    pub pass_count: usize,

    /// Maximum concurrent model calls
    pub worker_concurrency: usize,
}

/// An input span with the clauses a model is expected to find in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FewShotExample {
    /// Example input text
    pub text: String,

    /// Expected clause annotations
    #[serde(default)]
    pub clauses: Vec<ExampleClause>,
}

/// One expected clause in a few-shot example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleClause {
    /// Clause category
    pub category: String,

    /// Exact text from the example input
    pub text: String,

    /// Expected attributes
    #[serde(default)]
    pub attributes: Attributes,
}

/// A pair of clause categories that may be related
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRule {
    /// Source clause category
    pub source: String,

    /// Target clause category
    pub target: String,

    /// Relation type emitted for this pair
    pub relation_type: String,

    /// Whether the relation has a meaningful direction
    #[serde(default)]
    pub directed: bool,

    /// Default condition attached to relationships of this rule
    #[serde(default)]
    pub condition: Option<String>,
}

impl RelationRule {
    /// Whether this rule relates the two categories, in either order
    pub fn relates(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

impl DocumentTypeConfig {
    /// Whether `category` is one of this type's clause categories
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Relation rules that apply to a pair of categories
    pub fn rules_between<'a>(
        &'a self,
        a: &'a str,
        b: &'a str,
    ) -> impl Iterator<Item = &'a RelationRule> + 'a {
        self.relations.iter().filter(move |rule| rule.relates(a, b))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.categories.is_empty() {
            return Err(format!("{}: at least one category is required", self.name));
        }
        if self.max_chunk_chars == 0 {
            return Err(format!("{}: max_chunk_chars must be greater than 0", self.name));
        }
        if self.overlap_chars * 2 >= self.max_chunk_chars {
            return Err(format!(
                "{}: overlap_chars ({}) must be less than half of max_chunk_chars ({})",
                self.name, self.overlap_chars, self.max_chunk_chars
            ));
        }
        if self.pass_count == 0 {
            return Err(format!("{}: pass_count must be greater than 0", self.name));
        }
        if self.worker_concurrency == 0 {
            return Err(format!("{}: worker_concurrency must be greater than 0", self.name));
        }
        for rule in &self.relations {
            for category in [&rule.source, &rule.target] {
                if !self.has_category(category) {
                    return Err(format!(
                        "{}: relation '{}' names unknown category '{}'",
                        self.name, rule.relation_type, category
                    ));
                }
            }
        }
        for example in &self.examples {
            for clause in &example.clauses {
                if !self.has_category(&clause.category) {
                    return Err(format!(
                        "{}: example names unknown category '{}'",
                        self.name, clause.category
                    ));
                }
                if !example.text.contains(&clause.text) {
                    return Err(format!(
                        "{}: example clause {:?} is not a substring of its example text",
                        self.name, clause.text
                    ));
                }
            }
        }
        Ok(())
    }
}
