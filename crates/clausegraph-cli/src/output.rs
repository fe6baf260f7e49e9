//! Output formatting for the CLI.

use clausegraph_domain::{DocumentTypeConfig, ExtractionResult};
use clausegraph_extractor::SchemaRegistry;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Table of registered document types.
    pub fn schemas_table(&self, registry: &SchemaRegistry) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Type", "Categories", "Relations", "Chunk", "Passes", "Workers"]);

        for config in registry.configs() {
            builder.push_record([
                config.name.clone(),
                config.categories.len().to_string(),
                config.relations.len().to_string(),
                format!("{}/{}", config.max_chunk_chars, config.overlap_chars),
                config.pass_count.to_string(),
                config.worker_concurrency.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Categories and relation vocabulary of one document type.
    pub fn schema_detail(&self, config: &DocumentTypeConfig) -> String {
        let mut out = String::new();
        out.push_str(&self.colorize(&config.name, "cyan"));
        if !config.description.is_empty() {
            out.push_str(&format!(" - {}", config.description));
        }
        out.push_str("\n\nCategories:\n");
        for category in &config.categories {
            out.push_str(&format!("  {}\n", category));
        }

        if config.relations.is_empty() {
            out.push_str("\nNo relation vocabulary.");
            return out;
        }

        let mut builder = Builder::default();
        builder.push_record(["Source", "Target", "Type", "Directed", "Condition"]);
        for rule in &config.relations {
            builder.push_record([
                rule.source.clone(),
                rule.target.clone(),
                rule.relation_type.clone(),
                rule.directed.to_string(),
                rule.condition.clone().unwrap_or_default(),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());

        out.push_str("\nRelations:\n");
        out.push_str(&table.to_string());
        out
    }

    /// One-paragraph summary of an extraction run.
    pub fn extraction_summary(&self, result: &ExtractionResult) -> String {
        let stats = result.stats();
        let headline = format!(
            "Extracted {} clause(s) and {} relationship(s) from {} chunk(s) in {:.2}s (confidence {:.2})",
            result.clauses().len(),
            result.relationships().len(),
            stats.chunks,
            result.processing_time().as_secs_f64(),
            result.confidence_score()
        );

        let mut lines = vec![self.success(&headline)];
        if stats.candidates_ungrounded > 0 {
            lines.push(self.info(&format!(
                "Dropped {} ungrounded candidate(s) of {}",
                stats.candidates_ungrounded, stats.candidates_proposed
            )));
        }
        for failure in result.failures() {
            let scope = if failure.total { "all passes" } else { "some passes" };
            lines.push(self.warning(&format!(
                "Chunk {} [{}..{}] failed on {} ({} of {})",
                failure.chunk_index,
                failure.start_offset,
                failure.end_offset,
                scope,
                failure.failed_passes.len(),
                stats.passes_attempted / stats.chunks.max(1)
            )));
        }
        lines.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_table_lists_builtin_types() {
        let formatter = Formatter::new(false);
        let output = formatter.schemas_table(&SchemaRegistry::builtin().unwrap());
        assert!(output.contains("rental"));
        assert!(output.contains("loan"));
        assert!(output.contains("terms_of_service"));
    }

    #[test]
    fn test_schema_detail_shows_vocabulary() {
        let formatter = Formatter::new(false);
        let registry = SchemaRegistry::builtin().unwrap();
        let output = formatter.schema_detail(registry.get_config("loan").unwrap());
        assert!(output.starts_with("loan"));
        assert!(output.contains("secured_by"));
        assert!(output.contains("obligation"));
    }

    #[test]
    fn test_no_color_output_is_plain() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.success("done"), "✓ done");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
