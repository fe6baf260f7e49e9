//! LLM prompt engineering for clause extraction

use clausegraph_domain::{DocumentTypeConfig, FewShotExample};
use serde_json::json;

/// Builds the extraction prompt for one chunk
pub struct PromptBuilder<'a> {
    config: &'a DocumentTypeConfig,
    chunk_text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(config: &'a DocumentTypeConfig, chunk_text: &'a str) -> Self {
        Self { config, chunk_text }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Document-type instruction
        prompt.push_str(self.config.instruction.trim());
        prompt.push_str("\n\n");

        // 2. Allowed categories
        prompt.push_str("Allowed clause categories: ");
        prompt.push_str(&self.config.categories.join(", "));
        prompt.push_str("\n\n");

        prompt.push_str(EXTRACTION_RULES);
        prompt.push_str("\n\n");

        // 3. Few-shot examples
        for (idx, example) in self.config.examples.iter().enumerate() {
            prompt.push_str(&format!("Example {}:\n", idx + 1));
            prompt.push_str("Text:\n---\n");
            prompt.push_str(&example.text);
            prompt.push_str("\n---\nOutput:\n");
            prompt.push_str(&render_example(example));
            prompt.push_str("\n\n");
        }

        // 4. The text to analyze
        prompt.push_str("Text to analyze:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.chunk_text);
        prompt.push_str("\n---\n\n");

        // 5. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

fn render_example(example: &FewShotExample) -> String {
    let extractions: Vec<_> = example
        .clauses
        .iter()
        .map(|clause| {
            json!({
                "category": clause.category,
                "text": clause.text,
                "attributes": clause.attributes,
            })
        })
        .collect();
    json!({ "extractions": extractions }).to_string()
}

const EXTRACTION_RULES: &str = r#"Rules:
- Copy each clause's "text" verbatim from the source: same characters, same spacing, same punctuation
- Do not paraphrase, summarize, translate or fix typos in "text"
- Use only the allowed categories
- Put details (amounts, dates, parties, conditions) in "attributes" as strings
- If a clause refers to another extracted clause, name that clause's exact text in the "refers_to" attribute
- Extract clauses in order of appearance; it is fine to return no clauses"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{"extractions": [{"category": "...", "text": "exact text", "attributes": {"key": "value"}}]}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;
    use clausegraph_domain::{Attributes, ExampleClause};

    fn config() -> DocumentTypeConfig {
        let mut attributes = Attributes::new();
        attributes.insert("amount".to_string(), "25000".to_string());
        DocumentTypeConfig {
            name: "rental".to_string(),
            description: String::new(),
            instruction: "Extract the key clauses of this rental agreement.".to_string(),
            categories: vec!["financial_term".to_string(), "party".to_string()],
            examples: vec![FewShotExample {
                text: "Monthly rent: Rs. 25,000/- payable by the Tenant.".to_string(),
                clauses: vec![ExampleClause {
                    category: "financial_term".to_string(),
                    text: "Monthly rent: Rs. 25,000/-".to_string(),
                    attributes,
                }],
            }],
            relations: Vec::new(),
            reference_attributes: vec!["refers_to".to_string()],
            max_chunk_chars: 1000,
            overlap_chars: 100,
            pass_count: 3,
            worker_concurrency: 2,
        }
    }

    #[test]
    fn test_prompt_includes_instruction_and_categories() {
        let config = config();
        let prompt = PromptBuilder::new(&config, "chunk").build();
        assert!(prompt.starts_with("Extract the key clauses of this rental agreement."));
        assert!(prompt.contains("Allowed clause categories: financial_term, party"));
    }

    #[test]
    fn test_prompt_includes_examples_as_json() {
        let config = config();
        let prompt = PromptBuilder::new(&config, "chunk").build();
        assert!(prompt.contains("Example 1:"));
        assert!(prompt.contains(r#""text":"Monthly rent: Rs. 25,000/-""#));
        assert!(prompt.contains(r#""amount":"25000""#));
    }

    #[test]
    fn test_prompt_includes_chunk_text_last() {
        let config = config();
        let prompt = PromptBuilder::new(&config, "The Landlord shall repair the roof.").build();
        let text_pos = prompt.find("The Landlord shall repair the roof.").unwrap();
        let example_pos = prompt.find("Example 1:").unwrap();
        assert!(text_pos > example_pos);
        assert!(prompt.ends_with("no explanations."));
    }
}
