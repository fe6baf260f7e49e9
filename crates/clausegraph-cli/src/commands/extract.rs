//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::sink::JsonSink;
use clausegraph_domain::{ExtractionModel, ExtractionResult};
use clausegraph_extractor::{ClauseExtractor, PromptedModel, ResultDocument, ResultSink, SchemaRegistry};
use clausegraph_llm::OllamaProvider;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    registry: SchemaRegistry,
    formatter: &Formatter,
) -> Result<()> {
    let text = read_input(&args.input)?;

    let endpoint = config.endpoint(args.endpoint.as_deref());
    let model = config.model_name(args.model.as_deref());
    let mut provider = OllamaProvider::with_timeout(&endpoint, &model, config.extractor.call_timeout())?;
    if let Some(temperature) = config.model.temperature {
        provider = provider.with_temperature(temperature);
    }
    info!(endpoint = %endpoint, model = %model, "Using Ollama provider");

    let extractor = ClauseExtractor::new(PromptedModel::new(provider), registry, config.extractor.clone())?;
    let mut sink = JsonSink::for_output(args.output, args.pretty);

    let result = run_extraction(&extractor, &text, &args.document_type, &mut sink).await?;
    eprintln!("{}", formatter.extraction_summary(&result));
    Ok(())
}

/// Extract and hand the serialized result to `sink`.
pub async fn run_extraction<M, S>(
    extractor: &ClauseExtractor<M>,
    text: &str,
    document_type: &str,
    sink: &mut S,
) -> Result<ExtractionResult>
where
    M: ExtractionModel,
    S: ResultSink<Error = CliError>,
{
    let result = extractor.extract(text, document_type).await?;
    sink.persist(&ResultDocument::from(&result))?;
    Ok(result)
}

fn read_input(path: &Path) -> Result<String> {
    let text = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)?
    };

    if text.is_empty() {
        return Err(CliError::InvalidInput(format!("{} is empty", path.display())));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausegraph_extractor::ExtractorConfig;
    use clausegraph_llm::MockProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_run_extraction_writes_result() {
        let provider = MockProvider::new(r#"[{"category": "security_deposit", "text": "Rs. 50,000"}]"#);
        let extractor = ClauseExtractor::new(
            PromptedModel::new(provider),
            SchemaRegistry::builtin().unwrap(),
            ExtractorConfig::default(),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let mut sink = JsonSink::for_output(Some(path.clone()), false);

        let result = run_extraction(&extractor, "Security deposit: Rs. 50,000.", "rental", &mut sink)
            .await
            .unwrap();

        assert_eq!(result.clauses().len(), 1);
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["clauses"][0]["text"], "Rs. 50,000");
        assert_eq!(written["clauses"][0]["start_offset"], 18);
        assert_eq!(written["clauses"][0]["support_count"], 3);
    }

    #[tokio::test]
    async fn test_unknown_type_writes_nothing() {
        let extractor = ClauseExtractor::new(
            PromptedModel::new(MockProvider::default()),
            SchemaRegistry::builtin().unwrap(),
            ExtractorConfig::default(),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let mut sink = JsonSink::for_output(Some(path.clone()), false);

        let err = run_extraction(&extractor, "text", "employment", &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Extractor(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_input_rejects_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(read_input(file.path()), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_read_input_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Monthly rent: Rs. 25,000/-").unwrap();
        assert_eq!(read_input(file.path()).unwrap(), "Monthly rent: Rs. 25,000/-");
    }
}
