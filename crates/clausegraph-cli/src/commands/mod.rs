//! Command implementations.

pub mod extract;
pub mod schemas;

pub use self::extract::{execute_extract, run_extraction};
pub use self::schemas::execute_schemas;

use crate::error::Result;
use clausegraph_extractor::SchemaRegistry;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Built-in document types plus any definitions given with `--schema`.
pub fn load_registry(extra: &[PathBuf]) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::builtin()?;
    for path in extra {
        let source = fs::read_to_string(path)?;
        registry.register_toml(&source)?;
        info!(path = %path.display(), "Loaded document type definition");
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_registry_with_extra_schema() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name = \"nda\"\ninstruction = \"Extract confidentiality clauses.\"\n\
             categories = [\"confidential_information\", \"term\"]\n\
             max_chunk_chars = 1200\npass_count = 2\nworker_concurrency = 2"
        )
        .unwrap();

        let registry = load_registry(&[file.path().to_path_buf()]).unwrap();
        assert!(registry.get_config("nda").is_ok());
        assert!(registry.get_config("rental").is_ok());
    }

    #[test]
    fn test_invalid_extra_schema_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name = \"nda\"").unwrap();
        assert!(load_registry(&[file.path().to_path_buf()]).is_err());
    }
}
