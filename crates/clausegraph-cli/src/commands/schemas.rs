//! Schemas command implementation.

use crate::cli::SchemasArgs;
use crate::error::Result;
use crate::output::Formatter;
use clausegraph_extractor::SchemaRegistry;

/// Execute the schemas command.
pub fn execute_schemas(args: SchemasArgs, registry: &SchemaRegistry, formatter: &Formatter) -> Result<()> {
    let output = match args.document_type {
        Some(name) => formatter.schema_detail(registry.get_config(&name)?),
        None => formatter.schemas_table(registry),
    };
    println!("{}", output);
    Ok(())
}
