use anyhow::Result;
use yake_core::configs::document::document_schema;

pub fn execute() -> Result<()> {
    println!("{}", document_schema()?);
    Ok(())
}
