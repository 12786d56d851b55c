use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mcapjson::BagReader;

#[derive(Args)]
pub struct SchemasArgs {
    /// Path to the mcap file
    input: PathBuf,

    /// Only show schemas carried by these topics (all if none given)
    topics: Vec<String>,
}

impl SchemasArgs {
    pub fn run(self) -> Result<()> {
        let reader = BagReader::builder()
            .with_default_decoders()
            .with_topics(self.topics.clone())
            .build();
        let schemas = reader.list_schemas(&self.input)?;

        for info in schemas {
            let status = if info.resolved { "" } else { " [unresolved]" };
            println!(
                "=== {} (id {}, {}){status}",
                info.name, info.schema_id, info.encoding
            );
            println!("topics: {}", info.topics.join(", "));
            println!("{}", info.text.trim_end());
            println!();
        }
        Ok(())
    }
}
