use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mcapjson::BagReader;

#[derive(Args)]
pub struct TopicsArgs {
    /// Path to the mcap file
    input: PathBuf,
}

impl TopicsArgs {
    pub fn run(self) -> Result<()> {
        let reader = BagReader::builder().with_default_decoders().build();
        let listing = reader.list_topics(&self.input)?;

        let width = listing
            .entries
            .iter()
            .map(|e| e.topic.len())
            .max()
            .unwrap_or(0);
        for entry in &listing.entries {
            println!(
                "{:<width$}  {:>8}  {}",
                entry.topic, entry.count, entry.message_type
            );
        }
        println!("total: {} messages", listing.total);
        Ok(())
    }
}
