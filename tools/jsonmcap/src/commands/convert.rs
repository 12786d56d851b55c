use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use mcapjson::BagReader;

use crate::sink::JsonSink;

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to the mcap file
    input: PathBuf,

    /// Only convert these topics (all topics if none given)
    topics: Vec<String>,

    /// Output file path (stdout if not specified); `.zst` enables compression
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print records instead of one line per record
    #[arg(long)]
    pretty: bool,

    /// Stop after this many records
    #[arg(long)]
    limit: Option<u64>,
}

impl ConvertArgs {
    pub fn run(self) -> Result<()> {
        let mut builder = BagReader::builder()
            .with_default_decoders()
            .with_topics(self.topics.clone());
        if let Some(limit) = self.limit {
            builder = builder.with_record_limit(limit);
        }
        let reader = builder.build();

        let pb = match reader.message_count(&self.input)? {
            Some(count) => {
                let pb = ProgressBar::new(count);
                pb.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})",
                    )?
                    .progress_chars("=>-"),
                );
                pb
            }
            None => ProgressBar::hidden(),
        };

        let mut sink = JsonSink::create(self.output.as_deref(), self.pretty)?;
        let summary = reader.for_each_record(&self.input, |record| {
            sink.write(&record)?;
            pb.inc(1);
            Ok(())
        })?;
        sink.finish()?;
        pb.finish_and_clear();

        eprintln!(
            "{} messages ({} decoded, {} fallback)",
            summary.messages, summary.decoded, summary.fallbacks
        );
        Ok(())
    }
}
