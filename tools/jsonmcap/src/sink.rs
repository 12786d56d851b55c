use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Result;
use mcapjson::OutputRecord;

/// JSON record sink writing to stdout, a file, or a zstd-compressed file.
///
/// A `.zst` output extension selects compression.
pub struct JsonSink {
    dest: Box<dyn Write>,
    pretty: bool,
}

impl JsonSink {
    pub fn create(output: Option<&Path>, pretty: bool) -> Result<Self> {
        let dest: Box<dyn Write> = match output {
            Some(path) if path.extension().is_some_and(|ext| ext == "zst") => {
                let encoder = zstd::Encoder::new(fs::File::create(path)?, 0)?;
                Box::new(encoder.auto_finish())
            }
            Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        Ok(Self { dest, pretty })
    }

    pub fn write(&mut self, record: &OutputRecord) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.dest, record)?;
        } else {
            serde_json::to_writer(&mut self.dest, record)?;
        }
        self.dest.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.dest.flush()?;
        Ok(())
    }
}
