use std::{net::UdpSocket, path::PathBuf};

use anyhow::Result;
use clap::Args;
use mcapjson::{
    BagReader, Forwarder, OutputRecord, Transport, TransportError, json::transform_record,
};

#[derive(Args)]
pub struct PlayArgs {
    /// Path to the mcap file
    input: PathBuf,

    /// Only play these topics (all topics if none given)
    topics: Vec<String>,

    /// Destination address for UDP datagrams
    #[arg(short, long, default_value = "127.0.0.1:9870")]
    address: String,

    /// Stop after this many records
    #[arg(long)]
    limit: Option<u64>,
}

/// Sends each record as one JSON datagram.
struct UdpTransport {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl Transport for UdpTransport {
    fn send(&mut self, record: &OutputRecord) -> Result<(), TransportError> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, record)
            .map_err(|e| TransportError::Io(e.into()))?;
        self.socket.send(&self.buf)?;
        Ok(())
    }
}

impl PlayArgs {
    pub fn run(self) -> Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(&self.address)?;
        let forwarder = Forwarder::spawn(
            UdpTransport {
                socket,
                buf: Vec::new(),
            },
            256,
        );

        let mut builder = BagReader::builder()
            .with_default_decoders()
            .with_topics(self.topics.clone());
        if let Some(limit) = self.limit {
            builder = builder.with_record_limit(limit);
        }
        let reader = builder.build();

        let summary = reader.for_each_record(&self.input, |record| {
            forwarder.send(transform_record(record))?;
            Ok(())
        })?;
        forwarder.finish()?;

        eprintln!(
            "sent {} records to {} ({} fallback)",
            summary.messages, self.address, summary.fallbacks
        );
        Ok(())
    }
}
