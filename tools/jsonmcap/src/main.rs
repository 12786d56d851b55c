mod commands;
mod logging;
mod sink;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    convert::ConvertArgs, play::PlayArgs, schemas::SchemasArgs, topics::TopicsArgs,
};

#[derive(Parser)]
#[command(name = "jsonmcap", about = "Convert ROS 2 MCAP bags to line-delimited JSON")]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a bag to JSON Lines
    Convert(ConvertArgs),
    /// List topics with message counts
    Topics(TopicsArgs),
    /// Print the schema sources stored in a bag
    Schemas(SchemasArgs),
    /// Re-stream records as UDP datagrams
    Play(PlayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Convert(args) => args.run(),
        Commands::Topics(args) => args.run(),
        Commands::Schemas(args) => args.run(),
        Commands::Play(args) => args.run(),
    }
}
