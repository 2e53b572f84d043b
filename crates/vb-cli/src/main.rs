use anyhow::Result;
use vb_cli::{Cli, Commands, Parser};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.tracing_level())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Detect(args) => args.detect().await,
        Commands::Branches(args) => args.branches().await,
        Commands::Tags(args) => args.tags().await,
        Commands::Checkout(args) => args.run().await,
    }
}
