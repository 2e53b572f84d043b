//! Version browser CLI library

pub mod repo;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vb")]
#[command(about = "List branches and tags of Git or Subversion repositories and check out versions")]
#[command(version, author, long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(
        long = "log-level",
        global = true,
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report which backend handles the repository
    Detect(repo::RepoArgs),
    /// List branches as revision and name pairs
    Branches(repo::ListArgs),
    /// List tags as revision and name pairs
    Tags(repo::ListArgs),
    /// Check out a branch or tag into the local directory
    Checkout(repo::CheckoutArgs),
}

impl Cli {
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.as_str() {
            "error" => tracing::Level::ERROR,
            "info" => tracing::Level::INFO,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::WARN,
        }
    }
}
