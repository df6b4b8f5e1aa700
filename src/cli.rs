use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "bazel-bridge")]
#[command(about = "Bridge a resolved Maven dependency graph into Bazel JSON descriptors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Generate {
        #[arg(value_name = "MODEL", required = true)]
        models: Vec<PathBuf>,
    },
    Stats,
    Clear,
}
