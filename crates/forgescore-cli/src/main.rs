//! forgescore CLI — grade a submission with `forge test`.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "forgescore", version, about = "Autograder for forge test suites")]
struct Cli {
    /// Defaults to validating the current directory.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a submission directory
    Validate {
        /// Submission root directory
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Config file path (default: ./forgescore.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the JSON report to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create a starter forgescore.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("forgescore=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => commands::validate::execute(PathBuf::from("."), None, "text".into(), None).await,
        Some(Commands::Validate {
            path,
            config,
            format,
            output,
        }) => commands::validate::execute(path, config, format, output).await,
        Some(Commands::Init) => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
