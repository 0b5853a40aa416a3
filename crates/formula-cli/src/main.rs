//! Formula CLI entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rhizome_formula_cli::{
    compile_ast, evaluate, print, read_input, wire, Config, OutputFormat, DEFAULT_LOG_FILTER,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formula")]
#[command(about = "Formula expression language CLI")]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format, overriding the config file
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print expressions in canonical form
    Print {
        /// Source text, `-` for stdin, or `@path` for a file
        input: String,
    },

    /// Evaluate expressions
    Eval {
        /// Source text, `-` for stdin, or `@path` for a file
        input: String,
    },

    /// Compile expressions to an AST (JSON)
    Compile {
        /// Source text, `-` for stdin, or `@path` for a file
        input: String,
    },

    /// Show the wire form of expressions (JSON)
    Wire {
        /// Source text, `-` for stdin, or `@path` for a file
        input: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // RUST_LOG wins over the config file
    let filter = match (std::env::var_os("RUST_LOG"), &config.log_filter) {
        (Some(_), _) => EnvFilter::from_default_env(),
        (None, Some(directives)) => EnvFilter::try_new(directives)?,
        (None, None) => EnvFilter::default().add_directive(DEFAULT_LOG_FILTER.parse()?),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = config.output_format(cli.format);
    debug!(?format, "loaded config");

    let output = match cli.command {
        Commands::Print { input } => print(&read_input(&input)?, format)?,
        Commands::Eval { input } => evaluate(&read_input(&input)?, format)?,
        Commands::Compile { input } => compile_ast(&read_input(&input)?, format)?,
        Commands::Wire { input } => wire(&read_input(&input)?, format)?,
    };
    println!("{}", output);

    Ok(())
}
