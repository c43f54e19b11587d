use clap::{Parser, Subcommand};
use slsa_provenance::{
    cli::{self, commands::GenerateCommands},
    error::Result,
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate provenance
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    slsa_provenance::init_logging()?;

    // Parse command line arguments
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { command } => cli::handlers::handle_generate_command(command),
    };

    // Format and display any errors
    if let Err(ref e) = result {
        eprintln!("{}", cli::format_error(e));
    }

    result
}
