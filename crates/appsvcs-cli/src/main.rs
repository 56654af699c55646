//! appsvcs CLI - turn standalone Node.js handlers into an App Services project.

mod colors;
mod convert;
mod inspect;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "appsvcs")]
#[command(about = "Convert standalone handler sources into an App Services project")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Source selection shared by the generating commands.
#[derive(Args)]
struct SourceArgs {
    /// Folder containing the handler source files
    #[arg(long = "src", env = "SRC_FOLDER_NAME")]
    source_dir: PathBuf,

    /// Generated project folder
    #[arg(long = "out", default_value = "app")]
    app_dir: PathBuf,

    /// Source file extension to scan (repeatable)
    #[arg(long = "ext", default_value = "js")]
    extensions: Vec<String>,

    /// Read and transform source files in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the project from the template and generate functions and endpoints
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// App Services application name
        #[arg(long, env = "APP_NAME")]
        app_name: String,

        /// Atlas cluster backing the mongodb-atlas data source
        #[arg(long = "cluster", env = "DB_CLUSTER_NAME")]
        cluster_name: String,

        /// Project template folder
        #[arg(long, default_value = "app-svcs-app-template")]
        template: PathBuf,
    },

    /// Generate functions and endpoints into an existing project
    Functions {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the handlers of a source file without writing anything
    Inspect {
        /// Path to the source file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Values from .env back the env-based arguments.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Convert {
            source,
            app_name,
            cluster_name,
            template,
        } => convert::execute_project(&source, &app_name, &cluster_name, &template)?,

        Commands::Functions { source } => convert::execute_functions(&source)?,

        Commands::Inspect { file } => inspect::execute(&file)?,
    }

    Ok(())
}
