mod analyze;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jarscope",
    version,
    about = "Structural analysis of compiled Java archives",
    long_about = "Jarscope reads every class of a jar into an entity model, recovers record \
                  accessors, links class hierarchies through an optional classpath and unifies \
                  override-compatible methods into shared entries."
)]
pub struct Cli {
    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a jar and print a summary
    Analyze {
        /// Path to the jar to analyze
        #[arg(value_name = "JAR")]
        jar: PathBuf,
        /// Directory whose jars and class directories resolve parents outside the jar
        #[arg(long, value_name = "DIR")]
        classpath: Option<PathBuf>,
        /// Skip unifying method entries across hierarchies
        #[arg(long)]
        no_join: bool,
        /// Tab-separated mapping file to rename the model with
        #[arg(long, value_name = "FILE")]
        mappings: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_dir.as_deref());

    match cli.command {
        Commands::Analyze {
            jar,
            classpath,
            no_join,
            mappings,
            json,
        } => analyze::run(analyze::AnalyzeArgs {
            jar,
            classpath,
            no_join,
            mappings,
            json,
        }),
    }
}
