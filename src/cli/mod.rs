mod dose;
mod search;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pharmograph",
    version,
    about = "AI-generated drug monographs, packaging images, and dose suggestions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit raw JSON instead of rendered markdown
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the full monograph and a packaging image for a drug
    Search {
        /// Drug name to look up (e.g. paracetamol)
        drug: String,
        /// Write the generated packaging image as PNG to this path
        #[arg(long, value_name = "PATH")]
        image_out: Option<std::path::PathBuf>,
    },
    /// Suggest an individual dose for a drug, given patient age and weight
    Dose {
        /// Drug name the suggestion is for
        drug: String,
        /// Patient age in years
        #[arg(long)]
        age: u32,
        /// Patient weight in kilograms
        #[arg(long)]
        weight: f64,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Commands::Search { drug, image_out } => {
            search::run(&drug, image_out.as_deref(), cli.json).await
        }
        Commands::Dose { drug, age, weight } => dose::run(&drug, age, weight, cli.json).await,
    }
}
