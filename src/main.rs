use crate::cli::Cli;
use crate::config::Config;
use crate::errors::PipelineError;
use crate::pipeline::Pipeline;
use crate::sources::{RealtorClient, ZillowClient};
use clap::Parser;

mod cli;
mod config;
mod domain;
mod errors;
mod impute;
mod logging;
mod merge;
mod normalize;
mod pagination;
mod pipeline;
mod schools;
mod sources;
mod spreadsheets;

#[cfg(test)]
mod tests;

fn run(cli: &Cli) -> Result<(), PipelineError> {
    // 1️⃣ Keys and delays from the environment
    let config = Config::from_env()?;

    // 2️⃣ One client per marketplace; Zillow wins address ties
    let zillow = ZillowClient::new(&config.zillow)?;
    let realtor = RealtorClient::new(&config.realtor)?;

    // 3️⃣ Fetch → normalize → merge → impute → export
    let pipeline = Pipeline::new(cli.options(config.request_delay));
    let report = pipeline.run(&zillow, &realtor, &cli.query())?;

    match report.output {
        Some(path) => println!(
            "Data exported successfully to {} ({} properties, {} schools, {} dropped)",
            path.display(),
            report.listings.len(),
            report.schools.len(),
            report.dropped
        ),
        None => println!("No properties found for the given criteria."),
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging();

    if let Err(e) = run(&cli) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
