mod app;
mod config;

use clap::Parser;
use color_eyre::eyre::Error;
use tracing_subscriber::EnvFilter;

use crate::app::{
    App,
    Args,
};

fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    App::new(args.options)?.run(args.command)?;

    Ok(())
}
