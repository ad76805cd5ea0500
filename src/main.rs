use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::{info, LevelFilter};

mod cli;
mod config;
mod content;
mod failure;
mod handler;
mod html;
mod listing;
mod request;
mod response;
mod script;
mod server;
mod status;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    match cli {
        Cli::Serve(config) => {
            let server = server::Server::try_from(&config)?;
            info!(
                "Serving {} on http://{}",
                server.root().display(),
                server.local_addr()?
            );
            server.run()?;
        }
    }
    Ok(())
}
