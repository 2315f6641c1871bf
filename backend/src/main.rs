use clap::Parser;

use cert_allowance::io::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = io::run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
