use clap::Parser;
use finance_api::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let code = cli::run(Cli::parse()).await;
    std::process::exit(code);
}
