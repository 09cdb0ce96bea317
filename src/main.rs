//! cafe-scout CLI entry point
//!
//! Café recommendation chat - web app + developer tools

use cafe_scout::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
