//! Geocode command handler
//!
//! Prints the query ladder for an address and, unless `--dry-run` is
//! given, resolves it against the configured geocoder.

use crate::config::Config;
use crate::error::Result;
use crate::geo::get_geocoder;
use crate::geo::resolver::{GeocodeResolver, LocationInput};
use clap::Args;

/// Geocode command arguments
#[derive(Args, Debug)]
pub struct GeocodeArgs {
    /// Free-text address, e.g. "123/4 Lê Lợi, Q.1"
    pub address: String,

    /// Only print the candidate queries
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the geocode command
pub async fn run(args: GeocodeArgs) -> Result<()> {
    super::init_logging();

    let config = Config::load()?;
    let geocoder = get_geocoder(&config.geocoding)?;
    let resolver = GeocodeResolver::from_config(geocoder, &config.geocoding);

    match LocationInput::classify(&args.address) {
        LocationInput::Empty => {
            println!("Address is empty; coordinates would be cleared");
            return Ok(());
        }
        LocationInput::CurrentLocation => {
            println!("Address is the device-location placeholder; nothing to geocode");
            return Ok(());
        }
        LocationInput::Address(_) => {}
    }

    let candidates = resolver.candidates(&args.address);
    println!("Candidate queries:");
    for (i, query) in candidates.iter().enumerate() {
        println!("  {}. {}", i + 1, query);
    }

    if args.dry_run {
        return Ok(());
    }

    println!();
    match resolver.resolve_candidates(&candidates).await {
        Some(hit) => {
            println!("Matched: {}", hit.query);
            println!("  {}", hit.location.display_name);
            println!("  {:.6}, {:.6}", hit.location.lat, hit.location.lng);
        }
        None => println!("No match for {:?}", args.address),
    }

    Ok(())
}
