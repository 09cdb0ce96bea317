//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "geocoding.anchor_region")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    let geo = &config.geocoding;
    println!("[geocoding]");
    println!("endpoint = \"{}\"", geo.endpoint);
    println!("country_codes = \"{}\"", geo.country_codes);
    println!("viewbox = \"{}\"", geo.viewbox);
    println!("bounded = {}", geo.bounded);
    println!("anchor_region = \"{}\"", geo.anchor_region);
    println!("anchor_aliases = {:?}", geo.anchor_aliases);
    println!("debounce_ms = {}", geo.debounce_ms);
    println!("user_agent = \"{}\"", geo.user_agent);
    println!();

    println!("[geocoding.abbreviations]");
    let mut abbreviations: Vec<_> = geo.abbreviations.iter().collect();
    abbreviations.sort();
    for (abbr, full) in abbreviations {
        println!("\"{}\" = \"{}\"", abbr, full);
    }
    println!();

    println!("[ai]");
    println!("endpoint = \"{}\"", config.ai.endpoint);
    println!("model = \"{}\"", config.ai.model);
    match config.api_key() {
        Some(_) => println!("api_key_env = \"{}\" # set", config.ai.api_key_env),
        None => println!("api_key_env = \"{}\" # not set", config.ai.api_key_env),
    }
    println!();

    println!("[map]");
    println!("center_lat = {}", config.map.center_lat);
    println!("center_lng = {}", config.map.center_lng);
    println!("default_zoom = {}", config.map.default_zoom);
    println!("focus_zoom = {}", config.map.focus_zoom);
    println!("fit_padding = {}", config.map.fit_padding);
}
