//! cafe-scout: Vietnamese café recommendation chat
//!
//! A small web app where the user describes what café they want, a
//! generative-AI backend answers with structured recommendations, and the
//! page shows the reply as chat text cross-linked with map pins.
//!
//! ## Features
//!
//! - Vietnamese address normalization and a geocoding fallback ladder
//! - Strictly validated AI recommendations (Gemini)
//! - Chat links and map markers sharing one selection
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use cafe_scout::geo::candidates::QueryCandidateBuilder;
//! use cafe_scout::geo::normalize::AddressNormalizer;
//!
//! let raw = "12 Nguyễn Văn Bảo, p.4, q. Gò Vấp";
//! let normalized = AddressNormalizer::default().normalize(raw);
//! assert!(normalized.contains("Ward 4"));
//!
//! for query in QueryCandidateBuilder::default().build(raw, &normalized) {
//!     println!("{}", query);
//! }
//! ```

pub mod ai;
pub mod chat;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod map;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use chat::{Message, Place};
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{Coordinates, GeoLocation};
pub use session::Session;
