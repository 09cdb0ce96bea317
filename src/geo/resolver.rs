//! Address resolution
//!
//! Walks the candidate ladder against a [`GeoBackend`], one lookup per
//! candidate, and keeps the first hit. Failed lookups are logged and the
//! walk moves on; running out of candidates is "not found", never an error.

use crate::config::GeocodingConfig;
use crate::constants::location::CURRENT_LOCATION;
use crate::geo::candidates::QueryCandidateBuilder;
use crate::geo::normalize::AddressNormalizer;
use crate::geo::{Coordinates, GeoBackend, GeoLocation};
use tracing::{debug, info, warn};

/// What the settings location text asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationInput<'a> {
    /// Nothing typed: held coordinates must be cleared
    Empty,
    /// Device geolocation already supplied coordinates
    CurrentLocation,
    /// Free text that needs geocoding
    Address(&'a str),
}

impl<'a> LocationInput<'a> {
    pub fn classify(location: &'a str) -> Self {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else if trimmed.starts_with(CURRENT_LOCATION) {
            Self::CurrentLocation
        } else {
            Self::Address(location)
        }
    }
}

/// A successful resolution
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The candidate query that produced the hit
    pub query: String,
    pub location: GeoLocation,
}

impl Resolved {
    pub fn coordinates(&self) -> Coordinates {
        self.location.coordinates()
    }
}

/// Resolves free-text addresses through a geocoding backend
#[derive(Debug, Clone)]
pub struct GeocodeResolver<B> {
    backend: B,
    normalizer: AddressNormalizer,
    builder: QueryCandidateBuilder,
}

impl<B: GeoBackend> GeocodeResolver<B> {
    pub fn new(backend: B, normalizer: AddressNormalizer, builder: QueryCandidateBuilder) -> Self {
        Self {
            backend,
            normalizer,
            builder,
        }
    }

    /// Create a resolver using the configured tables and anchor region
    pub fn from_config(backend: B, config: &GeocodingConfig) -> Self {
        Self::new(
            backend,
            AddressNormalizer::from_config(config),
            QueryCandidateBuilder::from_config(config),
        )
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The query ladder for one raw address
    pub fn candidates(&self, raw: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(raw);
        self.builder.build(raw, &normalized)
    }

    /// Resolve a raw address
    ///
    /// Callers must not pass empty input or the current-location sentinel;
    /// see [`LocationInput::classify`].
    pub async fn resolve(&self, raw: &str) -> Option<Resolved> {
        let candidates = self.candidates(raw);
        debug!("Geocoding {:?} with {} candidates", raw, candidates.len());

        let resolved = self.resolve_candidates(&candidates).await;
        match &resolved {
            Some(hit) => info!(
                "Geocode successful for {:?}. Found: {} [{}, {}]",
                raw, hit.location.display_name, hit.location.lat, hit.location.lng
            ),
            None => info!(
                "Geocode was not successful for {:?}. No results after trying all queries",
                raw
            ),
        }
        resolved
    }

    /// Try candidates in order and stop at the first usable hit
    pub async fn resolve_candidates(&self, candidates: &[String]) -> Option<Resolved> {
        for query in candidates {
            match self.backend.geocode(query).await {
                Ok(Some(location)) => {
                    if let Err(e) = location.coordinates().validate() {
                        warn!("Ignoring geocode hit for {:?}: {}", query, e);
                        continue;
                    }
                    info!("Geocoder matched query {:?}", query);
                    return Some(Resolved {
                        query: query.clone(),
                        location,
                    });
                }
                Ok(None) => debug!("No geocode match for {:?}", query),
                Err(e) => warn!("Geocoding failed for query {:?}: {}", query, e),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::testing::{Scripted, StubGeocoder};

    fn resolver(stub: StubGeocoder) -> GeocodeResolver<StubGeocoder> {
        GeocodeResolver::from_config(stub, &GeocodingConfig::default())
    }

    fn queries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_hit_wins_and_stops() {
        let stub = StubGeocoder::new()
            .with("a", Scripted::Fail)
            .with("b", Scripted::Miss)
            .with("c", Scripted::Hit(10.78, 106.70))
            .with("d", Scripted::Hit(0.0, 0.0));
        let resolver = resolver(stub);

        let hit = resolver
            .resolve_candidates(&queries(&["a", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(hit.query, "c");
        assert_eq!(hit.coordinates(), Coordinates::new(10.78, 106.70));
        assert_eq!(resolver.backend.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_all_failures_are_not_found() {
        let stub = StubGeocoder::new()
            .with("a", Scripted::Fail)
            .with("b", Scripted::Fail);
        let resolver = resolver(stub);

        assert!(resolver.resolve_candidates(&queries(&["a", "b"])).await.is_none());
        assert_eq!(resolver.backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_not_found() {
        let resolver = resolver(StubGeocoder::new());
        assert!(resolver.resolve_candidates(&[]).await.is_none());
        assert!(resolver.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_hit_is_skipped() {
        let stub = StubGeocoder::new()
            .with("a", Scripted::Hit(f64::NAN, 106.7))
            .with("b", Scripted::Hit(10.8, 106.7));
        let resolver = resolver(stub);

        let hit = resolver.resolve_candidates(&queries(&["a", "b"])).await.unwrap();
        assert_eq!(hit.query, "b");
    }

    #[tokio::test]
    async fn test_resolve_walks_the_ladder() {
        let stub = StubGeocoder::new().with(
            "123/4 Lê Lợi, Ho Chi Minh City, Vietnam",
            Scripted::Hit(10.7731, 106.7004),
        );
        let resolver = resolver(stub);

        let hit = resolver.resolve("123/4 Lê Lợi").await.unwrap();

        assert_eq!(hit.query, "123/4 Lê Lợi, Ho Chi Minh City, Vietnam");
        assert_eq!(
            resolver.backend.calls(),
            vec!["123/4 Lê Lợi", "Lê Lợi", "123/4 Lê Lợi, Ho Chi Minh City, Vietnam"]
        );
    }

    #[test]
    fn test_classify_location_input() {
        assert_eq!(LocationInput::classify(""), LocationInput::Empty);
        assert_eq!(LocationInput::classify("  "), LocationInput::Empty);
        assert_eq!(
            LocationInput::classify(CURRENT_LOCATION),
            LocationInput::CurrentLocation
        );
        assert_eq!(
            LocationInput::classify("Vị trí hiện tại của bạn (GPS)"),
            LocationInput::CurrentLocation
        );
        assert_eq!(
            LocationInput::classify("Quận 3"),
            LocationInput::Address("Quận 3")
        );
    }
}
