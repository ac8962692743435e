//! Location lookup for quest placement.
//!
//! Names coarse regions offline and, when a Google Maps key is configured,
//! snaps generated quests onto a real nearby place of a category-relevant
//! type via the Places Nearby Search API. Every failure keeps the requested
//! coordinates.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use commupath_models::{Category, Coordinates, Location};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

const PLACES_API_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Default search radius in metres.
pub const DEFAULT_RADIUS_M: u32 = 2000;

/// Places API hard cap on the radius.
const MAX_RADIUS_M: u32 = 50_000;

/// Nearby results are cached for one hour.
const CACHE_TTL_SECS: i64 = 60 * 60;

/// Upper bound on cached nearby searches.
const MAX_CACHE_ENTRIES: usize = 1000;

/// Place types searched per category; only the first two are queried.
pub fn place_types(category: Category) -> &'static [&'static str] {
    match category {
        Category::Environment => &["park", "campground", "natural_feature", "tourist_attraction"],
        Category::Education => &["school", "university", "library", "primary_school"],
        Category::Health => &["hospital", "doctor", "pharmacy", "dentist"],
        Category::Social => &["community_center", "church", "mosque", "town_hall"],
    }
}

/// Human-readable name of the region around `coordinates`.
pub fn region_name(coordinates: Coordinates) -> String {
    let Coordinates { lat, lng } = coordinates;
    if (7.3..=7.5).contains(&lat) && (3.8..=4.0).contains(&lng) {
        "Ibadan, Nigeria".to_string()
    } else if (6.4..=6.6).contains(&lat) && (3.3..=3.5).contains(&lng) {
        "Lagos, Nigeria".to_string()
    } else if (-1.3..=-1.2).contains(&lat) && (36.8..=36.9).contains(&lng) {
        "Nairobi, Kenya".to_string()
    } else {
        format!("Location near ({lat:.2}, {lng:.2})")
    }
}

/// A place returned by the nearby search.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub place_id: Option<String>,
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: u64,
    pub business_status: String,
}

/// Suitability of a place for hosting a quest, in `[0, 1]`.
///
/// Rating 40%, review count (saturating at 100) 30%, operational 20%,
/// high-value type 10%.
pub fn place_quality_score(place: &Place) -> f64 {
    let mut score = 0.0;
    if let Some(rating) = place.rating {
        score += (rating / 5.0) * 0.4;
    }
    score += (place.user_ratings_total.min(100) as f64 / 100.0) * 0.3;
    if place.business_status == "OPERATIONAL" {
        score += 0.2;
    }
    const HIGH_VALUE: [&str; 4] = ["park", "school", "hospital", "community_center"];
    if place.types.iter().any(|t| HIGH_VALUE.contains(&t.as_str())) {
        score += 0.1;
    }
    score.min(1.0)
}

// -----------------------------------------------------------------------------
// Places API wire types
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
}

#[derive(Deserialize)]
struct RawPlace {
    name: Option<String>,
    vicinity: Option<String>,
    geometry: Option<RawGeometry>,
    place_id: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
    business_status: Option<String>,
}

#[derive(Deserialize)]
struct RawGeometry {
    location: Coordinates,
}

impl RawPlace {
    fn into_place(self) -> Option<Place> {
        let coordinates = self.geometry?.location;
        Some(Place {
            name: self.name.unwrap_or_else(|| "Unknown Location".to_string()),
            address: self.vicinity.unwrap_or_default(),
            coordinates,
            place_id: self.place_id,
            types: self.types,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total.unwrap_or(0),
            business_status: self
                .business_status
                .unwrap_or_else(|| "OPERATIONAL".to_string()),
        })
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    places: Vec<Place>,
    expires_at: DateTime<Utc>,
}

// -----------------------------------------------------------------------------
// Service
// -----------------------------------------------------------------------------

/// Google Places backed location service.
#[derive(Debug)]
pub struct LocationService {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl LocationService {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("GOOGLE_MAPS_API_KEY not set - quests keep requested coordinates");
        }
        Self {
            http,
            api_key,
            base_url: PLACES_API_URL.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Override the Places endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn cache_key(center: Coordinates, category: Category, radius: u32) -> String {
        // ~11 m precision
        format!("{:.4}:{:.4}:{}:{}", center.lat, center.lng, category, radius)
    }

    fn cached(&self, key: &str) -> Option<Vec<Place>> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(key)
            .filter(|e| Utc::now() < e.expires_at)
            .map(|e| e.places.clone())
    }

    fn store(&self, key: String, places: &[Place]) {
        if let Ok(mut cache) = self.cache.lock() {
            let now = Utc::now();
            cache.retain(|_, e| now < e.expires_at);
            if cache.len() >= MAX_CACHE_ENTRIES && !cache.contains_key(&key) {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    cache.remove(&oldest);
                }
            }
            cache.insert(
                key,
                CacheEntry {
                    places: places.to_vec(),
                    expires_at: now + Duration::seconds(CACHE_TTL_SECS),
                },
            );
        }
    }

    /// Nearby places of category-relevant types, at most `max_results`.
    ///
    /// Returns an empty list when unconfigured or when every request fails.
    /// Only answers the API actually gave are cached.
    pub async fn find_nearby_places(
        &self,
        center: Coordinates,
        category: Category,
        radius: u32,
        max_results: usize,
    ) -> Vec<Place> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Vec::new();
        };
        let radius = radius.min(MAX_RADIUS_M);
        let key = Self::cache_key(center, category, radius);
        if let Some(places) = self.cached(&key) {
            debug!(%category, "nearby places served from cache");
            return places.into_iter().take(max_results).collect();
        }

        let mut places = Vec::new();
        let mut answered = false;
        for place_type in place_types(category).iter().take(2) {
            let location = format!("{},{}", center.lat, center.lng);
            let radius = radius.to_string();
            let result = self
                .http
                .get(&self.base_url)
                .query(&[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("type", place_type),
                    ("language", "en"),
                    ("key", api_key),
                ])
                .send()
                .await;

            let resp = match result {
                Ok(r) if r.status().is_success() => r,
                Ok(r) => {
                    warn!(status = %r.status(), place_type, "places request failed");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, place_type, "places request failed");
                    continue;
                }
            };

            match resp.json::<NearbyResponse>().await {
                Ok(body) if body.status == "OK" => {
                    answered = true;
                    places.extend(
                        body.results
                            .into_iter()
                            .filter_map(RawPlace::into_place)
                            .take(3),
                    );
                }
                Ok(body) if body.status == "ZERO_RESULTS" => {
                    answered = true;
                    debug!(place_type, "no places of this type nearby");
                }
                Ok(body) => warn!(status = %body.status, place_type, "places API error status"),
                Err(e) => warn!(error = %e, place_type, "places response parse error"),
            }
        }

        places.truncate(max_results);
        if answered {
            self.store(key, &places);
        }
        info!(%category, count = places.len(), "nearby places resolved");
        places
    }

    /// Where a quest generated at `requested` should be placed.
    pub async fn place_quest(&self, requested: Coordinates, category: Category) -> Location {
        let places = self
            .find_nearby_places(requested, category, DEFAULT_RADIUS_M, 5)
            .await;
        match best_place(&places) {
            Some(place) => Location {
                lat: place.coordinates.lat,
                lng: place.coordinates.lng,
                name: Some(place.name.clone()),
                address: Some(place.address.clone()).filter(|a| !a.is_empty()),
            },
            None => Location {
                name: Some(region_name(requested)),
                ..Location::from(requested)
            },
        }
    }
}

/// Highest-scoring place; earlier places win ties.
pub fn best_place(places: &[Place]) -> Option<&Place> {
    places.iter().fold(None, |best: Option<&Place>, p| match best {
        Some(b) if place_quality_score(b) >= place_quality_score(p) => Some(b),
        _ => Some(p),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, rating: Option<f64>, reviews: u64, types: &[&str]) -> Place {
        Place {
            name: name.into(),
            address: String::new(),
            coordinates: Coordinates::new(7.40, 3.90),
            place_id: None,
            types: types.iter().map(|t| t.to_string()).collect(),
            rating,
            user_ratings_total: reviews,
            business_status: "OPERATIONAL".into(),
        }
    }

    #[test]
    fn region_names() {
        assert_eq!(region_name(Coordinates::new(7.3775, 3.9470)), "Ibadan, Nigeria");
        assert_eq!(region_name(Coordinates::new(6.5, 3.4)), "Lagos, Nigeria");
        assert_eq!(region_name(Coordinates::new(-1.25, 36.85)), "Nairobi, Kenya");
        assert_eq!(
            region_name(Coordinates::new(51.5074, -0.1278)),
            "Location near (51.51, -0.13)"
        );
    }

    #[test]
    fn quality_score_weights() {
        let perfect = place("Agodi Gardens", Some(5.0), 250, &["park"]);
        assert!((place_quality_score(&perfect) - 1.0).abs() < 1e-9);

        let mut bare = place("Somewhere", None, 0, &["point_of_interest"]);
        bare.business_status = "CLOSED_TEMPORARILY".into();
        assert_eq!(place_quality_score(&bare), 0.0);

        let half = place("Library", Some(2.5), 50, &["library"]);
        assert!((place_quality_score(&half) - (0.2 + 0.15 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn best_place_prefers_score_then_order() {
        let a = place("A", Some(3.0), 10, &[]);
        let b = place("B", Some(4.5), 80, &["park"]);
        let c = place("C", Some(4.5), 80, &["park"]);
        let places = vec![a, b, c];
        assert_eq!(best_place(&places).map(|p| p.name.as_str()), Some("B"));
        assert!(best_place(&[]).is_none());
    }

    #[tokio::test]
    async fn unconfigured_service_keeps_requested_point() {
        let svc = LocationService::new(Client::new(), None);
        assert!(!svc.is_configured());
        let loc = svc
            .place_quest(Coordinates::new(7.3775, 3.9470), Category::Environment)
            .await;
        assert_eq!(loc.lat, 7.3775);
        assert_eq!(loc.lng, 3.9470);
        assert_eq!(loc.name.as_deref(), Some("Ibadan, Nigeria"));
    }

    #[test]
    fn cache_drops_expired_and_stays_bounded() {
        let svc = LocationService::new(Client::new(), Some("k".into()));
        {
            let mut cache = svc.cache.lock().unwrap();
            cache.insert(
                "stale".into(),
                CacheEntry {
                    places: Vec::new(),
                    expires_at: Utc::now() - Duration::seconds(1),
                },
            );
        }
        svc.store("fresh".into(), &[]);
        {
            let cache = svc.cache.lock().unwrap();
            assert!(!cache.contains_key("stale"));
            assert!(cache.contains_key("fresh"));
        }

        for i in 0..MAX_CACHE_ENTRIES + 10 {
            svc.store(format!("key-{i}"), &[]);
        }
        let cache = svc.cache.lock().unwrap();
        assert_eq!(cache.len(), MAX_CACHE_ENTRIES);
        assert!(cache.contains_key(&format!("key-{}", MAX_CACHE_ENTRIES + 9)));
    }

    #[test]
    fn raw_place_without_geometry_is_skipped() {
        let raw: RawPlace = serde_json::from_value(serde_json::json!({
            "name": "Nowhere"
        }))
        .unwrap();
        assert!(raw.into_place().is_none());
    }
}
