//! Location snapping against an in-process Places stand-in.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use commupath_core::location::LocationService;
use commupath_models::{Category, Coordinates};
use serde_json::json;

#[derive(Default)]
struct Places {
    hits: AtomicUsize,
    /// Requests answered with 503 before the service recovers.
    failures: usize,
    types: std::sync::Mutex<Vec<String>>,
}

async fn nearby(
    State(places): State<Arc<Places>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let n = places.hits.fetch_add(1, Ordering::SeqCst);
    if n < places.failures {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    assert_eq!(params.get("key").map(String::as_str), Some("maps-key"));
    let place_type = params.get("type").cloned().unwrap_or_default();
    places.types.lock().unwrap().push(place_type.clone());
    if place_type != "park" {
        return Json(json!({"status": "ZERO_RESULTS", "results": []})).into_response();
    }
    Json(json!({
        "status": "OK",
        "results": [
            {
                "name": "Corner Kiosk",
                "vicinity": "Mokola Road",
                "geometry": {"location": {"lat": 7.3990, "lng": 3.8990}},
                "types": ["store"],
                "rating": 3.1,
                "user_ratings_total": 4,
                "business_status": "OPERATIONAL"
            },
            {
                "name": "Agodi Gardens",
                "vicinity": "Agodi, Ibadan",
                "geometry": {"location": {"lat": 7.4081, "lng": 3.9120}},
                "types": ["park", "tourist_attraction"],
                "rating": 4.5,
                "user_ratings_total": 1200,
                "business_status": "OPERATIONAL"
            }
        ]
    }))
    .into_response()
}

async fn start(failures: usize) -> (String, Arc<Places>) {
    let places = Arc::new(Places {
        failures,
        ..Places::default()
    });
    let app = Router::new()
        .route("/nearbysearch/json", get(nearby))
        .with_state(places.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/nearbysearch/json"), places)
}

fn service(url: &str) -> LocationService {
    LocationService::new(reqwest::Client::new(), Some("maps-key".into())).with_base_url(url)
}

const IBADAN: Coordinates = Coordinates {
    lat: 7.3775,
    lng: 3.9470,
};

#[tokio::test]
async fn quest_snaps_to_best_nearby_place() {
    let (url, places) = start(0).await;
    let svc = service(&url);

    let loc = svc.place_quest(IBADAN, Category::Environment).await;
    assert_eq!(loc.name.as_deref(), Some("Agodi Gardens"));
    assert_eq!(loc.address.as_deref(), Some("Agodi, Ibadan"));
    assert_eq!((loc.lat, loc.lng), (7.4081, 3.9120));
    assert_eq!(*places.types.lock().unwrap(), vec!["park", "campground"]);

    // Same spot again is served from cache.
    let again = svc.place_quest(IBADAN, Category::Environment).await;
    assert_eq!(again, loc);
    assert_eq!(places.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn outage_is_not_cached() {
    let (url, places) = start(2).await;
    let svc = service(&url);

    let first = svc.place_quest(IBADAN, Category::Environment).await;
    assert_eq!(first.name.as_deref(), Some("Ibadan, Nigeria"));
    assert_eq!((first.lat, first.lng), (IBADAN.lat, IBADAN.lng));

    let second = svc.place_quest(IBADAN, Category::Environment).await;
    assert_eq!(second.name.as_deref(), Some("Agodi Gardens"));
    assert_eq!(places.hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn zero_results_keep_requested_point() {
    let (url, places) = start(0).await;
    let svc = service(&url);

    let loc = svc.place_quest(IBADAN, Category::Health).await;
    assert_eq!(loc.name.as_deref(), Some("Ibadan, Nigeria"));
    assert_eq!((loc.lat, loc.lng), (IBADAN.lat, IBADAN.lng));

    svc.place_quest(IBADAN, Category::Health).await;
    assert_eq!(places.hits.load(Ordering::SeqCst), 2);
}
