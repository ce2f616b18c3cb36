use crate::infra::{AppState, BookingContext};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stayfinder::booking::{
    DayAvailability, LedgerError, ListingId, ReservationOutcome, ReservationRequest,
};
use stayfinder::catalog::{
    haversine_miles, CatalogSummary, Coordinates, Landmark, Listing, ListingFilter,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchRequest {
    #[serde(default)]
    pub(crate) filter: ListingFilter,
    #[serde(default)]
    pub(crate) custom_location: Option<Coordinates>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchResponse {
    pub(crate) summary: CatalogSummary,
    pub(crate) listings: Vec<ListingView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListingView {
    pub(crate) id: ListingId,
    pub(crate) name: String,
    pub(crate) host_name: String,
    pub(crate) neighborhood: String,
    pub(crate) room_type: &'static str,
    pub(crate) price: u32,
    pub(crate) minimum_nights: u32,
    pub(crate) distances: Vec<LandmarkDistance>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LandmarkDistance {
    pub(crate) landmark: String,
    pub(crate) miles: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvailabilityResponse {
    pub(crate) listing_id: ListingId,
    pub(crate) days: Vec<DayAvailability>,
}

pub(crate) fn with_booking_routes(context: BookingContext) -> Router {
    booking_router(context)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) fn booking_router(context: BookingContext) -> Router {
    Router::new()
        .route("/api/v1/listings/search", post(search_handler))
        .route(
            "/api/v1/listings/:listing_id/availability",
            get(availability_handler),
        )
        .route("/api/v1/reservations", post(reserve_handler))
        .with_state(context)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn search_handler(
    State(context): State<BookingContext>,
    Json(payload): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let SearchRequest {
        filter,
        custom_location,
    } = payload;

    let mut landmarks: Vec<Landmark> = context.landmarks.as_ref().clone();
    if let Some(coordinates) = custom_location {
        landmarks.push(Landmark {
            name: "Custom Location".to_string(),
            coordinates,
        });
    }

    let matched = filter.apply(&context.catalog);
    let summary = CatalogSummary::from_listings(&matched);
    let listings = matched
        .into_iter()
        .map(|listing| listing_view(listing, &landmarks))
        .collect();

    Json(SearchResponse { summary, listings })
}

fn listing_view(listing: &Listing, landmarks: &[Landmark]) -> ListingView {
    let distances = landmarks
        .iter()
        .map(|landmark| LandmarkDistance {
            landmark: landmark.name.clone(),
            miles: haversine_miles(listing.coordinates(), landmark.coordinates),
        })
        .collect();

    ListingView {
        id: listing.id,
        name: listing.name.clone(),
        host_name: listing.host_name.clone(),
        neighborhood: listing.neighborhood.clone(),
        room_type: listing.room_type.label(),
        price: listing.price,
        minimum_nights: listing.minimum_nights,
        distances,
    }
}

pub(crate) async fn availability_handler(
    State(context): State<BookingContext>,
    Path(listing_id): Path<String>,
) -> Response {
    let listing_id = match listing_id.parse::<ListingId>() {
        Ok(id) => id,
        Err(_) => {
            let payload = json!({ "error": "listing id must be numeric" });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let days = {
        let engine = context.engine.lock().expect("engine mutex poisoned");
        engine.availability(listing_id)
    };

    match days {
        Ok(days) => {
            let payload = AvailabilityResponse { listing_id, days };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(LedgerError::UnknownListing(id)) => {
            let payload = json!({ "error": format!("listing {id} is not tracked") });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn reserve_handler(
    State(context): State<BookingContext>,
    Json(request): Json<ReservationRequest>,
) -> Response {
    let today = Local::now().date_naive();

    let outcome = {
        let mut engine = context.engine.lock().expect("engine mutex poisoned");
        engine.attempt_reservation(&request, today)
    };

    match outcome {
        Ok(ReservationOutcome::Confirmed(record)) => {
            let payload = json!({
                "status": "confirmed",
                "reservation": record,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Ok(ReservationOutcome::Rejected(reason)) => {
            let payload = json!({
                "status": "rejected",
                "error": reason.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Ok(ReservationOutcome::Unavailable) => {
            let payload = json!({
                "status": "unavailable",
                "error": "requested dates are unavailable for this listing",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::BookingContext;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Duration, NaiveDate};
    use serde_json::Value;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use stayfinder::booking::{AuditLog, BookingEngine, Horizon, LedgerStore};
    use stayfinder::catalog::ListingCatalog;
    use tower::ServiceExt;

    const SAMPLE_CSV: &str = "\
id,name,host_name,neighbourhood,latitude,longitude,room_type,price,minimum_nights
100,Sunny studio near MIT,Simone,Area 2/MIT,42.3601,-71.0942,Entire home/apt,120,2
205,Riverside guest room,Hart,Riverside,42.3550,-71.1100,Private room,60,1
";

    fn build_context(dir: &std::path::Path) -> BookingContext {
        let catalog = ListingCatalog::from_reader(Cursor::new(SAMPLE_CSV)).expect("sample loads");
        // Anchor the horizon at the real current date so requests a few days
        // out validate against the handler's clock.
        let reference = Local::now().date_naive();
        let horizon = Horizon::new(reference, 90).expect("valid horizon");
        let engine = BookingEngine::open(
            horizon,
            catalog.listing_ids(),
            LedgerStore::new(dir.join("booking.csv")),
            AuditLog::new(dir.join("log.txt")),
        )
        .expect("engine opens");

        BookingContext {
            engine: Arc::new(Mutex::new(engine)),
            catalog: Arc::new(catalog),
            landmarks: Arc::new(Landmark::cambridge_defaults()),
        }
    }

    fn reservation_body(listing_id: &str, start: NaiveDate, end: NaiveDate) -> Value {
        json!({
            "listing_id": listing_id,
            "start_date": start.format("%Y-%m-%d").to_string(),
            "end_date": end.format("%Y-%m-%d").to_string(),
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "phone": "6175551234",
        })
    }

    async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
            .expect("request");

        let response = router.clone().oneshot(request).await.expect("dispatch");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json");
        (status, payload)
    }

    #[tokio::test]
    async fn search_returns_views_with_landmark_distances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = booking_router(build_context(dir.path()));

        let (status, payload) = post_json(
            &router,
            "/api/v1/listings/search",
            json!({ "filter": { "max_price": 100 } }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let listings = payload["listings"].as_array().expect("listings array");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0]["id"], json!(205));
        let distances = listings[0]["distances"].as_array().expect("distances");
        assert_eq!(distances.len(), 5);
        assert_eq!(payload["summary"]["total"], json!(1));
    }

    #[tokio::test]
    async fn search_includes_a_custom_location_distance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = booking_router(build_context(dir.path()));

        let (status, payload) = post_json(
            &router,
            "/api/v1/listings/search",
            json!({
                "custom_location": { "latitude": 42.36, "longitude": -71.09 },
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let listings = payload["listings"].as_array().expect("listings array");
        let distances = listings[0]["distances"].as_array().expect("distances");
        assert_eq!(distances.len(), 6);
        assert_eq!(distances[5]["landmark"], json!("Custom Location"));
    }

    #[tokio::test]
    async fn reservation_flow_confirms_then_conflicts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = booking_router(build_context(dir.path()));

        let start = Local::now().date_naive() + Duration::days(5);
        let end = start + Duration::days(2);

        let (status, payload) =
            post_json(&router, "/api/v1/reservations", reservation_body("100", start, end)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payload["status"], json!("confirmed"));
        assert_eq!(payload["reservation"]["listing_id"], json!(100));

        let overlap_start = start + Duration::days(1);
        let overlap_end = end + Duration::days(1);
        let (status, payload) = post_json(
            &router,
            "/api/v1/reservations",
            reservation_body("100", overlap_start, overlap_end),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(payload["status"], json!("unavailable"));
    }

    #[tokio::test]
    async fn malformed_contact_details_are_rejected_with_a_reason() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = booking_router(build_context(dir.path()));

        let start = Local::now().date_naive() + Duration::days(5);
        let mut body = reservation_body("100", start, start + Duration::days(2));
        body["phone"] = json!("617-555-1234");

        let (status, payload) = post_json(&router, "/api/v1/reservations", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(payload["status"], json!("rejected"));
        assert_eq!(payload["error"], json!("invalid phone number"));
    }

    #[tokio::test]
    async fn availability_view_tracks_committed_bookings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = booking_router(build_context(dir.path()));

        let start = Local::now().date_naive() + Duration::days(5);
        post_json(
            &router,
            "/api/v1/reservations",
            reservation_body("205", start, start + Duration::days(1)),
        )
        .await;

        let request = Request::builder()
            .method("GET")
            .uri("/api/v1/listings/205/availability")
            .body(Body::empty())
            .expect("request");
        let response = router.clone().oneshot(request).await.expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json");
        let days = payload["days"].as_array().expect("days array");
        assert_eq!(days.len(), 90);
        let booked = days
            .iter()
            .filter(|day| day["available"] == json!(false))
            .count();
        assert_eq!(booked, 2);
    }

    #[tokio::test]
    async fn unknown_listing_availability_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = booking_router(build_context(dir.path()));

        let request = Request::builder()
            .method("GET")
            .uri("/api/v1/listings/9999/availability")
            .body(Body::empty())
            .expect("request");
        let response = router.clone().oneshot(request).await.expect("dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
