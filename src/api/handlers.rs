// api/handlers.rs

use crate::api::{ApiError, AppState};
use crate::model::{Comparison, Feedback, InboxReport};
use crate::utils::{clean_optional, clean_required};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const FEATURE_SITE_VISIT: &str = "Site visit";
pub const FEATURE_BUY: &str = "Buy";
pub const FEATURE_BARTER: &str = "Barter";

#[derive(Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub catalog_entries: usize,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    #[serde(default)]
    pub crop: String,
}

#[derive(Debug, Serialize)]
pub struct BuyResponse {
    pub crop: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct BarterRequest {
    #[serde(default)]
    pub crop1: String,
    #[serde(default)]
    pub crop2: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Records a feature use. A storage failure is logged and otherwise ignored.
async fn record_usage(state: &AppState, feature: &str, details: &str) {
    if let Err(e) = state.storage.lock().await.record_usage(feature, Some(details)) {
        warn!("Usage record for {} failed: {}", feature, e);
    }
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Json<IndexResponse> {
    record_usage(&state, FEATURE_SITE_VISIT, "1").await;
    Json(IndexResponse {
        service: env!("CARGO_PKG_NAME"),
        catalog_entries: state.catalog.snapshot().await.len(),
    })
}

/// GET /health
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

/// GET /autocomplete?term=
pub async fn autocomplete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AutocompleteQuery>,
) -> Json<Vec<String>> {
    let term = query.term.to_uppercase();
    Json(state.catalog.snapshot().await.search(&term))
}

/// POST /buy
pub async fn buy(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BuyRequest>, JsonRejection>,
) -> Result<Json<BuyResponse>, ApiError> {
    let Json(request) = payload?;
    let crop = clean_required("crop", &request.crop).map_err(ApiError::Validation)?;
    info!("Handling buy: {}", crop);
    record_usage(&state, FEATURE_BUY, &crop).await;

    let price = state.catalog.snapshot().await.price_of(&crop.to_uppercase())?;
    Ok(Json(BuyResponse { crop, price }))
}

/// POST /barter
pub async fn barter(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BarterRequest>, JsonRejection>,
) -> Result<Json<Comparison>, ApiError> {
    let Json(request) = payload?;
    let crop1 = clean_required("crop1", &request.crop1).map_err(ApiError::Validation)?;
    let crop2 = clean_required("crop2", &request.crop2).map_err(ApiError::Validation)?;
    info!("Handling barter: {} vs {}", crop1, crop2);
    record_usage(
        &state,
        FEATURE_BARTER,
        &format!("Crop1 - {}, Crop2 - {}", crop1, crop2),
    )
    .await;

    let comparison = state
        .catalog
        .snapshot()
        .await
        .compare(&crop1.to_uppercase(), &crop2.to_uppercase())?;
    Ok(Json(comparison))
}

/// POST /feedback
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let Json(request) = payload?;
    let name = clean_optional("name", request.name.as_deref()).map_err(ApiError::Validation)?;
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message: This field is required.".into()));
    }

    let saved = state
        .storage
        .lock()
        .await
        .save_feedback(name.as_deref(), &request.message)?;
    info!("Feedback received: {}", saved);
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /inbox
pub async fn inbox(State(state): State<Arc<AppState>>) -> Result<Json<InboxReport>, ApiError> {
    let report = state.storage.lock().await.inbox_report(Utc::now())?;
    Ok(Json(report))
}

/// POST /refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    info!("Manual price list refresh requested");
    state.refresh_notify.notify_one();
    (
        StatusCode::ACCEPTED,
        Json(StatusResponse {
            status: "refresh scheduled",
        }),
    )
}

#[cfg(test)]
mod tests {
    use crate::api::{ApiKeyAuth, AppState, create_router};
    use crate::catalog::{PriceCatalog, SharedCatalog};
    use crate::parser::parse_price_list;
    use crate::storage::SqliteStorage;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::{Mutex, Notify};
    use tower::ServiceExt;

    const PRICES: &str = "\
ITEM,DESC,CONTAINER,MASS,GRADE,COUNT,LOW,HIGH,AVERAGE PRICE
Apple,RED DELICIOUS,CARTON,18.0,EXTRA FANCY,88,80.0,100.0,90.0
Banana,CAVENDISH,BOX,20.0,FIRST CLASS,100,50.0,70.0,60.0
Orange,NAVEL,BAG,10.0,STANDARD,40,30.0,40.0,35.0
Apple,GRANNY SMITH,CARTON,15.0,EXTRA FANCY,72,70.0,90.0,80.0
Kale,KALE,BUNCH,0,STANDARD,1,1,1,3
";

    struct Harness {
        router: Router,
        storage: Arc<Mutex<SqliteStorage>>,
        refresh_notify: Arc<Notify>,
    }

    fn harness() -> Harness {
        let storage = Arc::new(Mutex::new(SqliteStorage::in_memory().unwrap()));
        let refresh_notify = Arc::new(Notify::new());
        let state = AppState {
            catalog: SharedCatalog::new(PriceCatalog::new(parse_price_list(PRICES).unwrap())),
            storage: storage.clone(),
            auth: ApiKeyAuth::new(vec!["secret".into()]),
            refresh_notify: refresh_notify.clone(),
        };
        Harness {
            router: create_router(state),
            storage,
            refresh_notify,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    // ========== index / health ==========

    #[tokio::test]
    async fn index_records_site_visit() {
        let h = harness();
        let (status, body) = send(&h.router, get("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["catalog_entries"], 5);

        let usage = h.storage.lock().await.list_usage().unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].feature_name, "Site visit");
        assert_eq!(usage[0].details.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let h = harness();
        let (status, body) = send(&h.router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    // ========== autocomplete ==========

    #[tokio::test]
    async fn autocomplete_returns_matching_labels() {
        let h = harness();
        let (status, body) = send(&h.router, get("/autocomplete?term=carton")).await;

        assert_eq!(status, StatusCode::OK);
        let mut labels: Vec<String> = serde_json::from_value(body).unwrap();
        labels.sort();
        assert_eq!(labels, vec!["GRANNY SMITH - CARTON", "RED DELICIOUS - CARTON"]);
    }

    #[tokio::test]
    async fn autocomplete_without_matches_is_empty_array() {
        let h = harness();
        let (status, body) = send(&h.router, get("/autocomplete?term=mango")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn autocomplete_missing_term_lists_everything() {
        let h = harness();
        let (_, body) = send(&h.router, get("/autocomplete")).await;
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn autocomplete_rejects_post() {
        let h = harness();
        let (status, _) = send(&h.router, post_json("/autocomplete", json!({}))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    // ========== buy ==========

    #[tokio::test]
    async fn buy_returns_unit_price_and_records_usage() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            post_json("/buy", json!({ "crop": "Red Delicious - Carton" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "crop": "Red Delicious - Carton", "price": "5.00" }));

        let usage = h.storage.lock().await.list_usage().unwrap();
        assert_eq!(usage[0].feature_name, "Buy");
        assert_eq!(usage[0].details.as_deref(), Some("Red Delicious - Carton"));
    }

    #[tokio::test]
    async fn buy_unknown_crop_is_not_found() {
        let h = harness();
        let (status, body) = send(&h.router, post_json("/buy", json!({ "crop": "mango - box" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Crop not found on list.");
    }

    #[tokio::test]
    async fn buy_zero_mass_is_compute_error() {
        let h = harness();
        let (status, _) = send(&h.router, post_json("/buy", json!({ "crop": "kale - bunch" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn buy_blank_crop_is_rejected_without_usage() {
        let h = harness();
        let (status, _) = send(&h.router, post_json("/buy", json!({ "crop": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.storage.lock().await.usage_total().unwrap(), 0);
    }

    #[tokio::test]
    async fn buy_overlong_crop_is_rejected() {
        let h = harness();
        let crop = "A".repeat(101);
        let (status, _) = send(&h.router, post_json("/buy", json!({ "crop": crop }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ========== barter ==========

    #[tokio::test]
    async fn barter_compares_two_crops() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            post_json(
                "/barter",
                json!({ "crop1": "red delicious - carton", "crop2": "cavendish - box" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "label1": "Red Delicious - Carton",
                "ratio1": "1.67",
                "label2": "Cavendish - Box",
                "ratio2": "0.60",
                "price1": "5.00",
                "price2": "3.00",
            })
        );

        let usage = h.storage.lock().await.list_usage().unwrap();
        assert_eq!(usage[0].feature_name, "Barter");
        assert_eq!(
            usage[0].details.as_deref(),
            Some("Crop1 - red delicious - carton, Crop2 - cavendish - box")
        );
    }

    #[tokio::test]
    async fn barter_with_unknown_crop_is_not_found() {
        let h = harness();
        let (status, _) = send(
            &h.router,
            post_json("/barter", json!({ "crop1": "red delicious - carton", "crop2": "mango - box" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn barter_missing_second_crop_is_rejected() {
        let h = harness();
        let (status, body) = send(&h.router, post_json("/barter", json!({ "crop1": "navel - bag" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("crop2"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_validation_error() {
        let h = harness();
        let (status, body) = send(&h.router, post_json("/buy", json!({ "crop": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/barter")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        assert_eq!(h.storage.lock().await.usage_total().unwrap(), 0);
    }

    // ========== feedback / inbox ==========

    #[tokio::test]
    async fn feedback_is_stored() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            post_json("/feedback", json!({ "name": "Ada", "message": "Please add mangoes" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Ada");

        let messages = h.storage.lock().await.list_feedback().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "Please add mangoes");
    }

    #[tokio::test]
    async fn feedback_blank_name_is_anonymous() {
        let h = harness();
        let (status, body) = send(&h.router, post_json("/feedback", json!({ "name": " ", "message": "hi" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], Value::Null);
    }

    #[tokio::test]
    async fn feedback_requires_message() {
        let h = harness();
        let (status, _) = send(&h.router, post_json("/feedback", json!({ "name": "Ada" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn inbox_requires_api_key() {
        let h = harness();
        let (status, _) = send(&h.router, get("/inbox")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/inbox")
            .header("X-API-Key", "wrong")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn inbox_reports_feedback_and_usage() {
        let h = harness();
        send(&h.router, get("/")).await;
        send(&h.router, post_json("/buy", json!({ "crop": "navel - bag" }))).await;
        send(&h.router, post_json("/buy", json!({ "crop": "navel - bag" }))).await;
        send(&h.router, post_json("/feedback", json!({ "message": "first" }))).await;
        send(&h.router, post_json("/feedback", json!({ "message": "second" }))).await;

        let request = Request::builder()
            .uri("/inbox")
            .header("X-API-Key", "secret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&h.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_usage"], 3);
        assert_eq!(body["messages"][0]["message"], "second");
        assert_eq!(body["messages"][1]["message"], "first");
        assert_eq!(
            body["feature_counts"],
            json!([
                { "feature_name": "Buy", "count": 2 },
                { "feature_name": "Site visit", "count": 1 },
            ])
        );
        assert_eq!(body["daily_counts"][0]["count"], 3);
    }

    #[tokio::test]
    async fn refresh_notifies_reloader() {
        let h = harness();
        let request = Request::builder()
            .method("POST")
            .uri("/refresh")
            .header("X-API-Key", "secret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        tokio::time::timeout(std::time::Duration::from_secs(1), h.refresh_notify.notified())
            .await
            .expect("refresh was not signalled");
    }
}
