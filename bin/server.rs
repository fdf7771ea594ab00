// Catalog Classifier - Web Server
// REST API over the live catalog. Reads are open; every mutation needs an
// `x-admin-id` header naming a known administrator.

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use catalog_classifier::{
    logging, parse_user_id, sort_categories, CatalogError, CatalogStore, Classification, Config, ImportReport, Item,
    ItemRef, ListedItem, Location, Price, SearchHit,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Header carrying the acting user's id
const ADMIN_HEADER: &str = "x-admin-id";

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<CatalogStore>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Failure reported as `{success: false, error}` with a matching status
struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.1),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match err {
            CatalogError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            CatalogError::UnknownBucket { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        ApiError(status, err.to_string())
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    items: usize,
    persist_failures: usize,
}

/// One row of a category or brand listing
#[derive(Serialize)]
struct CountResponse {
    name: String,
    count: usize,
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

#[derive(Deserialize)]
struct ClassifyParams {
    description: String,
}

/// Items picked either by value or by listing numbers ("1,3", "2-5")
#[derive(Deserialize)]
struct MoveRequest {
    from: Location,
    to: Location,
    #[serde(default)]
    items: Vec<ItemRef>,
    selection: Option<String>,
}

#[derive(Deserialize)]
struct DeleteRequest {
    location: Location,
    #[serde(default)]
    items: Vec<ItemRef>,
    selection: Option<String>,
}

#[derive(Deserialize)]
struct ManualItemRequest {
    category: String,
    subcategory: String,
    description: String,
    #[serde(default)]
    price: Price,
}

#[derive(Deserialize)]
struct PriceRequest {
    location: Location,
    item: ItemRef,
    price: Price,
}

#[derive(Serialize)]
struct CountResult {
    count: usize,
}

// ============================================================================
// Admin check
// ============================================================================

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<i64, ApiError> {
    let raw = headers
        .get(ADMIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError(StatusCode::UNAUTHORIZED, format!("missing {} header", ADMIN_HEADER)))?;
    let user_id = parse_user_id(raw)?;
    state.store.authorize(user_id)?;
    Ok(user_id)
}

// ============================================================================
// Read handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    Ok(ApiResponse::ok(HealthResponse {
        status: "OK",
        items: state.store.merged().item_count(),
        persist_failures: state.store.persist_failures(),
    }))
}

/// GET /api/catalog - Categories with item counts, display order
async fn get_categories(State(state): State<AppState>) -> ApiResult<Vec<CountResponse>> {
    let merged = state.store.merged();
    let categories = sort_categories(&merged.category_names())
        .into_iter()
        .map(|name| CountResponse {
            count: merged.category_count(&name),
            name,
        })
        .collect();
    Ok(ApiResponse::ok(categories))
}

/// GET /api/catalog/:category - Brands of one category
async fn get_brands(State(state): State<AppState>, Path(category): Path<String>) -> ApiResult<Vec<CountResponse>> {
    let merged = state.store.merged();
    if !merged.has_category(&category) {
        return Err(ApiError(StatusCode::NOT_FOUND, format!("no such category: {}", category)));
    }
    let brands = merged
        .subcategories(&category)
        .into_iter()
        .map(|(name, count)| CountResponse { name, count })
        .collect();
    Ok(ApiResponse::ok(brands))
}

/// GET /api/catalog/:category/:subcategory - Numbered items of one bucket
async fn get_bucket(
    State(state): State<AppState>,
    Path((category, subcategory)): Path<(String, String)>,
) -> ApiResult<Vec<ListedItem>> {
    let listing = state.store.bucket_listing(&Location::new(category, subcategory));
    Ok(ApiResponse::ok(listing))
}

/// GET /api/search?q= - Search the merged catalog
async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Vec<SearchHit>> {
    Ok(ApiResponse::ok(state.store.search(&params.q)))
}

/// GET /api/classify?description= - Dry-run the classifier
async fn classify(State(state): State<AppState>, Query(params): Query<ClassifyParams>) -> ApiResult<Classification> {
    Ok(ApiResponse::ok(state.store.classify(&params.description)))
}

/// GET /api/export - Merged catalog as CSV
async fn export(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv = state
        .store
        .export_csv()
        .map_err(|err| ApiError(StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"catalog.csv\""),
        ],
        csv,
    )
        .into_response())
}

// ============================================================================
// Admin handlers
// ============================================================================

/// POST /api/import - Body is the CSV spreadsheet
async fn import(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<ImportReport> {
    require_admin(&state, &headers)?;
    let report = state
        .store
        .import_spreadsheet(&body)
        .map_err(|err| match err.downcast::<CatalogError>() {
            Ok(err) => ApiError::from(err),
            Err(err) => ApiError(StatusCode::BAD_REQUEST, format!("{err:#}")),
        })?;
    Ok(ApiResponse::ok(report))
}

/// POST /api/move - Re-file items to another bucket
async fn move_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MoveRequest>,
) -> ApiResult<CountResult> {
    require_admin(&state, &headers)?;
    let count = match request.selection {
        Some(selection) => state.store.move_selection(&request.from, &request.to, &selection)?,
        None if request.items.is_empty() => return Err(CatalogError::EmptySelection.into()),
        None => state.store.move_items(&request.from, &request.to, &request.items),
    };
    Ok(ApiResponse::ok(CountResult { count }))
}

/// POST /api/delete - Remove items from a bucket
async fn delete_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<CountResult> {
    require_admin(&state, &headers)?;
    let count = match request.selection {
        Some(selection) => state.store.delete_selection(&request.location, &selection)?,
        None if request.items.is_empty() => return Err(CatalogError::EmptySelection.into()),
        None => state.store.delete_items(&request.location, &request.items),
    };
    Ok(ApiResponse::ok(CountResult { count }))
}

/// POST /api/manual/items - Add a hand-entered item
async fn add_manual_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ManualItemRequest>,
) -> ApiResult<Item> {
    require_admin(&state, &headers)?;
    let location = Location::new(request.category, request.subcategory);
    let item = state.store.add_manual_item(&location, &request.description, request.price)?;
    Ok(ApiResponse::ok(item))
}

/// PUT /api/price - Fix one item's price
async fn set_price(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PriceRequest>,
) -> ApiResult<CountResult> {
    require_admin(&state, &headers)?;
    if !state.store.set_price(&request.location, &request.item, request.price) {
        return Err(ApiError(StatusCode::NOT_FOUND, format!("no such item: {}", request.item.description)));
    }
    Ok(ApiResponse::ok(CountResult { count: 1 }))
}

/// DELETE /api/manual/:category - Drop a manual category
async fn delete_manual_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(category): Path<String>,
) -> ApiResult<CountResult> {
    require_admin(&state, &headers)?;
    let count = state.store.delete_manual_category(&category)?;
    Ok(ApiResponse::ok(CountResult { count }))
}

/// DELETE /api/manual/:category/:subcategory - Drop a manual bucket
async fn delete_manual_bucket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((category, subcategory)): Path<(String, String)>,
) -> ApiResult<CountResult> {
    require_admin(&state, &headers)?;
    let count = state.store.delete_manual_bucket(&Location::new(category, subcategory))?;
    Ok(ApiResponse::ok(CountResult { count }))
}

// ============================================================================
// Main Server
// ============================================================================

fn app(store: Arc<CatalogStore>) -> Router {
    let state = AppState { store };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(get_categories))
        .route("/catalog/:category", get(get_brands))
        .route("/catalog/:category/:subcategory", get(get_bucket))
        .route("/search", get(search))
        .route("/classify", get(classify))
        .route("/export", get(export))
        .route("/import", post(import))
        .route("/move", post(move_items))
        .route("/delete", post(delete_items))
        .route("/manual/items", post(add_manual_item))
        .route("/price", put(set_price))
        .route("/manual/:category", delete(delete_manual_category))
        .route("/manual/:category/:subcategory", delete(delete_manual_bucket))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    println!("🌐 Catalog Classifier - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env()?;
    let port = config.http_port;
    let store = Arc::new(CatalogStore::open(config));

    if store.admins().is_empty() {
        tracing::warn!("no administrators configured; set CATALOG_ADMIN_IDS to allow edits");
    }

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://localhost:{}", port);
    println!("   API: http://localhost:{}/api/catalog", port);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(store))
        .await
        .context("Server stopped")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const SHEET: &str = "description,price\n\
        iPhone 15 Pro 256GB Black,129990\n\
        MacBook Air 13 M2 8/256,99990\n\
        Xiaomi Mi Robot Vacuum,24990\n";

    fn setup() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(dir.path());
        config.seed_admins = vec![1];
        let store = Arc::new(CatalogStore::open(config));
        (dir, app(store))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn import_request(admin: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/api/import");
        if let Some(admin) = admin {
            builder = builder.header(ADMIN_HEADER, admin);
        }
        builder.body(Body::from(SHEET)).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, router) = setup();
        let (status, body) = send(&router, get("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "OK");
    }

    #[tokio::test]
    async fn test_import_requires_admin() {
        let (_dir, router) = setup();

        let (status, body) = send(&router, import_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = send(&router, import_request(Some("abc"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, import_request(Some("2"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_import_then_browse() {
        let (_dir, router) = setup();

        let (status, body) = send(&router, import_request(Some("1"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["rows"], 3);

        let (_, body) = send(&router, get("/api/catalog")).await;
        assert_eq!(body["data"][0]["name"], "Phones");

        let (_, body) = send(&router, get("/api/catalog/Phones/Apple")).await;
        assert_eq!(body["data"][0]["number"], 1);
        assert_eq!(body["data"][0]["item"]["desc"], "iPhone 15 Pro 256GB Black");

        let (status, _) = send(&router, get("/api/catalog/Nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_and_classify() {
        let (_dir, router) = setup();
        send(&router, import_request(Some("1"))).await;

        let (_, body) = send(&router, get("/api/search?q=macbook")).await;
        let hits = body["data"].as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["category"], "Laptops");

        let (_, body) = send(&router, get("/api/classify?description=Xiaomi%20Mi%20Robot%20Vacuum")).await;
        assert_eq!(body["data"]["category"], "Vacuum cleaners");
        assert_eq!(body["data"]["subcategory"], "Xiaomi");
    }

    #[tokio::test]
    async fn test_move_by_selection() {
        let (_dir, router) = setup();
        send(&router, import_request(Some("1"))).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/move")
            .header(ADMIN_HEADER, "1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"from":{"category":"Phones","subcategory":"Apple"},"to":{"category":"Deals","subcategory":"Apple"},"selection":"1"}"#,
            ))
            .unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 1);

        let (_, body) = send(&router, get("/api/catalog/Deals/Apple")).await;
        assert_eq!(body["data"][0]["source"], "moved");
    }

    #[tokio::test]
    async fn test_export_is_csv() {
        let (_dir, router) = setup();
        send(&router, import_request(Some("1"))).await;

        let response = router.clone().oneshot(get("/api/export")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(csv.starts_with("category/brand,description,price\n"));
        assert!(csv.contains("Phones/Apple,iPhone 15 Pro 256GB Black,129990"));
    }
}
