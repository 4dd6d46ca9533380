//! REST API for the bento designer.
//!
//! Serves the ingredient catalog, the configured box and its placements, and
//! ranked suggestions. Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::catalog::Catalog;
use crate::config::{ApiConfig, BoxConfig, SuggestionConfig};
use crate::error::{ApiError, ErrorResponse};
use crate::layout::{DropEvent, add_placed_item, place_drop, remove_placed_item};
use crate::model::{
    BentoBox, BoxShape, Category, Item, ItemColor, Nutrition, NewItem, Partition, PartitionKind,
    PlacedItem, Season, create_item,
};
use crate::store::{BentoStorage, BlobStore, StoreBackend, StoreError};
use crate::suggestion::{Criterion, Suggestion, SuggestionContext, rank_top};
use crate::types::{Bounds, Point, Size};
use crate::validation::validate_item;

/// Shared state of all handlers.
///
/// Read-modify-write sequences on the store run under `write_lock`, so two
/// concurrent drops cannot both pass the overlap check against the same snapshot.
#[derive(Clone)]
pub struct ApiState {
    storage: BentoStorage<StoreBackend>,
    bento: Arc<BentoBox>,
    catalog: Arc<Catalog>,
    suggestion: SuggestionConfig,
    write_lock: Arc<Mutex<()>>,
}

impl ApiState {
    pub fn new(
        storage: BentoStorage<StoreBackend>,
        bento: BentoBox,
        catalog: Catalog,
        suggestion: SuggestionConfig,
    ) -> Self {
        Self {
            storage,
            bento: Arc::new(bento),
            catalog: Arc::new(catalog),
            suggestion,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Catalog items followed by the stored user items.
    async fn all_items(&self) -> Result<Catalog, StoreError> {
        let user_items = self.storage.load_items().await?;
        Ok(self.catalog.with_items(user_items))
    }
}

/// Loads the stored box, or creates and stores a new one.
///
/// A stored box that no longer matches the configured shape or dimensions is
/// replaced, and the placements that referenced its partitions are dropped.
pub async fn resolve_box<S: BlobStore>(
    storage: &BentoStorage<S>,
    config: &BoxConfig,
) -> Result<BentoBox, StoreError> {
    if let Some(bento) = storage.load_box().await? {
        if config.matches(&bento) {
            return Ok(bento);
        }
        warn!(
            stored = %bento.id,
            "configured box differs from the stored one, starting with an empty box"
        );
        storage.clear_placements().await?;
    }

    let bento = config.build_box();
    storage.save_box(&bento).await?;
    info!(id = %bento.id, shape = bento.shape.as_str(), "created box");
    Ok(bento)
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>bento-designer API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for the suggestion endpoint.
///
/// `limit` falls back to the configured default; `0` returns every item.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "criterion": "season", "season": "spring", "limit": 3 }))]
pub struct SuggestionRequest {
    pub criterion: String,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_items,
        create_user_item,
        delete_user_item,
        get_box,
        list_placements,
        create_placement,
        delete_placement,
        clear_placements,
        suggest
    ),
    components(
        schemas(
            Item,
            NewItem,
            Nutrition,
            Category,
            ItemColor,
            Season,
            BentoBox,
            BoxShape,
            Partition,
            PartitionKind,
            PlacedItem,
            DropEvent,
            Point,
            Size,
            Bounds,
            Criterion,
            SuggestionRequest,
            Suggestion,
            ErrorResponse
        )
    ),
    tags(
        (name = "items", description = "Ingredient catalog and user ingredients"),
        (name = "box", description = "The box and its placements"),
        (name = "suggestions", description = "Ranked ingredient suggestions")
    )
)]
struct ApiDoc;

/// Builds the application router.
pub fn router(state: ApiState, docs_enabled: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/items", get(list_items).post(create_user_item))
        .route("/items/{id}", delete(delete_user_item))
        .route("/box", get(get_box))
        .route(
            "/placements",
            get(list_placements)
                .post(create_placement)
                .delete(clear_placements),
        )
        .route("/placements/{id}", delete(delete_placement))
        .route("/suggestions", post(suggest));

    if docs_enabled {
        app = app
            .route("/docs/openapi.json", get(serve_openapi_json))
            .route("/docs", get(serve_openapi_ui));
    }

    app.layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and blocks until it terminates.
pub async fn start_api_server(config: ApiConfig, state: ApiState) -> std::io::Result<()> {
    let app = router(state, config.docs_enabled());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        info!("Local access: http://localhost:{}", config.port());
    }
    if config.docs_enabled() {
        info!("Documentation: GET /docs, GET /docs/openapi.json");
    }

    axum::serve(listener, app).await
}

/// Handler for GET /items.
///
/// Returns the built-in catalog followed by user-created ingredients.
#[utoipa::path(
    get,
    path = "/items",
    responses(
        (status = 200, description = "All known ingredients", body = [Item]),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "items"
)]
async fn list_items(State(state): State<ApiState>) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.all_items().await?.into_items()))
}

/// Handler for POST /items.
///
/// Omitted optional fields take their defaults; every validation problem is
/// reported at once.
#[utoipa::path(
    post,
    path = "/items",
    request_body = NewItem,
    responses(
        (status = 201, description = "Ingredient created", body = Item),
        (status = CONFLICT, description = "Ingredient id already in use", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid ingredient", body = ErrorResponse)
    ),
    tag = "items"
)]
async fn create_user_item(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let item = item_from_request(body)?;

    let _guard = state.write_lock.lock().await;
    if state.all_items().await?.find_by_id(&item.id).is_some() {
        return Err(ApiError::DuplicateItem(item.id));
    }
    state.storage.add_user_item(item.clone()).await?;
    info!(id = %item.id, name = %item.name, "added user ingredient");

    Ok((StatusCode::CREATED, Json(item)).into_response())
}

/// Builds an item from a partial JSON record.
///
/// Defaults fill the gaps first, then the merged record goes through the item
/// validator, so a bad request reports all of its problems together.
fn item_from_request(body: Value) -> Result<Item, ApiError> {
    let Value::Object(fields) = body else {
        return Err(ApiError::Validation(vec![
            "request body must be a JSON object".to_string(),
        ]));
    };

    let mut record = default_item_record();
    for (key, value) in fields {
        let blank_id = key == "id" && value.as_str().is_some_and(str::is_empty);
        if value.is_null() || blank_id {
            continue;
        }
        record.insert(key, value);
    }
    let record = Value::Object(record);

    let report = validate_item(&record);
    if !report.is_valid {
        return Err(ApiError::Validation(report.errors));
    }
    serde_json::from_value(record).map_err(|err| ApiError::Validation(vec![err.to_string()]))
}

/// Defaults of an item without the fields a request has to name itself.
fn default_item_record() -> Map<String, Value> {
    let template = create_item(NewItem::new("", Category::Other, ItemColor::White));
    let mut record = match serde_json::to_value(template) {
        Ok(Value::Object(record)) => record,
        _ => Map::new(),
    };
    for required in ["name", "category", "color"] {
        record.remove(required);
    }
    record
}

/// Handler for DELETE /items/{id}.
///
/// Only user-created ingredients can be removed.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Ingredient id")),
    responses(
        (status = 204, description = "Ingredient removed"),
        (status = NOT_FOUND, description = "No user ingredient with this id", body = ErrorResponse)
    ),
    tag = "items"
)]
async fn delete_user_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _guard = state.write_lock.lock().await;
    if !state.storage.remove_user_item(&id).await? {
        return Err(ApiError::ItemNotFound(id));
    }
    info!(%id, "removed user ingredient");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /box.
#[utoipa::path(
    get,
    path = "/box",
    responses((status = 200, description = "The box with its partitions", body = BentoBox)),
    tag = "box"
)]
async fn get_box(State(state): State<ApiState>) -> Json<BentoBox> {
    Json(state.bento.as_ref().clone())
}

/// Handler for GET /placements.
#[utoipa::path(
    get,
    path = "/placements",
    responses(
        (status = 200, description = "Items currently in the box", body = [PlacedItem]),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "box"
)]
async fn list_placements(
    State(state): State<ApiState>,
) -> Result<Json<Vec<PlacedItem>>, ApiError> {
    Ok(Json(state.storage.load_placements().await?))
}

/// Handler for POST /placements.
///
/// Applies a drop event. Without `partitionId`, the partition under the drop
/// point is used. The item occupies its default footprint.
#[utoipa::path(
    post,
    path = "/placements",
    request_body = DropEvent,
    responses(
        (status = 201, description = "Item placed", body = PlacedItem),
        (status = NOT_FOUND, description = "Unknown ingredient or partition", body = ErrorResponse),
        (status = CONFLICT, description = "Out of bounds or overlapping", body = ErrorResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request or drop point outside every partition",
            body = ErrorResponse
        )
    ),
    tag = "box"
)]
async fn create_placement(
    State(state): State<ApiState>,
    payload: Result<Json<DropEvent>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(drop) = payload?;

    let _guard = state.write_lock.lock().await;
    let items = state.all_items().await?;
    let item = items
        .find_by_id(&drop.item_id)
        .ok_or_else(|| ApiError::ItemNotFound(drop.item_id.clone()))?;

    let placements = state.storage.load_placements().await?;
    let placed = place_drop(&state.bento, item, &drop, &placements)?;
    state
        .storage
        .save_placements(&add_placed_item(&placements, placed.clone()))
        .await?;
    info!(
        id = %placed.id,
        item_id = %placed.item_id,
        partition_id = %placed.partition_id,
        "placed ingredient"
    );

    Ok((StatusCode::CREATED, Json(placed)).into_response())
}

/// Handler for DELETE /placements/{id}.
#[utoipa::path(
    delete,
    path = "/placements/{id}",
    params(("id" = String, Path, description = "Placement id")),
    responses(
        (status = 204, description = "Placement removed"),
        (status = NOT_FOUND, description = "No placement with this id", body = ErrorResponse)
    ),
    tag = "box"
)]
async fn delete_placement(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _guard = state.write_lock.lock().await;
    let placements = state.storage.load_placements().await?;
    if !placements.iter().any(|p| p.id == id) {
        return Err(ApiError::PlacementNotFound(id));
    }
    state
        .storage
        .save_placements(&remove_placed_item(&placements, &id))
        .await?;
    info!(%id, "removed placement");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /placements.
#[utoipa::path(
    delete,
    path = "/placements",
    responses((status = 204, description = "Box emptied")),
    tag = "box"
)]
async fn clear_placements(State(state): State<ApiState>) -> Result<StatusCode, ApiError> {
    let _guard = state.write_lock.lock().await;
    state.storage.clear_placements().await?;
    info!("cleared placements");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /suggestions.
///
/// Ranks catalog and user ingredients by the requested criterion.
#[utoipa::path(
    post,
    path = "/suggestions",
    request_body = SuggestionRequest,
    responses(
        (status = 200, description = "Ranked suggestions, best first", body = [Suggestion]),
        (status = BAD_REQUEST, description = "Unknown criterion", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "suggestions"
)]
async fn suggest(
    State(state): State<ApiState>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let Json(request) = payload?;
    let criterion: Criterion = request.criterion.parse()?;
    if request.season == Some(Season::All) {
        return Err(ApiError::Validation(vec![
            "season must be one of spring, summer, autumn, winter".to_string(),
        ]));
    }
    let context = request.season.map(SuggestionContext::with_season);
    let limit = request
        .limit
        .unwrap_or_else(|| state.suggestion.default_limit());

    let items = state.all_items().await?;
    Ok(Json(rank_top(
        criterion,
        items.items(),
        context.as_ref(),
        limit,
    )))
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
