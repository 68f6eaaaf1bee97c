use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use axum::{
    extract::{Path, Query, State},
    extract::rejection::JsonRejection,
    http::{Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{Instrument, Level};
use crate::authors::domain::model::AuthorParams;
use crate::authors::dto::AuthorDto;
use crate::catalog::command::create_author_cmd::{CreateAuthorCommand, CreateAuthorCommandRequest};
use crate::catalog::command::create_quote_cmd::{CreateQuoteCommand, CreateQuoteCommandRequest};
use crate::catalog::command::delete_author_cmd::{DeleteAuthorCommand, DeleteAuthorCommandRequest};
use crate::catalog::command::delete_quote_cmd::{DeleteQuoteCommand, DeleteQuoteCommandRequest};
use crate::catalog::command::get_author_cmd::{GetAuthorCommand, GetAuthorCommandRequest};
use crate::catalog::command::get_quote_cmd::{GetQuoteCommand, GetQuoteCommandRequest};
use crate::catalog::command::get_random_quote_cmd::GetRandomQuoteCommand;
use crate::catalog::command::list_authors_cmd::{ListAuthorsCommand, ListAuthorsCommandRequest, ListAuthorsCommandResponse};
use crate::catalog::command::list_quotes_cmd::{ListQuotesCommand, ListQuotesCommandRequest, ListQuotesCommandResponse};
use crate::catalog::command::search_authors_cmd::{SearchAuthorsCommand, SearchAuthorsCommandRequest, SearchAuthorsCommandResponse};
use crate::catalog::command::search_quotes_cmd::{SearchQuotesCommand, SearchQuotesCommandRequest, SearchQuotesCommandResponse};
use crate::catalog::command::update_author_cmd::{UpdateAuthorCommand, UpdateAuthorCommandRequest};
use crate::catalog::command::update_quote_cmd::{UpdateQuoteCommand, UpdateQuoteCommandRequest};
use crate::core::command::Command;
use crate::core::context::RequestContext;
use crate::core::controller::{json_to_server_error, rejection_to_server_error, AppState, ServerError};
use crate::core::library::ListParams;
use crate::quotes::domain::model::QuoteParams;
use crate::quotes::dto::{QuoteDto, QuoteWithAuthorDto};

const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
        .route("/authors", get(list_authors).post(create_author))
        .route("/authors/search", get(search_authors))
        .route("/authors/:id", get(get_author).put(update_author).delete(delete_author))
        .route("/quotes", get(list_quotes).post(create_quote))
        .route("/quotes/search", get(search_quotes))
        .route("/quotes/random", get(get_random_quote))
        .route("/quotes/:id", get(get_quote).put(update_quote).delete(delete_quote))
        .route_layer(middleware::from_fn_with_state(state.clone(), request_scope))
        .with_state(state);
    with_middleware(routes)
}

// with_middleware adds the outer stack: access log with status and latency,
// cross-origin headers and panic recovery into a 500.
fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(300));
    router
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).latency_unit(LatencyUnit::Millis)))
}

// request_scope gives every request a RequestContext bounded by the configured
// timeout and runs the handler inside a span carrying its request id.
async fn request_scope<B>(State(state): State<AppState>, mut req: Request<B>, next: Next<B>) -> Response {
    let ctx = RequestContext::with_timeout(state.config.request_timeout());
    let span = tracing::info_span!("request",
        request_id = ctx.request_id.as_str(), method = %req.method(), path = %req.uri().path());
    req.extensions_mut().insert(ctx);
    next.run(req).instrument(span).await
}

fn parse_id(raw: &str) -> Result<i64, ServerError> {
    raw.trim().parse::<i64>().map_err(|_| ServerError::invalid_id(raw))
}

fn parse_page(query: &HashMap<String, String>) -> ListParams {
    ListParams::parse(query.get("limit").map(String::as_str), query.get("offset").map(String::as_str))
}

fn parse_body<T: DeserializeOwned>(payload: Result<Json<Value>, JsonRejection>) -> Result<T, ServerError> {
    let Json(body) = payload.map_err(rejection_to_server_error)?;
    serde_json::from_value(body).map_err(json_to_server_error)
}

pub(crate) async fn create_author(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<Value>, JsonRejection>) -> Result<(StatusCode, Json<AuthorDto>), ServerError> {
    let author: AuthorParams = parse_body(payload)?;
    let res = CreateAuthorCommand::new(state.service.clone())
        .execute(&ctx, CreateAuthorCommandRequest { author }).await
        .map_err(|err| ServerError::from_command("CREATE_AUTHOR", err))?;
    Ok((StatusCode::CREATED, Json(res.author)))
}

pub(crate) async fn get_author(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>) -> Result<Json<AuthorDto>, ServerError> {
    let req = GetAuthorCommandRequest { id: parse_id(id.as_str())? };
    let res = GetAuthorCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("GET_AUTHOR", err))?;
    Ok(Json(res.author))
}

pub(crate) async fn list_authors(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<HashMap<String, String>>) -> Result<Json<ListAuthorsCommandResponse>, ServerError> {
    let req = ListAuthorsCommandRequest { page: parse_page(&query) };
    let res = ListAuthorsCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("LIST_AUTHORS", err))?;
    Ok(Json(res))
}

pub(crate) async fn update_author(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>) -> Result<Json<AuthorDto>, ServerError> {
    let id = parse_id(id.as_str())?;
    let author: AuthorParams = parse_body(payload)?;
    let res = UpdateAuthorCommand::new(state.service.clone())
        .execute(&ctx, UpdateAuthorCommandRequest { id, author }).await
        .map_err(|err| ServerError::from_command("UPDATE_AUTHOR", err))?;
    Ok(Json(res.author))
}

pub(crate) async fn delete_author(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>) -> Result<StatusCode, ServerError> {
    let req = DeleteAuthorCommandRequest { id: parse_id(id.as_str())? };
    DeleteAuthorCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("DELETE_AUTHOR", err))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn search_authors(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<HashMap<String, String>>) -> Result<Json<SearchAuthorsCommandResponse>, ServerError> {
    let req = SearchAuthorsCommandRequest {
        query: query.get("q").cloned().unwrap_or_default(),
        page: parse_page(&query),
    };
    let res = SearchAuthorsCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("SEARCH_AUTHORS", err))?;
    Ok(Json(res))
}

pub(crate) async fn create_quote(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<Value>, JsonRejection>) -> Result<(StatusCode, Json<QuoteDto>), ServerError> {
    let quote: QuoteParams = parse_body(payload)?;
    let res = CreateQuoteCommand::new(state.service.clone())
        .execute(&ctx, CreateQuoteCommandRequest { quote }).await
        .map_err(|err| ServerError::from_command("CREATE_QUOTE", err))?;
    Ok((StatusCode::CREATED, Json(res.quote)))
}

pub(crate) async fn get_quote(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>) -> Result<Json<QuoteWithAuthorDto>, ServerError> {
    let req = GetQuoteCommandRequest { id: parse_id(id.as_str())? };
    let res = GetQuoteCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("GET_QUOTE", err))?;
    Ok(Json(res.quote))
}

pub(crate) async fn list_quotes(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<HashMap<String, String>>) -> Result<Json<ListQuotesCommandResponse>, ServerError> {
    // an empty author_id is the same as none
    let author_id = match query.get("author_id").filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => {
            Some(raw.trim().parse::<i64>().map_err(|_| ServerError::invalid_author_id(raw))?)
        }
        None => { None }
    };
    let req = ListQuotesCommandRequest { author_id, page: parse_page(&query) };
    let res = ListQuotesCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("LIST_QUOTES", err))?;
    Ok(Json(res))
}

pub(crate) async fn update_quote(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>) -> Result<Json<QuoteDto>, ServerError> {
    let id = parse_id(id.as_str())?;
    let quote: QuoteParams = parse_body(payload)?;
    let res = UpdateQuoteCommand::new(state.service.clone())
        .execute(&ctx, UpdateQuoteCommandRequest { id, quote }).await
        .map_err(|err| ServerError::from_command("UPDATE_QUOTE", err))?;
    Ok(Json(res.quote))
}

pub(crate) async fn delete_quote(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>) -> Result<StatusCode, ServerError> {
    let req = DeleteQuoteCommandRequest { id: parse_id(id.as_str())? };
    DeleteQuoteCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("DELETE_QUOTE", err))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn search_quotes(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<HashMap<String, String>>) -> Result<Json<SearchQuotesCommandResponse>, ServerError> {
    let req = SearchQuotesCommandRequest {
        query: query.get("q").cloned().unwrap_or_default(),
        page: parse_page(&query),
    };
    let res = SearchQuotesCommand::new(state.service.clone()).execute(&ctx, req).await
        .map_err(|err| ServerError::from_command("SEARCH_QUOTES", err))?;
    Ok(Json(res))
}

pub(crate) async fn get_random_quote(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>) -> Result<Json<QuoteWithAuthorDto>, ServerError> {
    let res = GetRandomQuoteCommand::new(state.service.clone()).execute(&ctx, ()).await
        .map_err(|err| ServerError::from_command("GET_RANDOM_QUOTE", err))?;
    Ok(Json(res.quote))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub timestamp: String,
    pub services: BTreeMap<String, String>,
}

impl HealthBody {
    fn new(status: &str, services: BTreeMap<String, String>) -> Self {
        Self {
            status: status.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            services,
        }
    }
}

pub(crate) async fn liveness() -> Json<HealthBody> {
    Json(HealthBody::new("ok", BTreeMap::new()))
}

pub(crate) async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = RequestContext::with_timeout(READINESS_TIMEOUT);
    let mut services = BTreeMap::new();
    match state.backend.ping(&ctx).await {
        Ok(_) => {
            services.insert("database".to_string(), "healthy".to_string());
            (StatusCode::OK, Json(HealthBody::new("ok", services)))
        }
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            services.insert("database".to_string(), format!("unhealthy: {}", err.message()));
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthBody::new("unhealthy", services)))
        }
    }
}
