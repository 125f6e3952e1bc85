use crate::database::Database;
use crate::error::{AppError, Result};
use crate::event::{EventOrder, NewEvent};
use crate::feedback::NewFeedback;
use crate::suggestions::{CompletionClient, EventSuggestion, SuggestionError, generate_suggestions};
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::JsonConfig;
use actix_web::{App, HttpResponse, HttpServer, get, options, post, web};
use log::{error, info, warn};
use serde_json::json;
use std::sync::{Arc, Mutex};

pub const SUGGESTIONS_PATH: &str = "/functions/v1/generate-event-suggestions";

const CORS_ALLOWED_HEADERS: [&str; 4] = ["authorization", "x-client-info", "apikey", "content-type"];

/// Shared by all workers. The SQLite connection is not `Sync`, so access
/// goes through a mutex.
pub struct AppState {
    db: Mutex<Database>,
    completion: Option<Arc<dyn CompletionClient>>,
}

impl AppState {
    pub fn new(db: Database, completion: Option<Arc<dyn CompletionClient>>) -> Self {
        AppState {
            db: Mutex::new(db),
            completion,
        }
    }

    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let db = self.db.lock().map_err(|_| AppError::LockPoisoned)?;
        f(&db)
    }
}

/// Runs a store operation on the blocking thread pool
async fn run_db<T, F>(state: &web::Data<AppState>, f: F) -> Result<T>
where
    F: FnOnce(&Database) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = web::block(move || state.with_db(f)).await?;
    if let Err(e) = &result {
        warn!("Store operation failed: {}", e);
    }
    result
}

/// Any origin may call the API. Preflight `OPTIONS` requests are answered
/// here with an empty body.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(CORS_ALLOWED_HEADERS)
        .max_age(3600)
}

fn json_config() -> JsonConfig {
    JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            error!("JSON payload error: {}", err);
            let message = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(json!({ "error": message })),
            )
            .into()
        })
}

#[post("/functions/v1/generate-event-suggestions")]
pub async fn generate_event_suggestions(
    state: web::Data<AppState>,
) -> std::result::Result<HttpResponse, SuggestionError> {
    let result = suggest(&state).await;
    match result {
        Ok(suggestions) => Ok(HttpResponse::Ok().json(json!({ "suggestions": suggestions }))),
        Err(e) => {
            error!("Error generating event suggestions: {}", e);
            Err(e)
        }
    }
}

async fn suggest(
    state: &web::Data<AppState>,
) -> std::result::Result<Vec<EventSuggestion>, SuggestionError> {
    let client = state
        .completion
        .clone()
        .ok_or(SuggestionError::MissingApiKey)?;

    let context = run_db(state, |db| db.suggestion_context())
        .await
        .map_err(|e| SuggestionError::Store(e.to_string()))?;

    generate_suggestions(client.as_ref(), &context).await
}

/// Plain `OPTIONS` without CORS request headers still gets the permissive
/// headers and an empty body
#[options("/functions/v1/generate-event-suggestions")]
pub async fn suggestions_options() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOWED_HEADERS.join(", ")))
        .finish()
}

#[get("/api/events")]
pub async fn list_events(state: web::Data<AppState>) -> Result<HttpResponse> {
    let events = run_db(&state, |db| db.list_events(EventOrder::DateAscending)).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/api/events/{id}")]
pub async fn get_event(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    let id = id.into_inner();
    let event = run_db(&state, move |db| db.get_event(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;
    Ok(HttpResponse::Ok().json(event))
}

#[post("/api/events")]
pub async fn create_event(
    state: web::Data<AppState>,
    data: web::Json<NewEvent>,
) -> Result<HttpResponse> {
    let new_event = data.into_inner();
    let event = run_db(&state, move |db| db.create_event(new_event)).await?;
    info!("Event {} created: {}", event.id, event.title);
    Ok(HttpResponse::Created().json(event))
}

#[get("/api/feedback")]
pub async fn list_feedback(state: web::Data<AppState>) -> Result<HttpResponse> {
    let feedback = run_db(&state, |db| db.list_feedback_with_events()).await?;
    Ok(HttpResponse::Ok().json(feedback))
}

#[get("/api/feedback/{id}")]
pub async fn get_feedback(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    let id = id.into_inner();
    let feedback = run_db(&state, move |db| db.get_feedback(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback {}", id)))?;
    Ok(HttpResponse::Ok().json(feedback))
}

#[post("/api/feedback")]
pub async fn submit_feedback(
    state: web::Data<AppState>,
    data: web::Json<NewFeedback>,
) -> Result<HttpResponse> {
    let new_feedback = data.into_inner();
    let feedback = run_db(&state, move |db| db.submit_feedback(new_feedback)).await?;
    info!(
        "Feedback {} submitted for event {}",
        feedback.id, feedback.event_id
    );
    Ok(HttpResponse::Created().json(feedback))
}

#[get("/api/analytics")]
pub async fn get_analytics(state: web::Data<AppState>) -> Result<HttpResponse> {
    let summary = run_db(&state, |db| db.compute_analytics()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(generate_event_suggestions)
        .service(suggestions_options)
        .service(list_events)
        .service(get_event)
        .service(create_event)
        .service(list_feedback)
        .service(get_feedback)
        .service(submit_feedback)
        .service(get_analytics);
}

pub async fn run(state: AppState, bind_address: &str, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(state);
    info!("Listening on http://{}:{}", bind_address, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((bind_address, port))?
    .run()
    .await
}
