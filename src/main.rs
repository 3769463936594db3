mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::Resolver;
use models::ScoringWeights;
use routes::resolve::AppState;
use services::{DirectoryClient, NarrativeClient, RoomServiceClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Munchscene resolution service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize directory client
    let directory_timeout = settings.directory.timeout_secs.unwrap_or(15);
    let page_limit = settings.directory.page_limit.unwrap_or(24);
    let directory = Arc::new(DirectoryClient::new(
        settings.directory.base_url,
        settings.directory.api_key,
        Duration::from_secs(directory_timeout),
        page_limit,
        settings.directory.max_cuisine_queries.unwrap_or(4),
        settings.directory.search_radius_meters.unwrap_or(5_000.0),
    ));

    info!("Directory client initialized (page limit: {})", page_limit);

    // Initialize narrative client
    let narrative_timeout = settings.narrative.timeout_secs.unwrap_or(10);
    let narrative = Arc::new(NarrativeClient::new(
        settings.narrative.base_url,
        settings.narrative.api_key,
        settings.narrative.model,
        Duration::from_secs(narrative_timeout),
        settings.narrative.max_tokens.unwrap_or(90),
    ));

    info!("Narrative client initialized (timeout: {}s)", narrative_timeout);

    // Initialize room service client
    let rooms = Arc::new(RoomServiceClient::new(
        settings.rooms.base_url,
        settings.rooms.api_key,
        Duration::from_secs(settings.rooms.timeout_secs.unwrap_or(10)),
    ));

    info!("Room service client initialized");

    // Initialize resolver with configured weights
    let weights = ScoringWeights {
        cuisine: settings.scoring.weights.cuisine,
        vibe: settings.scoring.weights.vibe,
        budget_comfort: settings.scoring.weights.budget_comfort,
        distance_comfort: settings.scoring.weights.distance_comfort,
        variance_penalty: settings.scoring.weights.variance_penalty,
        low_floor_penalty: settings.scoring.weights.low_floor_penalty,
        low_floor_threshold: settings.scoring.weights.low_floor_threshold,
        rating_bonus_cap: settings.scoring.weights.rating_bonus_cap,
        cuisine_neutral: settings.scoring.weights.cuisine_neutral,
    };

    let explanation_count = settings.resolution.explanation_count.unwrap_or(3);
    let resolver = Resolver::with_limits(weights, page_limit, explanation_count);

    info!("Resolver initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        directory,
        narrative,
        rooms,
        resolver,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
