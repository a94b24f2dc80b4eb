use crate::infrastructure::http::controllers;
use crate::infrastructure::http::middleware::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Worker lifecycle
        .route("/api/health", get(controllers::health::health_check))
        .route("/api/worker/start", post(controllers::health::start_worker))
        // Broker directory and assignment
        .route("/api/brokers", get(controllers::brokers::list_brokers))
        .route(
            "/api/brokers/conversation/:id",
            get(controllers::brokers::get_conversation_broker),
        )
        .route(
            "/api/brokers/conversation/:id/assign",
            post(controllers::brokers::assign_conversation_broker),
        )
        // Lead conversations
        .route(
            "/api/conversations",
            post(controllers::conversations::create_conversation),
        )
        .route(
            "/api/conversations/:id",
            get(controllers::conversations::get_conversation),
        )
        .route(
            "/api/conversations/:id/complete",
            post(controllers::conversations::complete_conversation),
        )
        // Chat platform integration
        .route(
            "/api/chatwoot-webhook",
            post(controllers::webhooks::chatwoot_webhook),
        )
        .route(
            "/api/track-bot-message",
            post(controllers::messages::track_bot_message),
        )
        .route(
            "/api/detect-conversion",
            post(controllers::conversion::detect_conversion),
        )
        // Calculators
        .route(
            "/api/calculators/monthly-payment",
            post(controllers::calculators::monthly_payment),
        )
        .route(
            "/api/calculators/affordability",
            post(controllers::calculators::affordability),
        );

    Router::new()
        .route("/", get(root_handler))
        .merge(api)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Brokerdesk lead assignment service"
}
