// Route definitions

use std::convert::Infallible;
use std::sync::Arc;
use tracing::{info, warn};
use warp::Filter;

use crate::handlers;
use crate::service::ChatService;

/// Chat bodies larger than this are rejected before deserialization
const MAX_BODY_BYTES: u64 = 64 * 1024;

fn with_service(
    service: Arc<ChatService>,
) -> impl Filter<Extract = (Arc<ChatService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn cors(origins: &[String]) -> warp::cors::Builder {
    let builder = warp::cors()
        .allow_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type", "accept", "authorization", "origin"])
        .allow_credentials(true);

    if origins.iter().any(|o| o == "*") {
        return builder.allow_any_origin();
    }

    // warp panics on malformed origins, so skip anything without a scheme
    let valid: Vec<&str> = origins
        .iter()
        .filter(|o| {
            let ok = o.contains("://");
            if !ok {
                warn!(origin = %o, "Ignoring malformed CORS origin");
            }
            ok
        })
        .map(String::as_str)
        .collect();
    builder.allow_origins(valid)
}

pub fn configure_routes(
    service: Arc<ChatService>,
    cors_origins: &[String],
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    // POST /chat
    let chat = warp::path("chat")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_service(service.clone()))
        .and_then(handlers::chat_handler);

    // GET /conversations
    let list_conversations = warp::path("conversations")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::list_conversations_handler);

    // GET /conversations/{id}
    let get_conversation = warp::path("conversations")
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::get_conversation_handler);

    // DELETE /conversations/{id}
    let delete_conversation = warp::path("conversations")
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_service(service.clone()))
        .and_then(handlers::delete_conversation_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service))
        .and_then(handlers::health_handler);

    let request_log = warp::log::custom(|info| {
        info!(
            method = %info.method(),
            path = info.path(),
            status = info.status().as_u16(),
            elapsed_ms = info.elapsed().as_millis() as u64,
            "request"
        );
    });

    // Combine routes. Errors are recovered inside the CORS wrapper so they
    // get CORS headers; the outer recover only sees CORS refusals.
    chat.or(list_conversations)
        .or(get_conversation)
        .or(delete_conversation)
        .or(health)
        .recover(handlers::handle_rejection)
        .with(cors(cors_origins))
        .recover(handlers::handle_rejection)
        .with(request_log)
}
