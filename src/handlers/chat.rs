// POST /chat handler

use std::sync::Arc;
use tracing::{error, info};
use warp::http::StatusCode;

use crate::handlers::rejection::ApiError;
use crate::models::ChatRequest;
use crate::service::{ChatService, ServiceError};

pub async fn chat_handler(
    request: ChatRequest,
    service: Arc<ChatService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(
        conversation_id = request.conversation_id.as_deref().unwrap_or("<new>"),
        "POST /chat"
    );

    match service.chat(request).await {
        Ok(response) => Ok(warp::reply::with_status(
            warp::reply::json(&response),
            StatusCode::OK,
        )),
        Err(ServiceError::InvalidRequest(reason)) => {
            Err(warp::reject::custom(ApiError::BadRequest(reason)))
        }
        Err(e) => {
            error!("Error in chat endpoint: {}", e);
            Err(warp::reject::custom(ApiError::Internal))
        }
    }
}
