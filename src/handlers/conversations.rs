// GET/DELETE /conversations handlers

use std::sync::Arc;
use tracing::error;

use crate::handlers::rejection::ApiError;
use crate::models::DeleteResponse;
use crate::service::ChatService;

pub async fn list_conversations_handler(
    service: Arc<ChatService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversations = service.list_conversations().await.map_err(|e| {
        error!("Error getting conversations: {}", e);
        warp::reject::custom(ApiError::Internal)
    })?;

    Ok(warp::reply::json(&conversations))
}

pub async fn get_conversation_handler(
    conversation_id: String,
    service: Arc<ChatService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.get_conversation(&conversation_id).await {
        Ok(Some(conversation)) => Ok(warp::reply::json(&conversation)),
        Ok(None) => Err(warp::reject::custom(ApiError::NotFound(
            "Conversation not found".to_string(),
        ))),
        Err(e) => {
            error!(conversation_id = %conversation_id, "Error getting conversation: {}", e);
            Err(warp::reject::custom(ApiError::Internal))
        }
    }
}

pub async fn delete_conversation_handler(
    conversation_id: String,
    service: Arc<ChatService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    service
        .delete_conversation(&conversation_id)
        .await
        .map_err(|e| {
            error!(conversation_id = %conversation_id, "Error deleting conversation: {}", e);
            warp::reject::custom(ApiError::Internal)
        })?;

    Ok(warp::reply::json(&DeleteResponse {
        message: "Conversation deleted successfully".to_string(),
    }))
}
