// GET /health handler

use std::convert::Infallible;
use std::sync::Arc;

use crate::service::ChatService;

pub async fn health_handler(service: Arc<ChatService>) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&service.health()))
}
