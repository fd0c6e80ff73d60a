use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

use medchat::config::AppConfig;
use medchat::llm::{HostedResponder, LocalResponder, ModelSelector};
use medchat::routes::configure_routes;
use medchat::service::ChatService;
use medchat::{store, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    telemetry::init("info");

    let config = AppConfig::from_env()?;
    info!("Starting MedChat backend");

    // Loading the local model can take a while on first run
    let local = LocalResponder::load(&config.local).await;
    let hosted = HostedResponder::new(&config.hosted);
    let selector = ModelSelector::new(Arc::new(local), Arc::new(hosted), config.hosted.enabled);
    info!(active = ?selector.active(), openai_enabled = config.hosted.enabled, "Responders ready");

    let store = store::connect(&config.database_url, config.database_pool_size).await?;
    let service = Arc::new(ChatService::new(selector, store));

    let routes = configure_routes(service, &config.server.cors_origins);

    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Server listening on http://{}", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
