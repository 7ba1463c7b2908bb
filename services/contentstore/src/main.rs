use tracing::info;

use campus_contentstore::config::ContentStoreConfig;
use campus_contentstore::router::build_router;
use campus_contentstore::state::AppState;
use campus_core::config::Config;
use campus_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing("campus_contentstore=info,tower_http=info");

    let config = ContentStoreConfig::from_env();

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    std::fs::create_dir_all(&config.data_dir).expect("failed to create data dir");

    let state = AppState {
        redis,
        data_dir: config.data_dir.clone().into(),
        import_status_ttl_secs: config.import_status_ttl_secs,
    };

    let router = build_router(state, config.max_upload_bytes);
    let addr = format!("0.0.0.0:{}", config.contentstore_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("contentstore listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
