use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use campus_core::config::Config;
use campus_core::tracing::init_tracing;
use campus_verify::config::VerifyConfig;
use campus_verify::infra::crypto::ImageCipher;
use campus_verify::infra::storage::FsImageStore;
use campus_verify::infra::vendor::HttpVerificationVendor;
use campus_verify::router::build_router;
use campus_verify::state::AppState;
use campus_verify::usecase::retry::RetrySubmissionsUseCase;

fn spawn_retry_loop(state: AppState, interval_secs: u64, batch_size: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let usecase = RetrySubmissionsUseCase {
                repo: state.verification_repo(),
                vendor: state.vendor.clone(),
                cipher: state.cipher.clone(),
                callback_url: state.callback_url.clone(),
                batch_size,
            };
            if let Err(e) = usecase.execute().await {
                tracing::error!(error = %e, "must_retry resubmission pass failed");
            }
        }
    });
}

#[tokio::main]
async fn main() {
    init_tracing("campus_verify=info,tower_http=info");

    let config = VerifyConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let cipher = ImageCipher::new(&config.face_image_aes_key, &config.vendor_rsa_public_key)
        .expect("invalid image encryption configuration");

    let state = AppState {
        db,
        cipher: Arc::new(cipher),
        vendor: HttpVerificationVendor {
            client: reqwest::Client::new(),
            api_url: config.vendor_api_url.clone(),
            access_key: config.vendor_access_key.clone(),
            secret_key: config.vendor_secret_key.clone(),
        },
        images: FsImageStore {
            root: config.image_store_dir.clone().into(),
            base_url: config.image_base_url.clone(),
        },
        callback_url: config.callback_url.clone(),
        vendor_name: config.vendor_name.clone(),
        days_good_for: config.days_good_for,
    };

    spawn_retry_loop(
        state.clone(),
        config.retry_interval_secs,
        config.retry_batch_size,
    );

    let router = build_router(state, config.max_image_bytes);
    let addr = format!("0.0.0.0:{}", config.verify_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("verify service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
