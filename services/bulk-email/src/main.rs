use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use campus_bulk_email::config::BulkEmailConfig;
use campus_bulk_email::domain::types::DEFAULT_TEMPLATE;
use campus_bulk_email::infra::mail::HttpMailTransport;
use campus_bulk_email::router::build_router;
use campus_bulk_email::state::AppState;
use campus_bulk_email::usecase::send::SendSettings;
use campus_core::config::Config;
use campus_core::tracing::init_tracing;

/// Drain the QUEUED backlog, then wait for the next tick.
fn spawn_worker(state: AppState, poll_interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(poll_interval_secs));
        loop {
            ticker.tick().await;
            let usecase = state.send_usecase();
            loop {
                match usecase.run_next().await {
                    Ok(Some(_)) => continue,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "bulk email task run failed");
                        break;
                    }
                }
            }
        }
    });
}

#[tokio::main]
async fn main() {
    init_tracing("campus_bulk_email=info,tower_http=info");

    let config = BulkEmailConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        transport: HttpMailTransport {
            client: reqwest::Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
        },
        send_settings: SendSettings {
            emails_per_task: config.emails_per_task,
            max_retries: config.max_retries,
            base_delay: Duration::from_secs(config.retry_delay_secs),
            template: DEFAULT_TEMPLATE.to_owned(),
        },
    };

    spawn_worker(state.clone(), config.poll_interval_secs);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.bulk_email_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("bulk email service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
