use std::sync::Arc;

use anyhow::Context;
use common_auth::{JwtSigner, JwtVerifier};
use eats_service::email::{EmailSender, LogSender, MailgunSender};
use eats_service::metrics::ServiceMetrics;
use eats_service::payments::promotion::spawn_promotion_sweeper;
use eats_service::pubsub::PubSub;
use eats_service::uploads::{MemoryStore, ObjectStore, S3Store};
use eats_service::{build_router, build_schema, load_service_config, AppContext, AppState};
use reqwest::Client;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_service_config()?;

    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("failed to run database migrations")?;

    let http_client = Client::new();
    let mailer: Arc<dyn EmailSender> = match config.mailgun.clone() {
        Some(mailgun) => {
            info!(domain = %mailgun.domain, "Mailgun delivery enabled");
            Arc::new(MailgunSender::new(http_client.clone(), mailgun))
        }
        None => {
            warn!("MAILGUN_API_KEY not set; verification emails will only be logged");
            Arc::new(LogSender)
        }
    };
    let object_store: Arc<dyn ObjectStore> = match config.uploads.clone() {
        Some(uploads) => {
            info!(bucket = %uploads.bucket, region = %uploads.region, "S3 uploads enabled");
            Arc::new(S3Store::new(http_client.clone(), uploads))
        }
        None => {
            warn!("UPLOAD_BUCKET not set; uploads are kept in memory");
            Arc::new(MemoryStore::default())
        }
    };

    let signer = Arc::new(JwtSigner::from_secret(config.jwt.clone(), &config.jwt_secret)?);
    let verifier = Arc::new(JwtVerifier::from_secret(config.jwt.clone(), &config.jwt_secret)?);
    let metrics = ServiceMetrics::new()?;

    let ctx = AppContext {
        db: db.clone(),
        pubsub: PubSub::default(),
        signer,
        mailer,
        metrics: metrics.clone(),
    };
    spawn_promotion_sweeper(db, metrics.clone(), config.promotion_sweep_interval);

    let state = AppState {
        schema: build_schema(ctx),
        jwt_verifier: verifier,
        object_store,
        metrics,
        graphiql: config.graphiql_enabled,
    };
    let app = build_router(state, &config.cors_allowed_origins);

    info!(addr = %config.bind_addr, "starting eats-service");
    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
