mod handlers;
mod models;
mod services;
mod utils;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::env;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    handlers::{interviews, reports, retention},
    utils::database::create_pool,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_scheduler_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_pool(&database_url).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let state = AppState { db };

    let cors_origin =
        env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let cors = if cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(axum::http::header::HeaderValue::from_static("*"))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
    } else {
        CorsLayer::new()
            .allow_origin(cors_origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
    };

    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/candidates/:candidate_id/interviews",
            post(interviews::create_interview),
        )
        .route(
            "/candidates/:candidate_id/interviews/next-round",
            post(interviews::schedule_next_round),
        )
        .route("/interviews/:id", get(interviews::get_interview))
        .route("/interviews/:id", put(interviews::update_interview))
        .route("/interviews/:id", delete(interviews::delete_interview))
        .route(
            "/interviews/:id/finalize",
            post(interviews::finalize_interview),
        )
        .route(
            "/reports/interviewer-workload",
            get(reports::interviewer_workload),
        )
        .route("/reports/tracker", get(reports::interview_tracker))
        .route("/reports/daily-summary", get(reports::daily_summary))
        .route("/reports/monthly-summary", get(reports::monthly_summary))
        .route("/reports/total-summary", get(reports::total_summary))
        .route("/admin/retention/sweep", post(retention::trigger_sweep))
        .layer(cors)
        .with_state(state.clone());

    // Start the background retention sweeper
    let retention_db = state.db.clone();
    tokio::spawn(async move {
        use crate::services::retention::RetentionService;
        use tokio_cron_scheduler::{Job, JobScheduler};

        let sched = JobScheduler::new()
            .await
            .expect("Failed to create scheduler");

        // Purge long-soft-deleted interviews daily at 2 AM
        let job = Job::new_async("0 0 2 * * *", move |_uuid, _l| {
            let db = retention_db.clone();
            Box::pin(async move {
                let retention_service = RetentionService::new(db);
                match retention_service.permanently_delete_old_interviews().await {
                    Ok(purged) => {
                        tracing::info!("Retention sweep purged {} interviews", purged);
                    }
                    Err(e) => {
                        tracing::error!("Retention sweep failed: {}", e);
                    }
                }
            })
        })
        .expect("Failed to create retention job");

        sched.add(job).await.expect("Failed to add job");
        sched.start().await.expect("Failed to start scheduler");

        tracing::info!("Retention scheduler started - running daily at 2 AM");

        // Keep the scheduler running
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
        }
    });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
    tracing::info!("Server running on http://0.0.0.0:8000");

    axum::serve(listener, app).await?;

    Ok(())
}
