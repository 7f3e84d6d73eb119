mod authentication;
mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod helpers;
mod models;
mod policy;

use anyhow::Context;
pub use anyhow::Result;
pub use config::Config;
pub use data_formats::*;
pub use models::{ArticleStatus, Role};

use axum::{routing::*, Extension, Router};
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub async fn run_app(app: Router, address: SocketAddr, db_url: &str) -> Result<()> {
    let db = init_db(db_url).await?;
    serve_app(app, address, db).await
}

pub async fn serve_app(app: Router, address: SocketAddr, pool: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(pool)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!(db_url, "creating database");
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    let pool = SqlitePool::connect(db_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").expect("Could not bind a local port");
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/api/auth/register", post(register_user))
        .route("/api/auth/login", post(login_user))
        .route("/api/auth/profile", get(get_profile).put(update_profile))
        .route("/api/articles", post(create_article).get(list_articles))
        .route(
            "/api/articles/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/api/articles/:id/publish", post(publish_article))
        .route(
            "/api/articles/:id/like",
            post(like_article).delete(unlike_article),
        )
        .route("/api/articles/:id/likes", get(get_article_likes))
        .route("/api/comments", post(create_comment))
        .route("/api/comments/article/:article_id", get(get_article_comments))
        .route(
            "/api/comments/:id",
            put(update_comment).delete(delete_comment),
        )
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user).delete(delete_user))
        .route("/api/users/:id/articles", get(get_user_articles))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
