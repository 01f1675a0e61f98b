//! Throwaway PostgreSQL databases for adapter tests.
//!
//! `PROMPT2LEARN_TEST_PG_URL` points the tests at an existing server;
//! otherwise one container is started per test binary and reused.

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

// The container handle lives here so the server outlives every test.
static SERVER: OnceCell<(String, Option<ContainerAsync<Postgres>>)> = OnceCell::const_new();

async fn server_url() -> &'static str {
    let (url, _) = SERVER
        .get_or_init(|| async {
            if let Ok(url) = std::env::var("PROMPT2LEARN_TEST_PG_URL") {
                return (url.trim_end_matches('/').to_string(), None);
            }
            let container = Postgres::default()
                .with_tag("16-alpine")
                .start()
                .await
                .expect("PostgreSQL container should start");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("PostgreSQL port should be mapped");
            let host = container.get_host().await.expect("container host");
            (format!("postgresql://postgres:postgres@{host}:{port}"), Some(container))
        })
        .await;
    url
}

async fn connect(db_name: &str, max_connections: u32) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&format!("{}/{db_name}", server_url().await))
        .await
        .unwrap_or_else(|e| panic!("cannot connect to {db_name}: {e}"))
}

/// Creates an empty database with a unique name and returns `(pool, db_name)`.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!(
        "prompt2learn_test_{}_{}",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let admin = connect("postgres", 1).await;
    admin
        .execute(format!("CREATE DATABASE {db_name}").as_str())
        .await
        .unwrap_or_else(|e| panic!("cannot create {db_name}: {e}"));
    admin.close().await;

    (connect(&db_name, 5).await, db_name)
}

/// Drops a database made by [`create_test_db`], closing its open connections first.
pub async fn drop_test_db(db_name: &str) {
    let admin = connect("postgres", 1).await;
    let _ = admin
        .execute(format!("DROP DATABASE IF EXISTS {db_name} WITH (FORCE)").as_str())
        .await;
    admin.close().await;
}
