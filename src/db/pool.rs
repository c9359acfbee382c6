use std::str::FromStr;

use sqlx::{Pool, Sqlite, SqlitePool, sqlite::SqliteConnectOptions};

pub async fn create_pool(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePool::connect_with(options).await
}
