use sqlx::{SqlitePool, migrate::MigrateError};

pub async fn run(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
