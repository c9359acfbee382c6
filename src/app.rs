use std::net::SocketAddr;

use anyhow::Context;

use crate::{AppState, config::ServerConfig, db, events::EventRelay, routes, ws};

pub struct Server;

impl Server {
    pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
        let pool = db::pool::create_pool(&config.database_url)
            .await
            .context("failed to create sqlite pool")?;

        db::migrate::run(&pool)
            .await
            .context("failed to run database migrations")?;

        let relay = EventRelay::new(config.event_capacity);
        let rooms = ws::rooms::Rooms::default();
        let state = AppState::new(pool, relay.clone(), rooms.clone(), config.clone());

        tokio::spawn(ws::fanout::run(relay.subscribe(), rooms));

        let router = routes::router(state);
        let addr: SocketAddr = config
            .listen_addr
            .parse()
            .context("listen address is invalid")?;
        let tcp_listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("failed to bind tcp listener")?;

        tracing::info!(%addr, "taskcast server listening");

        axum::serve(tcp_listener, router.into_make_service())
            .await
            .context("server failure")?;

        Ok(())
    }
}
