use std::env;

// Capacity of the in-process mutation event channel; a subscriber lagging
// past this many undelivered events starts dropping rather than blocking.
const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub listen_addr: String,
    pub event_capacity: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let database_url = env::var("TASKCAST_DATABASE_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "sqlite://taskcast.sqlite".to_string());

        let listen_addr =
            env::var("TASKCAST_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Self {
            database_url,
            listen_addr,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
