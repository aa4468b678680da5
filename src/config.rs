use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Origin the bookmarklet posts from; overridable for staging mirrors.
const DEFAULT_BOOKMARKLET_ORIGIN: &str = "https://maimaidx-eng.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub bookmarklet_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bookmarklet_origin = std::env::var("BOOKMARKLET_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_BOOKMARKLET_ORIGIN.to_string());

        Self {
            host,
            port,
            log_level,
            bookmarklet_origin,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
