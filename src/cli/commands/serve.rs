//! Web server command.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use console::style;

use crate::config::Settings;
use crate::origins::UrlExtractor;
use crate::server::{self, AppState};
use crate::services::CollectionService;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Open the store, load the catalog and serve until SIGINT/SIGTERM.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind);
    let addr = resolve_bind_address(&host, port).await?;

    let ctx = settings.open_database().await?;
    let catalog = settings.load_catalog()?;
    let extractor = Arc::new(UrlExtractor::new(catalog));
    let service = CollectionService::new(Arc::new(ctx.collections()), extractor);

    println!(
        "{} Starting collectionbox at http://{}",
        style("→").cyan(),
        addr
    );
    println!("  Press Ctrl+C to stop");

    server::serve(AppState::new(service), addr).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 0.0.0.0:3030
/// - Just a host: "127.0.0.1" -> 127.0.0.1:8080
/// - Host and port: "127.0.0.1:3030" or "[::1]:3030"
fn parse_bind_address(bind: &str) -> (String, u16) {
    let bind = bind.trim();
    if bind.is_empty() {
        return (DEFAULT_HOST.to_string(), DEFAULT_PORT);
    }

    if let Ok(port) = bind.parse::<u16>() {
        return (DEFAULT_HOST.to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        // A bare IPv6 address has colons but no brackets.
        let bracketed = host.starts_with('[') && host.ends_with(']');
        if bracketed || !host.contains(':') {
            if let Ok(port) = port_str.parse::<u16>() {
                return (host.trim_matches(['[', ']']).to_string(), port);
            }
        }
    }

    (bind.trim_matches(['[', ']']).to_string(), DEFAULT_PORT)
}

async fn resolve_bind_address(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("invalid bind address {host}:{port}"))?
        .next()
        .with_context(|| format!("bind address {host}:{port} did not resolve"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(parse_bind_address("3030"), ("0.0.0.0".to_string(), 3030));
        assert_eq!(parse_bind_address("127.0.0.1"), ("127.0.0.1".to_string(), 8080));
        assert_eq!(parse_bind_address("127.0.0.1:9000"), ("127.0.0.1".to_string(), 9000));
        assert_eq!(parse_bind_address("localhost:9000"), ("localhost".to_string(), 9000));
        assert_eq!(parse_bind_address("[::1]:9000"), ("::1".to_string(), 9000));
        assert_eq!(parse_bind_address("::1"), ("::1".to_string(), 8080));
        assert_eq!(parse_bind_address(""), ("0.0.0.0".to_string(), 8080));
    }

    #[tokio::test]
    async fn test_resolve_bind_address() {
        let addr = resolve_bind_address("127.0.0.1", 8080).await.unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        let addr = resolve_bind_address("::1", 0).await.unwrap();
        assert!(addr.is_ipv6());
    }
}
