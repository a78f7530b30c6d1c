//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use cookie_path_rewrite::config::{parse_config, LoadedConfig};
use cookie_path_rewrite::{HttpServer, Shutdown};

/// Start a mock upstream that answers every request with the given cookies.
pub async fn start_cookie_backend(set_cookies: &'static [&'static str]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let body = "backend body";
                let mut response = String::from("HTTP/1.1 200 OK\r\n");
                for cookie in set_cookies {
                    response.push_str(&format!("Set-Cookie: {}\r\n", cookie));
                }
                response.push_str(&format!(
                    "X-Backend: mock\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                ));
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A running filter host.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub updates: mpsc::UnboundedSender<LoadedConfig>,
    pub shutdown: Shutdown,
}

/// Start the filter host in front of `upstream` with the given TOML rules.
pub async fn start_proxy(upstream: SocketAddr, rules_toml: &str) -> RunningProxy {
    let toml = format!("[upstream]\naddress = \"{}\"\n{}", upstream, rules_toml);
    let loaded = parse_config(&toml).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, update_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(loaded).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, update_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    RunningProxy {
        addr,
        updates,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
