use std::io;
use std::net::{IpAddr, SocketAddr};

use axum::Router;
use if_addrs::get_if_addrs;
use tokio::net::{TcpListener, ToSocketAddrs};

/// Serve `router` until Ctrl-C or SIGTERM.
pub async fn serve<A: ToSocketAddrs>(addr: A, router: Router) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log_listener_urls(&listener);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn log_listener_urls(listener: &TcpListener) {
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::warn!("could not determine listening address: {}", e);
            return;
        }
    };

    let port = addr.port();
    let ips = match addr {
        SocketAddr::V4(v4) if v4.ip().is_unspecified() => interface_ips(false),
        SocketAddr::V6(v6) if v6.ip().is_unspecified() => interface_ips(true),
        _ => vec![addr.ip()],
    };

    for ip in ips {
        tracing::info!("listening on {}", url_for(ip, port));
    }
}

fn interface_ips(ipv6: bool) -> Vec<IpAddr> {
    get_if_addrs()
        .into_iter()
        .flatten()
        .map(|i| i.ip())
        .filter(|ip| ip.is_ipv6() == ipv6)
        .collect()
}

fn url_for(addr: IpAddr, port: u16) -> String {
    match addr {
        _ if addr.is_loopback() => format!("http://localhost:{}", port),
        IpAddr::V4(_) => format!("http://{}:{}", addr, port),
        IpAddr::V6(_) => format!("http://[{}]:{}", addr, port),
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
