use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::service::{service_fn, Service};
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::config::{warn_allowlist_issues, Config};
use crate::error::{GateError, Result};
use crate::proxy::connection::ConnectionManager;
use crate::proxy::forwarding::Upstream;
use crate::security::{AccessFilter, RemoteAddr};

/// Bind the configured listen address and serve until SIGTERM or SIGINT
pub async fn run(config: Arc<Config>) -> Result<()> {
    let listener = TcpListener::bind(config.listen).await.map_err(GateError::Io)?;

    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|e| {
        GateError::Io(std::io::Error::other(format!("Failed to setup SIGTERM handler: {e}")))
    })?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).map_err(|e| {
        GateError::Io(std::io::Error::other(format!("Failed to setup SIGINT handler: {e}")))
    })?;

    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
    };

    serve(listener, config, shutdown).await
}

/// Accept connections on `listener` until `shutdown` resolves
///
/// Every request is tagged with its connection's [`RemoteAddr`] and passed
/// through an [`AccessFilter`] in front of the configured upstream.
pub async fn serve<F>(listener: TcpListener, config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr().map_err(GateError::Io)?;
    let builder = ConnBuilder::new(TokioExecutor::new());

    let upstream = Upstream::new(
        config.upstream.as_str(),
        Duration::from_millis(config.timeout.connect_ms),
    );
    let filter = AccessFilter::new(config.allowlist.clone(), upstream);
    let connections = ConnectionManager::new();

    warn_allowlist_issues(&config.allowlist);

    info!(
        ?addr,
        upstream = %config.upstream,
        allowlist = config.allowlist.len(),
        "starting IP gate (h1/h2)"
    );

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok((stream, peer)) => (stream, peer),
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };

                let guard = connections.track();
                let mut shutdown_rx = connections.shutdown_receiver();
                let builder = builder.clone();
                let filter = filter.clone();

                tokio::spawn(async move {
                    let _guard = guard;
                    let remote_addr = RemoteAddr::from(peer);

                    let svc = service_fn(move |mut req: Request<Incoming>| {
                        req.extensions_mut().insert(remote_addr.clone());
                        filter.call(req)
                    });

                    let conn = builder.serve_connection(TokioIo::new(stream), svc);
                    tokio::pin!(conn);

                    let result = tokio::select! {
                        res = conn.as_mut() => res,
                        _ = shutdown_rx.changed() => {
                            conn.as_mut().graceful_shutdown();
                            conn.await
                        }
                    };

                    if let Err(e) = result {
                        debug!(?peer, error = %e, "serve_connection error");
                    }
                });
            }
        }
    }

    drop(listener);
    connections
        .shutdown(Duration::from_secs(config.timeout.shutdown_secs))
        .await;

    info!("IP gate stopped");
    Ok(())
}
