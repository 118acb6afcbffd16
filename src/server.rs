use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio::{signal, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::codec::FrameCodec;
use crate::commands;
use crate::config::Config;
use crate::connection::Connection;
use crate::store::Store;
use crate::Error;

/// Binds the address in `config` and serves clients until the process receives SIGINT or SIGTERM.
pub async fn run(config: Config) -> Result<(), Error> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    info!("Redis server listening on {}", listener.local_addr()?);

    serve(
        listener,
        Store::new(),
        FrameCodec::new(config.max_frame_size),
        config.shutdown_timeout(),
        shutdown_signal(),
    )
    .await
}

/// Accepts connections on `listener` until `shutdown` completes.
///
/// Every connection runs in its own task against a clone of `store`. Once `shutdown` fires the
/// listener is closed and connections are asked to stop after their current request; whatever is
/// still running after `grace` is aborted.
pub async fn serve(
    listener: TcpListener,
    store: Store,
    codec: FrameCodec,
    grace: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Error> {
    tokio::pin!(shutdown);

    let cancel_token = CancellationToken::new();
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down, no longer accepting connections");
                break;
            }
            result = listener.accept() => match result {
                Ok((socket, client_address)) => {
                    info!("Accepted connection from {:?}", client_address);

                    let conn = Connection::with_codec(socket, codec.clone());
                    let store = store.clone();
                    let cancel_token = cancel_token.clone();

                    connections.spawn(async move {
                        if let Err(e) = handle_connection(conn, client_address, store, cancel_token).await {
                            error!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => error!("Failed to accept connection: {}", e),
            },
            Some(res) = connections.join_next() => {
                if let Err(e) = res {
                    error!("Connection task failed: {}", e);
                }
            }
        }
    }

    drop(listener);
    cancel_token.cancel();

    let drained = time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        warn!(
            "{} connection(s) still open after {:?}, aborting",
            connections.len(),
            grace
        );
        connections.shutdown().await;
    }

    info!("Server stopped");
    Ok(())
}

#[instrument(
    name = "connection",
    skip_all,
    fields(connection_id, client_address)
)]
async fn handle_connection(
    mut conn: Connection,
    client_address: SocketAddr,
    store: Store,
    shutdown: CancellationToken,
) -> Result<(), Error> {
    tracing::Span::current()
        .record("connection_id", tracing::field::display(conn.id))
        .record("client_address", tracing::field::display(client_address));

    loop {
        // Shutdown is only observed while waiting for a request. A request that has started to
        // arrive is read to the end and answered, the grace period bounds how long that may take.
        let frame = tokio::select! {
            res = conn.read_frame() => res?,
            _ = shutdown.cancelled() => {
                if !conn.is_mid_frame() {
                    debug!("Closing connection for shutdown");
                    break;
                }

                debug!("Finishing partially received request before shutdown");
                conn.read_frame().await?
            }
        };

        let Some(frame) = frame else {
            break;
        };

        debug!("Received frame from client: {}", frame);
        let res = commands::dispatch(frame, store.clone())?;
        debug!("Sending response to client: {}", res);

        conn.write_frame(res).await?;
    }

    info!("Connection closed");
    Ok(())
}

/// Completes on the first Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
