//! Web server

use crate::app::Service;
use crate::cli;

use std::{net::SocketAddr, process::exit, str::FromStr, time::Duration};

use axum::ServiceExt;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use expanduser::expanduser;
use tokio::signal;

/// Parse a socket address from a host and port.
///
/// IPv6 addresses may be given with or without brackets.
fn socket_addr(host: &str, port: u16) -> SocketAddr {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.contains(':') {
        SocketAddr::from_str(&format!("[{}]:{}", host, port))
    } else {
        SocketAddr::from_str(&format!("{}:{}", host, port))
    }
    .expect("invalid host name, IP address or port number")
}

/// Serve the web application and the monitor until a shutdown signal is received.
///
/// # Arguments
///
/// * `args`: Command line arguments
/// * `service`: The web application [Service] to serve
/// * `monitor`: The monitor [Service] to serve
pub async fn serve(args: &cli::CommandLineArgs, service: Service, monitor: Service) {
    let addr = socket_addr(&args.host, args.port);
    let monitor_addr = socket_addr(&args.monitor_host, args.monitor_port);

    // Catch ctrl+c and try to shutdown gracefully
    let handle = Handle::new();
    let monitor_handle = Handle::new();
    tokio::spawn(shutdown_signal(
        vec![handle.clone(), monitor_handle.clone()],
        args.graceful_shutdown_timeout,
    ));

    // The monitor is always plain HTTP.
    let monitor_server = axum_server::bind(monitor_addr)
        .handle(monitor_handle)
        .serve(monitor.into_make_service());
    let monitor_task = tokio::spawn(async move {
        if let Err(err) = monitor_server.await {
            tracing::error!("Monitor server failed: {}", err);
        }
    });
    tracing::info!("Monitor listening on http://{}", monitor_addr);

    if args.https {
        // Expand files
        let abs_cert_file = expanduser(&args.cert_file)
            .expect("Failed to expand ~ to user name. Please provide an absolute path instead.")
            .canonicalize()
            .expect("failed to determine absolute path to TLS cerficate file");
        let abs_key_file = expanduser(&args.key_file)
            .expect("Failed to expand ~ to user name. Please provide an absolute path instead.")
            .canonicalize()
            .expect("failed to determine absolute path to TLS key file");
        // Check files exist
        if !abs_cert_file.exists() {
            println!(
                "TLS certificate file expected at '{}' but not found.",
                abs_cert_file.display()
            );
            exit(1)
        }
        if !abs_key_file.exists() {
            println!(
                "TLS key file expected at '{}' but not found.",
                abs_key_file.display()
            );
            exit(1)
        }
        // Set up TLS config
        let tls_config = RustlsConfig::from_pem_file(abs_cert_file, abs_key_file)
            .await
            .expect("Failed to load TLS certificate files");
        tracing::info!("Listening on https://{}", addr);
        // run HTTPS server with hyper
        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(service.into_make_service())
            .await
            .unwrap();
    } else {
        tracing::info!("Listening on http://{}", addr);
        // run HTTP server with hyper
        axum_server::bind(addr)
            .handle(handle)
            .serve(service.into_make_service())
            .await
            .unwrap();
    }

    if let Err(err) = monitor_task.await {
        tracing::error!("Monitor task failed: {}", err);
    }
}

/// Graceful shutdown handler
///
/// Installs signal handlers to catch Ctrl-C or SIGTERM and trigger a graceful shutdown of every
/// server.
async fn shutdown_signal(handles: Vec<Handle>, timeout: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    println!("signal received, starting graceful shutdown");
    // Force shutdown if graceful shutdown takes longer than the timeout
    for handle in handles {
        handle.graceful_shutdown(Some(Duration::from_secs(timeout)));
    }
}
