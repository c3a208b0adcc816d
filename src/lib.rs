pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod quiz;

use tokio::net::TcpListener;

/// Bind the first free port in `[start, start + span)` on all interfaces.
pub async fn bind_first_free(start: u16, span: u16) -> std::io::Result<TcpListener> {
    let mut last_err = None;
    for port in (start..=u16::MAX).take(span as usize) {
        match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                tracing::debug!("Port {port} unavailable: {e}");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrInUse, "empty port range")
    }))
}
