//! Local HTTP listener that captures the authorization redirect.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Host;

use crate::{AuthorizationCallback, OAuthError, OAuthResult, validate_redirect_uri};

const MAX_REQUEST_HEAD: u64 = 16 * 1024;

/// How long one connection may take to send its request head.
const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Listens on the redirect URI's host and port for exactly one callback.
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    /// Bind to the host and port named by `redirect_uri`.
    ///
    /// Only plain `http` redirect URIs can be served locally.
    pub async fn bind(redirect_uri: &str) -> OAuthResult<Self> {
        let url = validate_redirect_uri(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(OAuthError::InvalidConfig(format!(
                "callback listener needs an http redirect_uri, got {redirect_uri:?}"
            )));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => {
                return Err(OAuthError::InvalidConfig(format!(
                    "redirect_uri {redirect_uri:?} has no host"
                )));
            }
        };
        let port = url.port_or_known_default().unwrap_or(80);

        let listener = TcpListener::bind((host.as_str(), port)).await?;
        debug!(addr = ?listener.local_addr().ok(), path = url.path(), "callback listener bound");

        Ok(Self {
            listener,
            path: url.path().to_string(),
        })
    }

    /// Address actually bound (useful when the redirect URI names port 0).
    pub fn local_addr(&self) -> OAuthResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait for the provider redirect and return the validated authorization code.
    ///
    /// Requests for other paths get a 404 and are otherwise ignored. The first
    /// request on the callback path decides the outcome: a provider error or a
    /// state mismatch is returned as an error.
    pub async fn wait_for_code(self, expected_state: &str, timeout: Duration) -> OAuthResult<String> {
        tokio::time::timeout(timeout, self.accept_callback(expected_state))
            .await
            .map_err(|_| OAuthError::CallbackTimeout(timeout))?
    }

    async fn accept_callback(&self, expected_state: &str) -> OAuthResult<String> {
        let mut pending = JoinSet::new();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (mut stream, peer) = accepted?;
                    pending.spawn(async move {
                        let target = tokio::time::timeout(
                            CONNECTION_READ_TIMEOUT,
                            read_request_target(&mut stream),
                        )
                        .await;
                        (stream, peer, target)
                    });
                }
                Some(joined) = pending.join_next(), if !pending.is_empty() => {
                    let Ok((mut stream, peer, target)) = joined else {
                        continue;
                    };
                    let target = match target {
                        Ok(Ok(Some(target))) => target,
                        Ok(Ok(None)) => continue,
                        Ok(Err(err)) => {
                            warn!(%peer, error = %err, "dropping malformed callback request");
                            continue;
                        }
                        Err(_) => {
                            debug!(%peer, "dropping idle callback connection");
                            continue;
                        }
                    };

                    let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));
                    if path != self.path {
                        debug!(%peer, path, "ignoring request outside the callback path");
                        write_response(&mut stream, "404 Not Found", "Not found").await;
                        continue;
                    }

                    let outcome = AuthorizationCallback::from_query(query)
                        .and_then(|cb| cb.validate(expected_state));
                    match &outcome {
                        Ok(_) => {
                            write_response(
                                &mut stream,
                                "200 OK",
                                "Authorization complete. You can close this window.",
                            )
                            .await;
                        }
                        Err(err) => {
                            warn!(%peer, error = %err, "authorization callback rejected");
                            write_response(&mut stream, "400 Bad Request", "Authorization failed.")
                                .await;
                        }
                    }
                    return outcome;
                }
            }
        }
    }
}

/// Read the request line and headers, returning the request target.
async fn read_request_target(stream: &mut TcpStream) -> std::io::Result<Option<String>> {
    let mut reader = BufReader::new(stream.take(MAX_REQUEST_HEAD));

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(None);
    }

    // Drain headers so the client sees a clean response.
    let mut header = String::new();
    loop {
        header.clear();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => Ok(Some(target.to_string())),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unexpected request line {:?}", request_line.trim_end()),
        )),
    }
}

async fn write_response(stream: &mut TcpStream, status: &str, message: &str) {
    let body = format!(
        "<!DOCTYPE html><html><head><title>ESO Logs</title></head>\
         <body><p>{message}</p></body></html>"
    );
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(err) = stream.write_all(response.as_bytes()).await {
        debug!(error = %err, "failed to answer callback request");
    }
    let _ = stream.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn bound_listener() -> (CallbackListener, String) {
        let listener = CallbackListener::bind("http://127.0.0.1:0/callback")
            .await
            .unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        (listener, base)
    }

    #[tokio::test]
    async fn test_captures_code() {
        let (listener, base) = bound_listener().await;
        let waiter = tokio::spawn(async move {
            listener
                .wait_for_code("xyz", Duration::from_secs(5))
                .await
        });

        let response = reqwest::get(format!("{base}/callback?code=the-code&state=xyz"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.text().await.unwrap().contains("Authorization complete"));

        assert_eq!(waiter.await.unwrap().unwrap(), "the-code");
    }

    #[tokio::test]
    async fn test_ignores_other_paths() {
        let (listener, base) = bound_listener().await;
        let waiter = tokio::spawn(async move {
            listener
                .wait_for_code("xyz", Duration::from_secs(5))
                .await
        });

        let favicon = reqwest::get(format!("{base}/favicon.ico")).await.unwrap();
        assert_eq!(favicon.status(), 404);

        reqwest::get(format!("{base}/callback?code=c2&state=xyz"))
            .await
            .unwrap();
        assert_eq!(waiter.await.unwrap().unwrap(), "c2");
    }

    #[tokio::test]
    async fn test_state_mismatch_fails() {
        let (listener, base) = bound_listener().await;
        let waiter = tokio::spawn(async move {
            listener
                .wait_for_code("expected", Duration::from_secs(5))
                .await
        });

        let response = reqwest::get(format!("{base}/callback?code=c&state=forged"))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, OAuthError::StateMismatch { .. }));
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_block_redirect() {
        let (listener, base) = bound_listener().await;
        let addr = listener.local_addr().unwrap();
        let waiter = tokio::spawn(async move {
            listener
                .wait_for_code("xyz", Duration::from_secs(3))
                .await
        });

        // Browsers open speculative sockets and never write to them.
        let _idle = TcpStream::connect(addr).await.unwrap();

        let response = reqwest::get(format!("{base}/callback?code=the-code&state=xyz"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(waiter.await.unwrap().unwrap(), "the-code");
    }

    #[tokio::test]
    async fn test_timeout() {
        let (listener, _) = bound_listener().await;
        let err = listener
            .wait_for_code("xyz", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::CallbackTimeout(_)));
    }

    #[tokio::test]
    async fn test_https_redirect_rejected() {
        let err = CallbackListener::bind("https://127.0.0.1:0/callback")
            .await
            .unwrap_err();
        assert!(err.is_config());
    }
}
