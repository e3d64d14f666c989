//! Startup connection selection
//!
//! Profiles are tried in priority order; the first one whose client answers
//! the liveness probe is kept for the rest of the process.

use crate::exchange::{BinanceClient, ConnectionError, ExchangeClient, ExchangeError};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// How to reach the exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub label: String,
    pub endpoint: String,
    pub timeout: Duration,
    /// Applied to both HTTP and HTTPS traffic
    pub proxy: Option<String>,
}

impl ConnectionProfile {
    pub fn direct(label: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            label: label.into(),
            endpoint: endpoint.into(),
            timeout,
            proxy: None,
        }
    }

    pub fn proxied(
        label: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
        proxy: impl Into<String>,
    ) -> Self {
        Self {
            proxy: Some(proxy.into()),
            ..Self::direct(label, endpoint, timeout)
        }
    }
}

/// Return the first profile's connection that passes `probe`.
///
/// `probe` both builds the connection and checks it; every failure is
/// logged and the next profile is tried.
pub async fn select_first<T, F, Fut>(
    profiles: &[ConnectionProfile],
    mut probe: F,
) -> Result<(T, ConnectionProfile), ConnectionError>
where
    F: FnMut(&ConnectionProfile) -> Fut,
    Fut: Future<Output = Result<T, ExchangeError>>,
{
    if profiles.is_empty() {
        return Err(ConnectionError::NoProfiles);
    }

    let mut tried = Vec::with_capacity(profiles.len());
    let mut last = String::new();

    for profile in profiles {
        info!(profile = %profile.label, "trying connection");
        match probe(profile).await {
            Ok(conn) => {
                info!(profile = %profile.label, "connection established");
                return Ok((conn, profile.clone()));
            }
            Err(e) => {
                warn!(profile = %profile.label, error = %e, "connection failed");
                tried.push(profile.label.clone());
                last = e.to_string();
            }
        }
    }

    Err(ConnectionError::Unreachable { tried, last })
}

/// Connect to Binance through the first profile that can fetch `probe_symbol`'s ticker
pub async fn select_connection(
    profiles: &[ConnectionProfile],
    probe_symbol: &str,
) -> Result<(BinanceClient, ConnectionProfile), ConnectionError> {
    select_first(profiles, |profile| {
        let profile = profile.clone();
        async move {
            let client = BinanceClient::new(&profile)?;
            let ticker = client.fetch_ticker(probe_symbol).await?;
            info!(symbol = %ticker.symbol, last_price = ticker.last_price, "liveness probe ok");
            Ok::<_, ExchangeError>(client)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn profiles() -> Vec<ConnectionProfile> {
        let timeout = Duration::from_secs(30);
        vec![
            ConnectionProfile::direct("direct", "https://api.binance.com", timeout),
            ConnectionProfile::proxied("proxy", "https://api.binance.com", timeout, "http://127.0.0.1:7890"),
        ]
    }

    #[tokio::test]
    async fn test_first_passing_profile_wins() {
        let calls = RefCell::new(Vec::new());
        let (conn, chosen) = select_first(&profiles(), |p| {
            calls.borrow_mut().push(p.label.clone());
            let ok = p.proxy.is_none();
            async move {
                if ok {
                    Ok(1)
                } else {
                    Err(ExchangeError::RateLimited(429))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(conn, 1);
        assert_eq!(chosen.label, "direct");
        // later profiles are never probed once one succeeds
        assert_eq!(*calls.borrow(), vec!["direct".to_string()]);
    }

    #[tokio::test]
    async fn test_falls_back_to_proxy() {
        let (_, chosen) = select_first(&profiles(), |p| {
            let ok = p.proxy.is_some();
            async move {
                if ok {
                    Ok(())
                } else {
                    Err(ExchangeError::InvalidPayload("timeout".into()))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(chosen.label, "proxy");
        assert_eq!(chosen.proxy.as_deref(), Some("http://127.0.0.1:7890"));
    }

    #[tokio::test]
    async fn test_all_profiles_failing() {
        let err = select_first(&profiles(), |_| async {
            Err::<(), _>(ExchangeError::HttpStatus {
                code: 451,
                body: "restricted location".into(),
            })
        })
        .await
        .unwrap_err();

        match err {
            ConnectionError::Unreachable { tried, last } => {
                assert_eq!(tried, vec!["direct".to_string(), "proxy".to_string()]);
                assert!(last.contains("451"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_no_profiles() {
        let err = select_first(&[], |_| async { Ok::<_, ExchangeError>(()) }).await.unwrap_err();
        assert!(matches!(err, ConnectionError::NoProfiles));
    }
}
