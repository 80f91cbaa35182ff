//! Avatar image source resolution.
//!
//! The stored avatar URL is free text. Before it is used as an image source it
//! is probed; anything that would render as a broken image resolves to the
//! static placeholder instead. A fallback is never an error.
//!
//! Only hosts that resolve to public addresses are probed, and redirects are
//! not followed, so the probe cannot be pointed at the service's own network.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use anyhow::Context;
use reqwest::{redirect::Policy, Client, StatusCode, Url};
use serde::Serialize;
use tokio::net::lookup_host;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvatarSource {
    pub src: String,
    pub fallback: bool,
}

#[derive(Clone)]
pub struct AvatarResolver {
    client: Client,
    fallback_url: String,
    allow_private_hosts: bool,
}

impl AvatarResolver {
    pub fn new(fallback_url: &str, probe_timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(probe_timeout)
                .redirect(Policy::none())
                .build()
                .context("Failed to build avatar probe HTTP client")?,
            fallback_url: fallback_url.to_string(),
            allow_private_hosts: false,
        })
    }

    /// Lets tests probe an image host bound to loopback.
    #[cfg(test)]
    fn allowing_private_hosts(mut self) -> Self {
        self.allow_private_hosts = true;
        self
    }

    fn fallback(&self) -> AvatarSource {
        AvatarSource {
            src: self.fallback_url.clone(),
            fallback: true,
        }
    }

    pub async fn resolve(&self, avatar_url: Option<&str>) -> AvatarSource {
        let Some(raw) = avatar_url.map(str::trim).filter(|u| !u.is_empty()) else {
            return self.fallback();
        };

        let url = match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                debug!("Avatar URL has unsupported scheme '{}'", url.scheme());
                return self.fallback();
            }
            Err(e) => {
                debug!("Avatar URL '{raw}' is malformed: {e}");
                return self.fallback();
            }
        };

        if !self.allow_private_hosts && !resolves_publicly(&url).await {
            debug!("Avatar URL '{raw}' does not resolve to a public address");
            return self.fallback();
        }

        if self.is_reachable(&url).await {
            AvatarSource {
                src: url.to_string(),
                fallback: false,
            }
        } else {
            self.fallback()
        }
    }

    /// HEAD first; some image hosts only answer GET.
    async fn is_reachable(&self, url: &Url) -> bool {
        match self.client.head(url.clone()).send().await {
            Ok(r) if r.status().is_success() => true,
            Ok(r) if r.status() == StatusCode::METHOD_NOT_ALLOWED => {
                match self.client.get(url.clone()).send().await {
                    Ok(r) => r.status().is_success(),
                    Err(e) => {
                        debug!("Avatar GET {url} failed: {e}");
                        false
                    }
                }
            }
            Ok(r) => {
                debug!("Avatar {url} answered {}", r.status());
                false
            }
            Err(e) => {
                debug!("Avatar {url} unreachable: {e}");
                false
            }
        }
    }
}

/// True when every address the host resolves to is publicly routable.
async fn resolves_publicly(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let Some(port) = url.port_or_known_default() else {
        return false;
    };
    // IPv6 literals come back bracketed from `host_str`
    let host = host.trim_start_matches('[').trim_end_matches(']');

    match lookup_host((host, port)).await {
        Ok(addrs) => {
            let ips: Vec<IpAddr> = addrs.map(|a| a.ip()).collect();
            !ips.is_empty() && ips.iter().all(is_public)
        }
        Err(e) => {
            debug!("Avatar host '{host}' did not resolve: {e}");
            false
        }
    }
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(&v4),
            None => is_public_v6(v6),
        },
    }
}

fn is_public_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || a == 0
        // carrier-grade NAT, 100.64.0.0/10
        || (a == 100 && (b & 0xc0) == 64))
}

fn is_public_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    !(ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // unique local fc00::/7
        || (first & 0xfe00) == 0xfc00
        // link local fe80::/10
        || (first & 0xffc0) == 0xfe80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::get, Router};

    const FALLBACK: &str = "https://via.placeholder.com/80?text=Avatar";

    fn resolver() -> AvatarResolver {
        AvatarResolver::new(FALLBACK, Duration::from_millis(500)).unwrap()
    }

    fn loopback_resolver() -> AvatarResolver {
        resolver().allowing_private_hosts()
    }

    async fn image_host() -> String {
        let app = Router::new()
            .route("/me.png", get(|| async { "png-bytes" }))
            .route(
                "/bounce.png",
                get(|| async { axum::response::Redirect::temporary("/me.png") }),
            )
            .route(
                "/get-only.png",
                axum::routing::any(|method: axum::http::Method| async move {
                    if method == axum::http::Method::HEAD {
                        AxumStatus::METHOD_NOT_ALLOWED
                    } else {
                        AxumStatus::OK
                    }
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_empty_url_uses_fallback() {
        let r = resolver();
        assert!(r.resolve(None).await.fallback);
        assert!(r.resolve(Some("   ")).await.fallback);
    }

    #[tokio::test]
    async fn test_malformed_url_uses_fallback() {
        let src = resolver().resolve(Some("not a url")).await;
        assert_eq!(src.src, FALLBACK);
        assert!(src.fallback);
    }

    #[tokio::test]
    async fn test_non_http_scheme_uses_fallback() {
        assert!(resolver().resolve(Some("ftp://example.com/a.png")).await.fallback);
    }

    #[tokio::test]
    async fn test_unreachable_url_uses_fallback() {
        let src = resolver()
            .resolve(Some("http://127.0.0.1:1/avatar.png"))
            .await;
        assert_eq!(src.src, FALLBACK);
    }

    #[tokio::test]
    async fn test_reachable_url_is_kept() {
        let base = image_host().await;
        let url = format!("{base}/me.png");
        let src = loopback_resolver().resolve(Some(&url)).await;
        assert!(!src.fallback);
        assert_eq!(src.src, url);
    }

    #[tokio::test]
    async fn test_loopback_host_is_never_probed() {
        let base = image_host().await;
        let src = resolver().resolve(Some(&format!("{base}/me.png"))).await;
        assert!(src.fallback);
        assert_eq!(src.src, FALLBACK);

        let src = resolver().resolve(Some("http://localhost/me.png")).await;
        assert!(src.fallback);
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let base = image_host().await;
        let src = loopback_resolver()
            .resolve(Some(&format!("{base}/bounce.png")))
            .await;
        assert!(src.fallback);
    }

    #[test]
    fn test_non_public_addresses() {
        for ip in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "169.254.169.254",
            "100.64.0.1",
            "0.0.0.0",
            "::1",
            "fd00::1",
            "fe80::1",
            "::ffff:127.0.0.1",
        ] {
            assert!(!is_public(&ip.parse().unwrap()), "{ip} should be private");
        }
        for ip in ["93.184.216.34", "8.8.8.8", "2606:4700::1111"] {
            assert!(is_public(&ip.parse().unwrap()), "{ip} should be public");
        }
    }

    #[tokio::test]
    async fn test_missing_image_uses_fallback() {
        let base = image_host().await;
        let src = loopback_resolver()
            .resolve(Some(&format!("{base}/gone.png")))
            .await;
        assert!(src.fallback);
    }

    #[tokio::test]
    async fn test_get_only_host_is_kept() {
        let base = image_host().await;
        let src = loopback_resolver()
            .resolve(Some(&format!("{base}/get-only.png")))
            .await;
        assert!(!src.fallback);
    }
}
