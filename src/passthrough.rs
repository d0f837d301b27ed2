//! Routing rules for the offline-cache fetch proxy that serves documents to
//! the parser. The proxy itself lives outside this crate; these rules decide
//! what it may touch.

use std::fmt::Display;

use tracing::debug;

/// Auth/API provider and weather-data provider; never proxied.
pub const DEFAULT_BYPASS_HOSTS: &[&str] = &["google.com", "open-meteo.com"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Let the request go out untouched; the proxy must not answer it.
    Bypass,
    Intercept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Bypassed,
    Responded(T),
    /// The network failed. Nothing is fabricated in its place.
    NoResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Skip waiting and take control of already-open clients.
    Immediate,
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    bypass_hosts: Vec<String>,
    claim_immediately: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BYPASS_HOSTS.iter().copied())
    }
}

impl FetchPolicy {
    pub fn new<I, S>(bypass_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bypass_hosts: bypass_hosts
                .into_iter()
                .map(|h| h.into().to_lowercase())
                .collect(),
            claim_immediately: true,
        }
    }

    pub fn claim_immediately(mut self, claim: bool) -> Self {
        self.claim_immediately = claim;
        self
    }

    pub fn bypass_hosts(&self) -> &[String] {
        &self.bypass_hosts
    }

    pub fn route(&self, url: &str) -> Route {
        let host = host_of(url).to_lowercase();
        if self.bypass_hosts.iter().any(|h| host.contains(h.as_str())) {
            Route::Bypass
        } else {
            Route::Intercept
        }
    }

    /// Run `fetch` for intercepted URLs. Failures surface as
    /// [`Outcome::NoResponse`] so the caller can fall back to cached content.
    pub fn respond<T, E, F>(&self, url: &str, fetch: F) -> Outcome<T>
    where
        E: Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        if self.route(url) == Route::Bypass {
            return Outcome::Bypassed;
        }
        match fetch(url) {
            Ok(response) => Outcome::Responded(response),
            Err(e) => {
                debug!(url, error = %e, "fetch failed, no response");
                Outcome::NoResponse
            }
        }
    }

    pub fn install(&self) -> Activation {
        if self.claim_immediately {
            Activation::Immediate
        } else {
            Activation::Deferred
        }
    }
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    host_port.split(':').next().unwrap_or(host_port)
}
