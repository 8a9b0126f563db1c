// src/net.rs

// One blocking GET, status check, body text. No retry, no backoff.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::consts::USER_AGENT;
use crate::error::{Result, ScorecardError};

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Shared blocking client with the request timeout baked in.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Send the request and read the whole body, whatever the status.
pub fn http_get(client: &Client, url: &str) -> Result<HttpResponse> {
    tracing::debug!(url = %redact_api_key(url), "GET");
    let resp = client.get(url).send()?;
    let status = resp.status().as_u16();
    let body = resp.text()?;
    tracing::debug!(status, bytes = body.len(), "response");
    Ok(HttpResponse { status, body })
}

/// 200 → body; anything else → HttpStatus with a hint for the caller.
pub fn ensure_ok(resp: HttpResponse, url: &str) -> Result<String> {
    if resp.status == 200 {
        return Ok(resp.body);
    }
    Err(ScorecardError::HttpStatus {
        status: resp.status,
        url: redact_api_key(url),
        hint: status_hint(resp.status),
    })
}

pub fn status_hint(status: u16) -> &'static str {
    match status {
        400 => "bad request; check the filter expression",
        403 => "api key rejected",
        404 => "malformed URL; check the base endpoint and dataset path",
        429 => "rate quota for this api key exceeded; reduce request frequency or raise per_page",
        500 => "transient server fault; retry after a delay",
        502..=504 => "upstream unavailable; retry after a delay",
        _ => "unexpected status",
    }
}

/// Replace the `api_key` value so URLs can be logged and shown.
pub fn redact_api_key(url: &str) -> String {
    const KEY: &str = "api_key=";
    let Some(start) = url.find(KEY).map(|i| i + KEY.len()) else {
        return s!(url);
    };
    let end = url[start..].find('&').map(|i| start + i).unwrap_or(url.len());
    join!(&url[..start], "***", &url[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_key_anywhere() {
        assert_eq!(redact_api_key("https://h/x?a=1&api_key=SECRET"), "https://h/x?a=1&api_key=***");
        assert_eq!(redact_api_key("https://h/x?api_key=SECRET&a=1"), "https://h/x?api_key=***&a=1");
        assert_eq!(redact_api_key("https://h/x?a=1"), "https://h/x?a=1");
    }

    #[test]
    fn non_200_maps_to_status_error() {
        let resp = HttpResponse { status: 429, body: s!("slow down") };
        let err = ensure_ok(resp, "https://h/x?api_key=k").unwrap_err();
        match err {
            ScorecardError::HttpStatus { status, url, hint } => {
                assert_eq!(status, 429);
                assert!(!url.contains("=k"));
                assert!(hint.contains("quota"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(status_hint(404).contains("malformed URL"));
        assert!(status_hint(500).contains("transient"));
    }
}
