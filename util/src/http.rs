use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Builds the shared HTTP client used for backend calls.
///
/// `timeout_secs` caps each whole request; redirects are limited to 5 hops.
pub fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
}

/// Returns true if the URL appears reachable (2xx/3xx considered alive).
///  - HEAD first (fast), fall back to GET on 405/501.
///  - `timeout_secs` caps the whole request timeout.
pub async fn is_url_alive(url: &str, timeout_secs: u64) -> Result<bool, reqwest::Error> {
    let client = build_client(timeout_secs)?;

    if let Ok(resp) = client.head(url).send().await {
        let code = resp.status();
        if is_alive_status(code) {
            return Ok(true);
        }
        // Some hosts disallow HEAD
        if code != StatusCode::METHOD_NOT_ALLOWED && code != StatusCode::NOT_IMPLEMENTED {
            return Ok(false);
        }
    }

    // HEAD failed outright or was refused: fall back to GET
    let get = client.get(url).send().await?;
    Ok(is_alive_status(get.status()))
}

fn is_alive_status(code: StatusCode) -> bool {
    code.is_success() || code.is_redirection() || code == StatusCode::NOT_MODIFIED
}
