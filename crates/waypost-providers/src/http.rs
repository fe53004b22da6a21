//! Shared upstream HTTP plumbing.
//!
//! Each adapter owns exactly one [`UpstreamClient`] for its lifetime — no
//! process-wide singleton. Cloning is cheap; the inner [`reqwest::Client`]
//! is `Arc`-based.

use std::time::Duration;

use serde_json::Value;

use crate::Result;

/// Fixed ceiling for every upstream call; a timeout is handled identically to
/// any other fetch failure.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub(crate) struct UpstreamClient {
  client: reqwest::Client,
}

impl UpstreamClient {
  pub(crate) fn new() -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(UPSTREAM_TIMEOUT)
      .build()?;
    Ok(Self { client })
  }

  /// GET a JSON document. Non-2xx statuses are errors so callers can treat
  /// them like any other provider failure.
  pub(crate) async fn get_json(
    &self,
    url: &str,
    params: &[(&str, String)],
  ) -> std::result::Result<Value, reqwest::Error> {
    self
      .client
      .get(url)
      .query(params)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await
  }
}
