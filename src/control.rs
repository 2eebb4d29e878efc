use crate::error::FixtureError;
use crate::expectation::{Expectation, MockResponse};
use log::debug;
use reqwest::header::CACHE_CONTROL;
use reqwest::StatusCode;
use serde::Serialize;

/// A thin client for the control API the mock server exposes alongside the
/// mocked routes: expectation registration, verification, reset and the
/// status endpoint used as readiness probe.
///
/// Connection reuse is inherited from `reqwest`'s pooled client; concurrent
/// use from multiple tasks is fine.
pub(crate) struct ControlClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControlClient {
    pub(crate) fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// The base URL of the mocked routes, e.g. `http://localhost:1080`.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A single readiness attempt: `PUT /status` with caching disabled.
    /// Any non-success status or transport error is a failure.
    pub(crate) async fn probe_status(&self) -> Result<(), FixtureError> {
        self.http
            .put(format!("{}/status", self.base_url))
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Register a one-shot expectation: the next single request matching
    /// `{path, method}` receives the given JSON response, after which the
    /// rule expires.
    pub(crate) async fn register(
        &self,
        path: &str,
        response: &MockResponse,
    ) -> Result<(), FixtureError> {
        let payload = ExpectationPayload::one_shot(path, response);
        debug!("Registering expectation on {} {}", payload.http_request.method, path);
        self.http
            .put(format!("{}/mockserver/expectation", self.base_url))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Ask the mock server whether at least one request matching the
    /// descriptor has been received. `202` resolves; `406` carries a
    /// diagnostic listing expected vs actual requests.
    pub(crate) async fn verify(&self, expectation: &Expectation) -> Result<(), FixtureError> {
        let response = self
            .http
            .put(format!("{}/mockserver/verify", self.base_url))
            .json(&VerifyPayload {
                http_request: expectation,
                times: VerifyTimes { at_least: 1 },
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_ACCEPTABLE => {
                Err(FixtureError::VerificationFailed(response.text().await?))
            }
            _ => {
                response.error_for_status()?;
                Ok(())
            }
        }
    }

    /// Drop all registered expectations and recorded requests.
    pub(crate) async fn reset(&self) -> Result<(), FixtureError> {
        self.http
            .put(format!("{}/mockserver/reset", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Wire shape of an expectation registration, as the mock server's control
/// API expects it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpectationPayload {
    pub(crate) http_request: RequestDefinition,
    pub(crate) http_response: ResponseDefinition,
    pub(crate) times: Times,
}

impl ExpectationPayload {
    fn one_shot(path: &str, response: &MockResponse) -> Self {
        Self {
            http_request: RequestDefinition {
                path: path.into(),
                method: response.method.clone(),
            },
            http_response: ResponseDefinition {
                status_code: response.status_code,
                headers: vec![Header {
                    name: "Content-Type".into(),
                    values: vec!["application/json; charset=utf-8".into()],
                }],
                body: response.body.to_string(),
            },
            times: Times {
                remaining_times: 1,
                unlimited: false,
            },
        }
    }
}

#[derive(Serialize)]
pub(crate) struct RequestDefinition {
    pub(crate) path: String,
    pub(crate) method: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponseDefinition {
    pub(crate) status_code: u16,
    pub(crate) headers: Vec<Header>,
    pub(crate) body: String,
}

#[derive(Serialize)]
pub(crate) struct Header {
    pub(crate) name: String,
    pub(crate) values: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Times {
    pub(crate) remaining_times: u32,
    pub(crate) unlimited: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyPayload<'a> {
    http_request: &'a Expectation,
    times: VerifyTimes,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyTimes {
    at_least: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_payload_is_a_one_shot_rule() {
        let response = MockResponse::new(json!({"ok": true})).status(201);

        let payload = ExpectationPayload::one_shot("/orders", &response);
        let serialized = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            serialized,
            json!({
                "httpRequest": {"path": "/orders", "method": "POST"},
                "httpResponse": {
                    "statusCode": 201,
                    "headers": [{
                        "name": "Content-Type",
                        "values": ["application/json; charset=utf-8"],
                    }],
                    "body": "{\"ok\":true}",
                },
                "times": {"remainingTimes": 1, "unlimited": false},
            })
        );
    }
}
