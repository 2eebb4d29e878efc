mod builder;

pub use builder::FixtureBuilder;

use crate::control::ControlClient;
use crate::error::FixtureError;
use crate::expectation::{Expectation, MockResponse, RequestMatcher};
use crate::retry::{self, RetryPolicy};
use crate::runtime::{ContainerRuntime, ContainerSpec};
use log::{debug, info};
use std::sync::Arc;

/// Image the fixture runs by default.
pub const MOCK_SERVER_IMAGE: &str = "mockserver/mockserver:latest";
/// Host the published container port is reached on by default.
pub const MOCK_SERVER_HOST: &str = "localhost";
/// Port published by the container by default, bound to the same host port.
pub const MOCK_SERVER_PORT: u16 = 1080;

/// A containerized mock HTTP server driven by your test suite: provision it
/// once at suite setup, register one-shot expectations before exercising the
/// system under test, verify afterwards, tear it down at suite end.
///
/// The fixture owns the container handle and the control-API client - there is
/// no process-wide state, so independent suites can run their own fixtures as
/// long as they publish distinct ports.
///
/// ### Example:
/// ```rust,no_run
/// use mockserver_fixture::{MockServerFixture, MockResponse, RequestMatcher};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut fixture = MockServerFixture::new()?;
///     fixture.start().await?;
///
///     let expectation = fixture
///         .mock(
///             "/orders",
///             RequestMatcher::new().body(json!({"id": 1})),
///             MockResponse::new(json!({"ok": true})).status(201),
///         )
///         .await?;
///
///     // ... exercise the system under test against fixture.url() ...
///
///     fixture.verify(&expectation).await?;
///     fixture.stop().await?;
///     Ok(())
/// }
/// ```
pub struct MockServerFixture {
    runtime: Arc<dyn ContainerRuntime>,
    control: ControlClient,
    spec: ContainerSpec,
    retry_policy: RetryPolicy,
    container: Option<String>,
}

impl MockServerFixture {
    pub(crate) fn with_parts(
        runtime: Arc<dyn ContainerRuntime>,
        control: ControlClient,
        spec: ContainerSpec,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            runtime,
            control,
            spec,
            retry_policy,
            container: None,
        }
    }

    /// A fixture with the stock configuration: image
    /// [`MOCK_SERVER_IMAGE`] published on
    /// `http://localhost:1080`, driven through the local Docker daemon.
    ///
    /// Fails if the Docker daemon cannot be reached.
    pub fn new() -> Result<Self, FixtureError> {
        Self::builder().build()
    }

    /// Use `MockServerFixture::builder` if you need to customize the fixture -
    /// e.g. a different port for a parallel suite, a faster retry schedule, or
    /// an injected [`ContainerRuntime`].
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::new()
    }

    /// Pull the image, create and start the container, then poll the server's
    /// status endpoint until it accepts requests.
    ///
    /// Pull, create and start failures are not retried. The readiness probe
    /// retries with exponential backoff; when the budget is exhausted `start`
    /// fails with [`FixtureError::StartTimeout`], which retains the last
    /// probe failure as its source.
    ///
    /// Not idempotent: a second `start` without an intervening
    /// [`stop`](MockServerFixture::stop) provisions a second container (or
    /// fails on the port conflict) and orphans the first handle.
    pub async fn start(&mut self) -> Result<(), FixtureError> {
        self.runtime.pull_image(&self.spec.image).await?;
        let id = self.runtime.create_container(&self.spec).await?;
        self.runtime.start_container(&id).await?;
        self.container = Some(id);

        // The process inside the container binds its socket some time after
        // the container is reported as started; poll instead of sleeping a
        // fixed amount.
        retry::with_backoff(&self.retry_policy, || self.control.probe_status())
            .await
            .map_err(|source| FixtureError::StartTimeout {
                source: Box::new(source),
            })?;

        info!("Mock server ready on {}", self.control.base_url());
        Ok(())
    }

    /// Stop and remove the container started by
    /// [`start`](MockServerFixture::start).
    ///
    /// Fails with [`FixtureError::NotStarted`] if the fixture was never
    /// started; other failures propagate from the container runtime as-is.
    pub async fn stop(&mut self) -> Result<(), FixtureError> {
        let id = self.container.take().ok_or(FixtureError::NotStarted)?;
        debug!("Stopping container {}", id);
        self.runtime.stop_container(&id).await?;
        self.runtime.remove_container(&id).await?;
        Ok(())
    }

    /// Base URL of the mocked routes, e.g. `http://localhost:1080`.
    /// Point the system under test here.
    pub fn url(&self) -> &str {
        self.control.base_url()
    }

    /// Register a one-shot expectation: the next single request to `path`
    /// with the response's method receives the response's status and JSON
    /// body, after which the rule expires (`remainingTimes: 1`).
    ///
    /// Returns an [`Expectation`] descriptor echoing the matcher inputs; pass
    /// it to [`verify`](MockServerFixture::verify) after exercising the
    /// system under test. The descriptor is not validated against what the
    /// server stored.
    ///
    /// Control-API failures (malformed expectation, unreachable server)
    /// propagate unwrapped.
    pub async fn mock(
        &self,
        path: &str,
        matcher: RequestMatcher,
        response: MockResponse,
    ) -> Result<Expectation, FixtureError> {
        self.control.register(path, &response).await?;
        Ok(Expectation::new(path, matcher, &response))
    }

    /// Check whether the mock server observed at least one request matching
    /// the descriptor's method, path, headers and (partial-JSON) body since
    /// the expectation was registered.
    ///
    /// A single point-in-time check, no retry: failure means the system under
    /// test did not make the expected call, and carries the server's
    /// diagnostic listing the requests it actually received.
    pub async fn verify(&self, expectation: &Expectation) -> Result<(), FixtureError> {
        self.control.verify(expectation).await
    }

    /// Drop all registered expectations and recorded requests, returning the
    /// server to a clean slate between test cases.
    pub async fn reset(&self) -> Result<(), FixtureError> {
        self.control.reset().await
    }
}
