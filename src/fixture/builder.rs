use crate::control::ControlClient;
use crate::error::FixtureError;
use crate::fixture::{MockServerFixture, MOCK_SERVER_HOST, MOCK_SERVER_IMAGE, MOCK_SERVER_PORT};
use crate::retry::RetryPolicy;
use crate::runtime::{ContainerRuntime, ContainerSpec, DockerRuntime};
use std::sync::Arc;

/// A builder providing a fluent API to assemble a [`MockServerFixture`]
/// step-by-step. Use [`MockServerFixture::builder`] to get started.
pub struct FixtureBuilder {
    image: String,
    host: String,
    port: u16,
    retry_policy: RetryPolicy,
    runtime: Option<Arc<dyn ContainerRuntime>>,
}

impl FixtureBuilder {
    pub(super) fn new() -> Self {
        Self {
            image: MOCK_SERVER_IMAGE.into(),
            host: MOCK_SERVER_HOST.into(),
            port: MOCK_SERVER_PORT,
            retry_policy: RetryPolicy::default(),
            runtime: None,
        }
    }

    /// Run a different image tag than [`MOCK_SERVER_IMAGE`].
    ///
    /// [`MOCK_SERVER_IMAGE`]: crate::MOCK_SERVER_IMAGE
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Reach the published port on a different host than `localhost` - e.g.
    /// when the Docker daemon runs on a remote machine.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Publish a different port than `1080`. The container port and the host
    /// port are always the same. Parallel suites should each pick their own
    /// port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the readiness probe's backoff schedule. The default waits
    /// roughly two minutes in total.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Drive a different [`ContainerRuntime`] than the local Docker daemon.
    pub fn runtime(mut self, runtime: impl ContainerRuntime + 'static) -> Self {
        self.runtime = Some(Arc::new(runtime));
        self
    }

    /// Finalise the builder to get an instance of a [`MockServerFixture`].
    ///
    /// Connects to the local Docker daemon unless a runtime was injected;
    /// fails if the daemon cannot be reached. No container is provisioned
    /// until [`MockServerFixture::start`] is called.
    pub fn build(self) -> Result<MockServerFixture, FixtureError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Arc::new(DockerRuntime::connect()?),
        };
        let control = ControlClient::new(format!("http://{}:{}", self.host, self.port));
        let spec = ContainerSpec {
            image: self.image,
            port: self.port,
        };
        Ok(MockServerFixture::with_parts(
            runtime,
            control,
            spec,
            self.retry_policy,
        ))
    }
}
