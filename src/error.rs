/// The error taxonomy of a [`MockServerFixture`].
///
/// Provisioning, teardown and control-API failures are propagated as-is from
/// the underlying clients. [`FixtureError::VerificationFailed`] is the one
/// *expected* failure mode: it is how consuming tests learn that the system
/// under test never made the call they were waiting for.
///
/// [`MockServerFixture`]: crate::MockServerFixture
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The container runtime refused an image pull, container creation,
    /// start, stop or removal.
    #[error("container runtime error")]
    Runtime(#[from] bollard::errors::Error),

    /// An HTTP call to the mock server's control API failed outright
    /// (connection refused, non-success status, malformed payload).
    #[error("mock server control API error")]
    Http(#[from] reqwest::Error),

    /// The readiness probe exhausted its retry budget.
    ///
    /// The last underlying cause is retained as [`source`](std::error::Error::source)
    /// rather than discarded.
    #[error("couldn't start mock server after 2 minutes")]
    StartTimeout {
        #[source]
        source: Box<FixtureError>,
    },

    /// The mock server never observed a request matching the descriptor.
    /// Carries the server-supplied diagnostic, which lists the requests that
    /// were actually received.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// `stop` was called on a fixture that was never started.
    #[error("mock server has not been started")]
    NotStarted,
}
