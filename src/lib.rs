#![allow(clippy::needless_doctest_main)]
//! `mockserver-fixture` provisions a containerized [MockServer](https://mock-server.com)
//! instance for black-box testing of applications that make outbound HTTP calls:
//! register what the server should answer, exercise your system under test,
//! then verify that the expected calls actually happened.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Expectations](#expectations)
//! 3. [Verification](#verification)
//! 4. [Test isolation](#test-isolation)
//!
//! ## Getting started
//! ```rust,no_run
//! use mockserver_fixture::{MockServerFixture, MockResponse, RequestMatcher};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Pull the image, start the container, wait for readiness.
//!     let mut fixture = MockServerFixture::new()?;
//!     fixture.start().await?;
//!
//!     // Arrange the behaviour of the mock server:
//!     // the next POST to '/orders' with a body containing {"id": 1}
//!     // will receive a 201 with {"ok": true}.
//!     let expectation = fixture
//!         .mock(
//!             "/orders",
//!             RequestMatcher::new().body(json!({"id": 1})),
//!             MockResponse::new(json!({"ok": true})).status(201),
//!         )
//!         .await?;
//!
//!     // ... point the system under test at fixture.url() and exercise it ...
//!
//!     // Assert the call was made; a failure carries the server's diagnostic.
//!     fixture.verify(&expectation).await?;
//!
//!     fixture.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Expectations
//!
//! Expectations are one-shot: each registered rule matches a single request
//! (`remainingTimes: 1`) and then expires, so a second identical request is
//! not guaranteed the same response. Register one expectation per call you
//! expect the system under test to make.
//!
//! Request bodies are matched as partial JSON: the actual body must contain
//! the fields you specified with matching values, but may carry extra fields.
//!
//! ## Verification
//!
//! [`MockServerFixture::mock`] returns an [`Expectation`] descriptor echoing
//! your matcher inputs. Pass it to [`MockServerFixture::verify`] after the
//! act phase of your test: verification resolves if the server observed at
//! least one matching request, and fails with the server's diagnostic -
//! listing the requests actually received - otherwise. That failure is the
//! assertion mechanism of a consuming test.
//!
//! ## Test isolation
//!
//! A fixture owns its container handle and control client; there is no
//! process-wide state. A single fixture must be driven sequentially
//! (`start`, then `mock`/`verify`, then `stop` - the borrow checker enforces
//! this), but independent fixtures on distinct ports can serve parallel
//! suites. Use [`MockServerFixture::reset`] to wipe expectations between
//! test cases sharing one fixture.
mod control;
mod error;
mod expectation;
mod fixture;
mod retry;
mod runtime;

pub use error::FixtureError;
pub use expectation::{Expectation, JsonBodyMatcher, MockResponse, RequestMatcher};
pub use fixture::{
    FixtureBuilder, MockServerFixture, MOCK_SERVER_HOST, MOCK_SERVER_IMAGE, MOCK_SERVER_PORT,
};
pub use retry::RetryPolicy;
pub use runtime::{ContainerRuntime, ContainerSpec, DockerRuntime};
