use crate::error::FixtureError;
use async_trait::async_trait;
use bollard::container::{Config, CreateContainerOptions, StartContainerOptions};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use bollard::Docker;
use futures::StreamExt;
use log::debug;
use std::collections::HashMap;

/// What the fixture needs to know to create the mock server container: which
/// image to run and which port to publish. The container port is bound to the
/// same port on the host, and a TTY is allocated.
#[derive(Clone, Debug)]
pub struct ContainerSpec {
    pub image: String,
    pub port: u16,
}

/// The container-lifecycle operations the fixture drives.
///
/// [`DockerRuntime`] is the production implementation; tests can inject a
/// fake to exercise the fixture without a Docker daemon.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Pull `image` from the registry, returning only once the pull has
    /// completed.
    async fn pull_image(&self, image: &str) -> Result<(), FixtureError>;

    /// Create a container from `spec` and return its id.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, FixtureError>;

    async fn start_container(&self, id: &str) -> Result<(), FixtureError>;

    async fn stop_container(&self, id: &str) -> Result<(), FixtureError>;

    async fn remove_container(&self, id: &str) -> Result<(), FixtureError>;
}

/// [`ContainerRuntime`] backed by the local Docker daemon.
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the Docker daemon using the platform's local defaults
    /// (Unix socket or named pipe).
    pub fn connect() -> Result<Self, FixtureError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn pull_image(&self, image: &str) -> Result<(), FixtureError> {
        debug!("Pulling image {}", image);
        let options = CreateImageOptions {
            from_image: image,
            ..Default::default()
        };
        // Pulling is asynchronous on the daemon side; the progress stream must
        // be drained to completion before the image is known to be available.
        let mut progress = self.docker.create_image(Some(options), None, None);
        while let Some(update) = progress.next().await {
            update?;
        }
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, FixtureError> {
        let port_key = format!("{}/tcp", spec.port);

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            port_key.clone(),
            Some(vec![PortBinding {
                host_ip: None,
                host_port: Some(spec.port.to_string()),
            }]),
        );
        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(port_key, HashMap::new());

        let config = Config {
            image: Some(spec.image.clone()),
            tty: Some(true),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await?;
        debug!("Created container {}", created.id);
        Ok(created.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), FixtureError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<(), FixtureError> {
        self.docker.stop_container(id, None).await?;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<(), FixtureError> {
        self.docker.remove_container(id, None).await?;
        Ok(())
    }
}
