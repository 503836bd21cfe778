// system-tests/tests/helpers/infra.rs
// ============================================================================
// Module: System Test Infrastructure
// Description: MinIO and CockroachDB fixtures for blobcheck system-tests.
// Purpose: Provide isolated object storage and a database cluster.
// Dependencies: testcontainers, aws-sdk-s3, blobcheck-store-postgres
// ============================================================================

//! ## Overview
//! Containers share one Docker network so the database can reach MinIO by
//! container name, while the test process reaches both through mapped ports.
//! Existing services named in the environment replace the containers.

use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use blobcheck_core::Cluster;
use blobcheck_core::Destination;
use blobcheck_core::ParamKey;
use blobcheck_core::ParameterSet;
use blobcheck_store_postgres::PostgresCluster;
use blobcheck_store_postgres::PostgresClusterConfig;
use system_tests::config::ExternalS3;
use system_tests::config::SystemTestConfig;
use testcontainers::ContainerAsync;
use testcontainers::GenericImage;
use testcontainers::ImageExt;
use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use uuid::Uuid;

const MINIO_PORT: u16 = 9000;
const COCKROACH_PORT: u16 = 26257;
const READY_ATTEMPTS: u32 = 60;
const READY_INTERVAL: Duration = Duration::from_secs(1);

/// Names shared by the containers of one test.
pub struct Network {
    pub name: String,
    run_id: String,
}

impl Network {
    pub fn new() -> Self {
        let run_id = Uuid::new_v4().simple().to_string();
        Self {
            name: format!("blobcheck-system-{run_id}"),
            run_id,
        }
    }

    fn container(&self, role: &str) -> String {
        format!("blobcheck-{role}-{}", self.run_id)
    }
}

// ============================================================================
// SECTION: Object Storage
// ============================================================================

pub struct S3Fixture {
    pub endpoint: String,
    pub cluster_endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    _container: Option<ContainerAsync<GenericImage>>,
}

impl S3Fixture {
    pub async fn start(config: &SystemTestConfig, network: &Network) -> Result<Self, String> {
        if let Some(external) = &config.s3 {
            let fixture = Self::external(external);
            fixture.seed_bucket().await?;
            return Ok(fixture);
        }

        ensure_docker_available()?;
        let access_key = "minioadmin".to_string();
        let secret_key = "minioadmin".to_string();
        let region = "us-east-1".to_string();
        let name = network.container("minio");
        let container = GenericImage::new("minio/minio", "latest")
            .with_exposed_port(MINIO_PORT.tcp())
            .with_entrypoint("/usr/bin/minio")
            .with_env_var("MINIO_ROOT_USER", access_key.clone())
            .with_env_var("MINIO_ROOT_PASSWORD", secret_key.clone())
            .with_env_var("MINIO_REGION", region.clone())
            .with_cmd(["server", "/data"])
            .with_network(network.name.clone())
            .with_container_name(name.clone())
            .start()
            .await
            .map_err(|err| format!("failed to start minio container: {err}"))?;
        let port = container
            .get_host_port_ipv4(MINIO_PORT.tcp())
            .await
            .map_err(|err| format!("failed to resolve minio port: {err}"))?;
        let fixture = Self {
            endpoint: format!("http://127.0.0.1:{port}"),
            cluster_endpoint: format!("http://{name}:{MINIO_PORT}"),
            bucket: "blobcheck-system-tests".to_string(),
            region,
            access_key,
            secret_key,
            _container: Some(container),
        };
        fixture.seed_bucket().await?;
        Ok(fixture)
    }

    fn external(external: &ExternalS3) -> Self {
        Self {
            endpoint: external.endpoint.clone(),
            cluster_endpoint: external.cluster_endpoint.clone(),
            bucket: external.bucket.clone(),
            region: external.region.clone(),
            access_key: external.access_key.clone(),
            secret_key: external.secret_key.clone(),
            _container: None,
        }
    }

    /// Credentials and region as a blobcheck environment lookup.
    pub fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "AWS_ACCESS_KEY_ID" => Some(self.access_key.clone()),
            "AWS_SECRET_ACCESS_KEY" => Some(self.secret_key.clone()),
            "AWS_REGION" => Some(self.region.clone()),
            _ => None,
        }
    }

    /// Destination the database nodes can write to, under a fresh prefix.
    pub fn cluster_destination(&self) -> Destination {
        let mut params = ParameterSet::new();
        params.insert(ParamKey::AccessKeyId, self.access_key.clone());
        params.insert(ParamKey::SecretAccessKey, self.secret_key.clone());
        params.insert(ParamKey::Region, self.region.clone());
        params.insert(ParamKey::Endpoint, self.cluster_endpoint.clone());
        params.insert(ParamKey::UsePathStyle, "true");
        let path = format!("{}/validation-{}", self.bucket, Uuid::new_v4().simple());
        Destination::new(&path, params)
    }

    pub async fn client(&self) -> Client {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .endpoint_url(self.endpoint.clone())
            .credentials_provider(Credentials::new(
                self.access_key.clone(),
                self.secret_key.clone(),
                None,
                None,
                "system-tests",
            ))
            .load()
            .await;
        let builder = aws_sdk_s3::config::Builder::from(&config).force_path_style(true);
        Client::from_conf(builder.build())
    }

    async fn seed_bucket(&self) -> Result<(), String> {
        let client = self.client().await;
        let mut last_error = String::new();
        for _ in 0 .. READY_ATTEMPTS {
            let _ = client.create_bucket().bucket(self.bucket.clone()).send().await;
            match client.head_bucket().bucket(self.bucket.clone()).send().await {
                Ok(_) => return Ok(()),
                Err(err) => last_error = err.to_string(),
            }
            tokio::time::sleep(READY_INTERVAL).await;
        }
        Err(format!("bucket {} never became ready: {last_error}", self.bucket))
    }
}

// ============================================================================
// SECTION: Database
// ============================================================================

pub struct CockroachFixture {
    pub url: String,
    _container: Option<ContainerAsync<GenericImage>>,
}

impl CockroachFixture {
    pub async fn start(config: &SystemTestConfig, network: &Network) -> Result<Self, String> {
        if let Some(url) = &config.database_url {
            return Ok(Self {
                url: url.clone(),
                _container: None,
            });
        }

        ensure_docker_available()?;
        let container = GenericImage::new("cockroachdb/cockroach", "latest-v25.2")
            .with_exposed_port(COCKROACH_PORT.tcp())
            .with_cmd(["start-single-node", "--insecure"])
            .with_network(network.name.clone())
            .with_container_name(network.container("cockroach"))
            .start()
            .await
            .map_err(|err| format!("failed to start cockroach container: {err}"))?;
        let port = container
            .get_host_port_ipv4(COCKROACH_PORT.tcp())
            .await
            .map_err(|err| format!("failed to resolve cockroach port: {err}"))?;
        Ok(Self {
            url: format!("postgresql://root@127.0.0.1:{port}/defaultdb?sslmode=disable"),
            _container: Some(container),
        })
    }

    /// Connects once the node accepts SQL.
    pub async fn connect(&self) -> Result<Arc<dyn Cluster>, String> {
        let mut last_error = String::new();
        for _ in 0 .. READY_ATTEMPTS {
            let config = PostgresClusterConfig::new(self.url.clone(), 4);
            let joined =
                tokio::task::spawn_blocking(move || PostgresCluster::connect(&config)).await;
            match joined.map_err(|err| err.to_string())? {
                Ok(cluster) => return Ok(Arc::new(cluster)),
                Err(err) => last_error = err.to_string(),
            }
            tokio::time::sleep(READY_INTERVAL).await;
        }
        Err(format!("cockroach never accepted connections: {last_error}"))
    }
}

fn ensure_docker_available() -> Result<(), String> {
    let output = std::process::Command::new("docker")
        .arg("info")
        .output()
        .map_err(|err| format!("docker info failed: {err}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("docker info failed: {stderr}"));
    }
    Ok(())
}
