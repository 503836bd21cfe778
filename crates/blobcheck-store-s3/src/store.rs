// crates/blobcheck-store-s3/src/store.rs
// ============================================================================
// Module: S3 Object Store
// Description: Per-candidate S3 clients driven from an owned Tokio runtime.
// Purpose: Implement the blocking object storage interfaces over aws-sdk-s3.
// Dependencies: aws-config, aws-sdk-s3, blobcheck-core, tokio, tracing
// ============================================================================

//! ## Overview
//! Per-candidate S3 clients driven from an owned Tokio runtime, implementing
//! the blocking object storage interfaces over aws-sdk-s3.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::config::RequestChecksumCalculation;
use aws_sdk_s3::config::ResponseChecksumValidation;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use blobcheck_core::DEFAULT_REGION;
use blobcheck_core::Destination;
use blobcheck_core::ObjectStore;
use blobcheck_core::ObjectStoreConnector;
use blobcheck_core::ParamKey;
use blobcheck_core::StorageError;
use blobcheck_core::StorageOperation;
use tokio::runtime::Runtime;
use tracing::debug;
use tracing::warn;

use crate::insecure::InsecureHttpClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Provider name attached to static credentials.
const CREDENTIALS_PROVIDER: &str = "blobcheck";

/// Requests per operation; discovery owns the retry dimension.
const MAX_ATTEMPTS: u32 = 1;

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Tokio runtime shared by a connector and the stores it creates.
struct OwnedRuntime {
    /// Runtime handle; taken on drop.
    runtime: Option<Runtime>,
}

impl OwnedRuntime {
    /// Returns the runtime.
    fn get(&self) -> Result<&Runtime, StorageError> {
        self.runtime.as_ref().ok_or_else(|| StorageError::Client("s3 runtime closed".to_string()))
    }
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

// ============================================================================
// SECTION: Connector
// ============================================================================

/// Builds one S3 client per candidate destination.
pub struct S3Connector {
    /// Runtime driving SDK futures.
    runtime: Arc<OwnedRuntime>,
}

impl S3Connector {
    /// Creates a connector with its own multi-threaded runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Client`] when the runtime cannot start.
    pub fn new() -> Result<Self, StorageError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| StorageError::Client(err.to_string()))?;
        Ok(Self {
            runtime: Arc::new(OwnedRuntime {
                runtime: Some(runtime),
            }),
        })
    }
}

impl ObjectStoreConnector for S3Connector {
    fn connect(&self, destination: &Destination) -> Result<Box<dyn ObjectStore>, StorageError> {
        let params = destination.params();
        let access_key = params
            .get(ParamKey::AccessKeyId)
            .ok_or_else(|| StorageError::Client("AWS_ACCESS_KEY_ID is not set".to_string()))?;
        let secret_key = params
            .get(ParamKey::SecretAccessKey)
            .ok_or_else(|| StorageError::Client("AWS_SECRET_ACCESS_KEY is not set".to_string()))?;
        let credentials = Credentials::new(
            access_key,
            secret_key,
            params.get(ParamKey::SessionToken).map(str::to_string),
            None,
            CREDENTIALS_PROVIDER,
        );
        let region = params.get(ParamKey::Region).unwrap_or(DEFAULT_REGION).to_string();
        let endpoint = params.get(ParamKey::Endpoint).map(str::to_string);

        let shared_config = self.runtime.get()?.block_on(async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region))
                .credentials_provider(credentials)
                .retry_config(RetryConfig::standard().with_max_attempts(MAX_ATTEMPTS));
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            loader.load().await
        });

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if params.is_enabled(ParamKey::UsePathStyle) {
            s3_builder = s3_builder.force_path_style(true);
        }
        if params.is_enabled(ParamKey::SkipChecksum) {
            s3_builder = s3_builder
                .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
                .response_checksum_validation(ResponseChecksumValidation::WhenRequired);
        }
        if params.is_enabled(ParamKey::SkipTlsVerify) {
            warn!(destination = %destination, "tls certificate verification disabled");
            let http_client =
                InsecureHttpClient::new().map_err(|err| StorageError::Client(err.to_string()))?;
            s3_builder = s3_builder.http_client(http_client);
        }
        debug!(destination = %destination, params = %params.obfuscated(), "built s3 client");

        Ok(Box::new(S3ObjectStore {
            client: Client::from_conf(s3_builder.build()),
            runtime: Arc::clone(&self.runtime),
        }))
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// S3 client bound to one candidate's settings.
pub struct S3ObjectStore {
    /// SDK client.
    client: Client,
    /// Runtime driving SDK futures.
    runtime: Arc<OwnedRuntime>,
}

impl ObjectStore for S3ObjectStore {
    fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        let client = self.client.clone();
        self.runtime.get()?.block_on(async {
            let output = client
                .list_objects_v2()
                .bucket(bucket)
                .send()
                .await
                .map_err(|err| request_error(StorageOperation::List, &err))?;
            let keys = output.contents().iter().filter_map(|object| object.key());
            Ok(keys.map(str::to_string).collect())
        })
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StorageError> {
        let client = self.client.clone();
        let body = ByteStream::from(body.to_vec());
        self.runtime.get()?.block_on(async {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|err| request_error(StorageOperation::Put, &err))?;
            Ok(())
        })
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let client = self.client.clone();
        self.runtime.get()?.block_on(async {
            let output = client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| request_error(StorageOperation::Get, &err))?;
            let data = output
                .body
                .collect()
                .await
                .map_err(|err| StorageError::request(StorageOperation::Get, err))?;
            Ok(data.into_bytes().to_vec())
        })
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let client = self.client.clone();
        self.runtime.get()?.block_on(async {
            client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| request_error(StorageOperation::Delete, &err))?;
            Ok(())
        })
    }
}

/// Renders an SDK error with its full source chain.
fn request_error<E: std::error::Error>(operation: StorageOperation, err: &E) -> StorageError {
    StorageError::request(operation, DisplayErrorContext(err))
}
