// system-tests/tests/validation.rs
// ============================================================================
// Module: Validation System Tests
// Description: Full backup/restore cycle against CockroachDB and MinIO.
// Purpose: Exercise every validation phase and teardown end to end.
// Dependencies: system-tests helpers, blobcheck-validate
// ============================================================================

//! Validation system tests run a real cluster against real object storage.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod helpers;

use std::time::Duration;

use blobcheck_core::Integrity;
use blobcheck_core::OBFUSCATED;
use blobcheck_core::ParamKey;
use blobcheck_validate::RunOutcome;
use blobcheck_validate::Validator;
use blobcheck_validate::ValidatorOptions;
use helpers::infra::CockroachFixture;
use helpers::infra::Network;
use helpers::infra::S3Fixture;
use helpers::load_config;
use helpers::with_timeout;
use tokio_util::sync::CancellationToken;

fn options() -> ValidatorOptions {
    ValidatorOptions {
        workers: 2,
        workload_duration: Duration::from_secs(1),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn full_cycle_verifies_restore_and_collects_stats() {
    let config = load_config();
    with_timeout(&config, async {
        let network = Network::new();
        let s3 = S3Fixture::start(&config, &network).await.unwrap();
        let db = CockroachFixture::start(&config, &network).await.unwrap();
        let cluster = db.connect().await.unwrap();
        let validator =
            Validator::new(cluster.clone(), s3.cluster_destination(), options()).unwrap();

        let outcome = validator.run(&CancellationToken::new()).await;
        let teardown = validator.clean().await;

        let RunOutcome::Completed(report) = outcome.unwrap() else {
            panic!("run was cancelled");
        };
        teardown.unwrap();
        assert_eq!(report.integrity, Integrity::Verified);
        assert_eq!(report.suggested_params.get(ParamKey::SecretAccessKey), Some(OBFUSCATED));
        let stats = report.stats.unwrap();
        assert!(!stats.is_empty());
        assert!(stats.iter().all(|node| node.error.is_empty()), "{stats:?}");
        for table in [validator.source_table(), validator.restored_table()] {
            let err = cluster.fingerprint(table).unwrap_err();
            assert!(err.to_string().contains("does not exist"), "{err}");
        }
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_run_still_tears_down() {
    let config = load_config();
    with_timeout(&config, async {
        let network = Network::new();
        let s3 = S3Fixture::start(&config, &network).await.unwrap();
        let db = CockroachFixture::start(&config, &network).await.unwrap();
        let cluster = db.connect().await.unwrap();
        let validator = Validator::new(cluster, s3.cluster_destination(), options()).unwrap();
        let stop = CancellationToken::new();
        stop.cancel();

        let outcome = validator.run(&stop).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Cancelled));
        validator.clean().await.unwrap();
    })
    .await;
}
