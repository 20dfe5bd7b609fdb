use std::time::Duration;

use serial_test::serial;
use spire_crd::prelude::*;
use spire_crd::FederationError;

const VARS: [&str; 4] = [
    "SPIRE_FEDERATION_NAMESPACE",
    "SPIRE_FEDERATION_CLASS_NAME",
    "SPIRE_FEDERATION_BATCH_CONCURRENCY",
    "SPIRE_FEDERATION_BATCH_DEADLINE_MS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_without_env() {
    clear_env();

    let config = ManagerConfig::from_env().unwrap();

    assert_eq!(config, ManagerConfig::default());
    assert_eq!(config.namespace, None);
    assert_eq!(config.batch_concurrency, 8);
    assert_eq!(config.batch_deadline, None);
}

#[test]
#[serial]
fn reads_every_variable() {
    clear_env();
    std::env::set_var("SPIRE_FEDERATION_NAMESPACE", "spire-system");
    std::env::set_var("SPIRE_FEDERATION_CLASS_NAME", "spire-mgmt");
    std::env::set_var("SPIRE_FEDERATION_BATCH_CONCURRENCY", "3");
    std::env::set_var("SPIRE_FEDERATION_BATCH_DEADLINE_MS", "1500");

    let config = ManagerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(
        config,
        ManagerConfig::new()
            .namespace("spire-system")
            .class_name("spire-mgmt")
            .batch_concurrency(3)
            .batch_deadline(Duration::from_millis(1500))
    );
}

#[test]
#[serial]
fn empty_namespace_means_cluster_scope() {
    clear_env();
    std::env::set_var("SPIRE_FEDERATION_NAMESPACE", "");

    let config = ManagerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.namespace, None);
}

#[test]
#[serial]
fn rejects_unparsable_values() {
    for (var, value) in [
        ("SPIRE_FEDERATION_BATCH_CONCURRENCY", "0"),
        ("SPIRE_FEDERATION_BATCH_CONCURRENCY", "many"),
        ("SPIRE_FEDERATION_BATCH_DEADLINE_MS", "-1"),
    ] {
        clear_env();
        std::env::set_var(var, value);

        let err = ManagerConfig::from_env().unwrap_err();

        assert!(matches!(err, FederationError::InvalidConfig(_)), "{}={}", var, value);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    clear_env();
}

#[test]
fn builder_clamps_concurrency() {
    assert_eq!(ManagerConfig::new().batch_concurrency(0).batch_concurrency, 1);
    assert_eq!(
        ManagerConfig::new().namespace("a").cluster_scoped().namespace,
        None
    );
}
