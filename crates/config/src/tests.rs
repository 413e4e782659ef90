use super::*;
use std::collections::HashMap;

fn resolve(vars: &[(&str, &str)]) -> Result<MetricsConfig, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    MetricsConfig::from_lookup(|var| map.get(var).cloned())
}

// -------------------- Defaults --------------------

#[test]
fn nothing_set_uses_defaults() {
    let cfg = resolve(&[]).unwrap();
    assert_eq!(cfg, MetricsConfig::default());
    assert!(cfg.enabled);
    assert_eq!(cfg.bind_attempts, 2);
    assert_eq!(cfg.service_name, "media.metrics");
}

#[test]
fn empty_values_count_as_unset() {
    let cfg = resolve(&[
        (ENV_ENABLED, ""),
        (ENV_BIND_ATTEMPTS, "  "),
        (ENV_SERVICE_NAME, ""),
    ])
    .unwrap();
    assert_eq!(cfg, MetricsConfig::default());
}

// -------------------- Enablement --------------------

#[test]
fn primary_switch_decides_when_set() {
    assert!(!resolve(&[(ENV_ENABLED, "0")]).unwrap().enabled);
    assert!(resolve(&[(ENV_ENABLED, "3")]).unwrap().enabled);
    // primary wins over persist
    assert!(!resolve(&[(ENV_ENABLED, "0"), (ENV_ENABLED_PERSIST, "1")])
        .unwrap()
        .enabled);
}

#[test]
fn unset_primary_defers_to_persist() {
    assert!(!resolve(&[(ENV_ENABLED, "-1"), (ENV_ENABLED_PERSIST, "0")])
        .unwrap()
        .enabled);
    assert!(!resolve(&[(ENV_ENABLED_PERSIST, "0")]).unwrap().enabled);
    assert!(resolve(&[(ENV_ENABLED_PERSIST, "1")]).unwrap().enabled);
}

#[test]
fn both_switches_unset_fall_back_to_default() {
    assert!(resolve(&[(ENV_ENABLED_PERSIST, "-1")]).unwrap().enabled);
    assert!(resolve(&[(ENV_ENABLED, "-1"), (ENV_ENABLED_PERSIST, "-1")])
        .unwrap()
        .enabled);
    assert!(!resolve(&[(ENV_ENABLED_PERSIST, "-2")]).unwrap().enabled);
}

#[test]
fn negative_values_other_than_unset_disable() {
    assert!(!resolve(&[(ENV_ENABLED, "-5")]).unwrap().enabled);
}

#[test]
fn whitespace_is_trimmed() {
    assert!(!resolve(&[(ENV_ENABLED, " 0 ")]).unwrap().enabled);
}

// -------------------- Other settings --------------------

#[test]
fn bind_attempts_and_service_name_override() {
    let cfg = resolve(&[(ENV_BIND_ATTEMPTS, "5"), (ENV_SERVICE_NAME, "metrics.test")]).unwrap();
    assert_eq!(cfg.bind_attempts, 5);
    assert_eq!(cfg.service_name, "metrics.test");
}

// -------------------- Errors --------------------

#[test]
fn unparsable_values_are_errors() {
    let err = resolve(&[(ENV_ENABLED, "yes")]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::Invalid {
            var: ENV_ENABLED,
            value: "yes".into(),
            expected: "integer",
        }
    );

    assert!(resolve(&[(ENV_ENABLED_PERSIST, "on")]).is_err());
    assert!(resolve(&[(ENV_BIND_ATTEMPTS, "-1")]).is_err());
}

#[test]
fn persist_is_not_parsed_when_primary_decides() {
    let cfg = resolve(&[(ENV_ENABLED, "1"), (ENV_ENABLED_PERSIST, "garbage")]).unwrap();
    assert!(cfg.enabled);
}
