use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use prodcat_cli::commands::{config, doctor, list, list::ListArgs};
use prodcat_core::config::{ConfigOverrides, LoadOptions};
use prodcat_core::{OutputFormat, RecomputePolicy, SortKey};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn list_renders_full_embedded_catalog_by_default() {
    with_env(&[], || {
        let result = list::run(LoadOptions::default(), ListArgs::default());
        assert_eq!(result.exit_code, 0, "expected list success");

        let lines: Vec<&str> = result.output.lines().collect();
        assert_eq!(lines.len(), 10, "header, separator and eight products");
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].contains("Milk"));
        assert!(lines[2].contains("🍺 - Drinks"));
        assert!(lines[2].ends_with("Roma"));
    });
}

#[test]
fn list_applies_owner_query_and_sort() {
    with_env(&[], || {
        let result = list::run(
            LoadOptions::default(),
            ListArgs {
                owner: Some(2),
                query: Some("S".to_owned()),
                sort: vec![SortKey::Product],
                format: Some(OutputFormat::Json),
                ..ListArgs::default()
            },
        );
        assert_eq!(result.exit_code, 0);

        let rows = parse_payload(&result.output);
        let names: Vec<&str> =
            rows.as_array().expect("array").iter().filter_map(|row| row["name"].as_str()).collect();
        assert_eq!(names, vec!["Eggs", "Sausage", "Sugar"]);
    });
}

#[test]
fn list_under_chained_policy_ignores_category_and_sort() {
    with_env(&[("PRODCAT_VIEW_RECOMPUTE", "chained")], || {
        let result = list::run(
            LoadOptions::default(),
            ListArgs {
                categories: vec![5],
                sort: vec![SortKey::Product],
                format: Some(OutputFormat::Json),
                ..ListArgs::default()
            },
        );
        assert_eq!(result.exit_code, 0);

        let rows = parse_payload(&result.output);
        assert_eq!(rows.as_array().map(Vec::len), Some(8));
        assert_eq!(rows[0]["name"], "Milk");
    });
}

#[test]
fn list_reports_empty_selection() {
    with_env(&[], || {
        let result = list::run(
            LoadOptions::default(),
            ListArgs { owner: Some(4), ..ListArgs::default() },
        );
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "No products matching selected criteria");
    });
}

#[test]
fn list_loads_dataset_override_and_renders_html() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"{
                "users": [{"id": 1, "name": "Max", "sex": "m"}],
                "categories": [{"id": 10, "title": "Fruits", "icon": "🍎", "ownerId": 1}],
                "products": [
                    {"id": 100, "name": "Banana", "categoryId": 10},
                    {"id": 101, "name": "Lost", "categoryId": 11}
                ]
            }"#,
        )
        .expect("write dataset");

        let options = LoadOptions {
            overrides: ConfigOverrides { dataset_path: Some(path), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };
        let result =
            list::run(options, ListArgs { format: Some(OutputFormat::Html), ..ListArgs::default() });

        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("class=\"has-text-link\">Max</td>"));
        assert!(result.output.contains("<td data-cy=\"ProductName\">Lost</td>"));
    });
}

#[test]
fn list_renders_unrecognized_sex_without_highlight() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"{
                "users": [{"id": 1, "name": "Sam", "sex": "x"}],
                "categories": [{"id": 10, "title": "Fruits", "icon": "🍎", "ownerId": 1}],
                "products": [{"id": 100, "name": "Banana", "categoryId": 10}]
            }"#,
        )
        .expect("write dataset");

        let options = LoadOptions {
            overrides: ConfigOverrides { dataset_path: Some(path), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };
        let result =
            list::run(options, ListArgs { format: Some(OutputFormat::Html), ..ListArgs::default() });

        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);
        assert!(result.output.contains("<td data-cy=\"ProductUser\">Sam</td>"));
        assert!(!result.output.contains("has-text-"));
    });
}

#[test]
fn list_returns_config_failure_for_bad_env() {
    with_env(&[("PRODCAT_LOG_LEVEL", "loud")], || {
        let result = list::run(LoadOptions::default(), ListArgs::default());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "list");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn list_returns_dataset_failure_for_malformed_file() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{ not json").expect("write dataset");

        let options = LoadOptions {
            overrides: ConfigOverrides { dataset_path: Some(path), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };
        let result = list::run(options, ListArgs::default());
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "dataset_load");
    });
}

#[test]
fn doctor_passes_with_embedded_dataset() {
    with_env(&[], || {
        let (passed, output) = doctor::run(LoadOptions::default(), true);
        assert!(passed);

        let report = parse_payload(&output);
        assert_eq!(report["overall_status"], "pass");
        assert_eq!(report["checks"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn doctor_flags_duplicate_ids_and_dangling_references() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"{
                "users": [{"id": 1, "name": "Max", "sex": "m"}, {"id": 1, "name": "Ann", "sex": "f"}],
                "categories": [{"id": 10, "title": "Fruits", "icon": "🍎", "ownerId": 3}],
                "products": [{"id": 100, "name": "Banana", "categoryId": 10}]
            }"#,
        )
        .expect("write dataset");

        let options = LoadOptions {
            overrides: ConfigOverrides { dataset_path: Some(path), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };
        let (passed, output) = doctor::run(options, false);

        assert!(!passed);
        assert!(output.contains("- [fail] dataset_integrity: user id 1 is not unique"));
        assert!(output.contains("category 10 references unknown owner 3"));
    });
}

#[test]
fn doctor_fails_on_misspelled_dataset_key() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"{
                "users": [{"id": 1, "name": "Max", "sex": "m"}],
                "categories": [{"id": 10, "title": "Fruits", "icon": "🍎", "ownerId": 1}],
                "prodcuts": [{"id": 100, "name": "Banana", "categoryId": 10}]
            }"#,
        )
        .expect("write dataset");

        let options = LoadOptions {
            overrides: ConfigOverrides { dataset_path: Some(path), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };
        let (passed, output) = doctor::run(options, false);

        assert!(!passed);
        assert!(output.contains("- [fail] dataset_load:"), "unexpected report: {output}");
        assert!(output.contains("prodcuts"));
        assert!(output.contains("- [skip] catalog_join"));
    });
}

#[test]
fn config_reports_env_and_override_sources() {
    with_env(&[("PRODCAT_VIEW_FORMAT", "json")], || {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                recompute: Some(RecomputePolicy::Chained),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };
        let output = config::run(options);

        assert!(output.contains("- view.recompute = Chained (source: cli flag)"));
        assert!(output.contains("- view.format = Json (source: env (PRODCAT_VIEW_FORMAT))"));
        assert!(output.contains("- dataset.path = <embedded> (source: default)"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "PRODCAT_DATASET_PATH",
        "PRODCAT_VIEW_RECOMPUTE",
        "PRODCAT_VIEW_FORMAT",
        "PRODCAT_LOGGING_LEVEL",
        "PRODCAT_LOGGING_FORMAT",
        "PRODCAT_LOG_LEVEL",
        "PRODCAT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
