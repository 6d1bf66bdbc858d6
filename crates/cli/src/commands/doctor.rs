use std::collections::BTreeSet;

use prodcat_core::config::{AppConfig, LoadOptions};
use prodcat_core::{Catalog, Dataset, IntegrityFinding, IntegrityReport};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> (bool, String) {
    let report = build_report(options);
    let passed = report.overall_status == CheckStatus::Pass;

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return (passed, output);
    }

    (passed, render_human(&report))
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            match Dataset::load(config.dataset.path.as_deref()) {
                Ok(dataset) => {
                    let source = config
                        .dataset
                        .path
                        .as_deref()
                        .map(|path| format!("`{}`", path.display()))
                        .unwrap_or_else(|| "embedded fixture".to_string());
                    checks.push(DoctorCheck {
                        name: "dataset_load",
                        status: CheckStatus::Pass,
                        details: format!(
                            "loaded {} users, {} categories, {} products from {source}",
                            dataset.users.len(),
                            dataset.categories.len(),
                            dataset.products.len()
                        ),
                    });
                    let integrity = dataset.integrity();
                    checks.push(check_integrity(&integrity));
                    checks.push(check_join(&Catalog::new(dataset), &integrity));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "dataset_load",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("dataset_integrity", "dataset did not load"));
                    checks.push(skipped("catalog_join", "dataset did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("dataset_load", "configuration did not load"));
            checks.push(skipped("dataset_integrity", "configuration did not load"));
            checks.push(skipped("catalog_join", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all catalog checks passed".to_string()
    } else {
        "doctor: one or more catalog checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}

fn check_integrity(report: &IntegrityReport) -> DoctorCheck {
    if report.is_clean() {
        return DoctorCheck {
            name: "dataset_integrity",
            status: CheckStatus::Pass,
            details: "ids are unique and every reference resolves".to_string(),
        };
    }

    DoctorCheck {
        name: "dataset_integrity",
        status: CheckStatus::Fail,
        details: report
            .findings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    }
}

/// Every row the join leaves without a category or owner must be explained by
/// a dangling reference in the integrity report.
fn check_join(catalog: &Catalog, integrity: &IntegrityReport) -> DoctorCheck {
    let mut dangling = BTreeSet::new();
    for finding in &integrity.findings {
        match finding {
            IntegrityFinding::UnknownProductCategory { category, .. }
            | IntegrityFinding::UnknownCategoryOwner { category, .. } => {
                dangling.insert(*category);
            }
            _ => {}
        }
    }

    let rows = catalog.denormalized();
    let unresolved = rows.iter().filter(|row| row.category.is_none() || row.user.is_none()).count();
    let explained =
        catalog.products().iter().filter(|product| dangling.contains(&product.category_id)).count();

    if unresolved > explained {
        return DoctorCheck {
            name: "catalog_join",
            status: CheckStatus::Fail,
            details: format!(
                "{unresolved} of {} rows are missing a category or owner, but only {explained} \
                 reference a dangling id",
                rows.len()
            ),
        };
    }

    DoctorCheck {
        name: "catalog_join",
        status: CheckStatus::Pass,
        details: format!("{} rows joined, {unresolved} with missing category or owner", rows.len()),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
