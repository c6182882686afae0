// src/advisor/mod.rs
//! Advisory helpers for capacity planning and query hygiene.
//!
//! Both functions are pure and independent of the stateful pipeline: one
//! derives a component list and server estimate from load requirements, the
//! other scans raw SQL for well-known anti-patterns.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;


/// Expected payload volume for the designed API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSize {
    Small,
    Large,
}

/// Load and feature requirements driving the design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequirements {
    pub expected_rps: u32,
    pub data_size: DataSize,
    pub caching: bool,
    pub auth: bool,
}

/// Deterministic design derived from [`ApiRequirements`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDesign {
    pub components: Vec<String>,
    pub estimated_servers: u32,
    pub architecture: String,
}

/// Selects architecture components and a server estimate for the given
/// requirements.
///
/// Every design carries a web server and a database. Load balancing joins
/// above 500 RPS, with the server count growing as `ceil(rps / 500)` past
/// 1000 RPS. Large data or an explicit caching requirement pulls in a cache
/// and a message queue; authentication pulls in an auth service and token
/// validator.
pub fn design_scalable_api(requirements: &ApiRequirements) -> ApiDesign {
    let mut components = vec!["web-server".to_string(), "database".to_string()];
    let mut estimated_servers = 1u32;

    if requirements.expected_rps > 1000 {
        components.push("load-balancer".to_string());
        estimated_servers = requirements.expected_rps.div_ceil(500);
    } else if requirements.expected_rps > 500 {
        components.push("load-balancer".to_string());
        estimated_servers = 2;
    } else if requirements.expected_rps > 100 {
        estimated_servers = 1;
    }

    if requirements.data_size == DataSize::Large || requirements.caching {
        components.push("cache".to_string());
        components.push("message-queue".to_string());
    }

    if requirements.auth {
        components.push("auth-service".to_string());
        components.push("token-validator".to_string());
    }

    let architecture = describe_architecture(&components, estimated_servers);

    ApiDesign {
        components,
        estimated_servers,
        architecture,
    }
}

/// Assembles the human-readable summary from the selected components.
fn describe_architecture(components: &[String], estimated_servers: u32) -> String {
    let has = |name: &str| components.iter().any(|c| c == name);
    let mut architecture = String::new();

    if has("load-balancer") {
        architecture.push_str("Distributed n-tier architecture with ");
        if has("cache") {
            architecture.push_str("multi-layer caching, ");
        }
        if has("message-queue") {
            architecture.push_str("async message queue processing, ");
        }
        architecture.push_str(&format!(
            "and {} servers running in parallel with round-robin load balancing.",
            estimated_servers
        ));

        if has("auth-service") {
            architecture.push_str(" Includes authentication middleware for security.");
        }
    } else {
        architecture.push_str("Single-server architecture with ");
        if has("cache") {
            architecture.push_str("local cache for performance optimization. ");
        }
        if has("auth-service") {
            architecture.push_str("Auth service for security.");
        } else {
            architecture.push_str("basic request handling.");
        }
    }

    architecture
}

/// Queries flagged as slow plus the deduplicated advice they triggered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    pub slow_queries: Vec<String>,
    pub suggestions: Vec<String>,
}

static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn anti_patterns() -> &'static [(Regex, &'static str)] {
    PATTERNS.get_or_init(|| {
        [
            (
                r"SELECT \*",
                "Specify only needed columns for better performance",
            ),
            (
                r"SELECT .* FROM .* WHERE [^=]*<>",
                "Add indexes on comparison columns",
            ),
            (
                r"SELECT .* FROM .* JOIN .* ON",
                "Ensure JOIN columns are indexed",
            ),
            (
                r"WHERE NOT IN",
                "Consider using NOT EXISTS with proper indexes",
            ),
            (
                r"YEAR\(",
                "Avoid functions on indexed columns for better query optimization",
            ),
            (
                r"WHERE \d+\s*=\s*1",
                "Remove unnecessary WHERE conditions",
            ),
        ]
        .into_iter()
        .map(|(pattern, suggestion)| {
            (
                Regex::new(pattern).expect("anti-pattern regex compiles"),
                suggestion,
            )
        })
        .collect()
    })
}

/// Scans each query against the fixed anti-pattern list.
///
/// Returns the subset of queries matching any pattern and the deduplicated
/// set of triggered suggestions, in first-trigger order. When nothing is
/// flagged the report still carries generic advice.
pub fn optimize_database(queries: &[String]) -> QueryReport {
    let mut slow_queries = Vec::new();
    let mut suggestions: Vec<String> = Vec::new();

    for query in queries {
        let mut is_slow = false;

        for (pattern, suggestion) in anti_patterns() {
            if pattern.is_match(query) {
                is_slow = true;
                if !suggestions.iter().any(|s| s == suggestion) {
                    suggestions.push(suggestion.to_string());
                }
            }
        }

        if is_slow {
            slow_queries.push(query.clone());
        }
    }

    if slow_queries.is_empty() && suggestions.is_empty() {
        suggestions.push("All queries appear to be optimized".to_string());
        suggestions.push(
            "Consider adding composite indexes for frequently used WHERE conditions".to_string(),
        );
    }

    QueryReport {
        slow_queries,
        suggestions,
    }
}
