//! Built-in rule snapshot, active from construction until the first
//! successful sync installs a newer version.

use crate::rules::types::{HeaderPattern, RuleSet};

/// Known AI-crawler User-Agent substrings, matched case-insensitively.
const BLOCKED_UAS: &[&str] = &[
    "gptbot",
    "chatgpt-user",
    "oai-searchbot",
    "claudebot",
    "claude-web",
    "anthropic-ai",
    "ccbot",
    "bytespider",
    "meta-externalagent",
    "meta-externalfetcher",
    "google-extended",
    "perplexitybot",
    "amazonbot",
    "omgilibot",
    "diffbot",
    "cohere-ai",
    "timpibot",
    "youbot",
];

/// Search crawlers let through even when broader signals would catch them.
const ALLOWED_UAS: &[&str] = &["googlebot", "bingbot", "duckduckbot", "slurp"];

/// Published egress ranges of known AI crawlers.
const BLOCKED_IPS: &[&str] = &["20.15.240.0/20", "52.230.152.0/24", "20.171.206.0/24"];

/// The version-1 ruleset compiled into the crate.
pub fn builtin() -> RuleSet {
    RuleSet {
        version: 1,
        updated_at: "2026-06-01T00:00:00Z".to_string(),
        allowed_uas: ALLOWED_UAS.iter().map(|s| s.to_string()).collect(),
        blocked_uas: BLOCKED_UAS.iter().map(|s| s.to_string()).collect(),
        blocked_ips: BLOCKED_IPS.iter().map(|s| s.to_string()).collect(),
        header_patterns: vec![
            // Scripted clients typically send a bare */* accept and omit the
            // language/encoding negotiation browsers always carry.
            HeaderPattern {
                name: "accept".to_string(),
                pattern: r"^\*/\*$".to_string(),
                weight: 1.0,
            },
            HeaderPattern {
                name: "accept-language".to_string(),
                pattern: "^$".to_string(),
                weight: 1.0,
            },
            HeaderPattern {
                name: "accept-encoding".to_string(),
                pattern: "^$".to_string(),
                weight: 1.0,
            },
        ],
        anomaly_threshold: 0.7,
    }
}
