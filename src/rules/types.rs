//! Rule document wire types and their compiled form.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::rules::cidr::{parse_ipv4, CidrRange};

/// A weighted header-shape pattern from the rule document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderPattern {
    /// Header name to inspect.
    pub name: String,

    /// Regex evaluated against the header value (absent header = "").
    pub pattern: String,

    /// Contribution to the anomaly score when the regex matches.
    pub weight: f64,
}

/// Rule document as served by `GET /v1/rules`.
///
/// `version` is monotonically increasing; a fetched document only replaces
/// the current one when its version is strictly greater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub version: u64,

    pub updated_at: String,

    /// User-Agent substrings to always allow.
    #[serde(rename = "allowedUAs", default)]
    pub allowed_uas: Vec<String>,

    /// User-Agent substrings to block.
    #[serde(rename = "blockedUAs", default)]
    pub blocked_uas: Vec<String>,

    /// CIDR ranges to block, IPv4 `a.b.c.d/n` form only.
    #[serde(rename = "blockedIPs", default)]
    pub blocked_ips: Vec<String>,

    /// Ordered header-shape patterns for anomaly scoring.
    #[serde(default)]
    pub header_patterns: Vec<HeaderPattern>,

    /// Anomaly threshold in [0, 1]; a score above it blocks.
    pub anomaly_threshold: f64,
}

#[derive(Debug)]
struct CompiledPattern {
    /// Lower-cased header name.
    name: String,
    /// `None` when the rule carried a malformed regex; such a pattern
    /// contributes weight to the total but never matches.
    regex: Option<Regex>,
    weight: f64,
}

/// A [`RuleSet`] with the per-swap precomputation applied: lower-cased UA
/// pattern lists, parsed CIDR ranges, compiled regexes.
///
/// Built once per install and shared read-only behind the store's atomic
/// swap, so the request path never lower-cases patterns or compiles regexes.
#[derive(Debug)]
pub struct CompiledRules {
    rules: RuleSet,
    allowed_uas: Vec<String>,
    blocked_uas: Vec<String>,
    cidrs: Vec<CidrRange>,
    patterns: Vec<CompiledPattern>,
}

impl CompiledRules {
    /// Compile a rule document, merging `extra_allowed` (config-supplied
    /// always-allow substrings) into the allow list.
    pub fn compile(rules: RuleSet, extra_allowed: &[String]) -> Self {
        let allowed_uas = rules
            .allowed_uas
            .iter()
            .chain(extra_allowed)
            .map(|ua| ua.to_lowercase())
            .collect();

        let blocked_uas = rules.blocked_uas.iter().map(|ua| ua.to_lowercase()).collect();

        let cidrs = rules
            .blocked_ips
            .iter()
            .filter_map(|entry| {
                let parsed = CidrRange::parse(entry);
                if parsed.is_none() {
                    tracing::warn!(entry = %entry, "skipping unparseable CIDR rule");
                }
                parsed
            })
            .collect();

        let patterns = rules
            .header_patterns
            .iter()
            .map(|p| {
                let regex = Regex::new(&p.pattern).ok();
                if regex.is_none() {
                    tracing::warn!(name = %p.name, pattern = %p.pattern, "skipping malformed header pattern regex");
                }
                CompiledPattern {
                    name: p.name.to_lowercase(),
                    regex,
                    weight: p.weight,
                }
            })
            .collect();

        Self {
            rules,
            allowed_uas,
            blocked_uas,
            cidrs,
            patterns,
        }
    }

    pub fn version(&self) -> u64 {
        self.rules.version
    }

    /// The underlying rule document.
    pub fn ruleset(&self) -> &RuleSet {
        &self.rules
    }

    pub fn anomaly_threshold(&self) -> f64 {
        self.rules.anomaly_threshold
    }

    /// Case-insensitive substring match against the allow list.
    pub fn is_allowed_ua(&self, ua: &str) -> bool {
        let lower = ua.to_lowercase();
        self.allowed_uas.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Case-insensitive substring match against the block list.
    pub fn is_blocked_ua(&self, ua: &str) -> bool {
        let lower = ua.to_lowercase();
        self.blocked_uas.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Whether `ip` falls inside any blocked range. IPv6 input is never
    /// blocked (no IPv6 CIDR support).
    pub fn is_blocked_ip(&self, ip: &str) -> bool {
        match parse_ipv4(ip) {
            Some(addr) => self.cidrs.iter().any(|range| range.contains(addr)),
            None => false,
        }
    }

    /// Weighted share of matching header patterns, in [0, 1].
    ///
    /// Every pattern contributes its weight to the total; only matching
    /// patterns contribute to the numerator. No patterns (or zero total
    /// weight) scores 0.
    pub fn header_anomaly_score(&self, headers: &HashMap<String, String>) -> f64 {
        let mut total_weight = 0.0;
        let mut match_weight = 0.0;

        for pattern in &self.patterns {
            total_weight += pattern.weight;
            let value = headers.get(&pattern.name).map(String::as_str).unwrap_or("");
            if let Some(regex) = &pattern.regex {
                if regex.is_match(value) {
                    match_weight += pattern.weight;
                }
            }
        }

        if total_weight > 0.0 {
            match_weight / total_weight
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruleset() -> RuleSet {
        RuleSet {
            version: 7,
            updated_at: "2026-01-01T00:00:00Z".into(),
            allowed_uas: vec!["Googlebot".into()],
            blocked_uas: vec!["GPTBot".into(), "ClaudeBot".into()],
            blocked_ips: vec!["20.15.240.0/20".into(), "bogus".into()],
            header_patterns: vec![
                HeaderPattern {
                    name: "Accept".into(),
                    pattern: r"^\*/\*$".into(),
                    weight: 1.0,
                },
                HeaderPattern {
                    name: "accept-language".into(),
                    pattern: "^$".into(),
                    weight: 1.0,
                },
                HeaderPattern {
                    name: "x-broken".into(),
                    pattern: "(".into(),
                    weight: 2.0,
                },
            ],
            anomaly_threshold: 0.7,
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_ua_matching_case_insensitive() {
        let compiled = CompiledRules::compile(ruleset(), &[]);
        assert!(compiled.is_blocked_ua("GPTBot/1.0"));
        assert!(compiled.is_blocked_ua("gptbot"));
        assert!(compiled.is_blocked_ua("Mozilla/5.0 CLAUDEBOT"));
        assert!(!compiled.is_blocked_ua("Mozilla/5.0 Chrome/120"));

        assert!(compiled.is_allowed_ua("Mozilla/5.0 (compatible; googlebot/2.1)"));
        assert!(!compiled.is_allowed_ua("Mozilla/5.0 Safari/605"));
    }

    #[test]
    fn test_extra_allowed_merged() {
        let compiled = CompiledRules::compile(ruleset(), &["MyMonitor".to_string()]);
        assert!(compiled.is_allowed_ua("mymonitor/3.1"));
        assert!(compiled.is_allowed_ua("Googlebot"));
    }

    #[test]
    fn test_blocked_ip_skips_unparseable_entries() {
        let compiled = CompiledRules::compile(ruleset(), &[]);
        assert!(compiled.is_blocked_ip("20.15.240.5"));
        assert!(!compiled.is_blocked_ip("8.8.8.8"));
        assert!(!compiled.is_blocked_ip("::1"));
        assert!(!compiled.is_blocked_ip("unknown"));
    }

    #[test]
    fn test_anomaly_score_bounds_and_malformed_regex() {
        let compiled = CompiledRules::compile(ruleset(), &[]);

        // x-broken never matches but its weight stays in the denominator:
        // both valid patterns matching yields 2/4.
        let score = compiled.header_anomaly_score(&headers(&[("accept", "*/*")]));
        assert!((score - 0.5).abs() < 1e-9);

        // One match out of the two valid patterns: 1/4.
        let score = compiled.header_anomaly_score(&headers(&[
            ("accept", "*/*"),
            ("accept-language", "en-US"),
        ]));
        assert!((score - 0.25).abs() < 1e-9);

        // Monotonic in matched weight, never above 1.
        let none = compiled.header_anomaly_score(&headers(&[
            ("accept", "text/html"),
            ("accept-language", "en-US"),
        ]));
        assert_eq!(none, 0.0);
        assert!(score >= none && score <= 1.0);
    }

    #[test]
    fn test_anomaly_score_empty_patterns() {
        let mut rules = ruleset();
        rules.header_patterns.clear();
        let compiled = CompiledRules::compile(rules, &[]);
        assert_eq!(compiled.header_anomaly_score(&headers(&[])), 0.0);
    }

    #[test]
    fn test_serde_round_trip_reproduces_match_behavior() {
        let original = CompiledRules::compile(ruleset(), &[]);
        let json = serde_json::to_string(original.ruleset()).unwrap();
        let parsed: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(*original.ruleset(), parsed);

        let restored = CompiledRules::compile(parsed, &[]);
        assert_eq!(
            original.is_blocked_ua("GPTBot/1.0"),
            restored.is_blocked_ua("GPTBot/1.0")
        );
        assert_eq!(
            original.is_blocked_ip("20.15.240.5"),
            restored.is_blocked_ip("20.15.240.5")
        );
        let sample = headers(&[("accept", "*/*")]);
        assert_eq!(
            original.header_anomaly_score(&sample),
            restored.header_anomaly_score(&sample)
        );
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(&ruleset()).unwrap();
        assert!(json.get("allowedUAs").is_some());
        assert!(json.get("blockedUAs").is_some());
        assert!(json.get("blockedIPs").is_some());
        assert!(json.get("headerPatterns").is_some());
        assert!(json.get("anomalyThreshold").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
