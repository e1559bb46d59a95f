//! Merchant normalization and grouping
//!
//! Turns noisy bank descriptions ("NETFLIX.COM*12345", "SQ *BLUE BOTTLE #042")
//! into canonical keys and groups near-duplicate keys together.
//!
//! Resolution order for a description:
//! 1. An installed [`MerchantResolver`] (external augmentation, e.g. an LLM)
//! 2. The alias table (built-in brands plus config aliases)
//! 3. The cleanup pipeline followed by fuzzy matching against existing groups

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::config::DetectionConfig;
use crate::error::Result;
use crate::models::Transaction;

/// Well-known brand variants mapped to canonical names
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("netflix", "netflix"),
    ("spotify", "spotify"),
    ("hulu", "hulu"),
    ("amazon prime", "amazon prime"),
    ("amzn prime", "amazon prime"),
    ("prime video", "amazon prime"),
    ("amzn mktp", "amazon"),
    ("amazon", "amazon"),
    ("amzn", "amazon"),
    ("apple com bill", "apple"),
    ("itunes", "apple"),
    ("icloud", "apple"),
    ("youtube premium", "youtube"),
    ("youtube", "youtube"),
    ("google storage", "google one"),
    ("google one", "google one"),
    ("disney plus", "disney plus"),
    ("disneyplus", "disney plus"),
    ("hbo max", "max"),
    ("hbomax", "max"),
    ("paramount plus", "paramount plus"),
    ("peacock", "peacock"),
    ("msft", "microsoft"),
    ("microsoft", "microsoft"),
    ("xbox", "microsoft"),
    ("adobe", "adobe"),
    ("dropbox", "dropbox"),
    ("audible", "audible"),
];

/// Descriptor words that identify a transaction kind, not a merchant
const GENERIC_TERMS: &[&str] = &[
    "atm",
    "transfer",
    "xfer",
    "payment",
    "pmt",
    "purchase",
    "deposit",
    "withdrawal",
    "debit",
    "credit",
    "pos",
    "ach",
    "check",
    "fee",
    "cash",
    "online",
    "mobile",
    "autopay",
    "bill",
    "recurring",
    "card",
    "transaction",
    "to",
    "from",
    "ref",
];

/// Card processor prefixes that precede the real merchant name
const PROCESSOR_PREFIXES: &[&str] = &["sq", "tst", "sp", "aplpay", "applepay", "pp", "paypal"];

const LEGAL_SUFFIXES: &[&str] = &["inc", "llc", "corp", "co", "ltd", "corporation", "company"];

/// External override for merchant identity.
///
/// Returning `Some(name)` replaces the normalizer's own answer for that
/// description. Implementations must be deterministic for detection to stay
/// reproducible.
pub trait MerchantResolver: Send + Sync {
    fn resolve(&self, raw_description: &str) -> Option<String>;
}

/// Transactions of one canonical merchant, ascending by date
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantGroup {
    pub key: String,
    pub transactions: Vec<Transaction>,
}

impl MerchantGroup {
    /// Most frequent raw description; ties go to the earliest seen
    pub fn representative_name(&self) -> &str {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tx in &self.transactions {
            *counts.entry(tx.merchant_description.as_str()).or_insert(0) += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for tx in &self.transactions {
            let name = tx.merchant_description.as_str();
            let count = counts[name];
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((name, count));
            }
        }
        best.map(|(name, _)| name).unwrap_or(self.key.as_str())
    }
}

/// Result of grouping a batch
#[derive(Debug, Default)]
pub struct Grouping {
    /// In order of first-seen transaction
    pub groups: Vec<MerchantGroup>,
    /// Records whose key is entirely generic
    pub generic_excluded: usize,
    /// Ids of records whose description normalizes to nothing
    pub unidentified: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Resolution {
    Group(usize),
    Generic,
    Unidentified,
}

/// Merchant normalizer with alias table and fuzzy grouping
pub struct MerchantNormalizer {
    aliases: Vec<(Regex, String)>,
    generic_terms: HashSet<String>,
    fuzzy_threshold: u8,
    domain_suffix: Regex,
    special_chars: Regex,
}

impl MerchantNormalizer {
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        let mut patterns: Vec<(String, String)> = BUILTIN_ALIASES
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        patterns.extend(
            config
                .aliases
                .iter()
                .map(|(p, c)| (p.to_lowercase(), c.to_lowercase())),
        );
        // Longest pattern first so "amazon prime" beats "amazon"
        patterns.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let mut aliases = Vec::with_capacity(patterns.len());
        for (pattern, canonical) in patterns {
            let words: Vec<String> = pattern.split_whitespace().map(regex::escape).collect();
            let regex = Regex::new(&format!(r"\b{}\b", words.join(r"\s+")))?;
            aliases.push((regex, canonical));
        }

        let mut generic_terms: HashSet<String> =
            GENERIC_TERMS.iter().map(|t| t.to_string()).collect();
        generic_terms.extend(config.generic_terms.iter().map(|t| t.to_lowercase()));

        Ok(Self {
            aliases,
            generic_terms,
            fuzzy_threshold: config.fuzzy_similarity_threshold,
            domain_suffix: Regex::new(r"\.(com|net|org|io|co|tv|us)\b")?,
            special_chars: Regex::new(r"[^\p{Alphabetic}\p{Nd}\s]+")?,
        })
    }

    /// Run the cleanup pipeline on a raw description.
    ///
    /// Returns an empty string when nothing identifying is left.
    pub fn normalize_key(&self, raw: &str) -> String {
        let lower = raw.to_lowercase();
        let without_domain = self.domain_suffix.replace_all(&lower, "");
        let cleaned = self.special_chars.replace_all(&without_domain, " ");

        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
        strip_processor_prefixes(&mut tokens);
        loop {
            let before = tokens.len();
            strip_store_numbers(&mut tokens);
            strip_legal_suffixes(&mut tokens);
            if tokens.len() == before {
                break;
            }
        }

        if !tokens.iter().any(|t| t.chars().any(char::is_alphabetic)) {
            return String::new();
        }
        tokens.join(" ")
    }

    /// Canonical name from the alias table, if any pattern matches
    pub fn alias_for(&self, raw: &str) -> Option<&str> {
        let lower = raw.to_lowercase();
        let cleaned = self.special_chars.replace_all(&lower, " ");
        self.aliases
            .iter()
            .find(|(regex, _)| regex.is_match(&cleaned))
            .map(|(_, canonical)| canonical.as_str())
    }

    /// Every token of the key is a generic descriptor
    pub fn is_generic(&self, key: &str) -> bool {
        let mut tokens = key.split_whitespace().peekable();
        tokens.peek().is_some() && tokens.all(|t| self.generic_terms.contains(t))
    }

    /// At least one token of the key is a generic descriptor
    pub fn mentions_generic(&self, key: &str) -> bool {
        key.split_whitespace()
            .any(|t| self.generic_terms.contains(t))
    }

    /// Canonical key for a single description, without fuzzy grouping
    pub fn canonical_key(&self, raw: &str, resolver: Option<&dyn MerchantResolver>) -> String {
        self.direct_key(raw, resolver)
            .unwrap_or_else(|| self.normalize_key(raw))
    }

    /// Key from the resolver or alias table; these skip fuzzy matching
    fn direct_key(&self, raw: &str, resolver: Option<&dyn MerchantResolver>) -> Option<String> {
        resolver
            .and_then(|r| r.resolve(raw))
            .map(|name| self.normalize_key(&name))
            .filter(|key| !key.is_empty())
            .or_else(|| self.alias_for(raw).map(str::to_string))
    }

    /// Group transactions by canonical merchant.
    ///
    /// Transactions are processed in (date, id) order, so the result does not
    /// depend on input order.
    pub fn group(
        &self,
        transactions: &[Transaction],
        resolver: Option<&dyn MerchantResolver>,
    ) -> Grouping {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a.merchant_description.cmp(&b.merchant_description))
        });

        let mut grouping = Grouping::default();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        let mut resolved: HashMap<&str, Resolution> = HashMap::new();

        for tx in sorted {
            let description = tx.merchant_description.as_str();
            let resolution = match resolved.get(description) {
                Some(r) => *r,
                None => {
                    let r = self.resolve(description, resolver, &mut grouping, &mut by_key);
                    resolved.insert(description, r);
                    r
                }
            };

            match resolution {
                Resolution::Group(idx) => grouping.groups[idx].transactions.push(tx.clone()),
                Resolution::Generic => grouping.generic_excluded += 1,
                Resolution::Unidentified => grouping.unidentified.push(tx.id.clone()),
            }
        }

        grouping
    }

    fn resolve(
        &self,
        description: &str,
        resolver: Option<&dyn MerchantResolver>,
        grouping: &mut Grouping,
        by_key: &mut HashMap<String, usize>,
    ) -> Resolution {
        let direct = self.direct_key(description, resolver);
        let is_direct = direct.is_some();

        let key = match direct {
            Some(key) => key,
            None => self.normalize_key(description),
        };
        if key.is_empty() {
            return Resolution::Unidentified;
        }
        if self.is_generic(&key) {
            return Resolution::Generic;
        }

        if let Some(&idx) = by_key.get(&key) {
            return Resolution::Group(idx);
        }

        if !is_direct {
            if let Some(idx) = self.best_fuzzy_match(&key, &grouping.groups) {
                tracing::debug!(
                    "Merged '{}' into '{}' (fuzzy)",
                    key,
                    grouping.groups[idx].key
                );
                by_key.insert(key, idx);
                return Resolution::Group(idx);
            }
        }

        let idx = grouping.groups.len();
        grouping.groups.push(MerchantGroup {
            key: key.clone(),
            transactions: Vec::new(),
        });
        by_key.insert(key, idx);
        Resolution::Group(idx)
    }

    /// Most similar existing group above the threshold; ties go to the
    /// earliest-created group
    fn best_fuzzy_match(&self, key: &str, groups: &[MerchantGroup]) -> Option<usize> {
        let mut best: Option<(usize, u8)> = None;
        for (idx, group) in groups.iter().enumerate() {
            let score = similarity(key, &group.key);
            if score > self.fuzzy_threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

fn strip_processor_prefixes(tokens: &mut Vec<&str>) {
    while tokens.len() > 1 && PROCESSOR_PREFIXES.contains(&tokens[0]) {
        tokens.remove(0);
    }
}

fn strip_store_numbers(tokens: &mut Vec<&str>) {
    while tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|t| t.chars().any(|c| c.is_ascii_digit()))
    {
        tokens.pop();
    }
}

fn strip_legal_suffixes(tokens: &mut Vec<&str>) {
    while tokens.len() > 1 && tokens.last().is_some_and(|t| LEGAL_SUFFIXES.contains(t)) {
        tokens.pop();
    }
}

/// Normalized edit-distance similarity in 0..=100
pub fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 100;
    }

    let distance = levenshtein_distance(&a, &b);
    ((1.0 - distance as f64 / max_len as f64) * 100.0).round() as u8
}

/// Minimum single-character insertions, deletions and substitutions
fn levenshtein_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tx;

    fn normalizer() -> MerchantNormalizer {
        MerchantNormalizer::new(&DetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_normalize_key_pipeline() {
        let n = normalizer();
        assert_eq!(n.normalize_key("COMCAST.NET*8842"), "comcast");
        assert_eq!(n.normalize_key("SQ *BLUE BOTTLE #042"), "blue bottle");
        assert_eq!(n.normalize_key("Planet Fitness Inc 0042"), "planet fitness");
        assert_eq!(n.normalize_key("ACME WIDGETS, LLC"), "acme widgets");
        assert_eq!(n.normalize_key("  State   Farm   Insurance  "), "state farm insurance");
        assert_eq!(n.normalize_key("TST* JOES DINER 1234 CORP 99"), "joes diner");
    }

    #[test]
    fn test_normalize_key_is_idempotent() {
        let n = normalizer();
        for raw in [
            "COMCAST.NET*8842",
            "SQ *BLUE BOTTLE #042",
            "Acme 123 Inc",
            "PAYPAL *SOMESHOP 4029357733",
            "GEICO *AUTO",
            "#0042",
        ] {
            let once = n.normalize_key(raw);
            assert_eq!(n.normalize_key(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_normalize_key_unidentifiable() {
        let n = normalizer();
        assert_eq!(n.normalize_key("#0042"), "");
        assert_eq!(n.normalize_key("***"), "");
    }

    #[test]
    fn test_alias_table_precedence() {
        let n = normalizer();
        assert_eq!(n.alias_for("NETFLIX.COM*12345"), Some("netflix"));
        assert_eq!(n.alias_for("Amazon Prime Annual"), Some("amazon prime"));
        assert_eq!(n.alias_for("AMZN Mktp US*2K4"), Some("amazon"));
        assert_eq!(n.alias_for("DISNEYPLUS 888-905-7888"), Some("disney plus"));
        assert_eq!(n.alias_for("LOCAL HARDWARE"), None);
        // Word-bounded: no match inside another word
        assert_eq!(n.alias_for("HULUDRIVE TOWING"), None);
    }

    #[test]
    fn test_config_aliases() {
        let mut config = DetectionConfig::default();
        config
            .aliases
            .insert("pge web".to_string(), "pacific gas electric".to_string());
        let n = MerchantNormalizer::new(&config).unwrap();
        assert_eq!(n.alias_for("PGE WEB ONLINE 1234"), Some("pacific gas electric"));
    }

    #[test]
    fn test_generic_terms() {
        let n = normalizer();
        assert!(n.is_generic("atm withdrawal"));
        assert!(n.is_generic("online transfer to"));
        assert!(!n.is_generic("geico payment"));
        assert!(!n.is_generic(""));
        assert!(n.mentions_generic("geico payment"));
        assert!(!n.mentions_generic("netflix"));
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("", ""), 100);
        assert_eq!(similarity("netflix", "netflix"), 100);
        assert_eq!(similarity("abc", ""), 0);
        assert_eq!(similarity("netflix", "netflx"), 86);
        assert!(similarity("comcast", "starbucks") < 50);
        assert_eq!(similarity("kitten", "sitting"), similarity("sitting", "kitten"));
    }

    #[test]
    fn test_levenshtein_distance() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(levenshtein_distance(&chars(""), &chars("")), 0);
        assert_eq!(levenshtein_distance(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein_distance(&chars("abc"), &chars("abc")), 0);
        assert_eq!(levenshtein_distance(&chars("café"), &chars("cafe")), 1);
    }

    #[test]
    fn test_group_fuzzy_merge() {
        let n = normalizer();
        let transactions = vec![
            tx("1", "PLANET FITNESS #042", 24.99, "2025-01-05"),
            tx("2", "PLANET FITNES", 24.99, "2025-02-05"),
            tx("3", "Planet Fitness Inc", 24.99, "2025-03-05"),
            tx("4", "CORNER BAKERY", 8.50, "2025-01-10"),
        ];

        let grouping = n.group(&transactions, None);
        assert_eq!(grouping.groups.len(), 2);
        assert_eq!(grouping.groups[0].key, "planet fitness");
        assert_eq!(grouping.groups[0].transactions.len(), 3);
        assert_eq!(grouping.groups[1].key, "corner bakery");
    }

    #[test]
    fn test_group_tie_break_prefers_earliest_group() {
        let config = DetectionConfig {
            fuzzy_similarity_threshold: 40,
            ..Default::default()
        };
        let n = MerchantNormalizer::new(&config).unwrap();
        // "aabb" scores 50 against both "aaaa" and "bbbb"
        let transactions = vec![
            tx("1", "aaaa", 5.0, "2025-01-02"),
            tx("2", "bbbb", 5.0, "2025-01-01"),
            tx("3", "aabb", 5.0, "2025-01-03"),
        ];

        let grouping = n.group(&transactions, None);
        assert_eq!(grouping.groups.len(), 2);
        assert_eq!(grouping.groups[0].key, "bbbb");
        assert_eq!(grouping.groups[0].transactions.len(), 2);
        assert_eq!(grouping.groups[1].key, "aaaa");
    }

    #[test]
    fn test_group_is_order_independent() {
        let n = normalizer();
        let mut transactions = vec![
            tx("1", "NETFLIX.COM", 15.99, "2025-01-15"),
            tx("2", "SPOTIFY USA", 10.99, "2025-01-20"),
            tx("3", "NETFLIX.COM*555", 15.99, "2025-02-15"),
            tx("4", "Spotify", 10.99, "2025-02-20"),
        ];
        let forward = n.group(&transactions, None);
        transactions.reverse();
        let backward = n.group(&transactions, None);
        assert_eq!(forward.groups, backward.groups);
    }

    #[test]
    fn test_group_excludes_generic_and_unidentified() {
        let n = normalizer();
        let transactions = vec![
            tx("1", "ATM WITHDRAWAL", 100.0, "2025-01-01"),
            tx("2", "ONLINE TRANSFER", 250.0, "2025-01-02"),
            tx("3", "#00042", 12.0, "2025-01-03"),
            tx("4", "GEICO PAYMENT", 98.0, "2025-01-04"),
        ];

        let grouping = n.group(&transactions, None);
        assert_eq!(grouping.generic_excluded, 2);
        assert_eq!(grouping.unidentified, vec!["3".to_string()]);
        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].key, "geico payment");
    }

    #[test]
    fn test_resolver_overrides_alias_and_pipeline() {
        struct NflxResolver;
        impl MerchantResolver for NflxResolver {
            fn resolve(&self, raw: &str) -> Option<String> {
                raw.contains("NFLX").then(|| "Netflix".to_string())
            }
        }

        let n = normalizer();
        let transactions = vec![
            tx("1", "NFLX DIGITAL 8842", 15.99, "2025-01-15"),
            tx("2", "NETFLIX.COM", 15.99, "2025-02-15"),
        ];
        let grouping = n.group(&transactions, Some(&NflxResolver));
        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].key, "netflix");
        assert_eq!(n.canonical_key("NFLX DIGITAL", Some(&NflxResolver)), "netflix");
    }

    #[test]
    fn test_representative_name() {
        let group = MerchantGroup {
            key: "netflix".into(),
            transactions: vec![
                tx("1", "NETFLIX.COM*1", 15.99, "2025-01-15"),
                tx("2", "NETFLIX.COM", 15.99, "2025-02-15"),
                tx("3", "NETFLIX.COM", 15.99, "2025-03-15"),
            ],
        };
        assert_eq!(group.representative_name(), "NETFLIX.COM");

        let tied = MerchantGroup {
            key: "hulu".into(),
            transactions: vec![
                tx("1", "HULU 1", 7.99, "2025-01-01"),
                tx("2", "HULU 2", 7.99, "2025-02-01"),
            ],
        };
        assert_eq!(tied.representative_name(), "HULU 1");
    }
}
