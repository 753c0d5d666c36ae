//! Region Resolver
//!
//! Maps a customer identifier prefix to the utility region expected to
//! serve it. The prefix table is configuration.

use serde::{Deserialize, Serialize};

use crate::domain::Region;

/// One `prefix -> region` entry; first match wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub region: Region,
}

impl PrefixRule {
    pub fn new(prefix: impl Into<String>, region: Region) -> Self {
        Self {
            prefix: prefix.into(),
            region,
        }
    }
}

/// Ordered prefix table with a fall-through region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTable {
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<PrefixRule>,
    #[serde(default = "default_region")]
    pub default: Region,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self {
            prefixes: default_prefixes(),
            default: default_region(),
        }
    }
}

fn default_prefixes() -> Vec<PrefixRule> {
    vec![
        PrefixRule::new("PE04", Region::EvnHcmc),
        PrefixRule::new("PH", Region::EvnHcmc),
        PrefixRule::new("PC", Region::EvnCpc),
        PrefixRule::new("PN", Region::EvnSpc),
        PrefixRule::new("PA", Region::EvnNpc),
    ]
}

fn default_region() -> Region {
    Region::EvnHcmc
}

/// Prefix-table lookup. Pure and total.
#[derive(Debug, Clone, Default)]
pub struct RegionResolver {
    table: RegionTable,
}

impl RegionResolver {
    pub fn new(table: RegionTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, customer_id: &str) -> Region {
        let id = customer_id.trim();
        self.table
            .prefixes
            .iter()
            .find(|rule| {
                let prefix = rule.prefix.as_bytes();
                !prefix.is_empty()
                    && id.len() >= prefix.len()
                    && id.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix)
            })
            .map(|rule| rule.region)
            .unwrap_or(self.table.default)
    }

    /// Configured hint wins over prefix detection
    pub fn resolve_with_hint(&self, customer_id: &str, hint: Option<Region>) -> Region {
        hint.unwrap_or_else(|| self.resolve(customer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_prefixes() {
        let resolver = RegionResolver::default();
        assert_eq!(resolver.resolve("PE0400065097"), Region::EvnHcmc);
        assert_eq!(resolver.resolve("PH1234"), Region::EvnHcmc);
        assert_eq!(resolver.resolve("PC0102"), Region::EvnCpc);
        assert_eq!(resolver.resolve("PN0001"), Region::EvnSpc);
        assert_eq!(resolver.resolve("PA0001"), Region::EvnNpc);
    }

    #[test]
    fn test_unknown_prefix_uses_default() {
        let resolver = RegionResolver::default();
        assert_eq!(resolver.resolve("ZZ999"), Region::EvnHcmc);
        assert_eq!(resolver.resolve(""), Region::EvnHcmc);
        assert_eq!(resolver.resolve("P"), Region::EvnHcmc);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_trims() {
        let resolver = RegionResolver::default();
        assert_eq!(resolver.resolve("  pc0102 "), Region::EvnCpc);
    }

    #[test]
    fn test_first_rule_wins_and_table_is_configurable() {
        let resolver = RegionResolver::new(RegionTable {
            prefixes: vec![
                PrefixRule::new("PE", Region::EvnHanoi),
                PrefixRule::new("PE04", Region::EvnHcmc),
            ],
            default: Region::EvnSpc,
        });
        assert_eq!(resolver.resolve("PE0400065097"), Region::EvnHanoi);
        assert_eq!(resolver.resolve("XX"), Region::EvnSpc);
    }

    #[test]
    fn test_hint_overrides_prefix() {
        let resolver = RegionResolver::default();
        assert_eq!(
            resolver.resolve_with_hint("PE0400065097", Some(Region::EvnHanoi)),
            Region::EvnHanoi
        );
        assert_eq!(resolver.resolve_with_hint("PE0400065097", None), Region::EvnHcmc);
    }
}
