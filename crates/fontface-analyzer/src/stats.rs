//! Per-family code point counts.

use indexmap::map::{IndexMap, Iter};
use smol_str::SmolStr;

/// Code point counts per font family.
///
/// Families keep the order in which they were first seen. Each family maps
/// to one count per `@font-face` rule, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FamilyStats(IndexMap<SmolStr, Vec<u64>>);

impl FamilyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the count of one rule to `family`.
    pub fn record(&mut self, family: impl Into<SmolStr>, count: u64) {
        self.0.entry(family.into()).or_default().push(count);
    }

    /// Returns the per-rule counts of `family`.
    pub fn get(&self, family: &str) -> Option<&[u64]> {
        self.0.get(family).map(Vec::as_slice)
    }

    /// Returns the number of families.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, SmolStr, Vec<u64>> {
        self.0.iter()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(SmolStr::as_str)
    }

    /// Returns the sum of all counts of `family`, saturating at `u64::MAX`.
    pub fn total(&self, family: &str) -> Option<u64> {
        self.get(family).map(saturating_sum)
    }

    /// Returns the sum over every family, saturating at `u64::MAX`.
    pub fn grand_total(&self) -> u64 {
        self.0
            .values()
            .fold(0u64, |sum, chunks| sum.saturating_add(saturating_sum(chunks)))
    }

    /// Returns one summary per family, in first-seen order.
    pub fn summaries(&self) -> Vec<FamilySummary> {
        self.0
            .iter()
            .map(|(family, chunks)| FamilySummary {
                family: family.clone(),
                chunks: chunks.clone(),
                total: saturating_sum(chunks),
            })
            .collect()
    }

    pub fn into_inner(self) -> IndexMap<SmolStr, Vec<u64>> {
        self.0
    }
}

impl<'a> IntoIterator for &'a FamilyStats {
    type Item = (&'a SmolStr, &'a Vec<u64>);
    type IntoIter = Iter<'a, SmolStr, Vec<u64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<F: Into<SmolStr>> FromIterator<(F, u64)> for FamilyStats {
    fn from_iter<I: IntoIterator<Item = (F, u64)>>(iter: I) -> Self {
        let mut stats = FamilyStats::new();
        for (family, count) in iter {
            stats.record(family, count);
        }
        stats
    }
}

/// The counts of one family together with their total.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FamilySummary {
    pub family: SmolStr,
    /// One count per `@font-face` rule.
    pub chunks: Vec<u64>,
    pub total: u64,
}

fn saturating_sum(counts: &[u64]) -> u64 {
    counts.iter().fold(0u64, |sum, &count| sum.saturating_add(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_keeps_first_seen_order() {
        let mut stats = FamilyStats::new();
        stats.record("B", 1);
        stats.record("A", 2);
        stats.record("B", 3);

        assert_eq!(stats.families().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(stats.get("B"), Some(&[1, 3][..]));
        assert_eq!(stats.get("A"), Some(&[2][..]));
        assert_eq!(stats.get("C"), None);
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn test_totals() {
        let stats: FamilyStats = [("A", 256), ("A", 256), ("B", 0)].into_iter().collect();
        assert_eq!(stats.total("A"), Some(512));
        assert_eq!(stats.total("B"), Some(0));
        assert_eq!(stats.total("C"), None);
        assert_eq!(stats.grand_total(), 512);
    }

    #[test]
    fn test_total_saturates() {
        let stats: FamilyStats = [("A", u64::MAX), ("A", 1)].into_iter().collect();
        assert_eq!(stats.total("A"), Some(u64::MAX));
    }

    #[test]
    fn test_summaries() {
        let stats: FamilyStats = [("Inter", 256), ("Mono", 1), ("Inter", 4)].into_iter().collect();
        assert_eq!(
            stats.summaries(),
            vec![
                FamilySummary {
                    family: "Inter".into(),
                    chunks: vec![256, 4],
                    total: 260,
                },
                FamilySummary {
                    family: "Mono".into(),
                    chunks: vec![1],
                    total: 1,
                },
            ]
        );
    }

    #[test]
    fn test_empty() {
        let stats = FamilyStats::new();
        assert!(stats.is_empty());
        assert!(stats.summaries().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_as_plain_map() {
        let stats: FamilyStats = [("Noto Sans", 256), ("Noto Sans", 1), ("Mono", 4)]
            .into_iter()
            .collect();
        insta::assert_snapshot!(
            serde_json::to_string(&stats).unwrap(),
            @r#"{"Noto Sans":[256,1],"Mono":[4]}"#
        );
        let back: FamilyStats = serde_json::from_str(r#"{"Noto Sans":[256,1],"Mono":[4]}"#).unwrap();
        assert_eq!(back, stats);
    }
}
