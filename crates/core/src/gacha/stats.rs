//! Per-rarity counts and pool odds

use std::collections::BTreeMap;

use crate::models::{rarity_rank, Card, DrawRecord};

/// Count of drawn cards per rarity label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RarityTally {
    counts: BTreeMap<String, usize>,
    total: usize,
}

impl RarityTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut tally = Self::new();
        for card in cards {
            tally.add(&card.rarity);
        }
        tally
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DrawRecord>,
    {
        let mut tally = Self::new();
        for record in records {
            tally.add(&record.card_rarity);
        }
        tally
    }

    pub fn add(&mut self, rarity: &str) {
        *self.counts.entry(rarity.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, rarity: &str) -> usize {
        self.counts.get(rarity).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Counts ordered rarest first, unknown labels alphabetically after
    pub fn entries(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(rarity, count)| (rarity.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| rarity_rank(b.0).cmp(&rarity_rank(a.0)).then(a.0.cmp(b.0)));
        entries
    }
}

/// A card's normalized share of its pool
#[derive(Debug, Clone, PartialEq)]
pub struct CardOdds<'a> {
    pub card: &'a Card,
    /// `weight / total`, in `[0, 1]`
    pub share: f64,
}

impl CardOdds<'_> {
    pub fn percent(&self) -> f64 {
        self.share * 100.0
    }
}

/// Normalized draw odds for every card.
///
/// Weights are relative, so a card's displayed percentage must come from
/// here rather than from its raw weight. Pools without positive weight
/// yield zero shares.
pub fn pool_odds(pool: &[Card]) -> Vec<CardOdds<'_>> {
    let total: f64 = pool
        .iter()
        .map(|card| card.weight)
        .filter(|w| w.is_finite() && *w > 0.0)
        .sum();

    pool.iter()
        .map(|card| {
            let share = if total > 0.0 && card.weight.is_finite() && card.weight > 0.0 {
                card.weight / total
            } else {
                0.0
            };
            CardOdds { card, share }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_by_rarity() {
        let cards = vec![
            Card::new("a", "SSR", 1.0),
            Card::new("b", "N", 1.0),
            Card::new("c", "N", 1.0),
            Card::new("d", "R", 1.0),
        ];
        let drawn: Vec<&Card> = vec![&cards[0], &cards[1], &cards[2], &cards[1], &cards[3]];

        let tally = RarityTally::from_cards(drawn);
        assert_eq!(tally.total(), 5);
        assert_eq!(tally.count("N"), 3);
        assert_eq!(tally.count("SSR"), 1);
        assert_eq!(tally.count("SR"), 0);
        assert_eq!(tally.entries(), vec![("SSR", 1), ("R", 1), ("N", 3)]);
    }

    #[test]
    fn test_tally_unknown_labels_last() {
        let mut tally = RarityTally::new();
        tally.add("mythic");
        tally.add("N");
        tally.add("common");

        assert_eq!(
            tally.entries(),
            vec![("N", 1), ("common", 1), ("mythic", 1)]
        );
    }

    #[test]
    fn test_empty_tally() {
        let tally = RarityTally::from_cards(std::iter::empty());
        assert!(tally.is_empty());
        assert!(tally.entries().is_empty());
    }

    #[test]
    fn test_pool_odds_normalizes() {
        let pool = vec![
            Card::new("a", "SSR", 1.0),
            Card::new("b", "N", 3.0),
            Card::new("c", "N", 0.0),
        ];

        let odds = pool_odds(&pool);
        assert_eq!(odds.len(), 3);
        assert!((odds[0].share - 0.25).abs() < 1e-12);
        assert!((odds[1].percent() - 75.0).abs() < 1e-9);
        assert_eq!(odds[2].share, 0.0);
    }

    #[test]
    fn test_pool_odds_zero_total() {
        let pool = vec![Card::new("a", "N", 0.0)];
        assert_eq!(pool_odds(&pool)[0].share, 0.0);
    }
}
