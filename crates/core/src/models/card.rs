//! Card model - one entry of a draw pool

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rarity label given to imported cards that do not name one
pub const DEFAULT_RARITY: &str = "common";

/// A drawable card.
///
/// `weight` is a relative weight, not a probability: a pool of weights
/// `[1, 3]` draws the second card three times as often as the first.
/// It is serialized as `probability` to match existing pool files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub rarity: String,
    #[serde(rename = "probability")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Card {
    pub fn new(name: impl Into<String>, rarity: impl Into<String>, weight: f64) -> Self {
        Self {
            id: format!("card_{}", Uuid::new_v4().simple()),
            name: name.into(),
            rarity: rarity.into(),
            weight,
            image: None,
            description: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Display rank of well-known rarity labels (higher is rarer).
///
/// Unknown labels rank 0 and sort after every known label.
pub fn rarity_rank(rarity: &str) -> u8 {
    match rarity {
        "SSR" => 4,
        "SR" => 3,
        "R" => 2,
        "N" => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_serializes_as_probability() {
        let card = Card::new("Dragon", "SSR", 0.5).with_id("c1");
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["probability"], 0.5);
        assert!(json.get("weight").is_none());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_rarity_rank_order() {
        assert!(rarity_rank("SSR") > rarity_rank("SR"));
        assert!(rarity_rank("SR") > rarity_rank("R"));
        assert!(rarity_rank("R") > rarity_rank("N"));
        assert_eq!(rarity_rank("legendary"), 0);
    }
}
