use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Name used when the catalog gives us no English name
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Portion assumed when the catalog doesn't say
pub const DEFAULT_PORTION: &str = "100g";

/// Nutrient fields a catalog entry can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Sugars,
    Fat,
    Carbohydrates,
    Proteins,
    Salt,
    SaturatedFat,
    Fiber,
}

impl Nutrient {
    /// Field name on the wire
    pub fn key(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Sugars => "sugars",
            Nutrient::Fat => "fat",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Proteins => "proteins",
            Nutrient::Salt => "salt",
            Nutrient::SaturatedFat => "saturated_fat",
            Nutrient::Fiber => "fiber",
        }
    }

    pub fn all() -> [Nutrient; 8] {
        [
            Nutrient::Calories,
            Nutrient::Sugars,
            Nutrient::Fat,
            Nutrient::Carbohydrates,
            Nutrient::Proteins,
            Nutrient::Salt,
            Nutrient::SaturatedFat,
            Nutrient::Fiber,
        ]
    }
}

/// Product model - what the rest of the app gets to see
///
/// Only the repository builds these (through normalization). Nothing updates a
/// product in place; a fresh lookup produces a fresh value.
///
/// Nutrient values default to 0 when the catalog leaves them out, and
/// `declared` remembers which ones the catalog actually sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Barcode, the primary key
    pub code: String,
    pub name_fr: Option<String>,
    pub name_en: String,
    /// kcal per portion
    pub calories: f64,
    pub sugars: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub proteins: f64,
    pub salt: f64,
    pub saturated_fat: f64,
    pub fiber: f64,
    pub portion: String,
    pub verified: Option<bool>,
    pub declared: BTreeSet<Nutrient>,
}

impl Product {
    pub fn value(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Sugars => self.sugars,
            Nutrient::Fat => self.fat,
            Nutrient::Carbohydrates => self.carbohydrates,
            Nutrient::Proteins => self.proteins,
            Nutrient::Salt => self.salt,
            Nutrient::SaturatedFat => self.saturated_fat,
            Nutrient::Fiber => self.fiber,
        }
    }

    /// Whether the catalog sent this nutrient (even if it was 0)
    pub fn declares(&self, nutrient: Nutrient) -> bool {
        self.declared.contains(&nutrient)
    }

    /// French name first, English (or the placeholder) otherwise
    pub fn display_name(&self) -> &str {
        self.name_fr.as_deref().unwrap_or(&self.name_en)
    }

    /// Neither localized name came from the catalog
    pub fn is_unnamed(&self) -> bool {
        self.name_fr.is_none() && self.name_en == UNKNOWN_PRODUCT_NAME
    }

    /// Empty codes can't be keyed, so they never leave the repository
    pub fn has_valid_code(&self) -> bool {
        !self.code.is_empty()
    }
}
