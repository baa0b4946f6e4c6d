// Protein-based recommendations - pure functions, no I/O
use serde::{Deserialize, Serialize};

use crate::models::{Nutrient, Product};

/// Candidates must beat this ratio (in %) no matter how weak the reference is
pub const PROTEIN_RATIO_FLOOR: f64 = 15.0;

pub const MAX_RECOMMENDATIONS: usize = 5;

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;

/// Share of the calories that come from protein, in percent
///
/// Zero calories divides by 1 instead. That makes a 0 kcal product with any
/// protein look enormous (5 g -> 2000%); existing rankings depend on it, so it
/// stays until someone decides otherwise.
pub fn protein_ratio(product: &Product) -> f64 {
    let calories = if product.calories == 0.0 {
        1.0
    } else {
        product.calories
    };
    (product.proteins * KCAL_PER_GRAM_PROTEIN / calories) * 100.0
}

fn has_protein_data(product: &Product) -> bool {
    product.declares(Nutrient::Proteins) && product.declares(Nutrient::Calories)
}

/// Higher protein alternatives to `reference`
///
/// A candidate qualifies when it is a different product, the catalog gave
/// both its proteins and calories (zero is fine), and its ratio beats
/// `max(ratio(reference), 15)`. A reference missing one of the two counts as
/// ratio 0, so only the floor applies; one missing both gets nothing. Best
/// ratio first, ties keep input order, at most five.
pub fn recommend(reference: &Product, candidates: &[Product]) -> Vec<Product> {
    let has_any_macro =
        reference.declares(Nutrient::Proteins) || reference.declares(Nutrient::Calories);
    if candidates.is_empty() || !has_any_macro {
        return Vec::new();
    }

    let reference_ratio = if has_protein_data(reference) {
        protein_ratio(reference)
    } else {
        0.0
    };
    let threshold = reference_ratio.max(PROTEIN_RATIO_FLOOR);

    let mut scored: Vec<(f64, &Product)> = candidates
        .iter()
        .filter(|c| c.code != reference.code && has_protein_data(c))
        .map(|c| (protein_ratio(c), c))
        .filter(|(ratio, _)| *ratio > threshold)
        .collect();

    // sort_by is stable, so equal ratios stay in search order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(_, product)| product.clone())
        .collect()
}

/// How good a protein source a product is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProteinScore {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl ProteinScore {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 30.0 {
            ProteinScore::Excellent
        } else if ratio >= 20.0 {
            ProteinScore::Good
        } else if ratio >= 10.0 {
            ProteinScore::Moderate
        } else {
            ProteinScore::Low
        }
    }

    /// Only scored when both values came from the catalog and calories aren't 0
    pub fn for_product(product: &Product) -> Option<Self> {
        if !has_protein_data(product) || product.calories == 0.0 {
            return None;
        }
        Some(Self::from_ratio(protein_ratio(product)))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProteinScore::Excellent => "Excellent source protéique",
            ProteinScore::Good => "Bonne source protéique",
            ProteinScore::Moderate => "Source modérée de protéines",
            ProteinScore::Low => "Faible en protéines",
        }
    }
}
