// Nutrition math - energy from macros, daily needs, macro splits
use serde::{Deserialize, Serialize};

/// kcal from macronutrient grams (4 / 4 / 9)
pub fn calories_from_macros(proteins: f64, carbohydrates: f64, fat: f64) -> f64 {
    proteins * 4.0 + carbohydrates * 4.0 + fat * 9.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    pub gender: Gender,
    pub activity: ActivityLevel,
}

/// Basal metabolic rate, Mifflin-St Jeor
pub fn basal_metabolic_rate(profile: &BodyProfile) -> f64 {
    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age_years;
    match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// kcal per day including activity
pub fn daily_needs(profile: &BodyProfile) -> f64 {
    basal_metabolic_rate(profile) * profile.activity.multiplier()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    Maintenance,
    MuscleGain,
}

/// Share of daily energy per macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatio {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

pub fn macro_ratio(goal: Goal) -> MacroRatio {
    match goal {
        Goal::WeightLoss => MacroRatio {
            protein: 0.4,
            carbs: 0.35,
            fat: 0.25,
        },
        Goal::Maintenance => MacroRatio {
            protein: 0.3,
            carbs: 0.4,
            fat: 0.3,
        },
        Goal::MuscleGain => MacroRatio {
            protein: 0.3,
            carbs: 0.5,
            fat: 0.2,
        },
    }
}
