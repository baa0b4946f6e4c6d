// Turns whatever the catalog sends into strict Product records
use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::{Nutrient, Product, DEFAULT_PORTION, UNKNOWN_PRODUCT_NAME};

/// Why a payload couldn't be turned into products
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("expected a product object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("expected an array of products, found {found}")]
    NotAnArray { found: &'static str },
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Permissive number parsing
///
/// JSON numbers pass through, strings are read up to the end of their leading
/// decimal ("12.5g" is 12.5). Everything else, including non-finite results,
/// is `None` and the caller substitutes 0.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => leading_decimal(s),
        _ => None,
    }
}

fn leading_decimal(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - (end + 1);
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when it has digits of its own
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Non-empty string, or a number rendered as one
fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pick the product out of a lookup response
///
/// The catalog answers either with the product itself or with
/// `{ "product": { ... } }`. A null/empty body, or a wrapper whose product is
/// missing, means there is nothing to show.
pub fn unwrap_product_payload(payload: &Value) -> Result<&Value, NormalizationError> {
    match payload {
        Value::Null => Err(NormalizationError::EmptyPayload),
        Value::Object(map) if map.is_empty() => Err(NormalizationError::EmptyPayload),
        Value::Object(map) => match map.get("product") {
            Some(inner @ Value::Object(_)) => Ok(inner),
            Some(_) => {
                let status = map
                    .get("status_verbose")
                    .and_then(|v| v.as_str())
                    .unwrap_or("-");
                debug!("Wrapper without product: {}", status);
                Err(NormalizationError::EmptyPayload)
            }
            None => Ok(payload),
        },
        other => Err(NormalizationError::NotAnObject {
            found: kind_of(other),
        }),
    }
}

/// Build a Product from one catalog object
///
/// Defaults: nutrients 0, `name_en` "Unknown Product", `portion` "100g",
/// `code` empty string. Callers drop products with an empty code.
pub fn normalize_product(value: &Value) -> Result<Product, NormalizationError> {
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Err(NormalizationError::EmptyPayload),
        other => {
            return Err(NormalizationError::NotAnObject {
                found: kind_of(other),
            })
        }
    };

    let mut declared = BTreeSet::new();
    let mut nutrient = |n: Nutrient| -> f64 {
        match map.get(n.key()).and_then(parse_number) {
            Some(v) => {
                declared.insert(n);
                v
            }
            None => 0.0,
        }
    };

    let calories = nutrient(Nutrient::Calories);
    let sugars = nutrient(Nutrient::Sugars);
    let fat = nutrient(Nutrient::Fat);
    let carbohydrates = nutrient(Nutrient::Carbohydrates);
    let proteins = nutrient(Nutrient::Proteins);
    let salt = nutrient(Nutrient::Salt);
    let saturated_fat = nutrient(Nutrient::SaturatedFat);
    let fiber = nutrient(Nutrient::Fiber);

    Ok(Product {
        code: text_field(map, "code").unwrap_or_default(),
        name_fr: text_field(map, "product_name_fr"),
        name_en: text_field(map, "product_name_en")
            .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string()),
        calories,
        sugars,
        fat,
        carbohydrates,
        proteins,
        salt,
        saturated_fat,
        fiber,
        portion: text_field(map, "portion").unwrap_or_else(|| DEFAULT_PORTION.to_string()),
        verified: map.get("verified").and_then(Value::as_bool),
        declared,
    })
}

/// Normalize a search response
///
/// Anything that isn't an array is a shape error. Entries without a code (or
/// that aren't objects) are skipped, not fatal.
pub fn normalize_search_results(payload: &Value) -> Result<Vec<Product>, NormalizationError> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(NormalizationError::NotAnArray {
                found: kind_of(other),
            })
        }
    };

    let mut products = Vec::with_capacity(items.len());
    for item in items {
        match normalize_product(item) {
            Ok(product) if product.has_valid_code() => products.push(product),
            Ok(_) => debug!("Skipping search entry without a code"),
            Err(e) => debug!("Skipping search entry: {}", e),
        }
    }

    Ok(products)
}
