use serde::{Deserialize, Deserializer};

pub const DEFAULT_UNIT: &str = "units";
pub const DEFAULT_CONSUMPTION: f64 = 1_000.0;

fn default_unit() -> String {
    DEFAULT_UNIT.to_owned()
}

fn default_consumption() -> f64 {
    DEFAULT_CONSUMPTION
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_unit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_unit))
}

fn null_as_default_consumption<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_CONSUMPTION))
}

/// Optional fields fall back to their defaults whether the key is absent or `null`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sku: String,
    #[serde(default = "default_unit", deserialize_with = "null_as_default_unit")]
    pub unit: String,
    #[serde(
        default = "default_consumption",
        deserialize_with = "null_as_default_consumption"
    )]
    pub consumption: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selection {
    Product(String),
    Category(String),
}

impl Selection {
    pub fn key(&self) -> &str {
        match self {
            Self::Product(id) => id,
            Self::Category(name) => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategorySummary {
    pub name: String,
    pub product_count: usize,
    pub consumption: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Focus {
    pub selection: Selection,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub consumption: f64,
}

impl Focus {
    pub fn from_product(product: &ProductRecord) -> Self {
        let consumption = if product.consumption.is_finite() && product.consumption > 0.0 {
            product.consumption
        } else {
            DEFAULT_CONSUMPTION
        };
        let unit = if product.unit.trim().is_empty() {
            DEFAULT_UNIT.to_owned()
        } else {
            product.unit.clone()
        };

        Self {
            selection: Selection::Product(product.id.clone()),
            name: product.name.clone(),
            category: (!product.category.is_empty()).then(|| product.category.clone()),
            unit,
            consumption,
        }
    }

    pub fn from_category(summary: &CategorySummary) -> Self {
        let consumption = if summary.consumption > 0.0 {
            summary.consumption
        } else {
            DEFAULT_CONSUMPTION
        };

        Self {
            selection: Selection::Category(summary.name.clone()),
            name: summary.name.clone(),
            category: Some(summary.name.clone()),
            unit: DEFAULT_UNIT.to_owned(),
            consumption,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_unit_and_consumption_use_defaults() {
        let product: ProductRecord =
            serde_json::from_str(r#"{"id": "p-1", "name": "Heparin 5000 IU"}"#)
                .expect("minimal record parses");

        assert_eq!(product.unit, DEFAULT_UNIT);
        assert_eq!(product.consumption, DEFAULT_CONSUMPTION);
        assert!(product.category.is_empty());
    }

    #[test]
    fn focus_replaces_unusable_consumption() {
        let product = ProductRecord {
            id: "p-2".to_owned(),
            name: "Saline 0.9%".to_owned(),
            category: "Fluids".to_owned(),
            location: String::new(),
            sku: String::new(),
            unit: " ".to_owned(),
            consumption: f64::NAN,
        };

        let focus = Focus::from_product(&product);
        assert_eq!(focus.consumption, DEFAULT_CONSUMPTION);
        assert_eq!(focus.unit, DEFAULT_UNIT);
        assert_eq!(focus.category.as_deref(), Some("Fluids"));
        assert_eq!(focus.selection, Selection::Product("p-2".to_owned()));
    }
}
