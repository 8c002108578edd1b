use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::record::ProductRecord;

pub(super) fn read_catalog_file(path: &Path) -> Result<Vec<ProductRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    parse_catalog(&raw).with_context(|| format!("failed to parse catalog {}", path.display()))
}

pub(super) fn parse_catalog(raw: &str) -> Result<Vec<ProductRecord>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in catalog")?;

    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("products") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(anyhow!("catalog field `products` must be an array")),
            None => return Err(anyhow!("catalog object has no `products` field")),
        },
        _ => return Err(anyhow!("unexpected JSON type for catalog")),
    };

    let mut seen = HashSet::with_capacity(entries.len());
    let mut products = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let product: ProductRecord = serde_json::from_value(entry)
            .with_context(|| format!("invalid product record at index {index}"))?;

        if product.id.trim().is_empty() {
            tracing::warn!(index, "skipping product record with empty id");
            continue;
        }
        if !seen.insert(product.id.clone()) {
            tracing::warn!(id = %product.id, "skipping duplicate product id");
            continue;
        }

        products.push(product);
    }

    if products.is_empty() {
        Err(anyhow!("catalog contains no usable product records"))
    } else {
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::{DEFAULT_CONSUMPTION, DEFAULT_UNIT};

    #[test]
    fn accepts_wrapped_and_bare_arrays() {
        let wrapped = r#"{"products": [{"id": "a", "name": "Amoxicillin"}]}"#;
        let bare = r#"[{"id": "a", "name": "Amoxicillin"}]"#;

        assert_eq!(parse_catalog(wrapped).expect("wrapped").len(), 1);
        assert_eq!(parse_catalog(bare).expect("bare").len(), 1);
    }

    #[test]
    fn drops_duplicate_and_blank_ids() {
        let raw = r#"[
            {"id": "a", "name": "Amoxicillin"},
            {"id": "a", "name": "Amoxicillin again"},
            {"id": " ", "name": "Nameless"},
            {"id": "b", "name": "Bupivacaine"}
        ]"#;

        let products = parse_catalog(raw).expect("catalog parses");
        let ids = products.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let raw = r#"[
            {"id": "a", "name": "Amoxicillin", "consumption": null},
            {"id": "b", "name": "Bupivacaine", "unit": null, "sku": null, "category": null}
        ]"#;

        let products = parse_catalog(raw).expect("null fields are tolerated");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].consumption, DEFAULT_CONSUMPTION);
        assert_eq!(products[0].unit, DEFAULT_UNIT);
        assert_eq!(products[1].unit, DEFAULT_UNIT);
        assert_eq!(products[1].consumption, DEFAULT_CONSUMPTION);
        assert!(products[1].sku.is_empty());
        assert!(products[1].category.is_empty());
    }

    #[test]
    fn rejects_empty_and_malformed_catalogs() {
        assert!(parse_catalog("[]").is_err());
        assert!(parse_catalog(r#"{"items": []}"#).is_err());
        assert!(parse_catalog(r#"[{"name": "no id"}]"#).is_err());
        assert!(parse_catalog("42").is_err());
    }
}
