mod load;
mod record;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

pub use record::{
    CategorySummary, DEFAULT_CONSUMPTION, DEFAULT_UNIT, Focus, ProductRecord, Selection,
};

#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl Catalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let products = load::read_catalog_file(path)?;
        tracing::info!(path = %path.display(), products = products.len(), "loaded catalog");
        Ok(Self::new(products))
    }

    pub fn builtin() -> Self {
        const ROWS: [(&str, &str, &str, &str, &str, &str, f64); 10] = [
            ("amx-500", "Amoxicillin 500 mg", "Antibiotics", "Central Pharmacy", "AMX-500-CAP", "capsules", 4_200.0),
            ("cro-1g", "Ceftriaxone 1 g", "Antibiotics", "Central Pharmacy", "CRO-1G-VIAL", "vials", 1_350.0),
            ("vnc-1g", "Vancomycin 1 g", "Antibiotics", "ICU Satellite", "VNC-1G-VIAL", "vials", 610.0),
            ("hep-5k", "Heparin 5000 IU", "Anticoagulants", "Central Pharmacy", "HEP-5K-AMP", "ampoules", 2_800.0),
            ("enx-40", "Enoxaparin 40 mg", "Anticoagulants", "Surgery Satellite", "ENX-40-SYR", "syringes", 1_900.0),
            ("ins-gla", "Insulin glargine 100 U/ml", "Endocrine", "Central Pharmacy", "INS-GLA-PEN", "pens", 480.0),
            ("par-iv", "Paracetamol 1 g IV", "Analgesics", "Emergency Satellite", "PAR-1G-IV", "bags", 3_600.0),
            ("mor-10", "Morphine 10 mg", "Analgesics", "Controlled Vault", "MOR-10-AMP", "ampoules", 720.0),
            ("ome-40", "Omeprazole 40 mg IV", "Gastro", "Central Pharmacy", "OME-40-VIAL", "vials", 1_150.0),
            ("nac-09", "Sodium chloride 0.9% 500 ml", "Fluids", "Main Warehouse", "NACL-500", "bags", 9_800.0),
        ];

        let products = ROWS
            .iter()
            .map(
                |&(id, name, category, location, sku, unit, consumption)| ProductRecord {
                    id: id.to_owned(),
                    name: name.to_owned(),
                    category: category.to_owned(),
                    location: location.to_owned(),
                    sku: sku.to_owned(),
                    unit: unit.to_owned(),
                    consumption,
                },
            )
            .collect();

        Self::new(products)
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        let mut by_name: BTreeMap<&str, CategorySummary> = BTreeMap::new();
        for product in &self.products {
            if product.category.is_empty() {
                continue;
            }

            let entry = by_name
                .entry(product.category.as_str())
                .or_insert_with(|| CategorySummary {
                    name: product.category.clone(),
                    product_count: 0,
                    consumption: 0.0,
                });
            entry.product_count += 1;
            if product.consumption.is_finite() && product.consumption > 0.0 {
                entry.consumption += product.consumption;
            }
        }

        by_name.into_values().collect()
    }

    pub fn resolve(&self, selection: &Selection) -> Option<Focus> {
        match selection {
            Selection::Product(id) => self.product(id).map(Focus::from_product),
            Selection::Category(name) => self
                .categories()
                .iter()
                .find(|summary| &summary.name == name)
                .map(Focus::from_category),
        }
    }

    pub fn search(&self, query: &str) -> Vec<&ProductRecord> {
        let query = query.trim();
        if query.is_empty() {
            return self.products.iter().collect();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored = self
            .products
            .iter()
            .filter_map(|product| {
                let by_name = fuzzy_match_score(&matcher, &product.name, query);
                let by_sku = fuzzy_match_score(&matcher, &product.sku, query);
                by_name.max(by_sku).map(|score| (score, product))
            })
            .collect::<Vec<_>>();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
        scored.into_iter().map(|(_, product)| product).collect()
    }
}
