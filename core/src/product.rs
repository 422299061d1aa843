//! Product sales rollups by category, subcategory, region and quarter.

use crate::{
    records::ProductSaleRecord,
    types::{mean, sort_descending, LabeledValue},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const HIERARCHY_ROOT: &str = "All Products";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total_sales: f64,
    pub avg_sale: f64,
    pub units_sold: f64,
    /// Mean of present margins, 0 when none.
    pub avg_margin: f64,
}

#[derive(Default)]
struct Accumulator {
    sales: Vec<f64>,
    units: f64,
    margins: Vec<f64>,
}

impl Accumulator {
    fn add(&mut self, r: &ProductSaleRecord) {
        self.sales.push(r.sales.unwrap_or(0.0));
        self.units += r.units.unwrap_or(0.0);
        if let Some(m) = r.profit_margin {
            self.margins.push(m);
        }
    }

    fn total_sales(&self) -> f64 {
        self.sales.iter().sum()
    }

    fn avg_margin(&self) -> f64 {
        mean(&self.margins).unwrap_or(0.0)
    }
}

/// Per-category totals, highest sales first.
pub fn category_stats(records: &[ProductSaleRecord]) -> Vec<CategoryStats> {
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for r in records {
        if let Some(category) = r.category.as_deref() {
            groups.entry(category).or_default().add(r);
        }
    }

    let mut stats: Vec<CategoryStats> = groups
        .into_iter()
        .map(|(category, acc)| CategoryStats {
            category: category.to_string(),
            total_sales: acc.total_sales(),
            avg_sale: mean(&acc.sales).unwrap_or(0.0),
            units_sold: acc.units,
            avg_margin: acc.avg_margin(),
        })
        .collect();
    stats.sort_by(|a, b| {
        b.total_sales
            .total_cmp(&a.total_sales)
            .then_with(|| a.category.cmp(&b.category))
    });
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub label: String,
    /// Empty for the root.
    pub parent: String,
    pub sales: f64,
    pub margin: f64,
}

/// Root, category and subcategory nodes for a tree map.
/// Categories and subcategories appear in first-seen order.
pub fn product_hierarchy(records: &[ProductSaleRecord]) -> Vec<HierarchyNode> {
    let mut root = Accumulator::default();
    let mut categories: Vec<(&str, Accumulator, Vec<(&str, Accumulator)>)> = Vec::new();

    for r in records {
        root.add(r);
        let Some(category) = r.category.as_deref() else {
            continue;
        };
        let idx = match categories.iter().position(|(c, _, _)| *c == category) {
            Some(i) => i,
            None => {
                categories.push((category, Accumulator::default(), Vec::new()));
                categories.len() - 1
            }
        };
        let (_, cat_acc, subs) = &mut categories[idx];
        cat_acc.add(r);

        if let Some(sub) = r.subcategory.as_deref() {
            match subs.iter_mut().find(|(s, _)| *s == sub) {
                Some((_, acc)) => acc.add(r),
                None => {
                    let mut acc = Accumulator::default();
                    acc.add(r);
                    subs.push((sub, acc));
                }
            }
        }
    }

    let mut nodes = vec![HierarchyNode {
        label: HIERARCHY_ROOT.to_string(),
        parent: String::new(),
        sales: root.total_sales(),
        margin: root.avg_margin(),
    }];
    for (category, acc, subs) in categories {
        nodes.push(HierarchyNode {
            label: category.to_string(),
            parent: HIERARCHY_ROOT.to_string(),
            sales: acc.total_sales(),
            margin: acc.avg_margin(),
        });
        for (sub, sub_acc) in subs {
            nodes.push(HierarchyNode {
                label: sub.to_string(),
                parent: category.to_string(),
                sales: sub_acc.total_sales(),
                margin: sub_acc.avg_margin(),
            });
        }
    }
    nodes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductMetric {
    Sales,
    Units,
    Margin,
}

/// Per-region sales or units (summed) or margin (averaged), highest first.
/// `category` restricts the rows considered.
pub fn region_performance(
    records: &[ProductSaleRecord],
    category: Option<&str>,
    metric: ProductMetric,
) -> Vec<LabeledValue> {
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for r in filter_category(records, category) {
        if let Some(region) = r.region.as_deref() {
            groups.entry(region).or_default().add(r);
        }
    }
    let mut out: Vec<LabeledValue> = groups
        .into_iter()
        .map(|(region, acc)| {
            let value = match metric {
                ProductMetric::Sales => acc.total_sales(),
                ProductMetric::Units => acc.units,
                ProductMetric::Margin => acc.avg_margin(),
            };
            LabeledValue::new(region, value)
        })
        .collect();
    sort_descending(&mut out);
    out
}

/// Sales per quarter label, ascending by label.
pub fn quarterly_sales(records: &[ProductSaleRecord], category: Option<&str>) -> Vec<LabeledValue> {
    let mut quarters: BTreeMap<&str, f64> = BTreeMap::new();
    for r in filter_category(records, category) {
        if let Some(q) = r.quarter.as_deref() {
            *quarters.entry(q).or_insert(0.0) += r.sales.unwrap_or(0.0);
        }
    }
    quarters
        .into_iter()
        .map(|(q, sales)| LabeledValue::new(q, sales))
        .collect()
}

/// Categories in first-seen order.
pub fn categories(records: &[ProductSaleRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for c in records.iter().filter_map(|r| r.category.as_deref()) {
        if !seen.iter().any(|s| s == c) {
            seen.push(c.to_string());
        }
    }
    seen
}

fn filter_category<'a>(
    records: &'a [ProductSaleRecord],
    category: Option<&'a str>,
) -> impl Iterator<Item = &'a ProductSaleRecord> {
    records
        .iter()
        .filter(move |r| category.is_none() || r.category.as_deref() == category)
}
