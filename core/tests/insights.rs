//! Customer, product, attribution and model-diagnostic summaries.

use novamart_core::{
    attribution::{attribution_models, model_shares, model_totals},
    customer::{age_histogram, income_ltv_correlation, ltv_by_segment, nps_distribution},
    diagnostics::{rank_features, top_features},
    error::MetricsError,
    product::{
        categories, category_stats, product_hierarchy, quarterly_sales, region_performance,
        ProductMetric, HIERARCHY_ROOT,
    },
    records::{ChannelAttributionRecord, CustomerRecord, FeatureImportanceRecord, ProductSaleRecord},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn customer(segment: &str, age: f64, income: f64, ltv: f64, nps: &str) -> CustomerRecord {
    CustomerRecord {
        segment: Some(segment.into()),
        age: Some(age),
        income: Some(income),
        ltv: Some(ltv),
        nps_category: Some(nps.into()),
        ..Default::default()
    }
}

fn sale(category: &str, sub: &str, region: &str, quarter: &str, sales: f64, margin: f64) -> ProductSaleRecord {
    ProductSaleRecord {
        product: None,
        category: Some(category.into()),
        subcategory: Some(sub.into()),
        region: Some(region.into()),
        quarter: Some(quarter.into()),
        sales: Some(sales),
        units: Some(1.0),
        profit_margin: Some(margin),
    }
}

fn attribution(channel: &str, values: &[(&str, f64)]) -> ChannelAttributionRecord {
    ChannelAttributionRecord {
        channel: channel.into(),
        models: values.iter().map(|(m, v)| (m.to_string(), *v)).collect(),
    }
}

fn feature(name: &str, importance: f64, std_dev: Option<f64>) -> FeatureImportanceRecord {
    FeatureImportanceRecord {
        feature: name.into(),
        importance,
        std_dev,
    }
}

// ── Customers ────────────────────────────────────────────────────────────────

#[test]
fn segment_ltv_statistics() {
    let records = vec![
        customer("Premium", 40.0, 120_000.0, 900.0, "Promoter"),
        customer("Premium", 45.0, 150_000.0, 1_100.0, "Promoter"),
        customer("Budget", 22.0, 30_000.0, 100.0, "Detractor"),
        customer("Budget", 25.0, 35_000.0, 300.0, "Passive"),
        customer("Budget", 30.0, 40_000.0, 200.0, "Promoter"),
    ];
    let stats = ltv_by_segment(&records);
    assert_eq!(stats[0].segment, "Premium");
    assert_eq!(stats[0].mean, 1_000.0);
    let budget = &stats[1];
    assert_eq!((budget.min, budget.median, budget.max, budget.count), (100.0, 200.0, 300.0, 3));

    let nps = nps_distribution(&records);
    assert_eq!(nps[0].label, "Promoter");
    assert_eq!(nps[0].value, 3.0);

    let r = income_ltv_correlation(&records).unwrap().unwrap();
    assert!(r > 0.9, "income and LTV rise together, r = {r}");
}

/// Every age lands in exactly one bin; the maximum goes in the last.
#[test]
fn age_histogram_counts_everyone() {
    let records: Vec<CustomerRecord> = [20.0, 25.0, 30.0, 35.0, 40.0]
        .iter()
        .map(|&age| customer("Regular", age, 1.0, 1.0, "Passive"))
        .collect();
    let hist = age_histogram(&records, 4);
    assert_eq!(hist.len(), 4);
    assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 5);
    assert_eq!(hist[3].count, 2);
    assert_eq!(hist[0].lower, 20.0);
    assert_eq!(hist[3].upper, 40.0);
    assert!(age_histogram(&[], 4).is_empty());
}

// ── Products ─────────────────────────────────────────────────────────────────

fn sales() -> Vec<ProductSaleRecord> {
    vec![
        sale("Electronics", "Phones", "North", "2024-Q2", 500.0, 20.0),
        sale("Electronics", "Audio", "South", "2024-Q1", 300.0, 30.0),
        sale("Fashion", "Women", "North", "2024-Q1", 200.0, 40.0),
        sale("Electronics", "Phones", "North", "2024-Q1", 100.0, 10.0),
    ]
}

#[test]
fn category_stats_sorted_by_sales() {
    let stats = category_stats(&sales());
    assert_eq!(stats[0].category, "Electronics");
    assert_eq!(stats[0].total_sales, 900.0);
    assert_eq!(stats[0].avg_sale, 300.0);
    assert_eq!(stats[0].units_sold, 3.0);
    assert_eq!(stats[0].avg_margin, 20.0);
    assert_eq!(categories(&sales()), vec!["Electronics", "Fashion"]);
}

/// Root, then each category followed by its subcategories.
#[test]
fn hierarchy_rolls_up_sales() {
    let nodes = product_hierarchy(&sales());
    let labels: Vec<&str> = nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![HIERARCHY_ROOT, "Electronics", "Phones", "Audio", "Fashion", "Women"]
    );
    assert_eq!(nodes[0].parent, "");
    assert_eq!(nodes[0].sales, 1_100.0);
    assert_eq!(nodes[2].parent, "Electronics");
    assert_eq!(nodes[2].sales, 600.0);
    assert_eq!(nodes[2].margin, 15.0);

    let child_total: f64 = nodes
        .iter()
        .filter(|n| n.parent == HIERARCHY_ROOT)
        .map(|n| n.sales)
        .sum();
    assert_eq!(child_total, nodes[0].sales);
}

#[test]
fn region_and_quarter_views() {
    let by_region = region_performance(&sales(), None, ProductMetric::Sales);
    assert_eq!(by_region[0].label, "North");
    assert_eq!(by_region[0].value, 800.0);

    let margin = region_performance(&sales(), Some("Electronics"), ProductMetric::Margin);
    assert_eq!(margin[0].label, "South");
    assert_eq!(margin[0].value, 30.0);

    let quarters = quarterly_sales(&sales(), None);
    let labels: Vec<&str> = quarters.iter().map(|q| q.label.as_str()).collect();
    assert_eq!(labels, vec!["2024-Q1", "2024-Q2"]);
    assert_eq!(quarters[0].value, 600.0);
}

// ── Attribution ──────────────────────────────────────────────────────────────

#[test]
fn model_shares_ascending_with_percentages() {
    let records = vec![
        attribution("Email", &[("first_touch", 300.0), ("linear", 100.0)]),
        attribution("TikTok", &[("first_touch", 100.0), ("linear", 300.0)]),
    ];
    assert_eq!(attribution_models(&records), vec!["first_touch", "linear"]);

    let shares = model_shares(&records, "first_touch").unwrap();
    assert_eq!(shares[0].channel, "TikTok");
    assert_eq!(shares[0].share_pct, 25.0);
    assert_eq!(shares[1].share_pct, 75.0);

    let totals = model_totals(&records);
    assert_eq!(totals, vec![("first_touch".to_string(), 400.0), ("linear".to_string(), 400.0)]);

    assert!(matches!(
        model_shares(&records, "u_shaped"),
        Err(MetricsError::UnknownModel { .. })
    ));
}

// ── Diagnostics ──────────────────────────────────────────────────────────────

#[test]
fn features_rank_with_error_bounds() {
    let records = vec![
        feature("age", 0.05, None),
        feature("site_visits", 0.30, Some(0.05)),
        feature("email_opens", 0.20, Some(0.02)),
    ];
    let ranked = rank_features(&records, true);
    assert_eq!(ranked[0].feature, "site_visits");
    assert_eq!(ranked[0].rank, 1);
    let (lo, hi) = ranked[0].bounds.unwrap();
    assert!((lo - 0.25).abs() < 1e-12 && (hi - 0.35).abs() < 1e-12);
    assert!(ranked[2].bounds.is_none());

    let ascending = rank_features(&records, false);
    assert_eq!(ascending[0].feature, "age");

    let top = top_features(&records, 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].feature, "email_opens");
}
