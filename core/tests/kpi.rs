//! Campaign KPI aggregation tests.

use novamart_core::{
    kpi::{
        aggregate_by_channel, compute_kpis, cumulative_conversions, customer_count,
        monthly_spend_by_campaign_type, region_quarter_revenue,
        sum_by_dimension, top_channel, ChannelMetric, Dimension,
    },
    records::{CampaignField, CampaignRecord, CustomerRecord},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn campaign(date: &str, channel: &str, spend: f64, revenue: f64, conversions: f64, clicks: f64) -> CampaignRecord {
    CampaignRecord {
        date: date.into(),
        channel: Some(channel.into()),
        region: Some("North".into()),
        campaign_type: Some("Promotion".into()),
        spend: Some(spend),
        revenue: Some(revenue),
        conversions: Some(conversions),
        clicks: Some(clicks),
        impressions: Some(clicks * 20.0),
        ctr: Some(5.0),
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn typed(date: &str, campaign_type: &str, spend: f64) -> CampaignRecord {
    CampaignRecord {
        campaign_type: Some(campaign_type.into()),
        ..campaign(date, "Email", spend, 0.0, 0.0, 0.0)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Two rows on one day: revenue 100+50, spend 50+50, conversions 5+2, clicks 20+10.
#[test]
fn two_row_scenario_headline_kpis() {
    let records = vec![
        campaign("2024-01-01", "Email", 50.0, 100.0, 5.0, 20.0),
        campaign("2024-01-01", "Facebook", 50.0, 50.0, 2.0, 10.0),
    ];
    let kpis = compute_kpis(&records);

    assert!(close(kpis.total_revenue, 150.0), "revenue {}", kpis.total_revenue);
    assert!(close(kpis.total_spend, 100.0), "spend {}", kpis.total_spend);
    assert!(close(kpis.roas, 1.5), "roas {}", kpis.roas);
    assert!(close(kpis.total_conversions, 7.0));
    assert!(
        (kpis.avg_conversion_rate - 23.33).abs() < 0.01,
        "conversion rate {} should be ~23.33%",
        kpis.avg_conversion_rate
    );
    assert!(close(kpis.avg_ctr, 5.0));
}

/// ROAS is 0, not infinite, when spend sums to zero.
#[test]
fn zero_spend_gives_zero_roas() {
    let records = vec![campaign("2024-01-01", "Email", 0.0, 500.0, 3.0, 10.0)];
    let kpis = compute_kpis(&records);
    assert_eq!(kpis.total_spend, 0.0);
    assert_eq!(kpis.roas, 0.0);
}

/// Empty input degrades to zeros rather than failing.
#[test]
fn empty_input_is_all_zero() {
    let kpis = compute_kpis(&[]);
    assert_eq!(kpis.total_revenue, 0.0);
    assert_eq!(kpis.avg_ctr, 0.0);
    assert_eq!(kpis.avg_conversion_rate, 0.0);
    assert!(top_channel(&[]).is_none());
    assert_eq!(customer_count(&[]), 0);
    assert_eq!(customer_count(&[CustomerRecord::default(), CustomerRecord::default()]), 2);
}

/// Rows missing a column contribute 0 to that column's total.
#[test]
fn missing_columns_count_as_zero() {
    let records = vec![
        campaign("2024-01-01", "Email", 10.0, 30.0, 1.0, 5.0),
        CampaignRecord {
            date: "2024-01-02".into(),
            channel: Some("Email".into()),
            spend: Some(10.0),
            ..Default::default()
        },
    ];
    let kpis = compute_kpis(&records);
    assert!(close(kpis.total_revenue, 30.0));
    assert!(close(kpis.total_spend, 20.0));
    assert!(close(kpis.roas, 1.5));
}

#[test]
fn channel_revenue_is_sorted_highest_first() {
    let records = vec![
        campaign("2024-01-01", "Email", 10.0, 30.0, 1.0, 5.0),
        campaign("2024-01-01", "TikTok", 10.0, 90.0, 1.0, 5.0),
        campaign("2024-01-02", "Email", 10.0, 40.0, 1.0, 5.0),
    ];
    let by_channel = aggregate_by_channel(&records, ChannelMetric::Revenue);
    assert_eq!(by_channel[0].label, "TikTok");
    assert!(close(by_channel[1].value, 70.0));
    assert_eq!(top_channel(&records).as_deref(), Some("TikTok"));

    let by_type = sum_by_dimension(&records, Dimension::CampaignType, CampaignField::Spend);
    assert_eq!(by_type.len(), 1);
    assert!(close(by_type[0].value, 30.0));
}

#[test]
fn region_quarters_split_by_calendar_quarter() {
    let records = vec![
        campaign("2024-03-31", "Email", 1.0, 10.0, 1.0, 1.0),
        campaign("2024-04-01", "Email", 1.0, 20.0, 1.0, 1.0),
        campaign("2024-04-15", "Email", 1.0, 5.0, 1.0, 1.0),
        campaign("garbage", "Email", 1.0, 1000.0, 1.0, 1.0),
    ];
    let rq = region_quarter_revenue(&records);
    assert_eq!(rq.len(), 2, "unparsable dates are dropped");
    assert_eq!((rq[0].year, rq[0].quarter), (2024, 1));
    assert!(close(rq[1].revenue, 25.0));
}

#[test]
fn cumulative_conversions_run_per_channel() {
    let records = vec![
        campaign("2024-01-01", "Email", 1.0, 1.0, 2.0, 5.0),
        campaign("2024-01-01", "Facebook", 1.0, 1.0, 4.0, 5.0),
        campaign("2024-01-02", "Email", 1.0, 1.0, 3.0, 5.0),
    ];
    let cum = cumulative_conversions(&records);
    let email: Vec<f64> = cum
        .iter()
        .filter(|c| c.channel == "Email")
        .map(|c| c.cumulative_conversions)
        .collect();
    assert_eq!(email, vec![2.0, 5.0]);
}

/// Spend splits per month and type; each month's shares add up to 100.
#[test]
fn monthly_spend_by_campaign_type_splits_each_month() {
    let records = vec![
        typed("2024-02-10", "Seasonal Sale", 30.0),
        typed("2024-01-05", "Lead Generation", 60.0),
        typed("2024-01-20", "Brand Awareness", 20.0),
        typed("2024-01-28", "Lead Generation", 20.0),
        typed("2024-02-11", "Lead Generation", 10.0),
        typed("bad date", "Lead Generation", 500.0),
    ];
    let rows = monthly_spend_by_campaign_type(&records);

    let keys: Vec<(String, &str)> = rows
        .iter()
        .map(|r| (r.month.to_string(), r.campaign_type.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2024-01-01".to_string(), "Brand Awareness"),
            ("2024-01-01".to_string(), "Lead Generation"),
            ("2024-02-01".to_string(), "Lead Generation"),
            ("2024-02-01".to_string(), "Seasonal Sale"),
        ]
    );
    assert!(close(rows[1].spend, 80.0));
    assert!(close(rows[1].share_pct, 80.0));
    assert!(close(rows[3].share_pct, 75.0));

    for month in ["2024-01-01", "2024-02-01"] {
        let total: f64 = rows
            .iter()
            .filter(|r| r.month.to_string() == month)
            .map(|r| r.share_pct)
            .sum();
        assert!(close(total, 100.0), "{month} shares sum to {total}");
    }
}
