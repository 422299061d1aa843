//! Seeded sample datasets for demos and tests.
//!
//! Same seed, same `Datasets`, byte for byte.

use crate::{
    correlation::pearson,
    funnel::FunnelStage,
    loader::Datasets,
    records::{
        CampaignRecord, ChannelAttributionRecord, CorrelationMatrix, CustomerJourneyRecord,
        CustomerRecord, FeatureImportanceRecord, FunnelStageRecord, GeographicRecord,
        LeadScoringRecord, LearningCurveRecord, ProductSaleRecord,
    },
    rng::{DatasetSlot, RngBank, SampleRng},
};
use chrono::{Duration, NaiveDate};

pub const CHANNELS: [&str; 6] = [
    "Google Ads",
    "Facebook",
    "Email",
    "Instagram",
    "LinkedIn",
    "TikTok",
];
pub const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
pub const SEGMENTS: [&str; 4] = ["Premium", "Regular", "Budget", "New"];
const CAMPAIGN_TYPES: [&str; 4] = ["Awareness", "Retargeting", "Promotion", "Seasonal"];
const NPS: [&str; 3] = ["Promoter", "Passive", "Detractor"];
const CATALOG: [(&str, &[&str]); 4] = [
    ("Electronics", &["Phones", "Laptops", "Audio"]),
    ("Fashion", &["Men", "Women", "Kids"]),
    ("Home", &["Kitchen", "Furniture", "Decor"]),
    ("Sports", &["Fitness", "Outdoor"]),
];
const QUARTERS: [&str; 4] = ["2024-Q1", "2024-Q2", "2024-Q3", "2024-Q4"];
const FEATURES: [&str; 8] = [
    "email_opens",
    "site_visits",
    "pages_per_session",
    "days_since_signup",
    "cart_adds",
    "support_tickets",
    "income",
    "age",
];
const STATES: [(&str, &str); 12] = [
    ("New York", "East"),
    ("Pennsylvania", "East"),
    ("Florida", "South"),
    ("Georgia", "South"),
    ("Texas", "South"),
    ("Illinois", "Central"),
    ("Ohio", "Central"),
    ("Michigan", "North"),
    ("Minnesota", "North"),
    ("California", "West"),
    ("Washington", "West"),
    ("Arizona", "West"),
];
const ATTRIBUTION_MODELS: [&str; 5] = [
    "first_touch",
    "last_touch",
    "linear",
    "time_decay",
    "position_based",
];
const TOUCHPOINTS: [&str; 5] = ["Ad View", "Site Visit", "Email Click", "Cart", "Checkout"];
const CORRELATED_METRICS: [&str; 5] = ["spend", "revenue", "conversions", "clicks", "impressions"];

/// Row counts of a generated bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSize {
    pub days: u32,
    pub customers: usize,
    pub product_rows: usize,
    pub leads: usize,
    pub journeys: usize,
}

impl Default for SampleSize {
    fn default() -> Self {
        Self {
            days: 120,
            customers: 500,
            product_rows: 400,
            leads: 400,
            journeys: 150,
        }
    }
}

/// Generate a full bundle with the default sizes.
pub fn generate(seed: u64) -> Datasets {
    generate_with(seed, SampleSize::default())
}

pub fn generate_with(seed: u64, size: SampleSize) -> Datasets {
    let bank = RngBank::new(seed);
    let campaigns = campaigns(&mut bank.for_slot(DatasetSlot::Campaign), size.days);
    let correlation = correlation_of(&campaigns);

    let datasets = Datasets {
        customers: customers(&mut bank.for_slot(DatasetSlot::Customer), size.customers),
        product_sales: product_sales(&mut bank.for_slot(DatasetSlot::Product), size.product_rows),
        leads: leads(&mut bank.for_slot(DatasetSlot::Lead), size.leads),
        feature_importance: feature_importance(&mut bank.for_slot(DatasetSlot::Feature)),
        learning_curve: learning_curve(&mut bank.for_slot(DatasetSlot::LearningCurve)),
        geographic: geographic(&mut bank.for_slot(DatasetSlot::Geographic)),
        channel_attribution: channel_attribution(&mut bank.for_slot(DatasetSlot::Attribution)),
        funnel: funnel(&mut bank.for_slot(DatasetSlot::Funnel)),
        customer_journey: customer_journey(&mut bank.for_slot(DatasetSlot::Journey), size.journeys),
        campaigns,
        correlation,
    };
    log::info!(
        "sample: seed {seed} generated {} campaign rows, {} customers, {} leads",
        datasets.campaigns.len(),
        datasets.customers.len(),
        datasets.leads.len(),
    );
    datasets
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn campaigns(rng: &mut SampleRng, days: u32) -> Vec<CampaignRecord> {
    let start = start_date();
    let mut rows = Vec::with_capacity(days as usize * CHANNELS.len());
    for day in 0..days {
        let date = start + Duration::days(i64::from(day));
        for (i, channel) in CHANNELS.iter().enumerate() {
            let spend = round2(rng.range(200.0, 1200.0));
            let impressions = (spend * rng.range(40.0, 90.0)).round();
            let clicks = (impressions * rng.range(0.01, 0.05)).round();
            let conversions = (clicks * rng.range(0.02, 0.12)).round();
            // Channels further down the list earn less per conversion.
            let order_value = rng.range(60.0, 140.0) * (1.0 - i as f64 * 0.08);
            rows.push(CampaignRecord {
                date: date.format("%Y-%m-%d").to_string(),
                channel: Some(channel.to_string()),
                region: Some(rng.pick(&REGIONS).to_string()),
                campaign_type: Some(rng.pick(&CAMPAIGN_TYPES).to_string()),
                spend: Some(spend),
                revenue: Some(round2(conversions * order_value)),
                conversions: Some(conversions),
                clicks: Some(clicks),
                impressions: Some(impressions),
                ctr: Some(round2(clicks / impressions.max(1.0) * 100.0)),
            });
        }
    }
    rows
}

fn customers(rng: &mut SampleRng, n: usize) -> Vec<CustomerRecord> {
    (0..n)
        .map(|i| {
            let segment = *rng.pick(&SEGMENTS);
            let income = round2(rng.pareto(25_000.0, 2.5).min(400_000.0));
            let premium = if segment == "Premium" { 2.0 } else { 1.0 };
            let ltv = round2(income * rng.range(0.005, 0.02) * premium);
            let satisfaction = round2(rng.range(1.0, 10.0));
            let nps = if satisfaction >= 9.0 {
                NPS[0]
            } else if satisfaction >= 7.0 {
                NPS[1]
            } else {
                NPS[2]
            };
            CustomerRecord {
                customer_id: Some(format!("C{:05}", i + 1)),
                segment: Some(segment.to_string()),
                region: Some(rng.pick(&REGIONS).to_string()),
                channel: Some(rng.pick(&CHANNELS).to_string()),
                age: Some((18 + rng.next_u64_below(57)) as f64),
                income: Some(income),
                ltv: Some(ltv),
                satisfaction_score: Some(satisfaction),
                nps_category: Some(nps.to_string()),
                purchases: Some((1 + rng.next_u64_below(40)) as f64),
            }
        })
        .collect()
}

fn product_sales(rng: &mut SampleRng, n: usize) -> Vec<ProductSaleRecord> {
    (0..n)
        .map(|i| {
            let (category, subcategories) = *rng.pick(&CATALOG);
            let subcategory = *rng.pick(subcategories);
            let units = (1 + rng.next_u64_below(200)) as f64;
            ProductSaleRecord {
                product: Some(format!("{subcategory} #{}", i % 25 + 1)),
                category: Some(category.to_string()),
                subcategory: Some(subcategory.to_string()),
                region: Some(rng.pick(&REGIONS).to_string()),
                quarter: Some(rng.pick(&QUARTERS).to_string()),
                sales: Some(round2(units * rng.range(15.0, 400.0))),
                units: Some(units),
                profit_margin: Some(round2(rng.range(5.0, 45.0))),
            }
        })
        .collect()
}

fn leads(rng: &mut SampleRng, n: usize) -> Vec<LeadScoringRecord> {
    (0..n)
        .map(|i| {
            // The first two leads pin both classes so the ROC is defined.
            let actual = match i {
                0 => true,
                1 => false,
                _ => rng.chance(0.3),
            };
            let signal = if actual { 0.25 } else { -0.25 };
            let probability = (0.5 + signal + rng.range(-0.35, 0.35)).clamp(0.0, 1.0);
            LeadScoringRecord {
                lead_id: Some(format!("L{:05}", i + 1)),
                actual_converted: i64::from(actual),
                predicted_class: i64::from(probability >= 0.5),
                predicted_probability: round2(probability),
            }
        })
        .collect()
}

fn feature_importance(rng: &mut SampleRng) -> Vec<FeatureImportanceRecord> {
    FEATURES
        .iter()
        .map(|feature| {
            let importance = round2(rng.range(0.01, 0.30));
            FeatureImportanceRecord {
                feature: feature.to_string(),
                importance,
                std_dev: Some(round2(importance * rng.range(0.05, 0.25))),
            }
        })
        .collect()
}

fn learning_curve(rng: &mut SampleRng) -> Vec<LearningCurveRecord> {
    (1..=10u64)
        .map(|step| {
            let progress = step as f64 / 10.0;
            LearningCurveRecord {
                training_set_size: step * 500,
                training_score: round2(0.99 - 0.08 * progress + rng.range(-0.005, 0.005)),
                validation_score: round2(0.68 + 0.18 * progress + rng.range(-0.01, 0.01)),
                training_std: Some(round2(0.03 * (1.1 - progress))),
                validation_std: Some(round2(0.05 * (1.1 - progress))),
            }
        })
        .collect()
}

fn geographic(rng: &mut SampleRng) -> Vec<GeographicRecord> {
    STATES
        .iter()
        .map(|(state, region)| {
            let customers = (500 + rng.next_u64_below(20_000)) as f64;
            GeographicRecord {
                state: state.to_string(),
                region: Some(region.to_string()),
                revenue: Some(round2(customers * rng.range(80.0, 220.0))),
                customers,
                market_penetration: round2(rng.range(2.0, 60.0)),
                satisfaction: round2(rng.range(5.0, 9.8)),
            }
        })
        .collect()
}

fn channel_attribution(rng: &mut SampleRng) -> Vec<ChannelAttributionRecord> {
    CHANNELS
        .iter()
        .map(|channel| ChannelAttributionRecord {
            channel: channel.to_string(),
            models: ATTRIBUTION_MODELS
                .iter()
                .map(|model| (model.to_string(), (rng.range(50.0, 900.0)).round()))
                .collect(),
        })
        .collect()
}

fn funnel(rng: &mut SampleRng) -> Vec<FunnelStageRecord> {
    let mut visitors = 100_000 + rng.next_u64_below(50_000);
    FunnelStage::ORDER
        .iter()
        .map(|stage| {
            let record = FunnelStageRecord::new(stage.name(), visitors);
            visitors = (visitors as f64 * rng.range(0.25, 0.6)) as u64;
            record
        })
        .collect()
}

fn customer_journey(rng: &mut SampleRng, n: usize) -> Vec<CustomerJourneyRecord> {
    let mut rows = Vec::new();
    for i in 0..n {
        let steps = 1 + rng.next_u64_below(TOUCHPOINTS.len() as u64) as usize;
        let converted = steps == TOUCHPOINTS.len();
        for (step, touchpoint) in TOUCHPOINTS.iter().take(steps).enumerate() {
            rows.push(CustomerJourneyRecord {
                customer_id: Some(format!("C{:05}", i + 1)),
                touchpoint: Some(touchpoint.to_string()),
                channel: Some(rng.pick(&CHANNELS).to_string()),
                step: Some(step as u32 + 1),
                converted: Some(i64::from(converted)),
            });
        }
    }
    rows
}

/// Pairwise Pearson correlation of the numeric campaign columns.
/// Undefined pairs read 0; the diagonal is 1.
fn correlation_of(campaigns: &[CampaignRecord]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = CORRELATED_METRICS
        .iter()
        .map(|metric| {
            campaigns
                .iter()
                .map(|r| match *metric {
                    "spend" => r.spend,
                    "revenue" => r.revenue,
                    "conversions" => r.conversions,
                    "clicks" => r.clicks,
                    _ => r.impressions,
                })
                .map(|v| v.unwrap_or(0.0))
                .collect()
        })
        .collect();

    let values = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        pearson(&columns[i], &columns[j])
                            .ok()
                            .flatten()
                            .map(round2)
                            .unwrap_or(0.0)
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        metrics: CORRELATED_METRICS.iter().map(|m| m.to_string()).collect(),
        values,
    }
}
