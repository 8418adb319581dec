//! The aggregation engine: pure functions from the loaded record
//! collections to the view-models the presentation layer consumes.
//!
//! Every function here recomputes its result in full on each call — only
//! the raw loads are memoized (see `store`). None of them mutate their
//! inputs, and none of them fail: data-quality problems were already
//! reduced to skips and defaults at parse time.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use serde::Serialize;

use crate::schema::{Order, OrderStatus, User};
use crate::store::DataStore;
use crate::utils::{mean_2dp, month_key, percentage};

pub const DEFAULT_TOP_COUNTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_users: u64,
    pub total_orders: u64,
    pub completion_rate: f64,
    pub avg_items_per_order: f64,
    pub cancelled_rate: f64,
    pub return_rate: f64,
}

/// Per-month order counts, one field per known status. Orders whose status
/// falls outside the five known ones are not counted anywhere in this view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyOrders {
    pub month: String,
    #[serde(rename = "Complete")]
    pub complete: u64,
    #[serde(rename = "Shipped")]
    pub shipped: u64,
    #[serde(rename = "Processing")]
    pub processing: u64,
    #[serde(rename = "Cancelled")]
    pub cancelled: u64,
    #[serde(rename = "Returned")]
    pub returned: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSource {
    pub source: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatusSlice {
    pub status: String,
    pub count: u64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroup {
    pub age_group: String,
    pub male: u64,
    pub female: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRegistrations {
    pub month: String,
    pub count: u64,
}

pub fn kpi_summary(users: &[User], orders: &[Order]) -> KpiSummary {
    let mut completed = 0;
    let mut cancelled = 0;
    let mut returned = 0;
    let mut total_items: u64 = 0;

    for order in orders {
        match OrderStatus::from_raw(&order.status) {
            OrderStatus::Complete => completed += 1,
            OrderStatus::Cancelled => cancelled += 1,
            OrderStatus::Returned => returned += 1,
            _ => {}
        }
        total_items += u64::from(order.num_of_item);
    }

    KpiSummary {
        total_users: users.len() as u64,
        total_orders: orders.len() as u64,
        completion_rate: percentage(completed, orders.len()),
        avg_items_per_order: mean_2dp(total_items, orders.len()),
        cancelled_rate: percentage(cancelled, orders.len()),
        return_rate: percentage(returned, orders.len()),
    }
}

/// Group orders by the `"YYYY-MM"` of `created_at`, counting per known
/// status. Orders with an unparseable date are excluded from the view
/// entirely. The BTreeMap key order gives the ascending month sort for free
/// (the key is fixed-width and zero-padded, so lexicographic is
/// chronological).
pub fn monthly_orders(orders: &[Order]) -> Vec<MonthlyOrders> {
    let mut by_month: BTreeMap<String, MonthlyOrders> = BTreeMap::new();

    for order in orders {
        let Some(month) = month_key(&order.created_at) else {
            continue;
        };
        let entry = by_month.entry(month).or_default();
        match OrderStatus::from_raw(&order.status) {
            OrderStatus::Complete => entry.complete += 1,
            OrderStatus::Shipped => entry.shipped += 1,
            OrderStatus::Processing => entry.processing += 1,
            OrderStatus::Cancelled => entry.cancelled += 1,
            OrderStatus::Returned => entry.returned += 1,
            OrderStatus::Other => {}
        }
    }

    by_month
        .into_iter()
        .map(|(month, mut entry)| {
            entry.month = month;
            entry
        })
        .collect()
}

/// Count occurrences of each key, keeping first-encounter order. Combined
/// with a stable descending sort on count this gives the tie rule all the
/// ranked views share: ties stay in the order the key was first seen.
fn count_by_encounter<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for key in keys {
        match index.get(key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    counts
}

pub fn traffic_sources(users: &[User]) -> Vec<TrafficSource> {
    let mut counts = count_by_encounter(users.iter().map(|u| u.traffic_source.as_str()));
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(source, count)| TrafficSource { source, count })
        .collect()
}

/// Users per country, descending, truncated to `limit`. Users with an empty
/// country are excluded from grouping.
pub fn top_countries(users: &[User], limit: usize) -> Vec<CountryCount> {
    let mut counts = count_by_encounter(
        users
            .iter()
            .map(|u| u.country.as_str())
            .filter(|c| !c.is_empty()),
    );
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
        .into_iter()
        .map(|(country, count)| CountryCount { country, count })
        .collect()
}

/// Orders per raw status string — every distinct observed value, not just
/// the five known ones — with the chart color token attached.
pub fn order_status_breakdown(orders: &[Order]) -> Vec<OrderStatusSlice> {
    let mut counts = count_by_encounter(orders.iter().map(|o| o.status.as_str()));
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(status, count)| OrderStatusSlice {
            fill: OrderStatus::color_token(&status),
            status,
            count,
        })
        .collect()
}

const AGE_GROUP_LABELS: [&str; 7] = ["10s", "20s", "30s", "40s", "50s", "60s", "70+"];

/// Age-decade / gender cross-tab. Users with an unparseable age are skipped;
/// decades of 70 and above collapse into "70+"; decades outside the seven
/// labels (under 10, negative) are dropped. A gender other than "M"/"F"
/// increments neither counter but still marks the bucket as populated.
pub fn age_groups(users: &[User]) -> Vec<AgeGroup> {
    let mut buckets: [Option<(u64, u64)>; 7] = [None; 7];

    for user in users {
        let Some(age) = user.age else {
            continue;
        };
        let decade = age.div_euclid(10) * 10;
        let slot = if decade >= 70 {
            6
        } else if (10..=60).contains(&decade) {
            (decade / 10 - 1) as usize
        } else {
            continue;
        };

        let (male, female) = buckets[slot].get_or_insert((0, 0));
        match user.gender.as_str() {
            "M" => *male += 1,
            "F" => *female += 1,
            _ => {}
        }
    }

    AGE_GROUP_LABELS
        .iter()
        .zip(buckets)
        .filter_map(|(label, bucket)| {
            bucket.map(|(male, female)| AgeGroup {
                age_group: label.to_string(),
                male,
                female,
            })
        })
        .collect()
}

/// Registrations per `"YYYY-MM"` of the user's `created_at`; same grouping,
/// skip and sort policy as `monthly_orders`.
pub fn monthly_registrations(users: &[User]) -> Vec<MonthlyRegistrations> {
    let mut by_month: BTreeMap<String, u64> = BTreeMap::new();

    for user in users {
        let Some(month) = month_key(&user.created_at) else {
            continue;
        };
        *by_month.entry(month).or_insert(0) += 1;
    }

    by_month
        .into_iter()
        .map(|(month, count)| MonthlyRegistrations { month, count })
        .collect()
}

/// All seven view-models in one document — what the `report` subcommand and
/// an embedding API layer serialize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub kpis: KpiSummary,
    pub monthly_orders: Vec<MonthlyOrders>,
    pub traffic_sources: Vec<TrafficSource>,
    pub top_countries: Vec<CountryCount>,
    pub order_status_breakdown: Vec<OrderStatusSlice>,
    pub age_groups: Vec<AgeGroup>,
    pub monthly_registrations: Vec<MonthlyRegistrations>,
}

pub fn full_report(store: &DataStore, top_countries_limit: usize) -> Result<Report> {
    let users = store.users()?;
    let orders = store.orders()?;

    Ok(Report {
        kpis: kpi_summary(&users, &orders),
        monthly_orders: monthly_orders(&orders),
        traffic_sources: traffic_sources(&users),
        top_countries: top_countries(&users, top_countries_limit),
        order_status_breakdown: order_status_breakdown(&orders),
        age_groups: age_groups(&users),
        monthly_registrations: monthly_registrations(&users),
    })
}
