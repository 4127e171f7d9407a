//! List aggregation: normalize heterogeneous trade records and derive summary stats.
//!
//! Raw records arrive with inconsistent field names (`total_volume` vs
//! `volume` vs `vol`) and types (numbers as strings, `null` growth). The
//! aggregator resolves aliases, safe-parses numbers and computes
//! [`SummaryStats`] from scratch on every call.
//!
//! Parsing policy:
//! - flow quantities (volume, transaction count) default to `0` when unparsable;
//! - rates (average price, growth) become `None`, because `0` and "unknown"
//!   mean different things for a rate;
//! - `total_value` falls back to `avg_price × volume`, or `0` when the price is unknown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::missing::is_missing;
use crate::record::{parse_datetime, parse_number, plain_text, RowId};

/// Ordered alias lists: the first alias holding a non-missing value wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub id: Vec<String>,
    pub name: Vec<String>,
    pub country: Vec<String>,
    pub volume: Vec<String>,
    pub avg_price: Vec<String>,
    pub total_value: Vec<String>,
    pub growth: Vec<String>,
    pub transaction_count: Vec<String>,
    pub segment: Vec<String>,
    pub top_products: Vec<String>,
    pub first_trade: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            id: names(&["id"]),
            name: names(&["company", "company_name", "name"]),
            country: names(&["country"]),
            volume: names(&["total_volume", "volume", "trade_volume", "vol"]),
            avg_price: names(&["avg_price", "price"]),
            total_value: names(&["total_value", "estimated_revenue", "value"]),
            growth: names(&["yoy_growth", "growth"]),
            transaction_count: names(&["transaction_count"]),
            segment: names(&["segment_tag", "segment"]),
            top_products: names(&["top_products"]),
            first_trade: names(&["first_trade", "active_since"]),
        }
    }
}

/// One normalized list row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    pub id: RowId,
    pub name: String,
    pub country: String,
    pub volume: f64,
    pub avg_price: Option<f64>,
    pub total_value: f64,
    pub yoy_growth: Option<f64>,
    pub transaction_count: u64,
    pub segment: String,
    pub top_products: Vec<String>,
    pub first_trade: Option<NaiveDate>,
}

impl TradeRow {
    /// JSON form consumed by the filter, sort and export stages.
    pub fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "country": self.country,
            "volume": self.volume,
            "avg_price": self.avg_price,
            "total_value": self.total_value,
            "yoy_growth": self.yoy_growth,
            "transaction_count": self.transaction_count,
            "segment": self.segment,
            "top_products": self.top_products,
            "first_trade": self.first_trade.map(|d| d.format("%Y-%m-%d").to_string()),
        })
    }
}

/// Aggregate statistics, recomputed in full from a row set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub row_count: usize,
    pub skipped_rows: usize,
    pub total_volume: f64,
    pub total_value: f64,
    pub total_transactions: u64,
    /// Unweighted mean of per-row average prices over all rows; rows with an
    /// unknown price contribute zero to the sum and still count in the divisor.
    /// `None` for an empty set.
    pub avg_price: Option<f64>,
    /// `Σ(price × volume) / Σ volume` over rows with a known price.
    pub volume_weighted_price: Option<f64>,
    /// Mean growth over rows with a finite growth value only.
    /// `None` when no row has one.
    pub avg_growth: Option<f64>,
    pub growth_sample_size: usize,
}

/// Normalized rows plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub rows: Vec<TradeRow>,
    pub stats: SummaryStats,
}

impl Aggregation {
    pub fn values(&self) -> Vec<Value> {
        self.rows.iter().map(TradeRow::to_value).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListAggregator {
    aliases: FieldAliases,
}

impl ListAggregator {
    pub fn new(aliases: FieldAliases) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }

    /// Normalize and summarize. Malformed (non-object) records are skipped.
    pub fn aggregate(&self, raw: &[Value]) -> Aggregation {
        let rows: Vec<TradeRow> = raw
            .iter()
            .enumerate()
            .filter_map(|(index, record)| self.normalize_one(index, record))
            .collect();
        let mut stats = summarize(&rows);
        stats.skipped_rows = raw.len() - rows.len();
        Aggregation { rows, stats }
    }

    /// Normalize every usable record.
    pub fn normalize(&self, raw: &[Value]) -> Vec<TradeRow> {
        raw.iter()
            .enumerate()
            .filter_map(|(index, record)| self.normalize_one(index, record))
            .collect()
    }

    /// Normalize one record; `index` seeds the id when the record has none.
    pub fn normalize_one(&self, index: usize, record: &Value) -> Option<TradeRow> {
        let Some(map) = record.as_object() else {
            tracing::debug!(index, "skipping malformed record");
            return None;
        };
        let pick = |aliases: &Vec<String>| pick_alias(map, aliases);

        let volume = pick(&self.aliases.volume)
            .and_then(parse_number)
            .unwrap_or(0.0);
        let avg_price = pick(&self.aliases.avg_price).and_then(parse_number);
        let total_value = pick(&self.aliases.total_value)
            .and_then(parse_number)
            .or_else(|| avg_price.map(|price| price * volume))
            .unwrap_or(0.0);
        let yoy_growth = pick(&self.aliases.growth).and_then(parse_number);
        let transaction_count = pick(&self.aliases.transaction_count)
            .and_then(parse_number)
            .map(|n| n.max(0.0).trunc() as u64)
            .unwrap_or(0);

        let id = pick(&self.aliases.id)
            .and_then(RowId::from_value)
            .unwrap_or(RowId::Number(index as i64 + 1));
        let text = |aliases: &Vec<String>| pick(aliases).map(plain_text).unwrap_or_default();

        let top_products = match pick(&self.aliases.top_products) {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|item| !is_missing(*item))
                .map(plain_text)
                .collect(),
            Some(other) => plain_text(other)
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => Vec::new(),
        };

        Some(TradeRow {
            id,
            name: text(&self.aliases.name),
            country: text(&self.aliases.country),
            volume,
            avg_price,
            total_value,
            yoy_growth,
            transaction_count,
            segment: text(&self.aliases.segment),
            top_products,
            first_trade: pick(&self.aliases.first_trade)
                .and_then(parse_datetime)
                .map(|dt| dt.date()),
        })
    }
}

fn pick_alias<'a>(map: &'a Map<String, Value>, aliases: &[String]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| map.get(alias))
        .find(|value| !is_missing(*value))
}

/// Compute summary statistics over normalized rows.
pub fn summarize(rows: &[TradeRow]) -> SummaryStats {
    let row_count = rows.len();
    let total_volume: f64 = rows.iter().map(|r| r.volume).sum();
    let total_value: f64 = rows.iter().map(|r| r.total_value).sum();
    let total_transactions: u64 = rows.iter().map(|r| r.transaction_count).sum();

    let avg_price = (row_count > 0).then(|| {
        rows.iter().map(|r| r.avg_price.unwrap_or(0.0)).sum::<f64>() / row_count as f64
    });

    let (weighted_sum, priced_volume) = rows
        .iter()
        .filter_map(|r| r.avg_price.map(|p| (p * r.volume, r.volume)))
        .fold((0.0, 0.0), |(s, v), (ps, pv)| (s + ps, v + pv));
    let volume_weighted_price = (priced_volume > 0.0).then(|| weighted_sum / priced_volume);

    let growth: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.yoy_growth)
        .filter(|g| g.is_finite())
        .collect();
    let avg_growth = (!growth.is_empty()).then(|| growth.iter().sum::<f64>() / growth.len() as f64);

    SummaryStats {
        row_count,
        skipped_rows: 0,
        total_volume,
        total_value,
        total_transactions,
        avg_price,
        volume_weighted_price,
        avg_growth,
        growth_sample_size: growth.len(),
    }
}
