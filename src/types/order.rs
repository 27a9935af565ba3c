//! Commerce order types and sales KPI results

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Result, StorePulseError};

/// Order lifecycle status as reported by the commerce source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Completed,
    Processing,
    OnHold,
    Pending,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Completed,
        OrderStatus::Processing,
        OrderStatus::OnHold,
        OrderStatus::Pending,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }

    /// Statuses that count toward revenue when no specific status is selected
    pub fn is_revenue_status(&self) -> bool {
        matches!(self, Self::Completed | Self::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StorePulseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StorePulseError::Parse(format!("unknown order status '{}'", s)))
    }
}

/// Status filter applied to order fetches and revenue classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every status ("all" / "any")
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Whether an order with `status` counts toward revenue and ticket KPIs.
    ///
    /// With `All`, only completed and processing orders are revenue-valid.
    /// With a specific status the batch is already homogeneous and every
    /// order counts, cancelled included: the caller asked for that status.
    pub fn is_revenue_valid(&self, status: OrderStatus) -> bool {
        match self {
            Self::All => status.is_revenue_status(),
            Self::Only(_) => true,
        }
    }

    /// Whether an order with `status` passes the fetch filter
    pub fn admits(&self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => f.write_str(status.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = StorePulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" | "any" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: u64,
    pub name: String,
    pub quantity: u32,
    /// Decimal amount as sent by the source (e.g. "49.90")
    pub total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub customer_name: String,
    pub status: OrderStatus,
    /// Decimal amount as sent by the source (e.g. "149.70")
    pub total: String,
    #[serde(deserialize_with = "deserialize_instant")]
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Calendar date of creation (UTC date component)
    pub fn created_date(&self) -> NaiveDate {
        self.date_created.date_naive()
    }
}

/// Accept RFC 3339 instants and offset-less timestamps (read as UTC)
fn deserialize_instant<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| StorePulseError::Parse(format!("invalid timestamp '{}': {}", raw, e)))
}

/// One page of an order listing
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total_count: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub revenue_order_count: u64,
    pub average_ticket: f64,
    pub total_items: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: u64,
    pub name: String,
    pub revenue: f64,
    pub units: u64,
}

/// Catalog entry ranked by popularity over the store's whole history
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: u64,
    pub name: String,
    /// Units sold in paid orders
    pub total_sales: u64,
    /// Unit price from the most recent sale
    pub price: f64,
    /// `price * total_sales`
    pub revenue: f64,
}

/// Sales view: KPIs, per-day series and top products
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub stats: SalesStats,
    pub chart_data: Vec<DailySales>,
    pub top_products: Vec<ProductSales>,
}
