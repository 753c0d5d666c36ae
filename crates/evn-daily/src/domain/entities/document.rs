//! ResultDocument - the single output produced per run

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{ConsumptionRecord, CustomerInfo, PORTAL_DATE_FORMAT};
use crate::domain::value_objects::{DataSource, Region, RunStatus};

/// Aggregates derived from the record sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_consumption_kwh: f64,
    pub total_amount_vnd: u64,
    pub average_daily_kwh: f64,
    pub days_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,
}

/// Output document written to disk after each run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub status: RunStatus,
    pub source: DataSource,
    pub region: Region,
    pub customer_id: String,
    pub customer_info: CustomerInfo,
    pub daily_data: Vec<ConsumptionRecord>,
    pub summary: Summary,
    pub timestamp: DateTime<Local>,
    /// Endpoint pair that produced live data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ResultDocument {
    /// Most recent day in the series
    pub fn latest(&self) -> Option<&ConsumptionRecord> {
        self.daily_data.first()
    }

    pub fn customer_name(&self) -> &str {
        self.customer_info.name.as_deref().unwrap_or("unknown")
    }

    /// One-line description used in run logs
    pub fn headline(&self) -> String {
        format!("{} | {} | {}", self.status, self.region, self.customer_name())
    }
}

/// Billing period label `oldest - newest` for a most-recent-first series
pub fn billing_period(records: &[ConsumptionRecord]) -> Option<String> {
    let newest = records.first()?;
    let oldest = records.last()?;
    Some(format!(
        "{} - {}",
        oldest.date.format(PORTAL_DATE_FORMAT),
        newest.date.format(PORTAL_DATE_FORMAT)
    ))
}
