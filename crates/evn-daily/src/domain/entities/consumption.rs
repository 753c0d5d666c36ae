//! ConsumptionRecord - one calendar day of metered usage

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used by the portals and in the output document
pub const PORTAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Daily consumption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    #[serde(with = "portal_date")]
    pub date: NaiveDate,
    pub consumption_kwh: f64,
    pub amount_vnd: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
}

impl ConsumptionRecord {
    pub fn new(date: NaiveDate, consumption_kwh: f64, amount_vnd: u64) -> Self {
        Self {
            date,
            consumption_kwh,
            amount_vnd,
            day_of_week: None,
        }
    }

    /// Attach the English weekday name (e.g. "Saturday")
    pub fn with_weekday_label(mut self) -> Self {
        self.day_of_week = Some(self.date.format("%A").to_string());
        self
    }
}

/// Round to one decimal place, the precision used for every kWh figure.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

mod portal_date {
    use super::PORTAL_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(PORTAL_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, PORTAL_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_serializes_in_portal_format() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 5).unwrap();
        let record = ConsumptionRecord::new(date, 26.9, 73975).with_weekday_label();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "05/07/2025");
        assert_eq!(json["day_of_week"], "Saturday");

        let back: ConsumptionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(18.24), 18.2);
        assert_eq!(round1(18.26), 18.3);
        assert_eq!(round1(0.0), 0.0);
    }
}
