//! Result Assembler
//!
//! Turns whichever source succeeded into the single output document
//! shape. Summary fields are always recomputed from the records.

use chrono::{DateTime, Local, NaiveDate};
use serde_json::Value;

use crate::domain::{
    billing_period, round1, ConsumptionRecord, CustomerInfo, DataSource, PipelineError, Region,
    ResultDocument, RunStatus, Summary, PORTAL_DATE_FORMAT,
};

const LIST_FIELDS: &[&str] = &["data", "daily_data", "items", "result"];
const DATE_FIELDS: &[&str] = &["ngay", "date", "ngay_doc"];
const KWH_FIELDS: &[&str] = &["san_luong", "consumption_kwh", "sanLuong"];
const AMOUNT_FIELDS: &[&str] = &["tien_uoc_tinh", "amount_vnd", "tienUocTinh"];

/// Which path produced a document, and for whom
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub status: RunStatus,
    pub source: DataSource,
    pub region: Region,
    pub customer_id: String,
    pub endpoint: Option<String>,
    pub note: Option<String>,
}

impl Provenance {
    pub fn live(region: Region, customer_id: &str, endpoint: String) -> Self {
        Self {
            status: RunStatus::Success,
            source: DataSource::Live,
            region,
            customer_id: customer_id.to_string(),
            endpoint: Some(endpoint),
            note: None,
        }
    }

    /// Synthetic data after every live path failed
    pub fn fallback(region: Region, customer_id: &str) -> Self {
        Self {
            status: RunStatus::Mock,
            source: DataSource::Synthetic,
            region,
            customer_id: customer_id.to_string(),
            endpoint: None,
            note: Some("Generated data: the EVN portal could not be reached".to_string()),
        }
    }

    /// Demo data; `pinned` marks a reproducible mock series
    pub fn demo(region: Region, customer_id: &str, pinned: bool) -> Self {
        Self {
            status: RunStatus::Demo,
            source: if pinned {
                DataSource::Mock
            } else {
                DataSource::Synthetic
            },
            region,
            customer_id: customer_id.to_string(),
            endpoint: None,
            note: Some("Generated data based on a typical household pattern".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(
        &self,
        provenance: Provenance,
        info: CustomerInfo,
        records: Vec<ConsumptionRecord>,
    ) -> Result<ResultDocument, PipelineError> {
        self.assemble_at(provenance, info, records, Local::now())
    }

    pub fn assemble_at(
        &self,
        provenance: Provenance,
        info: CustomerInfo,
        records: Vec<ConsumptionRecord>,
        timestamp: DateTime<Local>,
    ) -> Result<ResultDocument, PipelineError> {
        validate(&records)?;
        let summary = summarize(&records);

        Ok(ResultDocument {
            status: provenance.status,
            source: provenance.source,
            region: provenance.region,
            customer_id: provenance.customer_id,
            customer_info: info,
            daily_data: records,
            summary,
            timestamp,
            endpoint: provenance.endpoint,
            note: provenance.note,
        })
    }
}

/// Deterministic aggregates of a record sequence
pub fn summarize(records: &[ConsumptionRecord]) -> Summary {
    let total_kwh: f64 = records.iter().map(|r| r.consumption_kwh).sum();
    let total_amount: u64 = records.iter().map(|r| r.amount_vnd).sum();
    let count = records.len();

    Summary {
        total_consumption_kwh: round1(total_kwh),
        total_amount_vnd: total_amount,
        average_daily_kwh: if count == 0 {
            0.0
        } else {
            round1(total_kwh / count as f64)
        },
        days_count: count,
        billing_period: billing_period(records),
    }
}

fn validate(records: &[ConsumptionRecord]) -> Result<(), PipelineError> {
    if let Some(bad) = records
        .iter()
        .find(|r| !r.consumption_kwh.is_finite() || r.consumption_kwh < 0.0)
    {
        return Err(PipelineError::InvalidRecords(format!(
            "consumption on {} is {}",
            bad.date.format(PORTAL_DATE_FORMAT),
            bad.consumption_kwh
        )));
    }

    if let Some(pair) = records.windows(2).find(|w| w[0].date <= w[1].date) {
        return Err(PipelineError::InvalidRecords(format!(
            "records out of order or duplicated at {}",
            pair[1].date.format(PORTAL_DATE_FORMAT)
        )));
    }

    Ok(())
}

/// Normalize a raw live consumption payload into ordered records.
///
/// Any summary the portal included is ignored; the assembler recomputes it.
pub fn records_from_raw(
    raw: &Value,
    unit_price: f64,
    endpoint: &str,
) -> Result<Vec<ConsumptionRecord>, PipelineError> {
    parse_records(raw, unit_price).map_err(|reason| PipelineError::malformed(endpoint, reason))
}

fn parse_records(raw: &Value, unit_price: f64) -> Result<Vec<ConsumptionRecord>, String> {
    let items = if let Some(list) = raw.as_array() {
        list
    } else {
        LIST_FIELDS
            .iter()
            .find_map(|field| raw.get(*field).and_then(|v| v.as_array()))
            .ok_or_else(|| "no record list in consumption payload".to_string())?
    };

    let mut records = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            record_from_item(item, unit_price).map_err(|e| format!("item {}: {}", index, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    records.sort_by(|a, b| b.date.cmp(&a.date));

    if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(format!(
            "duplicate day {}",
            pair[0].date.format(PORTAL_DATE_FORMAT)
        ));
    }

    Ok(records)
}

fn record_from_item(item: &Value, unit_price: f64) -> Result<ConsumptionRecord, String> {
    let date_raw = pick(item, DATE_FIELDS)
        .and_then(|v| v.as_str())
        .ok_or("missing date")?;
    let date = parse_date(date_raw).ok_or_else(|| format!("unparsable date '{}'", date_raw))?;

    let kwh = pick(item, KWH_FIELDS)
        .and_then(as_number)
        .ok_or("missing consumption")?;
    if !kwh.is_finite() || kwh < 0.0 {
        return Err(format!("invalid consumption {}", kwh));
    }

    let amount = match pick(item, AMOUNT_FIELDS).and_then(as_number) {
        Some(amount) if amount >= 0.0 => amount.floor() as u64,
        Some(amount) => return Err(format!("invalid amount {}", amount)),
        None => (kwh * unit_price).floor() as u64,
    };

    Ok(ConsumptionRecord::new(date, kwh, amount).with_weekday_label())
}

fn pick<'a>(item: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields.iter().find_map(|field| item.get(*field))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, PORTAL_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            raw.get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const USAGE: &str = "/api/usage";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn provenance() -> Provenance {
        Provenance::fallback(Region::EvnHcmc, "PE0400065097")
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 7, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_is_recomputable_from_records() {
        let records = vec![
            ConsumptionRecord::new(day(7), 18.2, 50050),
            ConsumptionRecord::new(day(6), 25.0, 68750),
            ConsumptionRecord::new(day(5), 26.9, 73975),
        ];
        let document = ResultAssembler::new()
            .assemble_at(provenance(), CustomerInfo::new("PE0400065097"), records, at())
            .unwrap();

        assert_eq!(summarize(&document.daily_data), document.summary);
        assert_eq!(document.summary.total_consumption_kwh, 70.1);
        assert_eq!(document.summary.total_amount_vnd, 192775);
        assert_eq!(document.summary.average_daily_kwh, 23.4);
        assert_eq!(document.summary.days_count, 3);
        assert_eq!(
            document.summary.billing_period.as_deref(),
            Some("05/07/2025 - 07/07/2025")
        );
        assert_eq!(document.status, RunStatus::Mock);
        assert_eq!(document.source, DataSource::Synthetic);
    }

    #[test]
    fn test_empty_records_give_zero_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.days_count, 0);
        assert_eq!(summary.average_daily_kwh, 0.0);
        assert!(summary.billing_period.is_none());
    }

    #[test]
    fn test_out_of_order_records_are_rejected() {
        let records = vec![
            ConsumptionRecord::new(day(5), 1.0, 1),
            ConsumptionRecord::new(day(6), 1.0, 1),
        ];
        let result = ResultAssembler::new().assemble(provenance(), CustomerInfo::default(), records);
        assert!(matches!(result, Err(PipelineError::InvalidRecords(_))));
    }

    #[test]
    fn test_negative_consumption_is_rejected() {
        let records = vec![ConsumptionRecord::new(day(5), -1.0, 0)];
        let result = ResultAssembler::new().assemble(provenance(), CustomerInfo::default(), records);
        assert!(matches!(result, Err(PipelineError::InvalidRecords(_))));
    }

    #[test]
    fn test_records_from_raw_normalizes_and_ignores_portal_summary() {
        let raw = json!({
            "data": [
                {"ngay": "05/07/2025", "san_luong": 12.5, "tien_uoc_tinh": 31250},
                {"ngay": "07/07/2025", "san_luong": "13.5"},
                {"ngay": "06/07/2025", "san_luong": 11.8, "tien_uoc_tinh": "29500"}
            ],
            "tong_san_luong_thang": 999.0
        });

        let records = records_from_raw(&raw, 2500.0, USAGE).unwrap();
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(7), day(6), day(5)]);
        assert_eq!(records[0].amount_vnd, 33750);
        assert_eq!(records[1].amount_vnd, 29500);
        assert_eq!(records[0].day_of_week.as_deref(), Some("Monday"));
        assert_eq!(summarize(&records).total_consumption_kwh, 37.8);
    }

    #[test]
    fn test_records_from_raw_accepts_iso_dates_and_bare_arrays() {
        let raw = json!([
            {"date": "2025-07-07T00:00:00", "consumption_kwh": 10.0, "amount_vnd": 27500}
        ]);
        let records = records_from_raw(&raw, 2750.0, USAGE).unwrap();
        assert_eq!(records[0].date, day(7));
    }

    fn malformed_reason(raw: Value) -> String {
        match records_from_raw(&raw, 2750.0, USAGE) {
            Err(PipelineError::MalformedResponse { endpoint, reason }) => {
                assert_eq!(endpoint, USAGE);
                reason
            }
            other => panic!("expected a malformed response, got {:?}", other),
        }
    }

    #[test]
    fn test_records_from_raw_reports_missing_fields() {
        let reason = malformed_reason(json!({"data": [{"ngay": "07/07/2025"}]}));
        assert!(reason.contains("missing consumption"));

        let reason = malformed_reason(json!({"message": "ok"}));
        assert!(reason.contains("no record list"));

        let reason = malformed_reason(json!([
            {"ngay": "07/07/2025", "san_luong": 1.0},
            {"ngay": "07/07/2025", "san_luong": 2.0}
        ]));
        assert!(reason.contains("duplicate"));
    }

    #[test]
    fn test_fallback_is_synthetic_and_pinned_demo_is_mock() {
        let fallback = Provenance::fallback(Region::EvnHcmc, "PE0400065097");
        assert_eq!(fallback.status, RunStatus::Mock);
        assert_eq!(fallback.source, DataSource::Synthetic);

        let demo = Provenance::demo(Region::EvnHcmc, "PE0400065097", false);
        assert_eq!(demo.source, DataSource::Synthetic);
        let pinned = Provenance::demo(Region::EvnHcmc, "PE0400065097", true);
        assert_eq!(pinned.status, RunStatus::Demo);
        assert_eq!(pinned.source, DataSource::Mock);
    }
}
