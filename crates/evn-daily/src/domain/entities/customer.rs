//! CustomerInfo - the customer block of a result document

use serde::{Deserialize, Serialize};
use serde_json::Value;

const NAME_FIELDS: &[&str] = &["ten_khachhang", "tenKhachHang", "name", "customer_name"];
const ADDRESS_FIELDS: &[&str] = &["dia_chi", "diaChi", "address"];
const METER_FIELDS: &[&str] = &["ma_congto", "maCongTo", "meter_code"];
const PHONE_FIELDS: &[&str] = &["so_dien_thoai", "dien_thoai", "phone"];
const CODE_FIELDS: &[&str] = &["ma_khachhang", "maKhachHang", "customer_code"];

/// Customer details attached to a result document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerInfo {
    pub fn new(customer_code: impl Into<String>) -> Self {
        Self {
            customer_code: customer_code.into(),
            ..Default::default()
        }
    }

    /// Normalize a raw portal payload.
    ///
    /// Portals answer with either Vietnamese or English field names, and
    /// some wrap the object in `data`. Unknown shapes still yield a block
    /// keyed by the configured customer code.
    pub fn from_raw(raw: &Value, fallback_code: &str) -> Self {
        let object = raw.get("data").filter(|v| v.is_object()).unwrap_or(raw);

        Self {
            customer_code: pick_string(object, CODE_FIELDS)
                .unwrap_or_else(|| fallback_code.to_string()),
            name: pick_string(object, NAME_FIELDS),
            address: pick_string(object, ADDRESS_FIELDS),
            meter_code: pick_string(object, METER_FIELDS),
            phone: pick_string(object, PHONE_FIELDS),
        }
    }
}

fn pick_string(object: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| object.get(*field))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_reads_vietnamese_fields() {
        let raw = json!({
            "ten_khachhang": "Nguyen Van Minh",
            "dia_chi": "Quan 1, TP Ho Chi Minh",
            "ma_congto": "CT065097",
        });
        let info = CustomerInfo::from_raw(&raw, "PE0400065097");
        assert_eq!(info.customer_code, "PE0400065097");
        assert_eq!(info.name.as_deref(), Some("Nguyen Van Minh"));
        assert_eq!(info.meter_code.as_deref(), Some("CT065097"));
    }

    #[test]
    fn test_from_raw_unwraps_data_envelope() {
        let raw = json!({"data": {"name": "Minh", "customer_code": "PE0400065097"}});
        let info = CustomerInfo::from_raw(&raw, "fallback");
        assert_eq!(info.name.as_deref(), Some("Minh"));
        assert_eq!(info.customer_code, "PE0400065097");
    }

    #[test]
    fn test_from_raw_unknown_shape_keeps_code() {
        let info = CustomerInfo::from_raw(&json!([1, 2, 3]), "PE0400065097");
        assert_eq!(info, CustomerInfo::new("PE0400065097"));
    }
}
