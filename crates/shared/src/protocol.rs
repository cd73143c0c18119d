use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Suggestion;

pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Column order of both export formats; pagination never applies to exports.
pub const EXPORT_COLUMNS: [&str; 10] = [
    "originLocode",
    "destinationLocode",
    "etd",
    "eta",
    "vessel",
    "voyage",
    "carrier",
    "routingType",
    "transitDays",
    "service",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingType {
    Direct,
    Transshipment,
}

impl RoutingType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Transshipment => "Transshipment",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "transshipment" => Some(Self::Transshipment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Etd,
    Transit,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Etd => "etd",
            Self::Transit => "transit",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "etd" => Some(Self::Etd),
            "transit" => Some(Self::Transit),
            _ => None,
        }
    }
}

/// Filter set sent to the listing and export endpoints. Dates are
/// calendar days serialized in API format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_type: Option<RoutingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
}

impl ScheduleFilter {
    /// Query parameters with the names the backend expects. Absent
    /// filters are omitted rather than sent empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(origin) = &self.origin {
            pairs.push(("origin", origin.clone()));
        }
        if let Some(destination) = &self.destination {
            pairs.push(("destination", destination.clone()));
        }
        if let Some(from) = self.from {
            pairs.push(("from", from.format(API_DATE_FORMAT).to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.format(API_DATE_FORMAT).to_string()));
        }
        if let Some(equipment) = &self.equipment {
            pairs.push(("equipment", equipment.clone()));
        }
        if let Some(routing_type) = self.routing_type {
            pairs.push(("routingType", routing_type.as_str().to_string()));
        }
        if let Some(carrier) = &self.carrier {
            pairs.push(("carrier", carrier.clone()));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleLeg {
    pub leg_number: u32,
    pub from_locode: String,
    pub from_port: String,
    pub to_locode: String,
    pub to_port: String,
    pub etd: String,
    pub eta: String,
    pub vessel: String,
    pub voyage: String,
    pub transit_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub etd: String,
    pub eta: String,
    pub vessel: String,
    pub voyage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imo: Option<String>,
    pub routing_type: String,
    pub transit_days: i64,
    pub carrier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs: Option<Vec<ScheduleLeg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePage {
    pub items: Vec<Schedule>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Csv => "/api/schedules.csv",
            Self::Xlsx => "/api/schedules.xlsx",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "schedules.csv",
            Self::Xlsx => "schedules.xlsx",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    pub name: String,
    pub locode: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl From<PortRecord> for Suggestion {
    fn from(port: PortRecord) -> Self {
        let detail = port.country_name.unwrap_or(port.country);
        Suggestion::new(port.locode, port.name).with_detail(detail)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierRecord {
    pub name: String,
    pub scac: String,
}

impl From<CarrierRecord> for Suggestion {
    fn from(carrier: CarrierRecord) -> Self {
        Suggestion::new(carrier.scac, carrier.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_uses_backend_parameter_names() {
        let filter = ScheduleFilter {
            origin: Some("EGALY".into()),
            from: NaiveDate::from_ymd_opt(2025, 8, 16),
            to: NaiveDate::from_ymd_opt(2025, 8, 30),
            routing_type: Some(RoutingType::Direct),
            sort: SortKey::Transit,
            ..ScheduleFilter::default()
        };

        assert_eq!(
            filter.query_pairs(),
            vec![
                ("origin", "EGALY".to_string()),
                ("from", "2025-08-16".to_string()),
                ("to", "2025-08-30".to_string()),
                ("routingType", "Direct".to_string()),
                ("sort", "transit".to_string()),
            ]
        );
    }

    #[test]
    fn filter_serializes_dates_in_api_format() {
        let filter = ScheduleFilter {
            from: NaiveDate::from_ymd_opt(2025, 9, 1),
            ..ScheduleFilter::default()
        };
        let json = serde_json::to_value(&filter).expect("serialize");
        assert_eq!(json["from"], "2025-09-01");
        assert!(json.get("to").is_none());
    }

    #[test]
    fn schedule_page_decodes_backend_envelope() {
        let raw = r#"{
            "items": [{
                "id": "s-1", "origin": "Alexandria, EG", "destination": "Rotterdam, NL",
                "etd": "2025-08-20T10:00:00Z", "eta": "2025-09-02T08:00:00Z",
                "vessel": "MSC AURORA", "voyage": "123E", "routingType": "Direct",
                "transitDays": 13, "carrier": "MSC"
            }],
            "total": 1, "page": 1, "pageSize": 50
        }"#;
        let page: SchedulePage = serde_json::from_str(raw).expect("page");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].transit_days, 13);
        assert!(page.items[0].legs.is_none());
    }

    #[test]
    fn port_record_becomes_suggestion_with_country_detail() {
        let port = PortRecord {
            name: "Alexandria".into(),
            locode: "EGALY".into(),
            country: "EG".into(),
            country_name: Some("Egypt".into()),
            aliases: vec!["ALX".into()],
        };
        let suggestion = Suggestion::from(port);
        assert_eq!(suggestion.code, "EGALY");
        assert_eq!(suggestion.detail.as_deref(), Some("Egypt"));
    }
}
