use serde::{Deserialize, Serialize};

pub const LOCATION_CODE_LEN: usize = 5;

/// True for a UN/LOCODE: exactly five ASCII uppercase letters.
pub fn is_location_code(text: &str) -> bool {
    text.len() == LOCATION_CODE_LEN && text.bytes().all(|b| b.is_ascii_uppercase())
}

/// True for a carrier SCAC: two to four ASCII uppercase letters.
pub fn is_carrier_scac(text: &str) -> bool {
    (2..=4).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_uppercase())
}

/// One type-ahead candidate. Only `code` and `label` matter to the
/// controller; `detail` is auxiliary display text (country, SCAC, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Suggestion {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_code_shape_is_strict() {
        assert!(is_location_code("EGALY"));
        assert!(!is_location_code("egaly"));
        assert!(!is_location_code("EGAL"));
        assert!(!is_location_code("EGALY1"));
        assert!(!is_location_code("EG4LY"));
    }

    #[test]
    fn scac_accepts_two_to_four_letters() {
        assert!(is_carrier_scac("MSCU"));
        assert!(is_carrier_scac("CMA"));
        assert!(!is_carrier_scac("M"));
        assert!(!is_carrier_scac("MAEUX"));
    }

    #[test]
    fn suggestion_detail_round_trips_through_json() {
        let item = Suggestion::new("EGALY", "Alexandria").with_detail("Egypt");
        let json = serde_json::to_string(&item).expect("json");
        assert_eq!(serde_json::from_str::<Suggestion>(&json).expect("back"), item);

        let bare: Suggestion =
            serde_json::from_str(r#"{"code":"MSCU","label":"MSC"}"#).expect("bare");
        assert_eq!(bare.detail, None);
    }
}
