//! Location model for points of departure and arrival

use serde::{Deserialize, Serialize};

/// A named point of departure/arrival owned by the backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    /// Human-facing unique code, e.g. `IST` or `CCIST`
    pub location_code: String,
}

/// Payload for creating or replacing a location; the backend assigns the id
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocationDraft {
    pub name: String,
    pub country: String,
    pub city: String,
    pub location_code: String,
}

impl Location {
    /// Short label used in listings, e.g. `Istanbul Airport (IST)`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.location_code)
    }
}

impl From<&Location> for LocationDraft {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            country: location.country.clone(),
            city: location.city.clone(),
            location_code: location.location_code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_deserializes_camel_case() {
        let location: Location = serde_json::from_value(json!({
            "id": 7,
            "name": "John F. Kennedy International",
            "country": "USA",
            "city": "New York",
            "locationCode": "NYC"
        }))
        .unwrap();

        assert_eq!(location.location_code, "NYC");
        assert_eq!(location.label(), "John F. Kennedy International (NYC)");
    }

    #[test]
    fn test_draft_omits_id() {
        let draft = LocationDraft {
            name: "Los Angeles International".to_string(),
            country: "USA".to_string(),
            city: "Los Angeles".to_string(),
            location_code: "LAX".to_string(),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["locationCode"], "LAX");
    }
}
