//! Transportation segments: single directed legs between two locations

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Mode of a transportation segment
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportationType {
    Uber,
    Bus,
    Flight,
    Subway,
}

impl fmt::Display for TransportationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportationType::Uber => "UBER",
            TransportationType::Bus => "BUS",
            TransportationType::Flight => "FLIGHT",
            TransportationType::Subway => "SUBWAY",
        };
        f.write_str(name)
    }
}

impl FromStr for TransportationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UBER" => Ok(TransportationType::Uber),
            "BUS" => Ok(TransportationType::Bus),
            "FLIGHT" => Ok(TransportationType::Flight),
            "SUBWAY" => Ok(TransportationType::Subway),
            other => Err(format!(
                "unknown transportation type '{other}', expected UBER, BUS, FLIGHT or SUBWAY"
            )),
        }
    }
}

/// Weekdays a segment operates on, 1 = Monday .. 7 = Sunday
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct OperatingDays(BTreeSet<u8>);

impl OperatingDays {
    pub fn new(days: impl IntoIterator<Item = u8>) -> Result<Self, String> {
        let days: BTreeSet<u8> = days.into_iter().collect();
        if let Some(bad) = days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(format!("operating day {bad} is outside 1..=7"));
        }
        Ok(Self(days))
    }

    #[must_use]
    pub fn every_day() -> Self {
        Self((1..=7).collect())
    }

    #[must_use]
    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    #[must_use]
    pub fn operates_on(&self, date: NaiveDate) -> bool {
        // number_from_monday is 1..=7
        self.contains(date.weekday().number_from_monday() as u8)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<u8>> for OperatingDays {
    type Error = String;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<OperatingDays> for Vec<u8> {
    fn from(days: OperatingDays) -> Self {
        days.0.into_iter().collect()
    }
}

/// A single directed leg available on specific weekdays
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportationSegment {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_location_id: Option<i64>,
    pub origin_location_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_location_id: Option<i64>,
    pub destination_location_code: String,
    pub transportation_type: TransportationType,
    #[serde(default)]
    pub operating_days: OperatingDays,
}

/// Payload for creating or replacing a transportation segment
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_location_id: Option<i64>,
    pub origin_location_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_location_id: Option<i64>,
    pub destination_location_code: String,
    pub transportation_type: TransportationType,
    pub operating_days: OperatingDays,
}

impl TransportationSegment {
    #[must_use]
    pub fn operates_on(&self, date: NaiveDate) -> bool {
        self.operating_days.operates_on(date)
    }
}

impl fmt::Display for TransportationSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {} ({})",
            self.origin_location_code, self.destination_location_code, self.transportation_type
        )
    }
}
