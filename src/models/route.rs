//! Routes and multi-segment itineraries returned by route search

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Location, TransportationSegment};

/// A bookable direct itinerary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: i64,
    pub origin: Location,
    pub destination: Location,
    pub transportation: TransportationSegment,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub price: f64,
}

impl Route {
    #[must_use]
    pub fn departure(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.departure_time)
    }

    #[must_use]
    pub fn arrival(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.arrival_time)
    }
}

/// Accepts RFC 3339 as well as the zone-less `YYYY-MM-DDTHH:MM[:SS]` form
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// An ordered chain of segments through intermediate stops
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Itinerary {
    pub legs: Vec<TransportationSegment>,
}

impl Itinerary {
    #[must_use]
    pub fn new(legs: Vec<TransportationSegment>) -> Self {
        Self { legs }
    }

    #[must_use]
    pub fn origin_code(&self) -> Option<&str> {
        self.legs.first().map(|leg| leg.origin_location_code.as_str())
    }

    #[must_use]
    pub fn destination_code(&self) -> Option<&str> {
        self.legs
            .last()
            .map(|leg| leg.destination_location_code.as_str())
    }

    /// Whether each leg departs from where the previous one arrived.
    /// The backend does not enforce this.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.legs
            .windows(2)
            .all(|pair| pair[0].destination_location_code == pair[1].origin_location_code)
    }

    #[must_use]
    pub fn operates_on(&self, date: NaiveDate) -> bool {
        self.legs.iter().all(|leg| leg.operates_on(date))
    }

    /// `NYC → IST → LAX`
    #[must_use]
    pub fn stops(&self) -> String {
        let mut codes: Vec<&str> = self
            .legs
            .iter()
            .map(|leg| leg.origin_location_code.as_str())
            .collect();
        if let Some(last) = self.destination_code() {
            codes.push(last);
        }
        codes.join(" → ")
    }
}

/// Query for the route search endpoints
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSearchRequest {
    pub origin_location_code: String,
    pub destination_location_code: String,
    #[serde(with = "travel_date")]
    pub travel_date: NaiveDate,
}

impl RouteSearchRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            origin_location_code: origin.into(),
            destination_location_code: destination.into(),
            travel_date: date,
        }
    }

    #[must_use]
    pub fn travel_date_param(&self) -> String {
        self.travel_date.format(travel_date::FORMAT).to_string()
    }
}

mod travel_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Outcome of a route search, shaped by what the backend returned
#[derive(Debug, Clone, PartialEq)]
pub enum RouteSearchResult {
    /// Flat list of bookable direct routes
    Direct(Vec<Route>),
    /// Multi-segment journeys
    Itineraries(Vec<Itinerary>),
    /// Body did not match any known shape
    Unrecognized(serde_json::Value),
}

impl RouteSearchResult {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RouteSearchResult::Direct(routes) => routes.len(),
            RouteSearchResult::Itineraries(itineraries) => itineraries.len(),
            RouteSearchResult::Unrecognized(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
