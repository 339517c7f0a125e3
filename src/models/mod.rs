//! Data models for the route console
//!
//! Read-only copies of backend entities organized by concern:
//! - Location: named points of departure and arrival
//! - Transportation: directed legs and their operating weekdays
//! - Route: direct routes, itineraries and search queries

pub mod location;
pub mod route;
pub mod transportation;

pub use location::{Location, LocationDraft};
pub use route::{Itinerary, Route, RouteSearchRequest, RouteSearchResult};
pub use transportation::{
    OperatingDays, TransportationDraft, TransportationSegment, TransportationType,
};
