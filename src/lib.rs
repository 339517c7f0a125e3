//! `RouteConsole` - administrative client for a travel-routing backend
//!
//! This library provides the session lifecycle, the client-side access gate,
//! response normalization and typed operations over the backend's locations,
//! transportations and route search endpoints.

pub mod access;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod profile_store;
pub mod search;
pub mod session;
pub mod telemetry;

// Re-export core types for public API
pub use access::{Access, AccessGate, DenyReason, Role};
pub use api::{LegacyRouteQuery, LoginResponse};
pub use client::{ApiClient, HttpTransport, Transport};
pub use config::ConsoleConfig;
pub use error::{ConsoleError, ErrorCode};
pub use models::{
    Itinerary, Location, Route, RouteSearchRequest, RouteSearchResult, TransportationSegment,
    TransportationType,
};
pub use normalize::{Arity, Normalized, ResponseNormalizer};
pub use profile_store::ProfileStore;
pub use search::{RouteSearcher, SearchMethod, SearchOutcome};
pub use session::{Session, SessionState, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ConsoleError>;
