use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::client::{ApiClient, Transport};
use crate::models::{Itinerary, Route, RouteSearchRequest, RouteSearchResult, TransportationSegment};
use crate::normalize::{Arity, Normalized};

const ROUTES: &str = "/api/routes";
const ROUTE_SEARCH: &str = "/api/routes/search";

/// Filters for the legacy `GET /api/routes` listing; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyRouteQuery {
    pub origin_id: Option<i64>,
    pub destination_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl LegacyRouteQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.origin_id {
            params.push(("originId", id.to_string()));
        }
        if let Some(id) = self.destination_id {
            params.push(("destinationId", id.to_string()));
        }
        if let Some(date) = self.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

fn decode_or_warn<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(item) => Some(item),
        Err(e) => {
            warn!("Dropping {} that failed to decode: {}", what, e);
            None
        }
    }
}

impl From<Normalized> for RouteSearchResult {
    fn from(normalized: Normalized) -> Self {
        match normalized {
            Normalized::List(items) => RouteSearchResult::Direct(
                items
                    .into_iter()
                    .filter_map(|item| decode_or_warn::<Route>(item, "route"))
                    .collect(),
            ),
            Normalized::Scalar(item) => match serde_json::from_value::<Route>(item.clone()) {
                Ok(route) => RouteSearchResult::Direct(vec![route]),
                Err(_) => RouteSearchResult::Unrecognized(item),
            },
            Normalized::Itineraries(itineraries) => RouteSearchResult::Itineraries(
                itineraries
                    .into_iter()
                    .map(|legs| {
                        legs.into_iter()
                            .filter_map(|leg| {
                                decode_or_warn::<TransportationSegment>(leg, "itinerary leg")
                            })
                            .collect::<Vec<_>>()
                    })
                    .filter(|legs| !legs.is_empty())
                    .map(Itinerary::new)
                    .collect(),
            ),
            Normalized::NotFound => RouteSearchResult::Direct(Vec::new()),
            Normalized::Unrecognized(raw) => RouteSearchResult::Unrecognized(raw),
        }
    }
}

impl<T: Transport> ApiClient<T> {
    /// `GET /api/routes/search?originCode&destinationCode&travelDate`
    #[instrument(skip(self), fields(origin = %request.origin_location_code, destination = %request.destination_location_code))]
    pub async fn search_routes(&self, request: &RouteSearchRequest) -> Result<RouteSearchResult> {
        let params = [
            ("originCode", request.origin_location_code.clone()),
            ("destinationCode", request.destination_location_code.clone()),
            ("travelDate", request.travel_date_param()),
        ];
        let normalized = self.get(ROUTE_SEARCH, &params, Arity::List).await?;
        let result = RouteSearchResult::from(normalized);
        debug!("Route search returned {} results", result.len());
        Ok(result)
    }

    /// `POST /api/routes/search` with the request as JSON body
    #[instrument(skip(self), fields(origin = %request.origin_location_code, destination = %request.destination_location_code))]
    pub async fn search_routes_post(&self, request: &RouteSearchRequest) -> Result<RouteSearchResult> {
        let normalized = self.post(ROUTE_SEARCH, request, Arity::List).await?;
        Ok(RouteSearchResult::from(normalized))
    }

    #[instrument(skip(self))]
    pub async fn get_route(&self, id: i64) -> Result<Route> {
        self.get(&format!("{ROUTES}/{id}"), &[], Arity::Scalar)
            .await?
            .into_single()
    }

    #[instrument(skip(self))]
    pub async fn list_routes_legacy(&self, query: &LegacyRouteQuery) -> Result<Vec<Route>> {
        self.get(ROUTES, &query.params(), Arity::List)
            .await?
            .into_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{FakeTransport, signed_in};
    use reqwest::Method;
    use serde_json::json;

    fn route_json(id: i64) -> Value {
        json!({
            "id": id,
            "origin": {"id": 1, "name": "JFK", "country": "USA", "city": "New York", "locationCode": "NYC"},
            "destination": {"id": 2, "name": "LAX", "country": "USA", "city": "Los Angeles", "locationCode": "LAX"},
            "transportation": {
                "id": 7,
                "originLocationCode": "NYC",
                "destinationLocationCode": "LAX",
                "transportationType": "FLIGHT",
                "operatingDays": [7]
            },
            "departureTime": "2024-02-25T08:00:00",
            "arrivalTime": "2024-02-25T11:30:00",
            "price": 199.0
        })
    }

    fn leg(id: i64, from: &str, to: &str) -> Value {
        json!({
            "id": id,
            "originLocationCode": from,
            "destinationLocationCode": to,
            "transportationType": "BUS",
            "operatingDays": [1, 2, 3, 4, 5, 6, 7]
        })
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 25).unwrap()
    }

    #[tokio::test]
    async fn test_search_routes_direct() {
        let body = json!([route_json(1)]).to_string();
        let client = ApiClient::new(FakeTransport::new().reply(200, &body), signed_in("agency", "t"));

        let result = client
            .search_routes(&RouteSearchRequest::new("NYC", "LAX", sunday()))
            .await
            .unwrap();

        let RouteSearchResult::Direct(routes) = result else {
            panic!("expected direct routes");
        };
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].transportation.transportation_type.to_string(), "FLIGHT");

        let request = &client.transport().requests()[0];
        assert_eq!(request.path, "/api/routes/search");
        assert_eq!(
            request.query,
            vec![
                ("originCode".to_string(), "NYC".to_string()),
                ("destinationCode".to_string(), "LAX".to_string()),
                ("travelDate".to_string(), "2024-02-25".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_search_routes_post_itineraries() {
        let body = json!([
            [leg(1, "NYC", "IST"), leg(2, "IST", "LAX")],
            [leg(3, "NYC", "LAX")]
        ])
        .to_string();
        let client = ApiClient::new(FakeTransport::new().reply(200, &body), signed_in("agency", "t"));

        let result = client
            .search_routes_post(&RouteSearchRequest::new("NYC", "LAX", sunday()))
            .await
            .unwrap();

        let RouteSearchResult::Itineraries(itineraries) = result else {
            panic!("expected itineraries");
        };
        assert_eq!(itineraries.len(), 2);
        assert_eq!(itineraries[0].stops(), "NYC → IST → LAX");
        assert!(itineraries[0].is_connected());

        let request = &client.transport().requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.body,
            Some(json!({"originLocationCode": "NYC", "destinationLocationCode": "LAX", "travelDate": "2024-02-25"}))
        );
    }

    #[test]
    fn test_itineraries_with_no_decodable_legs_are_dropped() {
        let normalized = Normalized::Itineraries(vec![
            vec![json!({"id": 9, "name": "not a segment"})],
            vec![leg(1, "NYC", "LAX")],
        ]);
        let RouteSearchResult::Itineraries(itineraries) = RouteSearchResult::from(normalized) else {
            panic!("expected itineraries");
        };
        assert_eq!(itineraries.len(), 1);
    }

    #[test]
    fn test_unrecognized_passes_through() {
        let raw = json!({"message": "maintenance"});
        assert_eq!(
            RouteSearchResult::from(Normalized::Unrecognized(raw.clone())),
            RouteSearchResult::Unrecognized(raw)
        );
        assert_eq!(
            RouteSearchResult::from(Normalized::NotFound),
            RouteSearchResult::Direct(vec![])
        );
    }

    #[tokio::test]
    async fn test_legacy_listing_sends_only_set_filters() {
        let body = json!({"results": [route_json(4)]}).to_string();
        let client = ApiClient::new(FakeTransport::new().reply(200, &body), signed_in("admin", "t"));

        let query = LegacyRouteQuery {
            origin_id: Some(1),
            date: Some(sunday()),
            ..Default::default()
        };
        let routes = client.list_routes_legacy(&query).await.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].id, 4);

        let request = &client.transport().requests()[0];
        assert_eq!(request.path, "/api/routes");
        assert_eq!(
            request.query,
            vec![
                ("originId".to_string(), "1".to_string()),
                ("date".to_string(), "2024-02-25".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_get_route_empty_body_is_not_found() {
        let client = ApiClient::new(FakeTransport::new().reply(200, ""), signed_in("agency", "t"));
        let err = client.get_route(12).await.unwrap_err();
        assert!(matches!(err, crate::ConsoleError::NotFound { .. }));
    }
}
