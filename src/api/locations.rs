use tracing::instrument;

use super::path_segment;
use crate::Result;
use crate::client::{ApiClient, Transport};
use crate::models::{Location, LocationDraft};
use crate::normalize::Arity;

const LOCATIONS: &str = "/api/locations";

impl<T: Transport> ApiClient<T> {
    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        self.get(LOCATIONS, &[], Arity::List).await?.into_items()
    }

    #[instrument(skip(self))]
    pub async fn get_location(&self, id: i64) -> Result<Location> {
        self.get(&format!("{LOCATIONS}/{id}"), &[], Arity::Scalar)
            .await?
            .into_single()
    }

    #[instrument(skip(self))]
    pub async fn get_location_by_code(&self, code: &str) -> Result<Location> {
        self.get(
            &format!("{LOCATIONS}/code/{}", path_segment(code)),
            &[],
            Arity::Scalar,
        )
        .await?
        .into_single()
    }

    /// `None` when the backend answers without echoing the entity (HTTP 204)
    #[instrument(skip(self))]
    pub async fn create_location(&self, location: &LocationDraft) -> Result<Option<Location>> {
        self.post(LOCATIONS, location, Arity::Scalar)
            .await?
            .into_optional()
    }

    #[instrument(skip(self))]
    pub async fn update_location(
        &self,
        id: i64,
        location: &LocationDraft,
    ) -> Result<Option<Location>> {
        self.put(&format!("{LOCATIONS}/{id}"), location, Arity::Scalar)
            .await?
            .into_optional()
    }

    #[instrument(skip(self))]
    pub async fn delete_location(&self, id: i64) -> Result<()> {
        self.delete(&format!("{LOCATIONS}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use crate::ConsoleError;
    use crate::client::ApiClient;
    use crate::client::testing::{FakeTransport, signed_in};
    use crate::models::LocationDraft;
    use reqwest::Method;
    use serde_json::json;

    const NYC: &str =
        r#"{"id":1,"name":"John F. Kennedy","country":"USA","city":"New York","locationCode":"NYC"}"#;

    #[tokio::test]
    async fn test_list_locations_from_bare_array() {
        let body = format!(r#"[{NYC},{{"id":2,"name":"LAX","country":"USA","city":"Los Angeles","locationCode":"LAX"}}]"#);
        let client = ApiClient::new(FakeTransport::new().reply(200, &body), signed_in("agency", "t"));

        let locations = client.list_locations().await.unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].location_code, "NYC");
        assert_eq!(locations[1].location_code, "LAX");
    }

    #[tokio::test]
    async fn test_get_location_by_code_encodes_segment() {
        let client = ApiClient::new(FakeTransport::new().reply(200, NYC), signed_in("agency", "t"));

        let location = client.get_location_by_code("NY C").await.unwrap();
        assert_eq!(location.id, 1);
        assert_eq!(
            client.transport().requests()[0].path,
            "/api/locations/code/NY%20C"
        );
    }

    #[tokio::test]
    async fn test_get_location_wrapped_in_data() {
        let body = format!(r#"{{"data":{NYC}}}"#);
        let client = ApiClient::new(FakeTransport::new().reply(200, &body), signed_in("admin", "t"));
        assert_eq!(client.get_location(1).await.unwrap().name, "John F. Kennedy");
    }

    #[tokio::test]
    async fn test_create_location_posts_draft() {
        let client = ApiClient::new(FakeTransport::new().reply(200, NYC), signed_in("admin", "t"));
        let draft = LocationDraft {
            name: "John F. Kennedy".to_string(),
            country: "USA".to_string(),
            city: "New York".to_string(),
            location_code: "NYC".to_string(),
        };

        let created = client.create_location(&draft).await.unwrap().unwrap();
        assert_eq!(created.id, 1);

        let request = &client.transport().requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.body,
            Some(json!({"name": "John F. Kennedy", "country": "USA", "city": "New York", "locationCode": "NYC"}))
        );
    }

    #[tokio::test]
    async fn test_mutations_without_body_succeed() {
        let transport = FakeTransport::new().reply(204, "").reply(204, "");
        let client = ApiClient::new(transport, signed_in("admin", "t"));
        let draft = LocationDraft {
            name: "Istanbul Airport".to_string(),
            country: "Turkey".to_string(),
            city: "Istanbul".to_string(),
            location_code: "IST".to_string(),
        };

        assert_eq!(client.create_location(&draft).await.unwrap(), None);
        assert_eq!(client.update_location(3, &draft).await.unwrap(), None);

        let requests = client.transport().requests();
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].path, "/api/locations/3");
    }

    #[tokio::test]
    async fn test_agency_delete_rejected_by_backend() {
        let client = ApiClient::new(FakeTransport::new().reply(403, ""), signed_in("agency", "t"));
        let err = client.delete_location(1).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Forbidden { .. }));
    }
}
