use chrono::NaiveDate;
use tracing::instrument;

use crate::Result;
use crate::client::{ApiClient, Transport};
use crate::models::{TransportationDraft, TransportationSegment};
use crate::normalize::Arity;

const TRANSPORTATIONS: &str = "/api/transportations";

impl<T: Transport> ApiClient<T> {
    #[instrument(skip(self))]
    pub async fn list_transportations(&self) -> Result<Vec<TransportationSegment>> {
        self.get(TRANSPORTATIONS, &[], Arity::List)
            .await?
            .into_items()
    }

    #[instrument(skip(self))]
    pub async fn get_transportation(&self, id: i64) -> Result<TransportationSegment> {
        self.get(&format!("{TRANSPORTATIONS}/{id}"), &[], Arity::Scalar)
            .await?
            .into_single()
    }

    /// Segments running directly between two locations
    #[instrument(skip(self))]
    pub async fn search_transportations(
        &self,
        origin_code: &str,
        destination_code: &str,
    ) -> Result<Vec<TransportationSegment>> {
        let params = [
            ("originCode", origin_code.to_string()),
            ("destinationCode", destination_code.to_string()),
        ];
        self.get(&format!("{TRANSPORTATIONS}/search"), &params, Arity::List)
            .await?
            .into_items()
    }

    /// Segments leaving `origin_code` on the weekday of `date`
    #[instrument(skip(self))]
    pub async fn transportations_from_origin(
        &self,
        origin_code: &str,
        date: NaiveDate,
    ) -> Result<Vec<TransportationSegment>> {
        let params = [
            ("originCode", origin_code.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        self.get(&format!("{TRANSPORTATIONS}/origin"), &params, Arity::List)
            .await?
            .into_items()
    }

    /// `None` when the backend answers without echoing the segment (HTTP 204)
    #[instrument(skip(self))]
    pub async fn create_transportation(
        &self,
        transportation: &TransportationDraft,
    ) -> Result<Option<TransportationSegment>> {
        self.post(TRANSPORTATIONS, transportation, Arity::Scalar)
            .await?
            .into_optional()
    }

    #[instrument(skip(self))]
    pub async fn update_transportation(
        &self,
        id: i64,
        transportation: &TransportationDraft,
    ) -> Result<Option<TransportationSegment>> {
        self.put(&format!("{TRANSPORTATIONS}/{id}"), transportation, Arity::Scalar)
            .await?
            .into_optional()
    }

    #[instrument(skip(self))]
    pub async fn delete_transportation(&self, id: i64) -> Result<()> {
        self.delete(&format!("{TRANSPORTATIONS}/{id}")).await
    }
}
