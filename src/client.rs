use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::auth::GaroonAuth;
use crate::error::GroupwareError;
use crate::models::common::format_value;
use crate::models::meeting::{
    AvailabilityQuery, AvailableSlot, AvailableTimesResponse, EventsResponse, Meeting, Room,
    RoomsResponse,
};

/// The groupware operations the rescheduler depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Groupware: Send + Sync {
    async fn find_event(&self, id: &str) -> Result<Meeting, GroupwareError>;

    /// Overwrites the stored event with `meeting`.
    async fn update_event(&self, meeting: &Meeting) -> Result<Meeting, GroupwareError>;

    async fn search_events(
        &self,
        keyword: &str,
        range_start: DateTime<FixedOffset>,
    ) -> Result<Vec<Meeting>, GroupwareError>;

    async fn search_available_times(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AvailableSlot>, GroupwareError>;

    async fn find_rooms_by_name(&self, name: &str) -> Result<Vec<Room>, GroupwareError>;

    async fn list_rooms_in_group(&self, group_id: &str) -> Result<Vec<Room>, GroupwareError>;
}

/// Client for the Garoon REST API
#[derive(Debug, Clone)]
pub struct GaroonClient {
    client: Client,
    endpoint: String,
    authorization: String,
}

impl GaroonClient {
    /// Client for `https://{subdomain}.cybozu.com`.
    pub fn new(subdomain: &str, user: &str, password: &str) -> Self {
        Self::with_endpoint(
            format!("https://{}.cybozu.com/g/api/v1", subdomain),
            user,
            password,
        )
    }

    pub fn with_endpoint(endpoint: impl Into<String>, user: &str, password: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            authorization: GaroonAuth::authorization_header(user, password),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(GaroonAuth::HEADER, &self.authorization)
            .header("Content-Type", "application/json")
    }

    async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, GroupwareError> {
        let status = res.status();
        debug!("Groupware responded with status: {}", status);

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GroupwareError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(res.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GroupwareError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!("GET {} {:?}", url, query);

        let res = self
            .authorized(self.client.get(&url))
            .query(query)
            .send()
            .await?;
        Self::read_json(res).await
    }
}

#[async_trait]
impl Groupware for GaroonClient {
    async fn find_event(&self, id: &str) -> Result<Meeting, GroupwareError> {
        info!("Fetching schedule event {}", id);
        self.get(&format!("/schedule/events/{}", id), &[]).await
    }

    async fn update_event(&self, meeting: &Meeting) -> Result<Meeting, GroupwareError> {
        let url = format!("{}/schedule/events/{}", self.endpoint, meeting.id);
        info!("Updating schedule event {}", meeting.id);

        let res = self
            .authorized(self.client.patch(&url))
            .json(meeting)
            .send()
            .await?;
        Self::read_json(res).await
    }

    async fn search_events(
        &self,
        keyword: &str,
        range_start: DateTime<FixedOffset>,
    ) -> Result<Vec<Meeting>, GroupwareError> {
        info!("Searching schedule events by keyword: {}", keyword);
        let query = [
            ("keyword", keyword.to_string()),
            ("excludeFromSearch", "company,notes,comments".to_string()),
            ("rangeStart", format_value(&range_start)),
            ("orderBy", "createdAt asc".to_string()),
        ];

        let response: EventsResponse = self.get("/schedule/events", &query).await?;
        if response.has_next {
            debug!("More events match `{}` than the first page returned", keyword);
        }
        Ok(response.events)
    }

    async fn search_available_times(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AvailableSlot>, GroupwareError> {
        let url = format!("{}/schedule/searchAvailableTimes", self.endpoint);
        debug!(
            "Searching available times in {} range(s) for {} minutes",
            query.time_ranges.len(),
            query.time_interval
        );

        let res = self
            .authorized(self.client.post(&url))
            .json(query)
            .send()
            .await?;
        let response: AvailableTimesResponse = Self::read_json(res).await?;
        Ok(response.available_times)
    }

    async fn find_rooms_by_name(&self, name: &str) -> Result<Vec<Room>, GroupwareError> {
        let response: RoomsResponse = self
            .get("/schedule/facilities", &[("name", name.to_string())])
            .await?;
        Ok(response.rooms)
    }

    async fn list_rooms_in_group(&self, group_id: &str) -> Result<Vec<Room>, GroupwareError> {
        let response: RoomsResponse = self
            .get(&format!("/schedule/facilityGroups/{}/facilities", group_id), &[])
            .await?;
        Ok(response.rooms)
    }
}
