use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use super::{EnrollmentDirectory, SlotChanges, SlotQuery, SlotStore, SlotUpsert};
use crate::{
    config::ApiConfig,
    error::{SchedError, SchedResult},
    model::{EnrollmentRecord, EnrollmentStatus, TimeSlot},
};

/// Client for the remote scheduling API.
#[derive(Debug, Clone)]
pub struct HttpSlotStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

/// Body of an update: the persisted id plus only the changed fields.
#[derive(Serialize)]
struct UpdateBody<'a> {
    id: &'a str,
    #[serde(flatten)]
    changes: &'a SlotChanges,
}

impl HttpSlotStore {
    pub fn new(config: &ApiConfig) -> SchedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send and reject any non-2xx response with the body as message.
    async fn send(&self, request: RequestBuilder) -> SchedResult<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::warn!("scheduling API returned {status}: {message}");
            return Err(SchedError::Api { status: status.as_u16(), message });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> SchedResult<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Query string pairs for a slot fetch, in wire naming.
pub(crate) fn query_params(query: &SlotQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(rep_id) = &query.rep_id {
        params.push(("agentId", rep_id.clone()));
    }
    if let Some(gig_id) = &query.gig_id {
        params.push(("gigId", gig_id.clone()));
    }
    if let Some(date) = query.date {
        params.push(("date", date.format("%Y-%m-%d").to_string()));
    }
    params
}

#[async_trait]
impl SlotStore for HttpSlotStore {
    async fn get_time_slots(&self, query: &SlotQuery) -> SchedResult<Vec<TimeSlot>> {
        let request = self.client.get(self.url("/time-slots")).query(&query_params(query));
        let slots: Vec<TimeSlot> = self.send_json(request).await?;
        log::debug!("fetched {} time slots ({query:?})", slots.len());
        Ok(slots)
    }

    async fn upsert_time_slot(&self, upsert: &SlotUpsert) -> SchedResult<TimeSlot> {
        let request = self.client.post(self.url("/time-slots"));
        let request = match upsert {
            SlotUpsert::Create(slot) => request.json(slot),
            SlotUpsert::Update { id, changes } => request.json(&UpdateBody { id, changes }),
        };
        self.send_json(request).await
    }

    async fn cancel_time_slot(&self, id: &str) -> SchedResult<TimeSlot> {
        let request = self.client.patch(self.url(&format!("/time-slots/{id}/cancel")));
        self.send_json(request).await
    }

    async fn delete_time_slot(&self, id: &str) -> SchedResult<()> {
        let request = self.client.delete(self.url(&format!("/time-slots/{id}")));
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl EnrollmentDirectory for HttpSlotStore {
    async fn agent_enrollments(&self, rep_id: &str) -> SchedResult<Vec<EnrollmentRecord>> {
        let request = self.client.get(self.url(&format!("/gig-agents/agent/{rep_id}")));
        self.send_json(request).await
    }

    async fn gig_roster(&self, gig_id: &str) -> SchedResult<Vec<EnrollmentRecord>> {
        let request = self.client.get(self.url("/gig-agents")).query(&[
            ("gigId", gig_id),
            ("status", EnrollmentStatus::Enrolled.as_str()),
        ]);
        self.send_json(request).await
    }
}
