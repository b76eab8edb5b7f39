use anyhow::{Context, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::DateTime;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::library::config::Credentials;

pub const CREATE_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

#[derive(Debug, Deserialize)]
pub struct VolumeList {
    pub num_records: u64,
    #[serde(default)]
    pub records: Vec<VolumeRecord>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRecord {
    pub uuid: String,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotList {
    #[serde(default)]
    pub records: Vec<SnapshotRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotRecord {
    pub uuid: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(storage: &str, credentials: &Credentials) -> anyhow::Result<Self> {
        let mut authorization = HeaderValue::from_str(&basic_auth(credentials))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        // Storage appliances usually serve self-signed certificates.
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .default_headers(headers)
            .build()?;

        Ok(ApiClient {
            http,
            base_url: format!("https://{}", storage),
        })
    }

    /// Look up the UUID of a volume by SVM and volume name.
    ///
    /// Returns `None` when the storage system knows no such volume.
    pub async fn resolve_volume_uuid(
        &self,
        svm: &str,
        volume: &str,
    ) -> anyhow::Result<Option<String>> {
        let url = format!("{}/api/storage/volumes", self.base_url);

        let volumes: VolumeList = self.get_json(url, &[("svm.name", svm), ("name", volume)]).await?;

        if volumes.num_records == 0 {
            return Ok(None);
        }

        Ok(volumes.records.into_iter().next().map(|record| record.uuid))
    }

    /// List the UUIDs of all snapshots of a volume. First page only.
    pub async fn list_snapshot_uuids(
        &self,
        volume_uuid: &str,
        svm: &str,
    ) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/api/storage/volumes/{}/snapshots", self.base_url, volume_uuid);

        let snapshots: SnapshotList = self.get_json(url, &[("svm.name", svm)]).await?;

        Ok(snapshots
            .records
            .into_iter()
            .map(|record| record.uuid)
            .collect())
    }

    /// Fetch full detail and reclaimable space for one snapshot and merge
    /// both responses into a single record.
    pub async fn fetch_snapshot(
        &self,
        volume_uuid: &str,
        snapshot_uuid: &str,
    ) -> anyhow::Result<Map<String, Value>> {
        let url = format!(
            "{}/api/storage/volumes/{}/snapshots/{}",
            self.base_url, volume_uuid, snapshot_uuid
        );

        let detail: Value = self.get_json(url.clone(), &[]).await?;
        let space: Value = self.get_json(url, &[("fields", "reclaimable_space")]).await?;

        let mut merged = merge_snapshot_detail(detail, space)?;

        let formatted = match merged.get("create_time") {
            Some(Value::String(created)) => Some(format_create_time(created).with_context(
                || format!("Snapshot {} has an unreadable create_time", snapshot_uuid),
            )?),
            _ => None,
        };

        if let Some(formatted) = formatted {
            merged.insert("create_time".to_string(), Value::String(formatted));
        }

        Ok(merged)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Request to {} failed", url))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Request to {} returned an unexpected body", url))
    }
}

/// Merge a snapshot's base detail with its reclaimable-space detail.
///
/// Entries of the reclaimable-space object override same-named base entries.
pub fn merge_snapshot_detail(detail: Value, space: Value) -> anyhow::Result<Map<String, Value>> {
    let Value::Object(mut merged) = detail else {
        return Err(anyhow!("Snapshot detail is not a JSON object"));
    };

    let Value::Object(space) = space else {
        return Err(anyhow!("Reclaimable space detail is not a JSON object"));
    };

    merged.extend(space);

    Ok(merged)
}

/// Rewrite an ISO 8601 creation time into the fixed display format.
///
/// The wall time is formatted as-is, without timezone conversion.
pub fn format_create_time(time: &str) -> anyhow::Result<String> {
    let parsed = DateTime::parse_from_rfc3339(time)?;

    Ok(parsed.format(CREATE_TIME_FORMAT).to_string())
}

fn basic_auth(credentials: &Credentials) -> String {
    let userpass = format!("{}:{}", credentials.username, credentials.password);

    format!("Basic {}", STANDARD.encode(userpass))
}
