use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::error::{GatewayResult, json_or_upstream};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Blob store for lesson videos. Binaries never pass through this service.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    async fn upload_url(&self, path: &str) -> GatewayResult<SignedUrl>;
    async fn stream_url(&self, path: &str) -> GatewayResult<SignedUrl>;
}

/// Object key for a lesson video. Keeps `[A-Za-z0-9._-]` of the file name.
pub fn video_path(course_id: Uuid, lesson_id: Uuid, filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.is_empty() { "video" } else { cleaned };

    format!("courses/{course_id}/lessons/{lesson_id}/{cleaned}")
}

#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
    upload_ttl: u64,
    stream_ttl: u64,
}

#[derive(Deserialize)]
struct UploadSignResponse {
    url: String,
}

#[derive(Deserialize)]
struct StreamSignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl HttpObjectStore {
    pub fn from_config(config: &crate::config::Storage) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            service_key: config.service_key().to_string(),
            bucket: config.bucket().to_string(),
            upload_ttl: config.upload_ttl_secs(),
            stream_ttl: config.stream_ttl_secs(),
        }
    }

    fn absolute(&self, returned: &str) -> String {
        if returned.starts_with("http://") || returned.starts_with("https://") {
            returned.to_string()
        } else {
            format!("{}/{}", self.base_url, returned.trim_start_matches('/'))
        }
    }

    fn expiry(ttl: u64) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(ttl as i64)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    #[tracing::instrument(skip(self))]
    async fn upload_url(&self, path: &str) -> GatewayResult<SignedUrl> {
        let endpoint = format!("{}/object/upload/sign/{}/{}", self.base_url, self.bucket, path);
        let resp = self
            .client
            .post(endpoint)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .send()
            .await?;
        let body: UploadSignResponse = json_or_upstream(resp).await?;

        Ok(SignedUrl {
            url: self.absolute(&body.url),
            expires_at: Self::expiry(self.upload_ttl),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn stream_url(&self, path: &str) -> GatewayResult<SignedUrl> {
        let endpoint = format!("{}/object/sign/{}/{}", self.base_url, self.bucket, path);
        let resp = self
            .client
            .post(endpoint)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "expiresIn": self.stream_ttl }))
            .send()
            .await?;
        let body: StreamSignResponse = json_or_upstream(resp).await?;

        Ok(SignedUrl {
            url: self.absolute(&body.signed_url),
            expires_at: Self::expiry(self.stream_ttl),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn video_path_test() {
        let course = Uuid::nil();
        let lesson = Uuid::max();

        assert_eq!(
            video_path(course, lesson, "intro.mp4"),
            format!("courses/{course}/lessons/{lesson}/intro.mp4")
        );
        assert_eq!(
            video_path(course, lesson, "../../etc/passwd"),
            format!("courses/{course}/lessons/{lesson}/_.._etc_passwd")
        );
        assert_eq!(
            video_path(course, lesson, "my lesson (1).mov"),
            format!("courses/{course}/lessons/{lesson}/my_lesson__1_.mov")
        );
        assert_eq!(
            video_path(course, lesson, ""),
            format!("courses/{course}/lessons/{lesson}/video")
        );
    }
}
