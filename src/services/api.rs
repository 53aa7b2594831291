//! REST client for the scraping backend
//!
//! | Operation          | Request                          | Invalidates            |
//! |--------------------|----------------------------------|------------------------|
//! | `start_scraping`   | `POST scrape` (form)             | database statistics    |
//! | `job_status`       | `GET job/{id}`                   | -                      |
//! | `database_stats`   | `GET database-stats`             | -                      |
//! | `control_job`      | `POST api/{pause,resume,cancel}-job/{id}` | selected job status |
//! | `request_info`     | `POST request-info` (form)       | -                      |
//! | `download_results` | `GET download/{id}`              | -                      |

use super::error::ClientError;
use crate::model::response::{
    ControlResponse, DatabaseStatsResponse, InfoRequest, InfoRequestResponse, JobStatusResponse,
    ScrapeRequest, ScrapeResponse,
};
use crate::model::JobControl;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiClient {
    endpoint: String,
    http_client: Client,
}

impl ApiClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Locator of the full CSV for a completed job
    pub fn download_url(&self, job_id: &str) -> String {
        format!("{}/download/{}", self.endpoint, job_id)
    }

    /// Start a job; returns the new job id
    pub async fn start_scraping(&self, req: &ScrapeRequest) -> Result<String, ClientError> {
        let url = format!("{}/scrape", self.endpoint);
        tracing::debug!(url = %url, state = %req.state, "starting scraping job");

        let resp = self.http_client.post(&url).form(req).send().await?;
        let body: ScrapeResponse = parse_json(resp).await?;

        match body.job_id {
            Some(job_id) if body.status == "started" => Ok(job_id),
            _ => Err(ClientError::Rejected(body.message.unwrap_or_else(|| {
                format!("unexpected status '{}'", body.status)
            }))),
        }
    }

    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ClientError> {
        let url = format!("{}/job/{}", self.endpoint, job_id);
        let resp = self.http_client.get(&url).send().await?;
        parse_json(resp).await
    }

    /// Statistics snapshot; an `error` field in the body is returned as-is
    pub async fn database_stats(&self) -> Result<DatabaseStatsResponse, ClientError> {
        let url = format!("{}/database-stats", self.endpoint);
        let resp = self.http_client.get(&url).send().await?;
        parse_json(resp).await
    }

    pub async fn control_job(
        &self,
        job_id: &str,
        control: JobControl,
    ) -> Result<ControlResponse, ClientError> {
        let url = format!("{}/api/{}-job/{}", self.endpoint, control.verb(), job_id);
        tracing::debug!(url = %url, "sending job control");
        let resp = self.http_client.post(&url).send().await?;
        parse_json(resp).await
    }

    pub async fn request_info(
        &self,
        req: &InfoRequest,
    ) -> Result<InfoRequestResponse, ClientError> {
        let url = format!("{}/request-info", self.endpoint);
        let resp = self.http_client.post(&url).form(req).send().await?;
        parse_json(resp).await
    }

    /// Raw CSV bytes of a completed job
    pub async fn download_results(&self, job_id: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.download_url(job_id);
        let resp = check_status(self.http_client.get(&url).send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Turn a non-2xx response into `ClientError::Api`
async fn check_status(resp: Response) -> Result<Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status,
        message: error_message(&body),
    })
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let resp = check_status(resp).await?;
    resp.json()
        .await
        .map_err(|e| ClientError::Deserialize(e.to_string()))
}

/// Prefer the JSON `message` (or `error`) field over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobStatus;
    use serde_json::json;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5))
    }

    #[test]
    fn test_endpoint_trailing_slash_removed() {
        let client = ApiClient::new("http://localhost:5001/", Duration::from_secs(1));
        assert_eq!(client.endpoint(), "http://localhost:5001");
        assert_eq!(
            client.download_url("job-1"),
            "http://localhost:5001/download/job-1"
        );
    }

    #[test]
    fn test_error_message_prefers_json_field() {
        assert_eq!(error_message(r#"{"message": "Job not found"}"#), "Job not found");
        assert_eq!(error_message(r#"{"error": "boom"}"#), "boom");
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_start_scraping_sends_state_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scrape"))
            .and(body_string("state=California"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "started", "job_id": "job-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let req = ScrapeRequest::new("California", Some(""));
        let job_id = client(&server).start_scraping(&req).await.unwrap();
        assert_eq!(job_id, "job-1");
    }

    #[tokio::test]
    async fn test_start_scraping_with_city() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scrape"))
            .and(body_string("state=New+York&city=Buffalo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "started", "job_id": "job-2"})),
            )
            .mount(&server)
            .await;

        let req = ScrapeRequest::new("New York", Some("Buffalo"));
        assert_eq!(client(&server).start_scraping(&req).await.unwrap(), "job-2");
    }

    #[tokio::test]
    async fn test_start_scraping_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scrape"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": "State is required"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .start_scraping(&ScrapeRequest::new("", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected(ref m) if m == "State is required"));
    }

    #[tokio::test]
    async fn test_job_status_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"status": "error", "message": "Job not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).job_status("missing").await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Job not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_job_status_completed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "completed",
                "results_count": 1247,
                "db_entries": 1200,
                "preview": [{"Post-Code": "90001", "City/Town": "Los Angeles"}],
                "message": "",
                "db_stats": {
                    "total_postcodes": 5000,
                    "recent_entries": [
                        {"Post-Code": "95814", "City/Town": "Sacramento"},
                        {"Post-Code": "93701", "City/Town": "Fresno"}
                    ],
                    "region_counts": {"California": 5000}
                }
            })))
            .mount(&server)
            .await;

        let resp = client(&server).job_status("job-1").await.unwrap();
        assert_eq!(resp.status, JobStatus::Completed);
        assert_eq!(resp.results_count, Some(1247));
        assert_eq!(resp.preview.unwrap()[0].code, "90001");
        let stats = resp.db_stats.unwrap();
        assert_eq!(stats.total_postcodes, 5000);
        assert_eq!(stats.recent_entries[1].place_name, "Fresno");
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialize_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/database-stats"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).database_stats().await.unwrap_err();
        assert!(matches!(err, ClientError::Deserialize(_)));
    }

    #[tokio::test]
    async fn test_control_job_paths() {
        let server = MockServer::start().await;
        for verb in ["pause", "resume", "cancel"] {
            Mock::given(method("POST"))
                .and(path(format!("/api/{}-job/job-1", verb)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
                .expect(1)
                .mount(&server)
                .await;
        }

        let api = client(&server);
        for control in [JobControl::Pause, JobControl::Resume, JobControl::Cancel] {
            assert!(api.control_job("job-1", control).await.unwrap().success);
        }
    }

    #[tokio::test]
    async fn test_request_info_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/request-info"))
            .and(body_string("name=Ada&email=ada%40example.com&message=Hi"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "message": "Thanks"})),
            )
            .mount(&server)
            .await;

        let req = InfoRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hi".to_string(),
        };
        let resp = client(&server).request_info(&req).await.unwrap();
        assert_eq!(resp.status, "success");
    }

    #[tokio::test]
    async fn test_download_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/job-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Post-Code,City/Town\n90001,Los Angeles\n"),
            )
            .mount(&server)
            .await;

        let bytes = client(&server).download_results("job-1").await.unwrap();
        assert!(bytes.starts_with(b"Post-Code"));
    }
}
