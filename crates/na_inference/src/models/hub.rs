use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use na_core::{
    ClassificationModel, Error, LabelScore, RawEntity, Result, SummarizationModel, SummaryBounds,
    TokenClassificationModel,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::InferenceConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Value,
}

/// Text classification answers with one list per input, or a flat list
/// when a single string was sent, depending on the server version.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// One model hosted behind an inference endpoint.
pub struct HubModel {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    model_id: String,
}

impl fmt::Debug for HubModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubModel")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_deref().map(|_| "<redacted>"))
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl HubModel {
    pub fn new(config: &InferenceConfig, model_id: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config.model_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            model_id: model_id.to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model_id)
    }

    async fn call<T: DeserializeOwned>(&self, inputs: &str, parameters: Value) -> Result<T> {
        let request = InferenceRequest { inputs, parameters };
        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        debug!("Calling {} ({} chars)", self.model_id, inputs.chars().count());
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Inference(format!(
                "{} returned {}: {}",
                self.model_id, status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::Inference(format!("unexpected response from {}: {}", self.model_id, e))
        })
    }
}

#[async_trait]
impl ClassificationModel for HubModel {
    fn name(&self) -> &str {
        &self.model_id
    }

    async fn classify(&self, text: &str, max_tokens: usize) -> Result<Vec<LabelScore>> {
        let parameters = json!({
            "function_to_apply": "none",
            "top_k": null,
            "truncation": true,
            "max_length": max_tokens,
        });
        let response: ClassificationResponse = self.call(text, parameters).await?;
        match response {
            ClassificationResponse::Nested(mut batches) if !batches.is_empty() => {
                Ok(batches.swap_remove(0))
            }
            ClassificationResponse::Nested(_) => Err(Error::Inference(format!(
                "{} returned no classification",
                self.model_id
            ))),
            ClassificationResponse::Flat(scores) => Ok(scores),
        }
    }
}

#[async_trait]
impl SummarizationModel for HubModel {
    fn name(&self) -> &str {
        &self.model_id
    }

    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        let parameters = json!({
            "min_length": bounds.min_length,
            "max_length": bounds.max_length,
            "do_sample": false,
            "truncation": true,
        });
        let outputs: Vec<SummaryOutput> = self.call(text, parameters).await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or_else(|| Error::Inference(format!("{} returned no summary", self.model_id)))
    }
}

#[async_trait]
impl TokenClassificationModel for HubModel {
    fn name(&self) -> &str {
        &self.model_id
    }

    async fn extract(&self, text: &str) -> Result<Vec<RawEntity>> {
        let parameters = json!({ "aggregation_strategy": "simple" });
        self.call(text, parameters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::Path;
    use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    /// What the stub endpoint saw: model path, bearer header and JSON body.
    type Seen = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

    /// Serves `reply` with `status` for every model on an ephemeral port.
    async fn spawn_endpoint(status: StatusCode, reply: Value) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/models/*model",
            post(
                move |Path(model): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                    let auth = headers
                        .get(AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    recorder.lock().unwrap().push((model, auth, body));
                    let reply = reply.clone();
                    async move { (status, Json(reply)) }
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn only_request(seen: &Seen) -> (String, Option<String>, Value) {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        seen[0].clone()
    }

    fn model(url: &str) -> HubModel {
        let config = InferenceConfig {
            model_url: url.to_string(),
            api_token: Some("hf_token".to_string()),
            ..InferenceConfig::default()
        };
        HubModel::new(&config, "org/news-classifier").unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_and_model() {
        let hub = model("https://models.example.com/");
        assert_eq!(hub.endpoint(), "https://models.example.com/models/org/news-classifier");
    }

    #[test]
    fn test_debug_hides_token() {
        let hub = model("https://models.example.com");
        let debug = format!("{:?}", hub);
        assert!(!debug.contains("hf_token"));
    }

    #[test]
    fn test_classification_response_shapes() {
        let nested: ClassificationResponse =
            serde_json::from_str(r#"[[{"label":"LABEL_0","score":1.5},{"label":"LABEL_1","score":-0.2}]]"#)
                .unwrap();
        assert!(matches!(nested, ClassificationResponse::Nested(ref b) if b[0].len() == 2));

        let flat: ClassificationResponse =
            serde_json::from_str(r#"[{"label":"LABEL_3","score":2.0}]"#).unwrap();
        assert!(matches!(flat, ClassificationResponse::Flat(ref s) if s[0].label == "LABEL_3"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let hub = model("http://127.0.0.1:9");
        let result = ClassificationModel::classify(&hub, "some text", 512).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_classify_sends_raw_score_parameters() {
        let reply = json!([[{"label": "LABEL_0", "score": 1.5}, {"label": "LABEL_2", "score": -0.3}]]);
        let (url, seen) = spawn_endpoint(StatusCode::OK, reply).await;
        let hub = model(&url);

        let scores = ClassificationModel::classify(&hub, "Stocks fell", 256).await.unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[1].label, "LABEL_2");

        let (path, auth, body) = only_request(&seen);
        assert_eq!(path, "org/news-classifier");
        assert_eq!(auth.as_deref(), Some("Bearer hf_token"));
        assert_eq!(body["inputs"], "Stocks fell");
        assert_eq!(body["parameters"]["function_to_apply"], "none");
        assert_eq!(body["parameters"]["max_length"], 256);
        assert_eq!(body["parameters"]["truncation"], true);
    }

    #[tokio::test]
    async fn test_summarize_decodes_summary_text() {
        let reply = json!([{"summary_text": "Markets rallied after the rate cut."}]);
        let (url, seen) = spawn_endpoint(StatusCode::OK, reply).await;
        let hub = model(&url);

        let bounds = SummaryBounds {
            min_length: 12,
            max_length: 48,
        };
        let summary = hub.summarize("A long article body", bounds).await.unwrap();
        assert_eq!(summary, "Markets rallied after the rate cut.");

        let (_, _, body) = only_request(&seen);
        assert_eq!(body["inputs"], "A long article body");
        assert_eq!(body["parameters"]["min_length"], 12);
        assert_eq!(body["parameters"]["max_length"], 48);
        assert_eq!(body["parameters"]["do_sample"], false);
    }

    #[tokio::test]
    async fn test_summarize_empty_reply_is_an_error() {
        let (url, _) = spawn_endpoint(StatusCode::OK, json!([])).await;
        let hub = model(&url);

        let error = hub
            .summarize("A long article body", SummaryBounds::default())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Inference(ref m) if m == "org/news-classifier returned no summary"));
    }

    #[tokio::test]
    async fn test_extract_decodes_grouped_entities() {
        let reply = json!([
            {"entity_group": "ORG", "word": "ISRO", "score": 0.99, "start": 0, "end": 4},
            {"entity_group": "LOC", "word": "India", "score": 0.97, "start": 20, "end": 25}
        ]);
        let (url, seen) = spawn_endpoint(StatusCode::OK, reply).await;
        let hub = model(&url);

        let entities = hub.extract("ISRO will launch in India").await.unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_group.as_deref(), Some("ORG"));
        assert_eq!(entities[0].word.as_deref(), Some("ISRO"));
        assert_eq!(entities[1].end, Some(25));
        assert!(entities[1].entity.is_none());

        let (_, _, body) = only_request(&seen);
        assert_eq!(body["parameters"], json!({"aggregation_strategy": "simple"}));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let (url, _) = spawn_endpoint(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "loading"})).await;
        let hub = model(&url);

        let error = hub.extract("text").await.unwrap_err();
        let Error::Inference(message) = error else {
            panic!("expected an inference error");
        };
        assert!(message.starts_with("org/news-classifier returned 503"));
        assert!(message.contains("loading"));
    }
}
