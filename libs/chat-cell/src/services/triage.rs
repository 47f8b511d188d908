use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;

const SYSTEM_PROMPT: &str = "You are a medical assistant for an online clinic. Assess the patient's message, \
give a short helpful reply and decide whether they should see a doctor. \
Answer only with a JSON object with the keys: \
\"response\" (string, your reply to the patient), \
\"suggest_doctor\" (boolean, true when the symptoms need a specialist), \
\"specialization\" (string naming the specialist, or null), \
\"check_prescriptions\" (boolean, true when the patient asks about their prescriptions or medication reminders).";

/// Structured answer of the triage model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageReply {
    pub response: String,
    #[serde(default)]
    pub suggest_doctor: bool,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub check_prescriptions: bool,
}

impl TriageReply {
    pub fn plain(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }

    /// Reads the model's content, falling back to a plain reply when it is
    /// not the expected JSON object.
    pub fn from_content(content: &str) -> Self {
        match serde_json::from_str::<TriageReply>(content.trim()) {
            Ok(mut reply) => {
                let specialization = reply
                    .specialization
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                if reply.suggest_doctor && specialization.is_none() {
                    reply.suggest_doctor = false;
                }
                reply.specialization = specialization;
                reply
            }
            Err(e) => {
                warn!("Triage reply was not structured JSON ({}), using it verbatim", e);
                Self::plain(content.trim())
            }
        }
    }
}

#[async_trait]
pub trait Triage: Send + Sync {
    async fn triage(&self, message: &str) -> Result<TriageReply>;
}

/// OpenAI chat-completions client.
pub struct OpenAiTriage {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiTriage {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        }
    }
}

#[async_trait]
impl Triage for OpenAiTriage {
    async fn triage(&self, message: &str) -> Result<TriageReply> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": message }
            ],
            "temperature": 0.3,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let payload: Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid OpenAI response format"))?;
        debug!("Triage content: {}", content);

        Ok(TriageReply::from_content(content))
    }
}
