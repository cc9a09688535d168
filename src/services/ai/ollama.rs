use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{with_system_prompt, LlmProvider, Message};

pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            url,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.url.trim_end_matches('/'))
    }

    fn request_body(&self, system_prompt: &str, messages: &[Message]) -> Value {
        json!({
            "model": self.model,
            "messages": with_system_prompt(system_prompt, messages),
            "stream": false,
            "options": { "temperature": 0 },
        })
    }
}

fn reply_content(data: &Value) -> anyhow::Result<String> {
    data["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing content in Ollama response: {data}"))
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(system_prompt, messages))
            .send()
            .await
            .context("failed to call Ollama API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse Ollama response")?;

        if !status.is_success() {
            anyhow::bail!("Ollama API error ({}): {}", status, data);
        }

        reply_content(&data)
    }
}
