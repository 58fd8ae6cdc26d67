//! Model-backed extraction: sends one statement document per request and
//! decodes the JSON transaction list from the reply.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tally_batch::Extractor;
use tally_ingest::{parse_extraction_response, Document, ExtractedRecord, MediaType, EXTRACTION_PROMPT};

use crate::config::LlmSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl Provider {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            other => bail!("unknown llm provider '{other}' (expected gemini or anthropic)"),
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub key_env: String,
}

impl LlmConfig {
    pub fn from_section(section: &LlmSection) -> Result<Self> {
        let provider = Provider::parse(&section.provider)?;
        let base_url = section
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| provider.default_base_url().to_string());
        Ok(Self {
            provider,
            model: section.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens: section.max_tokens,
            timeout: Duration::from_secs(section.timeout_secs),
            key_env: section
                .api_key_env
                .clone()
                .unwrap_or_else(|| provider.default_key_env().to_string()),
        })
    }
}

pub struct LlmExtractor {
    config: LlmConfig,
    api_key: String,
    client: reqwest::Client,
}

impl LlmExtractor {
    /// Build an extractor, reading the API key from the configured environment variable.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("missing API key; set {} in the environment", config.key_env))?;
        Self::new(config, api_key)
    }

    pub fn new(config: LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    async fn gemini_complete(&self, doc: &Document) -> Result<String> {
        #[derive(Serialize)]
        struct Req {
            contents: Vec<Content>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize)]
        struct Content {
            role: &'static str,
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        #[serde(untagged)]
        enum Part {
            Inline { inline_data: InlineData },
            Text { text: String },
        }

        #[derive(Serialize)]
        struct InlineData {
            mime_type: &'static str,
            data: String,
        }

        #[derive(Serialize)]
        struct GenerationConfig {
            #[serde(rename = "responseMimeType")]
            response_mime_type: &'static str,
            #[serde(rename = "maxOutputTokens")]
            max_output_tokens: u32,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<CandidateContent>,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<PartOut>,
        }

        #[derive(Deserialize)]
        struct PartOut {
            text: Option<String>,
        }

        let body = Req {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: doc.media_type.mime(),
                            data: doc.to_base64(),
                        },
                    },
                    Part::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                max_output_tokens: self.config.max_tokens,
                temperature: 0.0,
            },
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        debug!("gemini request: model={} doc={} bytes={}", self.config.model, doc.name, doc.bytes.len());

        let resp = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("gemini error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse gemini response")?;
        let text: String = out
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text)
    }

    async fn anthropic_complete(&self, doc: &Document) -> Result<String> {
        #[derive(Serialize)]
        struct Req {
            model: String,
            max_tokens: u32,
            messages: Vec<Msg>,
        }

        #[derive(Serialize)]
        struct Msg {
            role: &'static str,
            content: Vec<Block>,
        }

        #[derive(Serialize)]
        #[serde(tag = "type", rename_all = "lowercase")]
        enum Block {
            Document { source: Source },
            Image { source: Source },
            Text { text: String },
        }

        #[derive(Serialize)]
        struct Source {
            #[serde(rename = "type")]
            t: &'static str,
            media_type: &'static str,
            data: String,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let source = Source {
            t: "base64",
            media_type: doc.media_type.mime(),
            data: doc.to_base64(),
        };
        let attachment = match doc.media_type {
            MediaType::Pdf => Block::Document { source },
            MediaType::Heic => bail!("{}: HEIC images are not accepted by the anthropic provider", doc.name),
            _ => Block::Image { source },
        };

        let body = Req {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![Msg {
                role: "user",
                content: vec![
                    attachment,
                    Block::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                ],
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!("anthropic request: model={} doc={} bytes={}", self.config.model, doc.name, doc.bytes.len());

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s)
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, doc: &Document) -> Result<Vec<ExtractedRecord>> {
        let text = match self.config.provider {
            Provider::Gemini => self.gemini_complete(doc).await?,
            Provider::Anthropic => self.anthropic_complete(doc).await?,
        };
        let records = parse_extraction_response(&text).with_context(|| format!("reading model output for {}", doc.name))?;
        Ok(records)
    }
}
