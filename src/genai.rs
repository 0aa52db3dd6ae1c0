// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Serialize};

use crate::retry::CallError;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const TTS_VOICE: &str = "Kore";

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system_instruction: String,
    pub contents: String,
    pub temperature: f32,
    pub top_p: Option<f32>,
}

/// One-shot text generation. Implemented by the Gemini client and by test doubles.
pub trait TextModel {
    fn generate(&self, prompt: &Prompt) -> Result<String, CallError>;
}

/// Text to speech. Returns base64 16-bit mono PCM at 24 kHz.
pub trait SpeechModel {
    fn synthesize(&self, text: &str) -> Result<String, CallError>;
}

pub fn speech_prompt(text: &str) -> String {
    format!("Say with extreme motivation and professional clarity: {text}")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    response_modalities: [&'a str; 1],
    speech_config: VoiceSelection<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoice<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoice<'a> {
    voice_name: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
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
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    text: Option<String>,
    inline_data: Option<InlineBlob>,
}

#[derive(Deserialize)]
struct InlineBlob {
    data: String,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::blocking::Client, api_key: &str, model: &str) -> Self {
        Self::with_endpoint(http, api_key, model, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(
        http: reqwest::blocking::Client,
        api_key: &str,
        model: &str,
        endpoint: &str,
    ) -> Self {
        GeminiClient {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn post<B: Serialize>(&self, body: &B) -> Result<GenerateResponse, CallError> {
        if self.api_key.trim().is_empty() {
            return Err(CallError::MissingKey);
        }
        tracing::debug!(model = %self.model, "generateContent");
        let resp = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|e| format!("{} {}", e.error.status, e.error.message).trim().to_string())
                .unwrap_or(text);
            return Err(CallError::Status {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_str(&text).map_err(|e| CallError::Other(e.to_string()))
    }
}

fn first_parts(resp: GenerateResponse) -> Vec<CandidatePart> {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default()
}

impl TextModel for GeminiClient {
    fn generate(&self, prompt: &Prompt) -> Result<String, CallError> {
        let body = GenerateBody {
            system_instruction: Content {
                role: None,
                parts: vec![TextPart {
                    text: &prompt.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart {
                    text: &prompt.contents,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: prompt.temperature,
                top_p: prompt.top_p,
            },
        };
        let joined: String = first_parts(self.post(&body)?)
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            Err(CallError::Empty)
        } else {
            Ok(trimmed.to_string())
        }
    }
}

impl SpeechModel for GeminiClient {
    fn synthesize(&self, text: &str) -> Result<String, CallError> {
        let prompt = speech_prompt(text);
        let body = SpeechBody {
            contents: vec![Content {
                role: None,
                parts: vec![TextPart { text: &prompt }],
            }],
            generation_config: SpeechConfig {
                response_modalities: ["AUDIO"],
                speech_config: VoiceSelection {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoice {
                            voice_name: TTS_VOICE,
                        },
                    },
                },
            },
        };
        first_parts(self.post(&body)?)
            .into_iter()
            .next()
            .and_then(|p| p.inline_data)
            .map(|b| b.data)
            .filter(|d| !d.is_empty())
            .ok_or(CallError::Empty)
    }
}
