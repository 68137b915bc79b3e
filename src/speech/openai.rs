use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use crate::audio::AudioOutput;
use crate::media::pcm16_to_float;
use crate::sinks::SpeechSink;

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// OpenAI TTS returns raw PCM at 24kHz
pub const OPENAI_TTS_SAMPLE_RATE: u32 = 24000;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Speech sink that synthesizes text with the OpenAI speech endpoint
///
/// Each utterance is synthesized on a spawned task; the scheduler never
/// waits on the request. Audio is played on the shared output when it
/// arrives.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: String,
    model: String,
    voice: String,
    url: String,
    output: Arc<Mutex<Box<dyn AudioOutput>>>,
}

impl OpenAiSpeech {
    pub fn new(
        api_key: impl Into<String>,
        voice: impl Into<String>,
        output: Box<dyn AudioOutput>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            bail!("Valid OpenAI API key is required");
        }

        info!("OpenAI text-to-speech initialized");

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: "tts-1".to_string(),
            voice: voice.into(),
            url: SPEECH_URL.to_string(),
            output: Arc::new(Mutex::new(output)),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint (proxies, tests)
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Request speech for `text` and return the decoded samples
    pub async fn synthesize(&self, text: &str) -> Result<Vec<f32>> {
        synthesize(
            &self.client,
            &self.url,
            &self.api_key,
            &self.model,
            &self.voice,
            text,
        )
        .await
    }
}

async fn synthesize(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    model: &str,
    voice: &str,
    text: &str,
) -> Result<Vec<f32>> {
    let request = SpeechRequest {
        model,
        voice,
        input: text,
        response_format: "pcm",
    };

    debug!("Sending TTS request ({} chars)", text.len());

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .context("Failed to send TTS request")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("OpenAI API error: {} - {}", status, body);
    }

    let bytes = response
        .bytes()
        .await
        .context("Failed to read TTS audio")?;

    debug!("Received {} bytes of speech audio", bytes.len());

    Ok(pcm16_to_float(&bytes))
}

impl SpeechSink for OpenAiSpeech {
    fn speak(&mut self, text: &str) {
        if text.trim().is_empty() {
            debug!("No text provided for speech synthesis");
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("Cannot generate speech outside a tokio runtime");
            return;
        };

        let client = self.client.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();
        let model = self.model.clone();
        let voice = self.voice.clone();
        let text = text.to_string();
        let output = Arc::clone(&self.output);

        handle.spawn(async move {
            match synthesize(&client, &url, &api_key, &model, &voice, &text).await {
                Ok(samples) => match output.lock() {
                    Ok(mut out) => {
                        out.play(&samples, OPENAI_TTS_SAMPLE_RATE);
                        info!("Playing speech: {}", preview(&text));
                    }
                    Err(_) => error!("Audio output lock poisoned"),
                },
                Err(e) => error!("Error generating speech: {:#}", e),
            }
        });
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(50) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
