//! Text-to-speech fallback for model text responses

pub mod openai;

pub use openai::{OpenAiSpeech, OPENAI_TTS_SAMPLE_RATE};
