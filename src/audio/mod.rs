pub mod backend;
pub mod file;
pub mod output;
pub mod resample;

pub use backend::{AudioChunk, MicrophoneConfig, MicrophoneSource};
pub use file::WavMicrophone;
pub use output::{AudioOutput, WavAudioOutput};
pub use resample::{downmix_to_mono, resample_linear, LinearResampler};
