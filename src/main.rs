use anyhow::Result;
use clap::Parser;
use lens_live::{
    AudioPump, CameraPump, Config, Controller, JpegFrameEncoder, MicrophoneConfig,
    MicrophoneSource, OpenAiSpeech, SessionClient, StdoutTextSink, TestPatternCamera, Ticker,
    WavAudioOutput, WavMicrophone, WebSocketFactory,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Stream camera and microphone input to a live conversational model
#[derive(Debug, Parser)]
#[command(name = "lens-live", version)]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/lens-live")]
    config: String,

    /// WAV file replayed as microphone input
    #[arg(long)]
    wav: Option<String>,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;

    if cfg.session.api_key.is_empty() {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            cfg.session.api_key = key;
        }
    }
    if cfg.speech.api_key.is_empty() {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            cfg.speech.api_key = key;
        }
    }
    if args.wav.is_some() {
        cfg.audio.wav_path = args.wav.clone();
    }

    info!("Lens Live v{}", env!("CARGO_PKG_VERSION"));
    info!("Model: {}", cfg.session.model);

    let mut controller = build_controller(&cfg)?;
    let mut ticker = Ticker::new(Instant::now());
    let mut interval = tokio::time::interval(cfg.scheduler.tick_interval());
    let deadline = args
        .duration
        .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    info!("Press Enter to toggle the assistant, type text to send it, 'q' to quit");

    controller.start(Instant::now());

    loop {
        tokio::select! {
            _ = interval.tick() => {
                controller.tick(ticker.advance(Instant::now()));
            }
            line = stdin.next_line() => match line? {
                Some(line) => match line.trim() {
                    "" => controller.toggle(Instant::now()),
                    "q" | "quit" => break,
                    text => {
                        if !controller.send_text(text) {
                            warn!("Session not active; text not sent");
                        }
                    }
                },
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = sleep_until(deadline) => {
                info!("Duration elapsed");
                break;
            }
        }
    }

    let stats = controller.shutdown();
    info!("Session stats: {}", serde_json::to_string(&stats)?);

    Ok(())
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn build_controller(cfg: &Config) -> Result<Controller> {
    let mut session = SessionClient::builder(cfg.session.clone())
        .transport(Arc::new(WebSocketFactory::new()))
        .status_sink(Box::new(StdoutTextSink::new("[status] ")))
        .output_sink(Box::new(StdoutTextSink::new("[assistant] ")));

    if let Some(path) = &cfg.audio.response_path {
        session = session.audio_output(Box::new(WavAudioOutput::new(path)));
    }

    if cfg.speech.enabled {
        match OpenAiSpeech::new(
            cfg.speech.api_key.clone(),
            cfg.speech.voice.clone(),
            Box::new(WavAudioOutput::new(&cfg.speech.output_path)),
        ) {
            Ok(speech) => {
                session = session.speech_sink(Box::new(speech.with_model(cfg.speech.model.clone())))
            }
            Err(e) => warn!("Speech disabled: {:#}", e),
        }
    }

    let camera = CameraPump::new(
        cfg.camera.pump_config(),
        Box::new(TestPatternCamera::new(cfg.camera.width, cfg.camera.height)),
        Arc::new(JpegFrameEncoder::new(cfg.camera.jpeg_quality)),
    );

    let microphone: Option<Box<dyn MicrophoneSource>> = match &cfg.audio.wav_path {
        Some(path) => Some(Box::new(WavMicrophone::open(
            path,
            MicrophoneConfig {
                chunk_duration_ms: cfg.audio.chunk_duration_ms,
            },
        )?)),
        None => {
            info!("No microphone input configured; streaming camera only");
            None
        }
    };

    let audio = AudioPump::new(
        cfg.audio.pump_config(cfg.session.audio_sample_rate),
        microphone,
    );

    Ok(Controller::new(session.build(), camera, audio))
}
