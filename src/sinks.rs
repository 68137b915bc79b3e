use tracing::info;

/// A text widget the client writes into (status line, assistant output)
pub trait TextSink: Send {
    fn set_text(&mut self, text: &str);
}

/// Speech synthesis collaborator fed with each combined model utterance
pub trait SpeechSink: Send {
    fn speak(&mut self, text: &str);
}

/// Text sink that reports through the log
#[derive(Debug, Clone)]
pub struct LogTextSink {
    label: &'static str,
}

impl LogTextSink {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl TextSink for LogTextSink {
    fn set_text(&mut self, text: &str) {
        info!("[{}] {}", self.label, text);
    }
}

/// Text sink that prints to stdout, one line per update
#[derive(Debug, Clone)]
pub struct StdoutTextSink {
    prefix: String,
}

impl StdoutTextSink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TextSink for StdoutTextSink {
    fn set_text(&mut self, text: &str) {
        println!("{}{}", self.prefix, text);
    }
}
