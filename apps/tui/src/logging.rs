use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing_subscriber::EnvFilter;

/// Forwards formatted log lines to the UI log pane.
#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let _ = self.sender.send(line.to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn env_filter(debug: bool) -> EnvFilter {
    let default = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logging for the terminal UI: lines go to a channel the UI drains.
pub fn init_channel_logging(debug: bool) -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    let writer = ChannelWriter { sender };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .compact()
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(move || writer.clone())
        .try_init();
    receiver
}

/// Logging for headless runs: stderr.
pub fn init_stderr_logging(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(io::stderr)
        .try_init();
}
