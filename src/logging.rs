//! Logging setup
//!
//! Console output always goes through [`CrlfWriter`]: while the terminal is in
//! raw mode a bare `\n` only moves the cursor down, so every line feed is sent
//! as `\r\n`.

use anyhow::Context;
use jogkit_settings::LoggingSettings;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Initialize logging from the logging section of the configuration
///
/// - `RUST_LOG` overrides the configured level
/// - console output with `\r\n` line endings
/// - optional log file, appended to, without ANSI colours
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid log level '{}'", settings.level))?,
    };

    let console_layer = fmt::layer()
        .with_writer(RawModeStdout)
        .with_target(false)
        .with_level(true);

    let file_layer = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    Ok(())
}

/// Writer that expands `\n` to `\r\n`
pub struct CrlfWriter<W> {
    inner: W,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut lines = buf.split(|b| *b == b'\n');
        if let Some(first) = lines.next() {
            self.inner.write_all(first)?;
        }
        for line in lines {
            self.inner.write_all(b"\r\n")?;
            self.inner.write_all(line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Stdout with `\r\n` line endings
#[derive(Debug, Clone, Copy, Default)]
pub struct RawModeStdout;

impl<'a> MakeWriter<'a> for RawModeStdout {
    type Writer = CrlfWriter<io::Stdout>;

    fn make_writer(&'a self) -> Self::Writer {
        CrlfWriter::new(io::stdout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_feeds_become_crlf() {
        let mut writer = CrlfWriter::new(Vec::new());
        writer.write_all(b"first\nsecond\n").unwrap();
        writer.write_all(b"no newline").unwrap();
        assert_eq!(writer.into_inner(), b"first\r\nsecond\r\nno newline".to_vec());
    }

    #[test]
    fn test_empty_write() {
        let mut writer = CrlfWriter::new(Vec::new());
        assert_eq!(writer.write(b"").unwrap(), 0);
        assert!(writer.into_inner().is_empty());
    }
}
