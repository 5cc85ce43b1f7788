//! `tracing` output routed to the browser console

use std::io;

use tracing_subscriber::fmt::MakeWriter;

/// Buffers one formatted event and logs it when dropped
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = console_line(&self.buffer) {
            web_sys::console::log_1(&line.into());
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter { buffer: Vec::new() }
    }
}

/// Text for one console entry; `None` for an empty write
fn console_line(buffer: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(buffer);
    let line = line.trim_end();
    (!line.is_empty()).then(|| line.to_string())
}

/// Install the console subscriber. Later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
