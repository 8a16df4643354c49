//! Print handler for configurable output.
//!
//! `print` statements and shown error reports go to the session's handler:
//! - Stdout: the default for hosts that do not care
//! - Buffer: captured for tests and for hosts that display output later
//! - Writer: any `io::Write` sink supplied by the host
//! - Silent: output is discarded
//!
//! Uses enum dispatch instead of trait objects for the common cases.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Default print handler that writes to stdout.
#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    pub fn println(&self, msg: &str) {
        println!("{msg}");
    }

    pub fn print(&self, msg: &str) {
        print!("{msg}");
        let _ = io::stdout().flush();
    }
}

/// Print handler that captures output to a buffer.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    pub fn print(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

/// Print handler forwarding to a host-supplied writer.
///
/// Flushes after every write so output is complete when `interp` returns.
/// Write failures are dropped: a broken sink never fails evaluation.
pub struct WriterPrintHandler {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl WriterPrintHandler {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        WriterPrintHandler {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn println(&self, msg: &str) {
        let mut writer = self.writer.lock();
        let _ = writer
            .write_all(msg.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
    }

    pub fn print(&self, msg: &str) {
        let mut writer = self.writer.lock();
        let _ = writer
            .write_all(msg.as_bytes())
            .and_then(|()| writer.flush());
    }
}

/// Print handler implementation using enum dispatch.
pub enum PrintHandlerImpl {
    /// Writes to stdout (default).
    Stdout(StdoutPrintHandler),
    /// Captures to a buffer.
    Buffer(BufferPrintHandler),
    /// Forwards to a host writer.
    Writer(WriterPrintHandler),
    /// Discards all output.
    Silent,
}

impl PrintHandlerImpl {
    /// Print a line (with newline).
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.println(msg),
            Self::Buffer(h) => h.println(msg),
            Self::Writer(h) => h.println(msg),
            Self::Silent => {}
        }
    }

    /// Print without newline.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.print(msg),
            Self::Buffer(h) => h.print(msg),
            Self::Writer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout(_) | Self::Writer(_) | Self::Silent => String::new(),
        }
    }

    /// Clear captured output.
    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared print handler that can be handed to several sessions.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

/// Create a default stdout print handler.
pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

/// Create a buffer print handler for capturing output.
pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

/// Create a print handler writing to `writer`.
pub fn writer_handler(writer: impl Write + Send + 'static) -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Writer(WriterPrintHandler::new(writer)))
}

/// Create a silent print handler that discards all output.
pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}
