//! The read-only view handed to every command and provider.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use crate::{args::Options, config::Config};

/// A shared, mutex-guarded output sink.
///
/// Each call to [`write_str`](Self::write_str) holds the lock for the whole
/// text, so two emissions never interleave.
#[derive(Clone)]
pub struct OutputStream {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputStream {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::from_writer(io::stderr())
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self { inner: Arc::new(Mutex::new(Box::new(writer))) }
    }

    /// An in-memory stream plus a handle for reading back what was written.
    pub fn memory() -> (Self, MemoryBuffer) {
        let buffer = MemoryBuffer::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    pub fn write_str(&self, text: &str) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output stream lock poisoned"))?;
        guard.write_all(text.as_bytes())?;
        guard.flush()
    }

    pub fn write_line(&self, text: &str) -> io::Result<()> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.write_str(&line)
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OutputStream")
    }
}

/// Growable byte buffer usable as an [`OutputStream`] target.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer(Arc<Mutex<Vec<u8>>>);

impl MemoryBuffer {
    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Output and error streams owned by the dispatcher.
#[derive(Debug, Clone)]
pub struct Streams {
    pub stdout: OutputStream,
    pub stderr: OutputStream,
}

impl Streams {
    pub fn standard() -> Self {
        Self { stdout: OutputStream::stdout(), stderr: OutputStream::stderr() }
    }
}

impl Default for Streams {
    fn default() -> Self {
        Self::standard()
    }
}

/// Shared state for one invocation: parsed options, configuration, streams.
///
/// Cloning is cheap. Nothing reachable from a `Context` can be mutated by the
/// runnables that receive it.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    options: Options,
    config: Arc<Config>,
    provider_names: Arc<[String]>,
    streams: Streams,
}

impl Context {
    pub fn new(
        options: Options,
        config: Arc<Config>,
        provider_names: Arc<[String]>,
        streams: Streams,
    ) -> Self {
        Self { inner: Arc::new(Inner { options, config, provider_names, streams }) }
    }

    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// `--refresh`: bypass any cached provider data.
    pub fn refresh(&self) -> bool {
        self.inner.options.refresh
    }

    pub fn debug(&self) -> bool {
        self.inner.options.debug
    }

    /// Registered provider names, in registration order.
    pub fn provider_names(&self) -> &[String] {
        &self.inner.provider_names
    }

    pub fn stdout(&self) -> &OutputStream {
        &self.inner.streams.stdout
    }

    pub fn stderr(&self) -> &OutputStream {
        &self.inner.streams.stderr
    }
}
