//! Scripted in-memory transport
//!
//! [`MockLink`] is a shared handle: the transport it hands out and the test
//! that inspects it see the same state. Reads pop scripted responses; when the
//! script runs dry the fallback response (or nothing) is returned.

use super::{ConnectionParams, Transport, TransportFactory};
use jogkit_core::ConnectionError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

#[derive(Default)]
struct MockState {
    responses: VecDeque<io::Result<Vec<u8>>>,
    fallback: Option<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    write_attempts: u32,
    failing_writes: u32,
    fail_all_writes: bool,
    open_script: VecDeque<ConnectionError>,
    open_attempts: u32,
    closes: u32,
}

/// Shared handle to a scripted link
#[derive(Clone, Default)]
pub struct MockLink {
    state: Arc<Mutex<MockState>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next read
    pub fn push_response(&self, text: &str) -> &Self {
        self.state
            .lock()
            .responses
            .push_back(Ok(text.as_bytes().to_vec()));
        self
    }

    /// Queue a read that finds nothing buffered
    pub fn push_empty(&self) -> &Self {
        self.state.lock().responses.push_back(Ok(Vec::new()));
        self
    }

    /// Queue a read that times out
    pub fn push_timeout(&self) -> &Self {
        self.state.lock().responses.push_back(Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "Operation timed out",
        )));
        self
    }

    /// Response returned once the script is exhausted
    pub fn set_fallback(&self, text: &str) -> &Self {
        self.state.lock().fallback = Some(text.as_bytes().to_vec());
        self
    }

    /// Make the next `count` writes fail
    pub fn fail_next_writes(&self, count: u32) -> &Self {
        self.state.lock().failing_writes = count;
        self
    }

    /// Make every write fail
    pub fn fail_all_writes(&self) -> &Self {
        self.state.lock().fail_all_writes = true;
        self
    }

    /// Make the next open attempt fail with `error`
    pub fn push_open_error(&self, error: ConnectionError) -> &Self {
        self.state.lock().open_script.push_back(error);
        self
    }

    /// Successful writes, in order
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    /// Successful writes that were not status queries, as text
    pub fn commands(&self) -> Vec<String> {
        self.state
            .lock()
            .writes
            .iter()
            .filter(|w| w.as_slice() != b"?")
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Number of `?` status queries written
    pub fn status_queries(&self) -> usize {
        self.state
            .lock()
            .writes
            .iter()
            .filter(|w| w.as_slice() == b"?")
            .count()
    }

    /// Writes attempted, including failed ones
    pub fn write_attempts(&self) -> u32 {
        self.state.lock().write_attempts
    }

    pub fn open_attempts(&self) -> u32 {
        self.state.lock().open_attempts
    }

    pub fn close_count(&self) -> u32 {
        self.state.lock().closes
    }

    /// A transport bound to this link
    pub fn transport(&self) -> Box<dyn Transport> {
        Box::new(MockTransport { link: self.clone() })
    }
}

struct MockTransport {
    link: MockLink,
}

impl Transport for MockTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.link.state.lock();
        state.write_attempts += 1;
        if state.fail_all_writes {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
        }
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
        }
        state.writes.push(data.to_vec());
        Ok(())
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut state = self.link.state.lock();
        match state.responses.pop_front() {
            Some(response) => response,
            None => Ok(state.fallback.clone().unwrap_or_default()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.link.state.lock().closes += 1;
        Ok(())
    }
}

/// Factory handing out transports bound to a [`MockLink`]
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    link: MockLink,
}

impl MockTransportFactory {
    pub fn new(link: MockLink) -> Self {
        Self { link }
    }
}

impl TransportFactory for MockTransportFactory {
    fn open(&mut self, _params: &ConnectionParams) -> Result<Box<dyn Transport>, ConnectionError> {
        let scripted = {
            let mut state = self.link.state.lock();
            state.open_attempts += 1;
            state.open_script.pop_front()
        };
        match scripted {
            Some(err) => Err(err),
            None => Ok(self.link.transport()),
        }
    }
}
