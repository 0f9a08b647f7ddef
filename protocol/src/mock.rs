//! In-memory port for tests.

use crate::{Connection, frame::ResponseHeader};
use alloc::{boxed::Box, collections::vec_deque::VecDeque, format, vec::Vec};
use core::convert::Infallible;
use embedded_io_async::{ErrorType, Read, Write};

/// Builds a complete response frame with the given header.
pub fn response(header: ResponseHeader, data: &str) -> Vec<u8> {
    let payload = format!("~{data};\r\n").into_bytes();
    let len = u8::try_from(payload.len()).unwrap();
    let mut frame = header.to_bytes().to_vec();

    frame.push(len);
    frame.extend(&payload);
    frame.push(header.checksum(header.correct_length(len), &payload));

    frame
}

/// Port that replays one session of bytes per connection.
///
/// Reconnecting discards unread bytes and starts the next session.
#[derive(Default, Debug)]
pub struct MockPort {
    rx: VecDeque<u8>,
    sessions: VecDeque<Vec<u8>>,
    pub tx: Vec<u8>,
    pub reconnects: usize,
}

impl MockPort {
    pub fn new(session: Vec<u8>) -> Self {
        Self {
            rx: session.into(),
            ..Self::default()
        }
    }

    /// Appends a session that is replayed after the next reconnect.
    pub fn then(mut self, session: Vec<u8>) -> Self {
        self.sessions.push_back(session);
        self
    }
}

impl ErrorType for MockPort {
    type Error = Infallible;
}

impl Read for MockPort {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let len = buf.len().min(self.rx.len());

        for (dst, src) in buf.iter_mut().zip(self.rx.drain(..len)) {
            *dst = src;
        }

        Ok(len)
    }
}

impl Write for MockPort {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.extend_from_slice(buf);

        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[async_trait::async_trait(?Send)]
impl Connection for MockPort {
    async fn reconnect(&mut self) -> Result<(), Self::Error> {
        self.reconnects += 1;
        self.rx = self.sessions.pop_front().unwrap_or_default().into();

        Ok(())
    }
}
