//! Sources of streaming batches.
//!
//! The streaming loop pulls batches from a [`BatchSource`]. Two sources are
//! provided:
//!
//! - [`ChannelSource`]: batches pushed by another thread through a bounded
//!   channel ([`channel_source`]).
//! - [`IntervalLineSource`]: record lines read from any `BufRead` on a
//!   background thread and cut into one batch per time window.

use std::io::{self, BufRead};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, select, tick};
use log::debug;

use crate::error::{HashlearnError, Result};
use crate::ml::dataset::LabeledVector;
use crate::stream::cancel::CancellationToken;
use crate::stream::decoder::decode_batch;

/// A blocking, cancellable supplier of batches.
pub trait BatchSource {
    /// Wait for the next batch.
    ///
    /// Returns `None` once the source is exhausted or `cancel` fires. A
    /// batch that could not be assembled is returned as an error; the
    /// source stays usable afterwards.
    fn next_batch(&mut self, cancel: &CancellationToken) -> Option<Result<Vec<LabeledVector>>>;
}

/// The sending half of a [`ChannelSource`].
#[derive(Debug, Clone)]
pub struct BatchSender {
    sender: Sender<Result<Vec<LabeledVector>>>,
}

impl BatchSender {
    /// Send a batch, blocking while the queue is full.
    pub fn send(&self, batch: Vec<LabeledVector>) -> Result<()> {
        self.sender
            .send(Ok(batch))
            .map_err(|_| HashlearnError::cancelled("batch source has been dropped"))
    }

    /// Report a batch that failed before reaching the model.
    pub fn send_error(&self, error: HashlearnError) -> Result<()> {
        self.sender
            .send(Err(error))
            .map_err(|_| HashlearnError::cancelled("batch source has been dropped"))
    }
}

/// Batches delivered through a bounded channel.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: Receiver<Result<Vec<LabeledVector>>>,
}

/// Create a connected sender and source holding up to `capacity` batches.
pub fn channel_source(capacity: usize) -> (BatchSender, ChannelSource) {
    let (sender, receiver) = bounded(capacity);
    (BatchSender { sender }, ChannelSource { receiver })
}

impl BatchSource for ChannelSource {
    fn next_batch(&mut self, cancel: &CancellationToken) -> Option<Result<Vec<LabeledVector>>> {
        if cancel.is_cancelled() {
            return None;
        }
        select! {
            recv(self.receiver) -> batch => batch.ok(),
            recv(cancel.receiver()) -> _ => None,
        }
    }
}

/// Forward the lines of `reader` until it ends or fails.
///
/// Bytes that are not UTF-8 are replaced, so the decoder rejects such a line
/// as a malformed record instead of the input ending early.
fn read_lines<R: BufRead>(mut reader: R, sender: Sender<io::Result<String>>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                if sender.send(Ok(line)).is_err() {
                    break;
                }
            }
            Err(error) => {
                let _ = sender.send(Err(error));
                break;
            }
        }
    }
}

/// Record lines cut into batches on a fixed wall-clock interval.
///
/// Every line received during one window forms one batch; windows without
/// lines yield empty batches. When the input ends the pending lines are
/// flushed as a final batch.
#[derive(Debug)]
pub struct IntervalLineSource {
    lines: Receiver<io::Result<String>>,
    ticker: Receiver<Instant>,
    pending: Vec<(usize, String)>,
    line_number: usize,
    finished: bool,
}

impl IntervalLineSource {
    /// Start reading `reader` on a background thread.
    ///
    /// At most `capacity` lines are buffered ahead of the batcher.
    pub fn spawn<R>(reader: R, interval: Duration, capacity: usize) -> Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, lines) = bounded(capacity.max(1));
        thread::Builder::new()
            .name("hashlearn-reader".to_string())
            .spawn(move || read_lines(reader, sender))?;

        Ok(IntervalLineSource {
            lines,
            ticker: tick(interval),
            pending: Vec::new(),
            line_number: 0,
            finished: false,
        })
    }

    fn cut(&mut self) -> Result<Vec<LabeledVector>> {
        let pending = std::mem::take(&mut self.pending);
        decode_batch(pending.iter().map(|(number, line)| (*number, line.as_str())))
    }
}

impl BatchSource for IntervalLineSource {
    fn next_batch(&mut self, cancel: &CancellationToken) -> Option<Result<Vec<LabeledVector>>> {
        if self.finished || cancel.is_cancelled() {
            return None;
        }

        loop {
            select! {
                recv(self.lines) -> line => match line {
                    Ok(Ok(line)) => {
                        self.line_number += 1;
                        self.pending.push((self.line_number, line));
                    }
                    Ok(Err(error)) => {
                        // the reader stops after a read error
                        self.finished = true;
                        self.pending.clear();
                        return Some(Err(error.into()));
                    }
                    Err(_) => {
                        self.finished = true;
                        debug!("input closed after {} lines", self.line_number);
                        if self.pending.is_empty() {
                            return None;
                        }
                        return Some(self.cut());
                    }
                },
                recv(self.ticker) -> _ => return Some(self.cut()),
                recv(cancel.receiver()) -> _ => {
                    // lines of an unfinished window are discarded
                    self.finished = true;
                    self.pending.clear();
                    return None;
                }
            }
        }
    }
}
