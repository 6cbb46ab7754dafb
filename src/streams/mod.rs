// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Record sources and sinks shared by every unit and node.
//!
//! Records are lines: a [`Record`] is the text of one line without its
//! terminator. A [`RecordSource`] is the single-consumer end of a bounded
//! tokio `mpsc` channel; a [`RecordSink`] is the cloneable producer end.
//! Because every `send` hands over one whole record, concurrent writers to
//! one sink interleave at record granularity and never tear a line.
//!
//! Half-close is channel closure: once every sink clone is dropped, the
//! source yields its buffered records and then `None`.
//!
//! Byte streams are split on `\n`. A trailing `\r` is removed from each
//! line, so CRLF input comes back out with plain `\n` terminators and does
//! not round-trip byte for byte. Bytes that are not valid UTF-8 are replaced
//! with `U+FFFD` rather than ending the stream.

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use std::time::Duration;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};

use crate::errors::UnitFailure;

/// One line of text, without its terminator.
pub type Record = String;

/// Create a connected sink/source pair holding at most `capacity` in-flight records.
pub fn channel(capacity: usize) -> (RecordSink, RecordSource) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (RecordSink { sender }, RecordSource { receiver })
}

/// Sequential, already-open source of records.
#[derive(Debug)]
pub struct RecordSource {
    receiver: mpsc::Receiver<Record>,
}

impl RecordSource {
    /// A source that is already half-closed. Root units that ignore their
    /// input (`ping`, `date`, counters) are usually started with this.
    pub fn empty() -> Self {
        let (_, source) = channel(1);
        source
    }

    /// A half-closed source pre-filled with `records`.
    pub fn from_records<I, R>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        let records: Vec<Record> = records.into_iter().map(Into::into).collect();
        let (sink, source) = channel(records.len());
        for record in records {
            // capacity matches the record count and the receiver is alive
            let _ = sink.sender.try_send(record);
        }
        source
    }

    /// Split `reader` into line records on a background task.
    ///
    /// A trailing fragment without a newline is still delivered as the
    /// final record. The task stops early once the source is dropped.
    pub fn from_reader<R>(reader: R, capacity: usize) -> (Self, JoinHandle<std::io::Result<()>>)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (sink, source) = channel(capacity);
        let pump = tokio::spawn(async move {
            pump_lines(reader, &sink, false).await?;
            Ok(())
        });
        (source, pump)
    }

    /// Next record, or `None` once the source is half-closed and empty.
    pub async fn recv(&mut self) -> Option<Record> {
        self.receiver.recv().await
    }

    /// Discard everything up to the half-close. Returns the number of
    /// records thrown away.
    pub async fn drain(&mut self) -> usize {
        let mut discarded = 0;
        while self.receiver.recv().await.is_some() {
            discarded += 1;
        }
        discarded
    }

    /// Read every remaining record in order.
    pub async fn collect(mut self) -> Vec<Record> {
        let mut records = Vec::new();
        while let Some(record) = self.receiver.recv().await {
            records.push(record);
        }
        records
    }
}

/// Sequential sink of records. Clones write into the same stream.
#[derive(Debug, Clone)]
pub struct RecordSink {
    sender: mpsc::Sender<Record>,
}

impl RecordSink {
    /// Deliver one record, waiting for room if the channel is full.
    pub async fn send(&self, record: impl Into<Record>) -> Result<(), UnitFailure> {
        self.sender
            .send(record.into())
            .await
            .map_err(|_| UnitFailure::SinkClosed)
    }

    /// True once the consuming side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// A sink whose records are gathered in arrival order. The task
    /// finishes when every clone of the sink has been dropped.
    pub fn collector(capacity: usize) -> (Self, JoinHandle<Vec<Record>>) {
        let (sink, source) = channel(capacity);
        let task = tokio::spawn(source.collect());
        (sink, task)
    }

    /// A sink that writes each record to `writer` as one line, flushing per
    /// record so output streams through interactively.
    pub fn to_writer<W>(writer: W, capacity: usize) -> (Self, JoinHandle<std::io::Result<()>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sink, mut source) = channel(capacity);
        let task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(mut record) = source.recv().await {
                record.push('\n');
                writer.write_all(record.as_bytes()).await?;
                writer.flush().await?;
            }
            writer.flush().await
        });
        (sink, task)
    }
}

/// Outcome of copying a byte stream into a sink line by line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PumpStats {
    pub forwarded: usize,
    pub sink_closed: bool,
}

/// Copy `reader` into `sink` one line at a time.
///
/// When the sink's consumer disappears the pump either stops (`keep_draining
/// == false`) or keeps reading and discarding until end of input, which
/// keeps a producing child process from blocking on a full pipe.
pub(crate) async fn pump_lines<R>(
    reader: R,
    sink: &RecordSink,
    keep_draining: bool,
) -> std::io::Result<PumpStats>
where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(reader, AnyDelimiterCodec::new(b"\n".to_vec(), Vec::new()));
    let mut stats = PumpStats::default();

    while let Some(chunk) = lines.next().await {
        let line = decode_line(&chunk.map_err(into_io_error)?);
        if stats.sink_closed {
            continue;
        }
        if sink.send(line).await.is_err() {
            stats.sink_closed = true;
            if !keep_draining {
                break;
            }
        } else {
            stats.forwarded += 1;
        }
    }

    Ok(stats)
}

/// Wait for a reader pump started by [`RecordSource::from_reader`] and
/// return its outcome.
///
/// A pump that has not finished within `grace` is still blocked on a read
/// nobody needs any more (the consumer stopped early); it is aborted and
/// counted as a success.
pub async fn finish_pump(
    pump: JoinHandle<std::io::Result<()>>,
    grace: Duration,
) -> std::io::Result<()> {
    let mut pump = pump;
    match tokio::time::timeout(grace, &mut pump).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(std::io::Error::new(std::io::ErrorKind::Other, join_error)),
        Err(_) => {
            pump.abort();
            Ok(())
        }
    }
}

fn decode_line(chunk: &[u8]) -> Record {
    let line = chunk.strip_suffix(b"\r").unwrap_or(chunk);
    String::from_utf8_lossy(line).into_owned()
}

fn into_io_error(error: AnyDelimiterCodecError) -> std::io::Error {
    match error {
        AnyDelimiterCodecError::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_from_records_is_half_closed() {
        let source = RecordSource::from_records(["A", "B", "C"]);
        assert_eq!(source.collect().await, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_empty_source_yields_nothing() {
        let mut source = RecordSource::empty();
        assert_eq!(source.recv().await, None);
    }

    #[tokio::test]
    async fn test_from_reader_delivers_trailing_fragment() {
        let (source, pump) = RecordSource::from_reader(&b"Hello\nWorld"[..], 4);

        assert_eq!(source.collect().await, vec!["Hello", "World"]);
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_from_reader_keeps_blank_lines() {
        let (source, pump) = RecordSource::from_reader(&b"1\n\n3\n"[..], 4);

        assert_eq!(source.collect().await, vec!["1", "", "3"]);
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_from_reader_replaces_invalid_utf8_and_keeps_reading() {
        let (source, pump) = RecordSource::from_reader(&b"ok\n\xff\nafter\r\n"[..], 4);

        assert_eq!(source.collect().await, vec!["ok", "\u{FFFD}", "after"]);
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_from_reader_strips_carriage_returns() {
        let (source, pump) = RecordSource::from_reader(&b"one\r\ntwo\r\n\r\n"[..], 4);

        assert_eq!(source.collect().await, vec!["one", "two", ""]);
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_finish_pump_reports_read_errors() {
        struct BrokenReader;

        impl AsyncRead for BrokenReader {
            fn poll_read(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
                _buf: &mut tokio::io::ReadBuf<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "terminal went away",
                )))
            }
        }

        let (source, pump) = RecordSource::from_reader(BrokenReader, 4);

        assert!(source.collect().await.is_empty());
        let error = finish_pump(pump, Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(error.to_string(), "terminal went away");
    }

    #[tokio::test]
    async fn test_finish_pump_aborts_a_blocked_reader() {
        let (_writer, reader) = tokio::io::duplex(64);
        let (source, pump) = RecordSource::from_reader(reader, 4);
        drop(source);

        assert!(finish_pump(pump, Duration::from_millis(20)).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_fails_once_consumer_is_gone() {
        let (sink, source) = channel(1);
        drop(source);

        assert!(sink.is_closed());
        assert!(matches!(sink.send("late").await, Err(UnitFailure::SinkClosed)));
    }

    #[tokio::test]
    async fn test_collector_gathers_from_every_clone() {
        let (sink, collected) = RecordSink::collector(8);
        let other = sink.clone();

        sink.send("one").await.unwrap();
        other.send("two").await.unwrap();
        drop(sink);
        drop(other);

        assert_eq!(collected.await.unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_to_writer_terminates_each_record() {
        let (client, mut server) = tokio::io::duplex(1024);
        let (sink, task) = RecordSink::to_writer(client, 4);

        sink.send("first").await.unwrap();
        sink.send("second").await.unwrap();
        drop(sink);
        task.await.unwrap().unwrap();

        let mut written = String::new();
        server.read_to_string(&mut written).await.unwrap();
        assert_eq!(written, "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_pump_keeps_draining_after_sink_closes() {
        let (sink, source) = channel(1);
        drop(source);

        let stats = pump_lines(&b"a\nb\nc\n"[..], &sink, true).await.unwrap();
        assert_eq!(
            stats,
            PumpStats {
                forwarded: 0,
                sink_closed: true
            }
        );
    }
}
