//! Queued leveled writer backed by a worker thread

use super::{LeveledWriter, Sink};
use crate::core::{BufferPool, Level, LoggerError, Result, WriterMetrics};
use crate::core::buffer::Buffer;
use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Queue length used when a configuration asks for zero or less
pub const DEFAULT_QUEUE_LEN: usize = 1024;

/// How long `close` lets the worker drain queued lines
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Hands lines to a bounded queue that a dedicated worker writes out.
///
/// Callers block while the queue is full; nothing is dropped. Each enqueued
/// line is a private copy taken from the writer's buffer pool, so the
/// caller's bytes can be reused as soon as `write_if_level` returns.
///
/// `close` signals the worker, which keeps writing until the queue is empty
/// or the drain timeout passes. Lines still queued at the deadline are
/// abandoned and counted in [`WriterMetrics::abandoned`].
///
/// # Example
///
/// ```
/// use nlog::writers::{IoSink, LeveledWriter, ParallelWriter};
/// use nlog::Level;
///
/// let writer = ParallelWriter::new(IoSink::new(Vec::new()), 64, Level::Debug);
/// writer.write_if_level(Level::Info, b"queued\n").unwrap();
/// writer.close().unwrap();
/// assert_eq!(writer.metrics().written(), 1);
/// ```
pub struct ParallelWriter {
    level: Level,
    sender: Sender<(Level, Buffer)>,
    stop_tx: Sender<()>,
    worker: Mutex<Option<JoinHandle<io::Result<()>>>>,
    stopped: AtomicBool,
    pool: Arc<BufferPool>,
    metrics: Arc<WriterMetrics>,
}

impl ParallelWriter {
    pub fn new<S: Sink + 'static>(sink: S, queue_len: usize, level: Level) -> Self {
        Self::with_drain_timeout(sink, queue_len, level, DEFAULT_DRAIN_TIMEOUT)
    }

    pub fn with_drain_timeout<S: Sink + 'static>(
        sink: S,
        queue_len: usize,
        level: Level,
        drain_timeout: Duration,
    ) -> Self {
        let (sender, receiver) = bounded(queue_len);
        let (stop_tx, stop_rx) = bounded(1);
        let pool = Arc::new(BufferPool::new());
        let metrics = Arc::new(WriterMetrics::new());

        let worker = Worker {
            sink: Box::new(sink),
            data: receiver,
            stop: stop_rx,
            pool: Arc::clone(&pool),
            metrics: Arc::clone(&metrics),
            drain_timeout,
        };
        let handle = thread::spawn(move || worker.run());

        Self {
            level,
            sender,
            stop_tx,
            worker: Mutex::new(Some(handle)),
            stopped: AtomicBool::new(false),
            pool,
            metrics,
        }
    }

    pub fn metrics(&self) -> &WriterMetrics {
        &self.metrics
    }

    /// Lines currently waiting for the worker
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Drain (bounded by the timeout), close the sink and join the worker.
    ///
    /// Only the first call does any work.
    pub fn stop(&self) -> Result<()> {
        self.request_stop();
        let handle = self.worker.lock().take();
        match handle {
            Some(handle) => match handle.join() {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(LoggerError::io_operation(
                    "closing parallel writer",
                    "sink close failed",
                    e,
                )),
                Err(_) => Err(LoggerError::writer("parallel writer worker panicked")),
            },
            None => Ok(()),
        }
    }
}

impl LeveledWriter for ParallelWriter {
    fn level(&self) -> Level {
        self.level
    }

    fn write_if_level(&self, level: Level, line: &[u8]) -> Result<usize> {
        if !level.enabled(self.level) {
            return Ok(line.len());
        }
        if self.stopped.load(Ordering::Acquire) {
            return Err(LoggerError::WriterStopped);
        }
        let mut buf = self.pool.get();
        buf.append_bytes(line);
        self.sender
            .send((level, buf))
            .map_err(|_| LoggerError::WriterStopped)?;
        self.metrics.record_enqueued();
        Ok(line.len())
    }

    fn close(&self) -> Result<()> {
        self.stop()
    }

    fn request_stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            let _ = self.stop_tx.try_send(());
        }
    }

    fn name(&self) -> &str {
        "parallel"
    }
}

impl Drop for ParallelWriter {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            eprintln!("[nlog WARN] parallel writer shutdown failed: {}", e);
        }
    }
}

struct Worker {
    sink: Box<dyn Sink>,
    data: Receiver<(Level, Buffer)>,
    stop: Receiver<()>,
    pool: Arc<BufferPool>,
    metrics: Arc<WriterMetrics>,
    drain_timeout: Duration,
}

impl Worker {
    fn run(mut self) -> io::Result<()> {
        loop {
            // A pending stop wins over queued data
            if self.stop.try_recv().is_ok() {
                self.drain();
                break;
            }
            select! {
                recv(self.data) -> msg => match msg {
                    Ok((level, buf)) => self.write(level, buf),
                    Err(_) => break,
                },
                recv(self.stop) -> _ => {
                    self.drain();
                    break;
                }
            }
        }
        self.sink.close()
    }

    fn drain(&mut self) {
        let deadline = Instant::now() + self.drain_timeout;
        loop {
            if Instant::now() >= deadline {
                let left = self.data.len() as u64;
                if left > 0 {
                    self.metrics.record_abandoned(left);
                    eprintln!(
                        "[nlog WARN] parallel writer drain timed out, {} line(s) abandoned",
                        left
                    );
                }
                return;
            }
            match self.data.try_recv() {
                Ok((level, buf)) => self.write(level, buf),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    fn write(&mut self, level: Level, buf: Buffer) {
        match self.sink.write_line(level, buf.as_bytes()) {
            Ok(()) => {
                self.metrics.record_written();
            }
            Err(_) => {
                self.metrics.record_failed();
            }
        }
        self.pool.put(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<(Level, String)>>>);

    impl Sink for Capture {
        fn write_line(&mut self, level: Level, line: &[u8]) -> io::Result<()> {
            self.0
                .lock()
                .push((level, String::from_utf8_lossy(line).into_owned()));
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Takes a while per line
    struct Slow(Capture);

    impl Sink for Slow {
        fn write_line(&mut self, level: Level, line: &[u8]) -> io::Result<()> {
            thread::sleep(Duration::from_millis(20));
            self.0.write_line(level, line)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lines_are_written_in_order() {
        let cap = Capture::default();
        let writer = ParallelWriter::new(cap.clone(), 16, Level::Debug);
        for i in 0..100 {
            writer
                .write_if_level(Level::Info, format!("line {}\n", i).as_bytes())
                .unwrap();
        }
        writer.close().unwrap();

        let lines = cap.0.lock();
        assert_eq!(lines.len(), 100);
        assert_eq!(lines[0], (Level::Info, "line 0\n".to_string()));
        assert_eq!(lines[99].1, "line 99\n");
        assert_eq!(writer.metrics().enqueued(), 100);
        assert_eq!(writer.metrics().written(), 100);
    }

    #[test]
    fn test_level_is_forwarded_to_sink() {
        let cap = Capture::default();
        let writer = ParallelWriter::new(cap.clone(), 4, Level::Warning);
        writer.write_if_level(Level::Error, b"e\n").unwrap();
        writer.write_if_level(Level::Info, b"filtered\n").unwrap();
        writer.close().unwrap();

        assert_eq!(*cap.0.lock(), vec![(Level::Error, "e\n".to_string())]);
    }

    #[test]
    fn test_write_after_close_fails() {
        let writer = ParallelWriter::new(Capture::default(), 4, Level::Debug);
        writer.close().unwrap();
        writer.close().unwrap();

        let err = writer.write_if_level(Level::Info, b"late\n").unwrap_err();
        assert!(matches!(err, LoggerError::WriterStopped));
    }

    #[test]
    fn test_drain_timeout_abandons_rest() {
        let cap = Capture::default();
        let writer = ParallelWriter::with_drain_timeout(
            Slow(cap.clone()),
            16,
            Level::Debug,
            Duration::from_millis(30),
        );
        for _ in 0..10 {
            writer.write_if_level(Level::Info, b"x\n").unwrap();
        }
        writer.close().unwrap();

        let metrics = writer.metrics();
        assert_eq!(metrics.written() + metrics.abandoned(), 10);
        assert!(metrics.abandoned() > 0);
        assert_eq!(cap.0.lock().len() as u64, metrics.written());
    }
}
