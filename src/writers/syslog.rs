//! Syslog routing
//!
//! [`SyslogSink`] maps log levels onto the per-severity calls of a
//! [`SyslogBackend`]. On unix the bundled backend goes through the C
//! library's `syslog(3)`; anything else can plug in its own backend.

use super::{DummyWriter, LeveledWriter, Sink, Writer};
use crate::core::Level;
use std::io;
use std::sync::Arc;

/// One call per syslog severity
pub trait SyslogBackend: Send {
    fn debug(&mut self, msg: &str) -> io::Result<()>;
    fn info(&mut self, msg: &str) -> io::Result<()>;
    fn warning(&mut self, msg: &str) -> io::Result<()>;
    fn err(&mut self, msg: &str) -> io::Result<()>;
    fn crit(&mut self, msg: &str) -> io::Result<()>;
    fn emerg(&mut self, msg: &str) -> io::Result<()>;

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that routes each line to the backend call matching its level.
///
/// | level   | backend call |
/// |---------|--------------|
/// | Debug   | `debug`      |
/// | Info    | `info`       |
/// | Warning | `warning`    |
/// | Error   | `err`        |
/// | Fatal   | `crit`       |
/// | Notice  | `warning`    |
pub struct SyslogSink<B> {
    backend: B,
}

impl<B: SyslogBackend> SyslogSink<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SyslogBackend> Sink for SyslogSink<B> {
    fn write_line(&mut self, level: Level, line: &[u8]) -> io::Result<()> {
        let msg = String::from_utf8_lossy(line);
        match level {
            Level::Debug => self.backend.debug(&msg),
            Level::Info => self.backend.info(&msg),
            Level::Warning => self.backend.warning(&msg),
            Level::Error => self.backend.err(&msg),
            Level::Fatal => self.backend.crit(&msg),
            Level::Notice => self.backend.warning(&msg),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.backend.close()
    }
}

/// Connect to the local syslog daemon, tagging entries with `app_name`.
///
/// If no daemon can be reached a warning goes to stderr and a
/// [`DummyWriter`] is returned, so logging setup never fails on this.
pub fn syslog_writer(app_name: &str, level: Level) -> Arc<dyn LeveledWriter> {
    match syslog_sink(app_name) {
        Ok(sink) => Arc::new(Writer::new(sink, level)),
        Err(e) => {
            warn_unreachable(&e);
            Arc::new(DummyWriter::new())
        }
    }
}

/// Sink connected to the local syslog daemon, for callers that pick their
/// own dispatch (for example a [`ParallelWriter`](super::ParallelWriter))
pub fn syslog_sink(app_name: &str) -> io::Result<Box<dyn Sink>> {
    let sink = connect(app_name)?;
    Ok(Box::new(sink))
}

pub(crate) fn warn_unreachable(e: &io::Error) {
    eprintln!(
        "[nlog WARN] cannot connect to syslog ({}), syslog writer disabled",
        e
    );
}

#[cfg(unix)]
fn connect(app_name: &str) -> io::Result<SyslogSink<unix::PosixSyslog>> {
    unix::PosixSyslog::open(app_name).map(SyslogSink::new)
}

#[cfg(not(unix))]
fn connect(_app_name: &str) -> io::Result<SyslogSink<NoSyslog>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "syslog is not available on this platform",
    ))
}

#[cfg(not(unix))]
struct NoSyslog;

#[cfg(not(unix))]
impl SyslogBackend for NoSyslog {
    fn debug(&mut self, _msg: &str) -> io::Result<()> {
        Ok(())
    }
    fn info(&mut self, _msg: &str) -> io::Result<()> {
        Ok(())
    }
    fn warning(&mut self, _msg: &str) -> io::Result<()> {
        Ok(())
    }
    fn err(&mut self, _msg: &str) -> io::Result<()> {
        Ok(())
    }
    fn crit(&mut self, _msg: &str) -> io::Result<()> {
        Ok(())
    }
    fn emerg(&mut self, _msg: &str) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
pub use unix::PosixSyslog;

#[cfg(unix)]
mod unix {
    use super::SyslogBackend;
    use std::ffi::CString;
    use std::io;

    /// Backend on the POSIX `openlog`/`syslog` API, facility `user`.
    ///
    /// The C library owns socket discovery, the wire format and reconnecting
    /// after a daemon restart. `openlog` state is process-wide, so only one
    /// backend should be open at a time; a later `open` retags entries from
    /// every backend still alive.
    pub struct PosixSyslog {
        // openlog keeps this pointer until closelog
        ident: CString,
        open: bool,
    }

    impl PosixSyslog {
        pub fn open(tag: &str) -> io::Result<Self> {
            let ident = CString::new(tag).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("syslog tag: {}", e))
            })?;
            unsafe {
                libc::openlog(ident.as_ptr(), libc::LOG_PID | libc::LOG_NDELAY, libc::LOG_USER);
            }
            Ok(Self { ident, open: true })
        }

        pub fn tag(&self) -> &str {
            self.ident.to_str().unwrap_or_default()
        }

        fn send(&mut self, priority: libc::c_int, msg: &str) -> io::Result<()> {
            if !self.open {
                return Err(io::Error::new(io::ErrorKind::NotConnected, "syslog closed"));
            }
            let text = message(msg);
            unsafe {
                libc::syslog(
                    priority,
                    b"%s\0".as_ptr() as *const libc::c_char,
                    text.as_ptr(),
                );
            }
            Ok(())
        }
    }

    /// One entry per call: trailing newline dropped, NUL bytes removed
    pub(super) fn message(msg: &str) -> CString {
        let bytes: Vec<u8> = msg
            .trim_end_matches('\n')
            .bytes()
            .filter(|b| *b != 0)
            .collect();
        CString::new(bytes).unwrap_or_default()
    }

    impl SyslogBackend for PosixSyslog {
        fn debug(&mut self, msg: &str) -> io::Result<()> {
            self.send(libc::LOG_DEBUG, msg)
        }

        fn info(&mut self, msg: &str) -> io::Result<()> {
            self.send(libc::LOG_INFO, msg)
        }

        fn warning(&mut self, msg: &str) -> io::Result<()> {
            self.send(libc::LOG_WARNING, msg)
        }

        fn err(&mut self, msg: &str) -> io::Result<()> {
            self.send(libc::LOG_ERR, msg)
        }

        fn crit(&mut self, msg: &str) -> io::Result<()> {
            self.send(libc::LOG_CRIT, msg)
        }

        fn emerg(&mut self, msg: &str) -> io::Result<()> {
            self.send(libc::LOG_EMERG, msg)
        }

        fn close(&mut self) -> io::Result<()> {
            if std::mem::take(&mut self.open) {
                unsafe { libc::closelog() };
            }
            Ok(())
        }
    }

    impl Drop for PosixSyslog {
        fn drop(&mut self) {
            let _ = self.close();
        }
    }
}
