//! In-memory `log` backend for asserting on emitted records.
//!
//! The logger is process-global, so records are tagged with the emitting
//! thread and `take` only returns the calling thread's records.

use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};

struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((thread::current().id(), record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

lazy_static! {
    static ref LOGGER: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };
}

static INSTALL: Once = Once::new();

/// Route `log` records to the capture buffer and drop anything already
/// captured for this thread.
pub fn install() {
    INSTALL.call_once(|| {
        let _ = log::set_logger(&*LOGGER);
    });
    log::set_max_level(LevelFilter::Trace);
    take();
}

/// Drain the records emitted by the current thread.
pub fn take() -> Vec<(Level, String)> {
    let me = thread::current().id();
    let mut records = LOGGER.records.lock().unwrap();
    let (mine, others): (Vec<_>, Vec<_>) = records.drain(..).partition(|(id, _, _)| *id == me);
    *records = others;
    mine.into_iter().map(|(_, level, msg)| (level, msg)).collect()
}

/// Messages logged at `level` by the current thread
pub fn messages_at(level: Level) -> Vec<String> {
    take().into_iter().filter(|(l, _)| *l == level).map(|(_, msg)| msg).collect()
}
