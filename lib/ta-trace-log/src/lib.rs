// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `log` backend for trusted applications.
//!
//! The runtime owns the actual trace channel, so the logger only holds a
//! sink function it was handed at start-up and forwards formatted records
//! to it.

#![no_std]

use core::cell::{Cell, OnceCell};
use core::fmt;
use critical_section::Mutex;
use log::{Level, Metadata, Record};

/// Receives one formatted record, newline included.
pub type TraceSink = fn(fmt::Arguments<'_>);

static LOGGER: TraceLogger = TraceLogger::new();

struct TraceLogger {
    sink: Mutex<Cell<Option<TraceSink>>>,
    level: Mutex<OnceCell<Level>>,
}

impl TraceLogger {
    const fn new() -> Self {
        TraceLogger {
            sink: Mutex::new(Cell::new(None)),
            level: Mutex::new(OnceCell::new()),
        }
    }
}

impl log::Log for TraceLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        critical_section::with(|cs| {
            metadata.level()
                <= self.level.borrow(cs).get().cloned().unwrap_or(Level::Info)
        })
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Copy the sink out so it runs outside the critical section.
        let sink = critical_section::with(|cs| self.sink.borrow(cs).get());
        if let Some(sink) = sink {
            sink(format_args!(
                "[{}] - {}: {}\n",
                record.level(),
                record.target(),
                record.args()
            ));
        }
    }

    fn flush(&self) {}
}

/// Installs the logger. The level is fixed by the first call; later calls
/// only replace the sink and report that a logger is already set.
pub fn init(sink: TraceSink, level: Level) -> Result<(), log::SetLoggerError> {
    critical_section::with(|cs| {
        LOGGER.sink.borrow(cs).set(Some(sink));
        LOGGER.level.borrow(cs).set(level).ok();
    });
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level.to_level_filter()))
}
