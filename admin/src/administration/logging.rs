use log::{Level, Log, Metadata, Record};
use std::fmt;

const TARGET: &str = "sbadmin::administration";

/// Logging port handed to the pager and the client.
///
/// Defaults to the process-wide `log` facade; tests and embedders can route
/// records to their own sink instead.
#[derive(Clone, Copy)]
pub struct Logger {
    /// `None` resolves `log::logger()` on every record, so a logger installed
    /// after the client was built still receives its output.
    sink: Option<&'static dyn Log>,
}

impl Logger {
    /// Forward to whatever logger the process installed via `log::set_logger`.
    pub fn global() -> Self {
        Self { sink: None }
    }

    pub fn new(sink: &'static dyn Log) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let sink = match self.sink {
            Some(sink) => sink,
            None if level > log::max_level() => return,
            None => log::logger(),
        };
        let metadata = Metadata::builder().level(level).target(TARGET).build();
        if !sink.enabled(&metadata) {
            return;
        }
        sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("global", &self.sink.is_none())
            .finish()
    }
}
