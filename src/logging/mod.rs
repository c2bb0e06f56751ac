use std::fs::{File, OpenOptions};
use std::io as std_io;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
pub use slog::FilterLevel as Level;
use slog::{Discard, Drain, Duplicate, Fuse, Level as LogLevel, LevelFilter, Logger, OwnedKV,
           SendSyncRefUnwindSafeKV};
use slog_async::Async;
use slog_term::{CompactFormat, Decorator, FullFormat, PlainDecorator, TermDecorator};
use thiserror::Error;

#[derive(Debug)]
pub enum Stream {
    StdOut,
    StdErr,
    File(File),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Full,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Stdout,
    Stderr,
    Null,
}

#[derive(Debug)]
pub struct LoggerBuilder {
    stream: Stream,
    level: Level,
    format: Format,
}

impl LoggerBuilder {
    pub fn new(stream: Stream) -> Self {
        LoggerBuilder {
            stream,
            level: Level::Info,
            format: Format::Full,
        }
    }

    pub fn level(mut self, l: Level) -> Self {
        self.level = l;
        self
    }

    pub fn format(mut self, f: Format) -> Self {
        self.format = f;
        self
    }

    pub fn build<T>(self, values: OwnedKV<T>) -> Result<Logger, Error>
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        match self.build_drain()? {
            Some(drain) => Ok(Logger::root(drain.fuse(), values)),
            None => Ok(Logger::root(Discard, values)),
        }
    }

    /// Builds a logger writing to both streams.
    pub fn build_with<T>(self, other: LoggerBuilder, values: OwnedKV<T>) -> Result<Logger, Error>
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        let logger = match (self.build_drain()?, other.build_drain()?) {
            (Some(d1), Some(d2)) => Logger::root(Duplicate::new(d1, d2).fuse(), values),
            (Some(d), None) | (None, Some(d)) => Logger::root(d.fuse(), values),
            (None, None) => Logger::root(Discard, values),
        };
        Ok(logger)
    }

    fn build_drain(&self) -> Result<Option<LevelFilter<Fuse<Async>>>, Error> {
        let level = match LogLevel::from_usize(self.level.as_usize()) {
            Some(level) => level,
            None => return Ok(None),
        };
        let drain = match self.stream {
            Stream::StdOut => {
                self.build_drain_from_decorator(TermDecorator::new().stdout().build(), level)
            }
            Stream::StdErr => {
                self.build_drain_from_decorator(TermDecorator::new().stderr().build(), level)
            }
            Stream::File(ref f) => {
                self.build_drain_from_decorator(PlainDecorator::new(f.try_clone()?), level)
            }
            Stream::Null => return Ok(None),
        };
        Ok(Some(drain))
    }

    fn build_drain_from_decorator<D: Decorator + Send + 'static>(
        &self,
        decorator: D,
        level: LogLevel,
    ) -> LevelFilter<Fuse<Async>> {
        let drain = match self.format {
            Format::Compact => {
                let drain = CompactFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
            Format::Full => {
                let drain = FullFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
        };
        LevelFilter::new(drain.fuse(), level)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid logging option: {0}")]
    InvalidOption(String),
    #[error(transparent)]
    Io(#[from] std_io::Error),
}

/// Logging section of the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Level for the terminal stream: `off`, `critical`, `error`, `warning`, `info`,
    /// `debug` or `trace`.
    pub level: String,
    pub target: Target,
    pub format: Format,
    /// Optional file receiving a plain copy of the log at `file_level`.
    pub logfile: Option<PathBuf>,
    pub file_level: String,
    /// `a` appends to `logfile`, `w` truncates it.
    pub filemode: char,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            level: "info".to_string(),
            target: Target::Stderr,
            format: Format::Compact,
            logfile: None,
            file_level: "debug".to_string(),
            filemode: 'a',
        }
    }
}

pub fn parse_level(s: &str) -> Result<Level, Error> {
    Level::from_str(s).map_err(|_| Error::InvalidOption(format!("unknown level `{}`", s)))
}

pub fn create_logger(config: &Config) -> Result<Logger, Error> {
    create_logger_with_kv(config, o!())
}

pub fn create_logger_with_kv<T>(config: &Config, values: OwnedKV<T>) -> Result<Logger, Error>
where
    T: SendSyncRefUnwindSafeKV + 'static,
{
    let stream = match config.target {
        Target::Stdout => Stream::StdOut,
        Target::Stderr => Stream::StdErr,
        Target::Null => Stream::Null,
    };
    let terminal = LoggerBuilder::new(stream)
        .level(parse_level(&config.level)?)
        .format(config.format);
    let path = match config.logfile {
        Some(ref path) => path,
        None => return terminal.build(values),
    };
    let mut options = OpenOptions::new();
    options.create(true).write(true);
    match config.filemode {
        'a' => options.append(true),
        'w' => options.truncate(true),
        mode => {
            return Err(Error::InvalidOption(format!("unknown file mode `{}`", mode)));
        }
    };
    let file = LoggerBuilder::new(Stream::File(options.open(path)?))
        .level(parse_level(&config.file_level)?)
        .format(Format::Full);
    terminal.build_with(file, values)
}
