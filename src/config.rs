use std::fs::File;
use std::io as std_io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logging;
use crate::syntax::transition::SystemKind;

/// Run configuration for oracle generation.
///
/// ```json
/// {"system": "Cov3", "verify": true, "log": {"level": "debug", "target": "stderr"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub system: SystemKind,
    /// Check that each generated sequence rebuilds the gold arcs.
    pub verify: bool,
    pub log: logging::Config,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            system: SystemKind::Covington,
            verify: true,
            log: logging::Config::default(),
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> std_io::Result<Self> {
        serde_json::from_str(s).map_err(|e| std_io::Error::new(std_io::ErrorKind::InvalidData, e))
    }

    pub fn from_reader<R: std_io::Read>(reader: R) -> std_io::Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| std_io::Error::new(std_io::ErrorKind::InvalidData, e))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> std_io::Result<Self> {
        Config::from_reader(std_io::BufReader::new(File::open(path)?))
    }
}
