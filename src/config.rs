/*!
The persisted view.

A view is stored as a fixed 32-byte record in host byte order, with no
framing:

| offset | type  | field        |
|--------|-------|--------------|
| 0      | `u32` | version (1)  |
| 4      | `f64` | center x     |
| 12     | `f64` | center y     |
| 20     | `f64` | zoom         |
| 28     | `u32` | resolution   |

Records with any other version are rejected.
*/

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::debug;
use thiserror::Error;

use crate::viewport::{DEFAULT_CENTER, DEFAULT_MAX_ITERATIONS};

pub const VERSION: u32 = 1;
pub const RECORD_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported view record version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid {field} in view record")]
    InvalidValue { field: &'static str },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfig {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    /// Iteration budget.
    pub resolution: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            x: DEFAULT_CENTER.0,
            y: DEFAULT_CENTER.1,
            zoom: 1.0,
            resolution: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ViewConfig {
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut record = [0; RECORD_LEN];
        record[0..4].copy_from_slice(&VERSION.to_ne_bytes());
        record[4..12].copy_from_slice(&self.x.to_ne_bytes());
        record[12..20].copy_from_slice(&self.y.to_ne_bytes());
        record[20..28].copy_from_slice(&self.zoom.to_ne_bytes());
        record[28..32].copy_from_slice(&self.resolution.to_ne_bytes());
        record
    }

    pub fn from_bytes(record: &[u8; RECORD_LEN]) -> Result<Self, ConfigError> {
        let version = u32::from_ne_bytes(field(record, 0));
        if version != VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        let config = Self {
            x: f64::from_ne_bytes(field(record, 4)),
            y: f64::from_ne_bytes(field(record, 12)),
            zoom: f64::from_ne_bytes(field(record, 20)),
            resolution: u32::from_ne_bytes(field(record, 28)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ConfigError> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, ConfigError> {
        let mut record = [0; RECORD_LEN];
        reader.read_exact(&mut record)?;
        Self::from_bytes(&record)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        debug!("saving view to {}", path.display());
        self.write_to(BufWriter::new(File::create(path)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("loading view from {}", path.display());
        Self::read_from(BufReader::new(File::open(path)?))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.x.is_finite() {
            return Err(ConfigError::InvalidValue { field: "x" });
        }
        if !self.y.is_finite() {
            return Err(ConfigError::InvalidValue { field: "y" });
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(ConfigError::InvalidValue { field: "zoom" });
        }
        if self.resolution == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolution",
            });
        }
        Ok(())
    }
}

fn field<const LEN: usize>(record: &[u8; RECORD_LEN], offset: usize) -> [u8; LEN] {
    let mut bytes = [0; LEN];
    bytes.copy_from_slice(&record[offset..offset + LEN]);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_layout() {
        let config = ViewConfig {
            x: 0.25,
            y: -1.5,
            zoom: 1024.0,
            resolution: 500,
        };
        let bytes = config.to_bytes();
        assert_eq!(bytes[0..4], 1u32.to_ne_bytes());
        assert_eq!(bytes[4..12], 0.25f64.to_ne_bytes());
        assert_eq!(bytes[28..32], 500u32.to_ne_bytes());
        assert_eq!(ViewConfig::from_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn stream_round_trip() {
        let mut stored = Vec::new();
        ViewConfig::default().write_to(&mut stored).unwrap();
        assert_eq!(stored.len(), RECORD_LEN);
        let loaded = ViewConfig::read_from(stored.as_slice()).unwrap();
        assert_eq!(loaded, ViewConfig::default());
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let mut bytes = ViewConfig::default().to_bytes();
        bytes[0..4].copy_from_slice(&2u32.to_ne_bytes());
        assert!(matches!(
            ViewConfig::from_bytes(&bytes),
            Err(ConfigError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = ViewConfig {
            zoom: 0.0,
            ..ViewConfig::default()
        };
        assert!(matches!(
            ViewConfig::from_bytes(&config.to_bytes()),
            Err(ConfigError::InvalidValue { field: "zoom" })
        ));

        let config = ViewConfig {
            x: f64::NAN,
            ..ViewConfig::default()
        };
        assert!(matches!(
            ViewConfig::from_bytes(&config.to_bytes()),
            Err(ConfigError::InvalidValue { field: "x" })
        ));
    }

    #[test]
    fn truncated_records_are_io_errors() {
        let short = [0u8; 10];
        assert!(matches!(
            ViewConfig::read_from(&short[..]),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn save_and_load_a_file() {
        let path = std::env::temp_dir().join(format!("view-{}.bin", std::process::id()));
        let config = ViewConfig {
            x: 0.1,
            y: 0.2,
            zoom: 3.0,
            resolution: 42,
        };
        config.save(&path).unwrap();
        let loaded = ViewConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), config);
    }
}
