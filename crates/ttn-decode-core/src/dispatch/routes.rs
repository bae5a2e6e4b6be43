use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

use crate::codecs::{DeviceModel, ParseModelError};

/// Port used by LHT52 devices for temperature/humidity uplinks.
pub const LHT52_DEFAULT_PORT: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("invalid route '{value}': expected PORT=MODEL")]
    MissingSeparator { value: String },
    #[error("invalid route port '{value}': expected 0-255")]
    InvalidPort { value: String },
    #[error(transparent)]
    UnknownModel(#[from] ParseModelError),
}

/// A single `PORT=MODEL` mapping.
///
/// # Examples
/// ```
/// use ttn_decode_core::{DeviceModel, RouteEntry};
///
/// let entry: RouteEntry = "10=lwl02".parse()?;
/// assert_eq!(entry.port, 10);
/// assert_eq!(entry.model, DeviceModel::Lwl02);
/// # Ok::<(), ttn_decode_core::RouteTableError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub port: u8,
    pub model: DeviceModel,
}

impl FromStr for RouteEntry {
    type Err = RouteTableError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (port, model) = value
            .split_once('=')
            .ok_or_else(|| RouteTableError::MissingSeparator {
                value: value.to_string(),
            })?;
        let port = port
            .trim()
            .parse::<u8>()
            .map_err(|_| RouteTableError::InvalidPort {
                value: port.trim().to_string(),
            })?;
        let model = model.parse::<DeviceModel>()?;
        Ok(Self { port, model })
    }
}

/// How a codec was chosen for an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The port is mapped to this model; decode failures are real failures.
    Explicit(DeviceModel),
    /// No mapping; the fallback model is tried and failures mean "not ours".
    Fallback(DeviceModel),
}

/// Explicit port to codec mapping, with an optional fallback codec.
///
/// The default table maps port 2 to the LHT52 codec and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    ports: BTreeMap<u8, DeviceModel>,
    fallback: Option<DeviceModel>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::empty().with_route(LHT52_DEFAULT_PORT, DeviceModel::Lht52)
    }
}

impl RouteTable {
    pub fn empty() -> Self {
        Self {
            ports: BTreeMap::new(),
            fallback: None,
        }
    }

    /// Build a table from entries; a later entry for the same port wins.
    pub fn from_entries(entries: impl IntoIterator<Item = RouteEntry>) -> Self {
        entries.into_iter().fold(Self::empty(), |table, entry| {
            table.with_route(entry.port, entry.model)
        })
    }

    pub fn with_route(mut self, port: u8, model: DeviceModel) -> Self {
        self.ports.insert(port, model);
        self
    }

    pub fn with_fallback(mut self, model: DeviceModel) -> Self {
        self.fallback = Some(model);
        self
    }

    pub fn fallback(&self) -> Option<DeviceModel> {
        self.fallback
    }

    pub fn entries(&self) -> impl Iterator<Item = RouteEntry> + '_ {
        self.ports
            .iter()
            .map(|(&port, &model)| RouteEntry { port, model })
    }

    pub fn select(&self, port: u8) -> Option<Selection> {
        match self.ports.get(&port) {
            Some(&model) => Some(Selection::Explicit(model)),
            None => self.fallback.map(Selection::Fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_maps_only_lht52_port() {
        let table = RouteTable::default();
        assert_eq!(
            table.select(LHT52_DEFAULT_PORT),
            Some(Selection::Explicit(DeviceModel::Lht52))
        );
        assert_eq!(table.select(10), None);
        assert_eq!(table.entries().count(), 1);
    }

    #[test]
    fn fallback_covers_unmapped_ports() {
        let table = RouteTable::empty()
            .with_route(10, DeviceModel::Lwl02)
            .with_fallback(DeviceModel::Lht52);
        assert_eq!(table.select(10), Some(Selection::Explicit(DeviceModel::Lwl02)));
        assert_eq!(table.select(2), Some(Selection::Fallback(DeviceModel::Lht52)));
    }

    #[test]
    fn later_entries_override_earlier() {
        let entries = ["2=lht52", "2=lwl02"]
            .iter()
            .map(|s| s.parse::<RouteEntry>().unwrap());
        let table = RouteTable::from_entries(entries);
        assert_eq!(table.select(2), Some(Selection::Explicit(DeviceModel::Lwl02)));
    }

    #[test]
    fn entry_parse_errors() {
        assert_eq!(
            "2:lht52".parse::<RouteEntry>().unwrap_err(),
            RouteTableError::MissingSeparator {
                value: "2:lht52".to_string()
            }
        );
        assert_eq!(
            "256=lht52".parse::<RouteEntry>().unwrap_err(),
            RouteTableError::InvalidPort {
                value: "256".to_string()
            }
        );
        let err = "2=unknown".parse::<RouteEntry>().unwrap_err();
        assert!(matches!(err, RouteTableError::UnknownModel(_)));
        assert!(err.to_string().contains("unknown device model"));
    }
}
