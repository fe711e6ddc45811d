//! Built-in example devices, parsed once from embedded JSON literals.

use crate::evaluator::Evaluator;
use crate::loader::ProgramLoader;
use crate::machine::Machine;
use crate::types::TuringError;
use log::warn;

/// Which kind of device a catalog literal describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Evaluator,
    Machine,
}

// Default embedded programs
const PROGRAM_TEXTS: [(&str, Kind, &str); 2] = [
    (
        "div3",
        Kind::Evaluator,
        include_str!("../programs/div3.json"),
    ),
    (
        "busy-beaver",
        Kind::Machine,
        include_str!("../programs/busy-beaver.json"),
    ),
];

/// A parsed catalog device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Device {
    Evaluator(Evaluator),
    Machine(Machine),
}

impl Device {
    /// Exports the device's canonical bitstring.
    pub fn export_as_binary(&self) -> Result<String, TuringError> {
        match self {
            Device::Evaluator(evaluator) => evaluator.export_as_binary(),
            Device::Machine(machine) => machine.export_as_binary(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub text: &'static str,
    pub device: Device,
}

/// The set of built-in devices.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

lazy_static::lazy_static! {
    pub static ref CATALOG: Catalog = Catalog::load();
}

impl Catalog {
    fn load() -> Self {
        let mut entries = Vec::new();

        for (name, kind, text) in PROGRAM_TEXTS {
            let device = match kind {
                Kind::Evaluator => ProgramLoader::load_evaluator_from_string(text).map(Device::Evaluator),
                Kind::Machine => ProgramLoader::load_machine_from_string(text).map(Device::Machine),
            };

            match device {
                Ok(device) => entries.push(CatalogEntry { name, text, device }),
                Err(e) => warn!("Failed to parse built-in program {}: {}", name, e),
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// List all program names
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    /// Get a program by its name
    pub fn get(&self, name: &str) -> Result<&CatalogEntry, TuringError> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| TuringError::ValidationError(format!("Program '{}' not found", name)))
    }

    pub fn evaluator(&self, name: &str) -> Result<&Evaluator, TuringError> {
        match &self.get(name)?.device {
            Device::Evaluator(evaluator) => Ok(evaluator),
            Device::Machine(_) => Err(TuringError::ValidationError(format!(
                "Program '{}' is a machine, not an evaluator",
                name
            ))),
        }
    }

    pub fn machine(&self, name: &str) -> Result<&Machine, TuringError> {
        match &self.get(name)?.device {
            Device::Machine(machine) => Ok(machine),
            Device::Evaluator(_) => Err(TuringError::ValidationError(format!(
                "Program '{}' is an evaluator, not a machine",
                name
            ))),
        }
    }
}
