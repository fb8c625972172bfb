use std::path::Path;

use serde::{Deserialize, Serialize};

/// Simulation tuning knobs, loadable from a JSON file. Missing fields
/// fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
  /// Chance of a catastrophic failure on touchdown.
  pub crash_chance: f32,
  /// Chance when a large aircraft lands on a short-strip airport.
  pub short_strip_crash_chance: f32,

  /// Ticks spent loading at a terminal or helipad before departure.
  pub load_ticks: u32,
  /// Ticks spent being serviced in a hangar.
  pub service_ticks: u32,
  /// Ticks a wreck stays on the field before it is cleared.
  pub wreck_ticks: u32,
}

impl Default for Tuning {
  fn default() -> Self {
    Self {
      crash_chance: 0.0004,
      short_strip_crash_chance: 0.05,

      load_ticks: 90,
      service_ticks: 240,
      wreck_ticks: 600,
    }
  }
}

impl Tuning {
  pub fn from_path<T>(path: T) -> Result<Self, String>
  where
    T: AsRef<Path>,
  {
    let path = path.as_ref();
    let tuning = std::fs::read_to_string(path);
    match tuning {
      Ok(tuning) => match serde_json::from_str(&tuning) {
        Ok(tuning) => Ok(tuning),
        Err(err) => Err(format!("Failed to parse tuning file: {}", err)),
      },
      Err(err) => Err(format!("Failed to read tuning file: {}", err)),
    }
  }
}
