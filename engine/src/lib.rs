use serde::{Deserialize, Serialize};

pub mod blocks;
pub mod config;
pub mod entities;
pub mod geometry;
pub mod layout;
pub mod terminals;

pub const DEFAULT_TICK_RATE_TPS: usize = 30;

/// World units per map tile.
pub const TILE_UNITS: f32 = 64.0;

// Speeds are in world units per tick.
pub const MAX_TAXI_SPEED: f32 = 4.0;
pub const HOLD_SPEED: f32 = 24.0;
pub const APPROACH_SPEED: f32 = 12.0;

// Vertical rates, also in units per tick.
pub const CLIMB_RATE: f32 = 3.0;
pub const DESCENT_RATE: f32 = 2.0;
pub const HELI_VERTICAL_RATE: f32 = 2.0;

pub const HOLD_ALTITUDE: f32 = 120.0;
pub const HELI_HOVER_ALTITUDE: f32 = 48.0;
pub const MIN_CRUISE_ALTITUDE: f32 = 160.0;

/// Extra altitude for westbound traffic so that opposing streams stay
/// vertically separated while en route.
pub const WESTBOUND_CRUISE_OFFSET: f32 = 24.0;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct OwnerId(pub u8);

/// Cruise altitude for an aircraft, derived from its direction of travel
/// and its top speed. Faster aircraft fly higher.
pub fn cruise_altitude(facing: geometry::Facing, max_speed: f32) -> f32 {
  let separation = if facing.is_eastbound() {
    0.0
  } else {
    WESTBOUND_CRUISE_OFFSET
  };

  MIN_CRUISE_ALTITUDE + separation + max_speed * 2.0
}
