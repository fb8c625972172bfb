use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub fn normalize_angle(angle: f32) -> f32 {
  (360.0 + angle) % 360.0
}

pub fn move_point(point: Vec2, degrees: f32, length: f32) -> Vec2 {
  // Convert degrees to radians
  let radians = degrees * (PI / 180.0);

  // Calculate x and y components
  let x = length * radians.sin();
  let y = length * radians.cos();

  point + Vec2::new(x, y)
}

/// Height above the field a descending aircraft should be at, given its
/// distance to the touchdown point (7 degree glideslope).
pub fn calculate_glide_altitude(distance: f32) -> f32 {
  let slope_radians = 7.0_f32.to_radians();
  distance * slope_radians.tan()
}

pub fn delta_angle(current: f32, target: f32) -> f32 {
  ((target - current + 540.0) % 360.0) - 180.0
}

pub fn angle_between_points(a: Vec2, b: Vec2) -> f32 {
  let dx = b.x - a.x;
  let dy = b.y - a.y;
  let angle = dx.atan2(dy).to_degrees();
  if angle < 0.0 { angle + 360.0 } else { angle }
}

/// Eight-way compass orientation. Zero degrees is north, clockwise.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Facing {
  #[default]
  North,
  Northeast,
  East,
  Southeast,
  South,
  Southwest,
  West,
  Northwest,
}

impl Facing {
  pub const ALL: [Facing; 8] = [
    Facing::North,
    Facing::Northeast,
    Facing::East,
    Facing::Southeast,
    Facing::South,
    Facing::Southwest,
    Facing::West,
    Facing::Northwest,
  ];

  pub fn to_degrees(self) -> f32 {
    match self {
      Facing::North => 0.0,
      Facing::Northeast => 45.0,
      Facing::East => 90.0,
      Facing::Southeast => 135.0,
      Facing::South => 180.0,
      Facing::Southwest => 225.0,
      Facing::West => 270.0,
      Facing::Northwest => 315.0,
    }
  }

  pub fn from_degrees(degrees: f32) -> Self {
    let index =
      (normalize_angle(degrees + 22.5) / 45.0).floor() as usize % Self::ALL.len();
    Self::ALL[index]
  }

  pub fn is_eastbound(self) -> bool {
    matches!(self, Facing::Northeast | Facing::East | Facing::Southeast)
  }

  /// One 45 degree step towards `target`, ties broken clockwise.
  pub fn rotate_toward(self, target: Facing) -> Self {
    let delta = delta_angle(self.to_degrees(), target.to_degrees());
    if delta == 0.0 {
      self
    } else if delta > 0.0 || delta == -180.0 {
      Self::from_degrees(self.to_degrees() + 45.0)
    } else {
      Self::from_degrees(self.to_degrees() - 45.0)
    }
  }
}

/// Which side of an airport an aircraft approaches from, as an index into
/// the layout's entry point table: north, east, south, west.
pub fn approach_quadrant(from: Vec2, airport_center: Vec2) -> usize {
  let bearing = normalize_angle(angle_between_points(airport_center, from));
  match bearing {
    b if !(45.0..315.0).contains(&b) => 0,
    b if b < 135.0 => 1,
    b if b < 225.0 => 2,
    _ => 3,
  }
}
