pub mod events;
pub mod motion;
pub mod state;

use glam::Vec2;
use internment::Intern;
use serde::{Deserialize, Serialize};
use turborand::{rng::Rng, TurboRand};

use crate::{
  cruise_altitude,
  entities::{airport::Airport, order::Schedule},
  geometry::Facing,
  layout::{AirportLayout, Heading},
  OwnerId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AircraftCategory {
  SmallPlane,
  LargePlane,
  Helicopter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubUnitKind {
  Shadow,
  Rotor,
}

/// A render-only part that rides along with the aircraft: its ground
/// shadow and, for helicopters, the rotor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubUnit {
  pub kind: SubUnitKind,
  pub z: f32,
  pub frame: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AircraftCondition {
  Active,
  /// Burnt out on the field; cleared after a while.
  Wrecked { age: u32 },
}

/// Where the aircraft is on its target airport's ground automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundState {
  pub pos: u8,
  pub previous_pos: u8,
  pub state: Heading,
  pub target_airport: Intern<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
  pub id: Intern<String>,
  pub category: AircraftCategory,
  pub owner: OwnerId,

  pub pos: Vec2,
  pub z: f32,
  pub facing: Facing,
  pub cur_speed: f32,
  /// Fractional movement carried over to the next tick.
  pub subspeed: f32,

  pub ground: GroundState,
  pub schedule: Schedule,
  pub condition: AircraftCondition,

  pub load_ticks: u32,
  pub service_ticks: u32,

  pub sub_units: [SubUnit; 2],
}

impl Aircraft {
  pub fn new(
    id: Intern<String>,
    category: AircraftCategory,
    owner: OwnerId,
    target_airport: Intern<String>,
  ) -> Self {
    Self {
      id,
      category,
      owner,

      pos: Vec2::ZERO,
      z: 0.0,
      facing: Facing::North,
      cur_speed: 0.0,
      subspeed: 0.0,

      ground: GroundState {
        pos: 0,
        previous_pos: 0,
        state: Heading::Hangar,
        target_airport,
      },
      schedule: Schedule::default(),
      condition: AircraftCondition::Active,

      load_ticks: 0,
      service_ticks: 0,

      sub_units: [
        SubUnit {
          kind: SubUnitKind::Shadow,
          z: 0.0,
          frame: 0,
        },
        SubUnit {
          kind: SubUnitKind::Rotor,
          z: 0.0,
          frame: 0,
        },
      ],
    }
  }

  /// Spawn freshly built at `airport`: in the hangar when the class has
  /// one, otherwise inbound at a holding position.
  pub fn spawned(
    id: Intern<String>,
    category: AircraftCategory,
    owner: OwnerId,
    airport: &Airport,
    layout: &AirportLayout,
  ) -> Self {
    let mut aircraft = Self::new(id, category, owner, airport.id);

    let (position, state) = match layout.hangar_pos() {
      Some(hangar) => (hangar, Heading::Hangar),
      None => (layout.entry_points[0], Heading::Flying),
    };
    let step = layout.moving(position);

    aircraft.ground.pos = position;
    aircraft.ground.previous_pos = position;
    aircraft.ground.state = state;
    aircraft.pos = airport.origin + step.offset;
    aircraft.facing = step.facing;
    aircraft.z = match state {
      Heading::Flying => {
        layout.delta_z + cruise_altitude(step.facing, aircraft.max_speed())
      }
      _ => layout.delta_z,
    };

    aircraft
  }

  pub fn random_callsign(rng: &mut Rng) -> String {
    let mut string = String::new();
    let airlines = ["AAL", "SKW", "JBU"];

    let airline = rng.sample(&airlines).unwrap();

    string.push_str(airline);

    string.push_str(&rng.sample_iter(0..=9).unwrap().to_string());
    string.push_str(&rng.sample_iter(0..=9).unwrap().to_string());
    string.push_str(&rng.sample_iter(0..=9).unwrap().to_string());
    string.push_str(&rng.sample_iter(0..=9).unwrap().to_string());

    string
  }

  pub fn stop(&mut self) {
    self.cur_speed = 0.0;
    self.subspeed = 0.0;
  }

  pub fn is_helicopter(&self) -> bool {
    self.category == AircraftCategory::Helicopter
  }
}

// Performance stats
impl Aircraft {
  pub fn max_speed(&self) -> f32 {
    match self.category {
      AircraftCategory::SmallPlane => 16.0,
      AircraftCategory::LargePlane => 24.0,
      AircraftCategory::Helicopter => 12.0,
    }
  }

  pub fn acceleration(&self) -> f32 {
    match self.category {
      AircraftCategory::SmallPlane => 0.4,
      AircraftCategory::LargePlane => 0.3,
      AircraftCategory::Helicopter => 0.5,
    }
  }

  /// Large aircraft cannot safely use a short strip.
  pub fn needs_long_strip(&self) -> bool {
    self.category == AircraftCategory::LargePlane
  }

  /// Integrate speed towards `limit` and return the whole units to move
  /// this tick, banking the fractional remainder.
  pub fn update_speed(&mut self, limit: f32) -> f32 {
    let limit = limit.min(self.max_speed());
    if self.cur_speed < limit {
      self.cur_speed = (self.cur_speed + self.acceleration()).min(limit);
    } else {
      self.cur_speed = (self.cur_speed - self.acceleration() * 2.0).max(limit);
    }

    let total = self.cur_speed + self.subspeed;
    let advance = total.floor();
    self.subspeed = total - advance;

    advance
  }
}
