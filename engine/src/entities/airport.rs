use glam::Vec2;
use internment::Intern;
use serde::{Deserialize, Serialize};

use crate::{blocks::BlockReservationTable, layout::AirportClass, OwnerId};

/// A live airport on the map: class metadata plus the mutable occupancy
/// state its aircraft coordinate through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
  pub id: Intern<String>,
  pub class: AirportClass,
  /// World position of the field's southwest corner.
  pub origin: Vec2,
  pub owner: OwnerId,
  pub blocks: BlockReservationTable,
  /// Latched when the first aircraft ever docks at a stand here.
  pub visited: bool,
}

impl Airport {
  pub fn new(
    id: Intern<String>,
    class: AirportClass,
    origin: Vec2,
    owner: OwnerId,
  ) -> Self {
    Self {
      id,
      class,
      origin,
      owner,
      blocks: BlockReservationTable::default(),
      visited: false,
    }
  }

  pub fn is_usable_by(&self, owner: OwnerId) -> bool {
    self.owner == owner
  }
}
