use glam::Vec2;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Facing;

pub(crate) mod data;

/// Terminal reservation bits occupy the low 8 bits of the block mask, one
/// per `Heading::Terminal(1..=8)`; raising the cap means shifting every
/// area block above.
pub const MAX_TERMINALS: u8 = 8;
/// Helipad bits sit directly above the terminal bits.
pub const MAX_HELIPADS: u8 = 4;

/// Reservation bit for terminal `index` (0-based).
pub const fn term_block(index: u8) -> u64 {
  1 << index
}

/// Reservation bit for helipad `index` (0-based).
pub const fn helipad_block(index: u8) -> u64 {
  1 << (MAX_TERMINALS + index)
}

// Area blocks shared by the class tables. A hangar has no block of its own:
// any number of aircraft may sit inside one.
pub const TAXI_A_BLOCK: u64 = 1 << 16;
pub const TAXI_B_BLOCK: u64 = 1 << 17;
pub const TAXI_C_BLOCK: u64 = 1 << 18;
pub const OUT_WAY_BLOCK: u64 = 1 << 19;
pub const RUNWAY_BLOCK: u64 = 1 << 20;
pub const IN_WAY_BLOCK: u64 = 1 << 21;
pub const PRE_PAD_BLOCK: u64 = 1 << 22;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum AirportClass {
  Airfield,
  Regional,
  Heliport,
  OilRig,
  Helistation,
}

impl AirportClass {
  pub const ALL: [AirportClass; 5] = [
    AirportClass::Airfield,
    AirportClass::Regional,
    AirportClass::Heliport,
    AirportClass::OilRig,
    AirportClass::Helistation,
  ];
}

/// What a class of airport can serve.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct ClassFlags(pub u8);

impl ClassFlags {
  pub const PLANES: Self = Self(1 << 0);
  pub const HELICOPTERS: Self = Self(1 << 1);
  /// Strip too short for large aircraft to land comfortably.
  pub const SHORT_STRIP: Self = Self(1 << 2);

  pub const fn with(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  pub fn planes(self) -> bool {
    self.0 & Self::PLANES.0 != 0
  }

  pub fn helicopters(self) -> bool {
    self.0 & Self::HELICOPTERS.0 != 0
  }

  pub fn short_strip(self) -> bool {
    self.0 & Self::SHORT_STRIP.0 != 0
  }
}

/// The state an aircraft is in on the ground automaton, doubling as the
/// heading label on automaton routes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Heading {
  Hangar,
  /// 1-based terminal number.
  Terminal(u8),
  /// 1-based helipad number.
  Helipad(u8),
  Takeoff,
  StartTakeoff,
  EndTakeoff,
  HeliTakeoff,
  Flying,
  Landing,
  EndLanding,
  HeliLanding,
  HeliEndLanding,
  /// Wildcard route taken when no alternative matches the aircraft state.
  /// Never a valid aircraft state.
  Any,
  /// Allocator dispatch marker carrying a group's gating block. Never
  /// routes an aircraft.
  Group,
}

/// One outgoing edge of an automaton node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
  pub heading: Heading,
  pub block: u64,
  pub next: u8,
}

/// An automaton node: its identity route (first row of the chain) plus any
/// further alternatives, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonPosition {
  pub position: u8,
  pub heading: Heading,
  pub block: u64,
  pub next: u8,
  pub alternatives: Vec<Route>,
}

impl AutomatonPosition {
  pub fn identity(&self) -> Route {
    Route {
      heading: self.heading,
      block: self.block,
      next: self.next,
    }
  }

  /// Identity route first, then the alternatives in table order.
  pub fn routes(&self) -> impl Iterator<Item = Route> + '_ {
    std::iter::once(self.identity()).chain(self.alternatives.iter().copied())
  }

  pub fn group_markers(&self) -> impl Iterator<Item = Route> + '_ {
    self
      .alternatives
      .iter()
      .copied()
      .filter(|route| route.heading == Heading::Group)
  }

  /// The route an aircraft in `state` takes out of this node. A node with
  /// a single route is traversed unconditionally; otherwise a matching
  /// heading wins over a wildcard, regardless of table order.
  pub fn select(&self, state: Heading) -> Option<Route> {
    if self.alternatives.is_empty() {
      return Some(self.identity());
    }

    self
      .routes()
      .filter(|route| route.heading != Heading::Group)
      .find(|route| route.heading == state)
      .or_else(|| self.routes().find(|route| route.heading == Heading::Any))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionFlags(pub u16);

impl MotionFlags {
  pub const NONE: Self = Self(0);
  /// Arrival requires the exact point and the step's facing.
  pub const EXACT_POS: Self = Self(1 << 0);
  /// Turn at most one compass step per tick.
  pub const SLOW_TURN: Self = Self(1 << 1);
  pub const TAKEOFF: Self = Self(1 << 2);
  pub const HOLD: Self = Self(1 << 3);
  pub const LAND: Self = Self(1 << 4);
  pub const BRAKE: Self = Self(1 << 5);
  pub const NO_SPEED_CLAMP: Self = Self(1 << 6);
  pub const HELI_RAISE: Self = Self(1 << 7);
  pub const HELI_LOWER: Self = Self(1 << 8);

  pub const fn with(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  pub const fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

/// Where an automaton position physically is, relative to the airport
/// origin, and how to move there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementStep {
  pub offset: Vec2,
  pub facing: Facing,
  pub flags: MotionFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
  #[error("{class:?}: automaton has no positions")]
  Empty { class: AirportClass },
  #[error("{class:?}: position {position} breaks the contiguous numbering")]
  NonContiguous { class: AirportClass, position: u8 },
  #[error(
    "{class:?}: position {position} routes to {next}, but the automaton has {size} positions"
  )]
  TransitionOutOfRange {
    class: AirportClass,
    position: u8,
    next: u8,
    size: u8,
  },
  #[error("{class:?}: a group marker opens the chain at position {position}")]
  GroupMarkerOpensChain { class: AirportClass, position: u8 },
  #[error(
    "{class:?}: the group marker at position {position} is not followed by a routing alternative"
  )]
  TrailingGroupMarker { class: AirportClass, position: u8 },
  #[error(
    "{class:?}: a wildcard alternative at position {position} shadows later alternatives"
  )]
  WildcardNotLast { class: AirportClass, position: u8 },
  #[error(
    "{class:?}: entry point {index} is position {position}, which is not a holding pattern node"
  )]
  BadEntryPoint {
    class: AirportClass,
    index: usize,
    position: u8,
  },
  #[error("{class:?}: {count} terminals exceed the supported maximum of {max}")]
  TooManyTerminals {
    class: AirportClass,
    count: u8,
    max: u8,
  },
  #[error("{class:?}: {count} helipads exceed the supported maximum of {max}")]
  TooManyHelipads {
    class: AirportClass,
    count: u8,
    max: u8,
  },
  #[error("{class:?}: terminal {index} is missing from the automaton")]
  MissingTerminal { class: AirportClass, index: u8 },
  #[error("{class:?}: helipad {index} is missing from the automaton")]
  MissingHelipad { class: AirportClass, index: u8 },
  #[error(
    "{class:?}: position {position} references terminal {index}, which the class does not have"
  )]
  TerminalIndexOutOfRange {
    class: AirportClass,
    position: u8,
    index: u8,
  },
  #[error(
    "{class:?}: position {position} references helipad {index}, which the class does not have"
  )]
  HelipadIndexOutOfRange {
    class: AirportClass,
    position: u8,
    index: u8,
  },
  #[error("{class:?}: moving table has {have} entries for {size} positions")]
  MovingDataMismatch {
    class: AirportClass,
    have: usize,
    size: u8,
  },
}

/// A fully built and validated ground-movement description for one airport
/// class. Built once at startup and shared by every airport of the class.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportLayout {
  pub class: AirportClass,
  pub positions: Vec<AutomatonPosition>,
  pub moving_data: &'static [MovementStep],
  /// Holding pattern nodes indexed by approach quadrant (N, E, S, W).
  pub entry_points: [u8; 4],
  /// Terminals per allocation group.
  pub terminal_counts: &'static [u8],
  /// Helipads per allocation group.
  pub helipad_counts: &'static [u8],
  pub flags: ClassFlags,
  /// Hangar door offsets from the airport origin.
  pub depots: &'static [Vec2],
  pub size_tiles: (u8, u8),
  pub noise: u8,
  /// Ground elevation of the field relative to the surrounding terrain.
  pub delta_z: f32,
}

impl AirportLayout {
  pub(crate) fn build(
    class: AirportClass,
    spec: &data::ClassSpec,
  ) -> Result<Self, LayoutError> {
    if spec.transitions.is_empty() {
      return Err(LayoutError::Empty { class });
    }

    let mut positions: Vec<AutomatonPosition> = Vec::new();
    for &(position, heading, block, next) in spec.transitions {
      match positions.last_mut() {
        Some(node) if node.position == position => {
          node.alternatives.push(Route {
            heading,
            block,
            next,
          });
        }
        _ => {
          if position as usize != positions.len() {
            return Err(LayoutError::NonContiguous { class, position });
          }
          if heading == Heading::Group {
            return Err(LayoutError::GroupMarkerOpensChain { class, position });
          }

          positions.push(AutomatonPosition {
            position,
            heading,
            block,
            next,
            alternatives: Vec::new(),
          });
        }
      }
    }

    let layout = Self {
      class,
      positions,
      moving_data: spec.moving,
      entry_points: spec.entry_points,
      terminal_counts: spec.terminal_counts,
      helipad_counts: spec.helipad_counts,
      flags: spec.flags,
      depots: spec.depots,
      size_tiles: spec.size_tiles,
      noise: spec.noise,
      delta_z: spec.delta_z,
    };
    layout.validate()?;

    Ok(layout)
  }

  fn validate(&self) -> Result<(), LayoutError> {
    let class = self.class;
    let size = self.size();
    let terminals = self.num_terminals();
    let helipads = self.num_helipads();

    if terminals > MAX_TERMINALS {
      return Err(LayoutError::TooManyTerminals {
        class,
        count: terminals,
        max: MAX_TERMINALS,
      });
    }
    if helipads > MAX_HELIPADS {
      return Err(LayoutError::TooManyHelipads {
        class,
        count: helipads,
        max: MAX_HELIPADS,
      });
    }

    for node in &self.positions {
      for route in node.routes() {
        if route.next >= size {
          return Err(LayoutError::TransitionOutOfRange {
            class,
            position: node.position,
            next: route.next,
            size,
          });
        }

        match route.heading {
          Heading::Terminal(index) if index == 0 || index > terminals => {
            return Err(LayoutError::TerminalIndexOutOfRange {
              class,
              position: node.position,
              index,
            });
          }
          Heading::Helipad(index) if index == 0 || index > helipads => {
            return Err(LayoutError::HelipadIndexOutOfRange {
              class,
              position: node.position,
              index,
            });
          }
          _ => {}
        }
      }

      if node.alternatives.last().map(|route| route.heading)
        == Some(Heading::Group)
      {
        return Err(LayoutError::TrailingGroupMarker {
          class,
          position: node.position,
        });
      }

      // A wildcard matches everything, so rows behind it are dead.
      if let Some(index) = node
        .alternatives
        .iter()
        .position(|route| route.heading == Heading::Any)
      {
        if index + 1 != node.alternatives.len() {
          return Err(LayoutError::WildcardNotLast {
            class,
            position: node.position,
          });
        }
      }
    }

    for (index, &position) in self.entry_points.iter().enumerate() {
      let holding = position < size
        && self.node(position).heading == Heading::Flying;
      if !holding {
        return Err(LayoutError::BadEntryPoint {
          class,
          index,
          position,
        });
      }
    }

    let headings = || {
      self
        .positions
        .iter()
        .flat_map(|node| node.routes())
        .map(|route| route.heading)
    };
    for index in 1..=terminals {
      if !headings().contains(&Heading::Terminal(index)) {
        return Err(LayoutError::MissingTerminal { class, index });
      }
    }
    for index in 1..=helipads {
      if !headings().contains(&Heading::Helipad(index)) {
        return Err(LayoutError::MissingHelipad { class, index });
      }
    }

    if self.moving_data.len() != size as usize {
      return Err(LayoutError::MovingDataMismatch {
        class,
        have: self.moving_data.len(),
        size,
      });
    }

    Ok(())
  }

  pub fn size(&self) -> u8 {
    self.positions.len() as u8
  }

  pub fn node(&self, position: u8) -> &AutomatonPosition {
    &self.positions[position as usize]
  }

  pub fn moving(&self, position: u8) -> &MovementStep {
    &self.moving_data[position as usize]
  }

  pub fn num_terminals(&self) -> u8 {
    self.terminal_counts.iter().sum()
  }

  pub fn num_helipads(&self) -> u8 {
    self.helipad_counts.iter().sum()
  }

  pub fn terminal_groups(&self) -> usize {
    self.terminal_counts.len()
  }

  pub fn helipad_groups(&self) -> usize {
    self.helipad_counts.len()
  }

  pub fn hangar_pos(&self) -> Option<u8> {
    self
      .positions
      .iter()
      .find(|node| node.heading == Heading::Hangar)
      .map(|node| node.position)
  }

  pub fn has_depot(&self) -> bool {
    !self.depots.is_empty()
  }

  pub fn footprint(&self) -> Vec2 {
    Vec2::new(
      self.size_tiles.0 as f32 * crate::TILE_UNITS,
      self.size_tiles.1 as f32 * crate::TILE_UNITS,
    )
  }
}

/// Registry of the built layouts, one per airport class.
#[derive(Debug, Clone, PartialEq)]
pub struct Layouts {
  by_class: Vec<AirportLayout>,
}

impl Layouts {
  pub fn build_all() -> Result<Self, LayoutError> {
    let mut by_class = Vec::with_capacity(AirportClass::ALL.len());
    for class in AirportClass::ALL {
      by_class.push(AirportLayout::build(class, data::spec_for(class))?);
    }

    Ok(Self { by_class })
  }

  pub fn get(&self, class: AirportClass) -> &AirportLayout {
    &self.by_class[class as usize]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn minimal_moving() -> &'static [MovementStep] {
    &[
      MovementStep {
        offset: Vec2::ZERO,
        facing: Facing::North,
        flags: MotionFlags::NONE,
      },
      MovementStep {
        offset: Vec2::ZERO,
        facing: Facing::North,
        flags: MotionFlags::HOLD,
      },
    ]
  }

  fn build(
    transitions: &'static [(u8, Heading, u64, u8)],
    entry_points: [u8; 4],
  ) -> Result<AirportLayout, LayoutError> {
    AirportLayout::build(
      AirportClass::Heliport,
      &data::ClassSpec {
        transitions,
        moving: minimal_moving(),
        entry_points,
        terminal_counts: &[],
        helipad_counts: &[],
        flags: ClassFlags::HELICOPTERS,
        depots: &[],
        size_tiles: (1, 1),
        noise: 1,
        delta_z: 0.0,
      },
    )
  }

  mod build_all {
    use super::*;

    #[test]
    fn test_all_classes_validate() {
      let layouts = Layouts::build_all().unwrap();
      for class in AirportClass::ALL {
        assert_eq!(layouts.get(class).class, class);
      }
    }

    #[test]
    fn test_entry_points_are_holding_nodes() {
      let layouts = Layouts::build_all().unwrap();
      for class in AirportClass::ALL {
        let layout = layouts.get(class);
        for &entry in layout.entry_points.iter() {
          assert_eq!(layout.node(entry).heading, Heading::Flying);
        }
      }
    }

    #[test]
    fn test_moving_tables_match() {
      let layouts = Layouts::build_all().unwrap();
      for class in AirportClass::ALL {
        let layout = layouts.get(class);
        assert_eq!(layout.moving_data.len(), layout.size() as usize);
      }
    }

    #[test]
    fn test_depot_classes() {
      let layouts = Layouts::build_all().unwrap();
      assert!(layouts.get(AirportClass::Airfield).has_depot());
      assert!(layouts.get(AirportClass::Regional).has_depot());
      assert!(layouts.get(AirportClass::Helistation).has_depot());
      assert!(!layouts.get(AirportClass::Heliport).has_depot());
      assert!(!layouts.get(AirportClass::OilRig).has_depot());
    }
  }

  mod validate {
    use super::*;

    #[test]
    fn test_non_contiguous() {
      let result = build(
        &[(0, Heading::Flying, 0, 1), (2, Heading::Flying, 0, 0)],
        [0, 0, 0, 0],
      );
      assert_eq!(
        result,
        Err(LayoutError::NonContiguous {
          class: AirportClass::Heliport,
          position: 2
        })
      );
    }

    #[test]
    fn test_transition_out_of_range() {
      let result = build(
        &[(0, Heading::Flying, 0, 1), (1, Heading::Flying, 0, 7)],
        [0, 0, 0, 0],
      );
      assert_eq!(
        result,
        Err(LayoutError::TransitionOutOfRange {
          class: AirportClass::Heliport,
          position: 1,
          next: 7,
          size: 2
        })
      );
    }

    #[test]
    fn test_group_marker_opens_chain() {
      let result = build(
        &[(0, Heading::Flying, 0, 1), (1, Heading::Group, 1, 0)],
        [0, 0, 0, 0],
      );
      assert_eq!(
        result,
        Err(LayoutError::GroupMarkerOpensChain {
          class: AirportClass::Heliport,
          position: 1
        })
      );
    }

    #[test]
    fn test_trailing_group_marker() {
      let result = build(
        &[
          (0, Heading::Flying, 0, 1),
          (0, Heading::Group, 1, 1),
          (1, Heading::Flying, 0, 0),
        ],
        [0, 0, 0, 0],
      );
      assert_eq!(
        result,
        Err(LayoutError::TrailingGroupMarker {
          class: AirportClass::Heliport,
          position: 0
        })
      );
    }

    #[test]
    fn test_wildcard_not_last() {
      let result = build(
        &[
          (0, Heading::Flying, 0, 1),
          (0, Heading::Any, 0, 1),
          (0, Heading::HeliLanding, 0, 1),
          (1, Heading::Flying, 0, 0),
        ],
        [0, 0, 0, 0],
      );
      assert_eq!(
        result,
        Err(LayoutError::WildcardNotLast {
          class: AirportClass::Heliport,
          position: 0
        })
      );
    }

    #[test]
    fn test_bad_entry_point() {
      let result = build(
        &[(0, Heading::Hangar, 0, 1), (1, Heading::Flying, 0, 0)],
        [1, 1, 0, 1],
      );
      assert_eq!(
        result,
        Err(LayoutError::BadEntryPoint {
          class: AirportClass::Heliport,
          index: 2,
          position: 0
        })
      );
    }

    #[test]
    fn test_terminal_index_out_of_range() {
      let result = build(
        &[(0, Heading::Terminal(1), 1, 1), (1, Heading::Flying, 0, 0)],
        [1, 1, 1, 1],
      );
      assert_eq!(
        result,
        Err(LayoutError::TerminalIndexOutOfRange {
          class: AirportClass::Heliport,
          position: 0,
          index: 1
        })
      );
    }
  }

  mod select {
    use super::*;

    fn junction() -> AutomatonPosition {
      AutomatonPosition {
        position: 1,
        heading: Heading::Any,
        block: TAXI_A_BLOCK,
        next: 5,
        alternatives: vec![
          Route {
            heading: Heading::Hangar,
            block: 0,
            next: 0,
          },
          Route {
            heading: Heading::Terminal(1),
            block: term_block(0),
            next: 2,
          },
        ],
      }
    }

    #[test]
    fn test_specific_heading_beats_wildcard() {
      let node = junction();
      let route = node.select(Heading::Terminal(1)).unwrap();
      assert_eq!(route.next, 2);
    }

    #[test]
    fn test_wildcard_catches_the_rest() {
      let node = junction();
      let route = node.select(Heading::Takeoff).unwrap();
      assert_eq!(route.next, 5);
    }

    #[test]
    fn test_single_route_is_unconditional() {
      let node = AutomatonPosition {
        position: 2,
        heading: Heading::Terminal(1),
        block: term_block(0),
        next: 1,
        alternatives: vec![],
      };
      let route = node.select(Heading::Takeoff).unwrap();
      assert_eq!(route.next, 1);
    }

    #[test]
    fn test_group_marker_never_routes() {
      let node = AutomatonPosition {
        position: 0,
        heading: Heading::Hangar,
        block: 0,
        next: 1,
        alternatives: vec![
          Route {
            heading: Heading::Group,
            block: TAXI_A_BLOCK,
            next: 1,
          },
          Route {
            heading: Heading::Any,
            block: 0,
            next: 1,
          },
        ],
      };
      let route = node.select(Heading::Group);
      // A group marker matches only via the wildcard.
      assert_eq!(route.map(|r| r.heading), Some(Heading::Any));
    }
  }
}
