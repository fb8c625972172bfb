//! Static ground-movement tables, one set per airport class.
//!
//! Each transition row is `(position, heading, block, next)`. The first row
//! of a position is the node's identity; later rows are alternatives tried
//! against the aircraft state. Movement steps are offsets from the airport
//! origin, with north as positive y.

use glam::Vec2;

use super::{
  AirportClass, ClassFlags, Heading, MotionFlags, MovementStep, helipad_block,
  term_block, IN_WAY_BLOCK, OUT_WAY_BLOCK, PRE_PAD_BLOCK, RUNWAY_BLOCK,
  TAXI_A_BLOCK, TAXI_B_BLOCK, TAXI_C_BLOCK,
};
use crate::geometry::Facing;
use Facing::{East, North, South, West};
use Heading::*;

pub(crate) struct ClassSpec {
  pub transitions: &'static [(u8, Heading, u64, u8)],
  pub moving: &'static [MovementStep],
  pub entry_points: [u8; 4],
  pub terminal_counts: &'static [u8],
  pub helipad_counts: &'static [u8],
  pub flags: ClassFlags,
  pub depots: &'static [Vec2],
  pub size_tiles: (u8, u8),
  pub noise: u8,
  pub delta_z: f32,
}

pub(crate) fn spec_for(class: AirportClass) -> &'static ClassSpec {
  match class {
    AirportClass::Airfield => &AIRFIELD,
    AirportClass::Regional => &REGIONAL,
    AirportClass::Heliport => &HELIPORT,
    AirportClass::OilRig => &OIL_RIG,
    AirportClass::Helistation => &HELISTATION,
  }
}

const TERM1: u64 = term_block(0);
const TERM2: u64 = term_block(1);
const TERM3: u64 = term_block(2);
const TERM4: u64 = term_block(3);
const TERM5: u64 = term_block(4);
const TERM6: u64 = term_block(5);
const PAD1: u64 = helipad_block(0);
const PAD2: u64 = helipad_block(1);

const fn step(x: f32, y: f32, facing: Facing, flags: MotionFlags) -> MovementStep {
  MovementStep {
    offset: Vec2::new(x, y),
    facing,
    flags,
  }
}

// Flag combinations shared by the moving tables.
const EXACT: MotionFlags = MotionFlags::EXACT_POS;
const TAXI_TURN: MotionFlags =
  MotionFlags::EXACT_POS.with(MotionFlags::SLOW_TURN);
const CLIMB_OUT: MotionFlags =
  MotionFlags::TAKEOFF.with(MotionFlags::NO_SPEED_CLAMP);
const CIRCLE: MotionFlags = MotionFlags::HOLD
  .with(MotionFlags::NO_SPEED_CLAMP)
  .with(MotionFlags::SLOW_TURN);
const GLIDE: MotionFlags = MotionFlags::LAND
  .with(MotionFlags::NO_SPEED_CLAMP)
  .with(MotionFlags::SLOW_TURN);
const HOVER: MotionFlags =
  MotionFlags::NO_SPEED_CLAMP.with(MotionFlags::SLOW_TURN);

/// Small field: one short runway, three terminals on one taxi loop, no
/// helipads (helicopters set down on the apron and use a terminal).
static AIRFIELD: ClassSpec = ClassSpec {
  transitions: &[
    (0, Hangar, 0, 1),
    // east junction
    (1, Any, TAXI_A_BLOCK, 5),
    (1, Hangar, 0, 0),
    (1, Terminal(1), TERM1, 2),
    (1, HeliTakeoff, 0, 10),
    (2, Terminal(1), TERM1, 1),
    (3, Terminal(2), TERM2, 5),
    (4, Terminal(3), TERM3, 5),
    // west junction
    (5, Any, TAXI_B_BLOCK, 6),
    (5, Hangar, 0, 1),
    (5, Terminal(1), 0, 1),
    (5, Terminal(2), TERM2, 3),
    (5, Terminal(3), TERM3, 4),
    (5, HeliTakeoff, 0, 10),
    // hold short of the runway
    (6, Any, OUT_WAY_BLOCK, 7),
    (7, Takeoff, RUNWAY_BLOCK, 8),
    (8, StartTakeoff, RUNWAY_BLOCK, 9),
    (9, EndTakeoff, 0, 11),
    (10, HeliTakeoff, 0, 11),
    // holding pattern, clockwise
    (11, Flying, 0, 12),
    (11, Landing, 0, 15),
    (11, HeliLanding, 0, 17),
    (12, Flying, 0, 13),
    (12, Landing, 0, 15),
    (12, HeliLanding, 0, 17),
    (13, Flying, 0, 14),
    (13, Landing, 0, 15),
    (13, HeliLanding, 0, 17),
    (14, Flying, 0, 11),
    (14, Landing, 0, 15),
    (14, HeliLanding, 0, 17),
    (15, Landing, RUNWAY_BLOCK, 16),
    (16, EndLanding, IN_WAY_BLOCK, 1),
    (17, HeliLanding, 0, 18),
    (18, HeliEndLanding, TAXI_B_BLOCK, 5),
  ],
  moving: &[
    step(208.0, 168.0, South, EXACT),
    step(176.0, 88.0, West, TAXI_TURN),
    step(176.0, 168.0, North, EXACT),
    step(128.0, 168.0, North, EXACT),
    step(80.0, 168.0, North, EXACT),
    step(104.0, 88.0, West, TAXI_TURN),
    step(32.0, 88.0, South, TAXI_TURN),
    step(24.0, 24.0, East, TAXI_TURN),
    step(136.0, 24.0, East, CLIMB_OUT),
    step(420.0, 24.0, East, CLIMB_OUT),
    step(104.0, 88.0, North, MotionFlags::HELI_RAISE),
    step(128.0, 600.0, East, CIRCLE),
    step(600.0, 96.0, South, CIRCLE),
    step(128.0, -400.0, West, CIRCLE),
    step(-400.0, 96.0, North, CIRCLE),
    step(-220.0, 24.0, East, GLIDE),
    step(112.0, 24.0, East, MotionFlags::BRAKE),
    step(104.0, 152.0, South, HOVER),
    step(104.0, 152.0, South, MotionFlags::HELI_LOWER),
  ],
  entry_points: [11, 12, 13, 14],
  terminal_counts: &[3],
  helipad_counts: &[],
  flags: ClassFlags::PLANES
    .with(ClassFlags::HELICOPTERS)
    .with(ClassFlags::SHORT_STRIP),
  depots: &[Vec2::new(208.0, 168.0)],
  size_tiles: (4, 3),
  noise: 3,
  delta_z: 0.0,
};

/// Mid-size commercial airport: six terminals in two groups behind separate
/// taxiways, two helipads, a full runway with a dedicated exit.
static REGIONAL: ClassSpec = ClassSpec {
  transitions: &[
    (0, Hangar, 0, 1),
    (0, Group, TAXI_A_BLOCK, 1),
    (0, Group, TAXI_B_BLOCK, 5),
    (0, Any, 0, 1),
    // junction A: terminals 1-3
    (1, Any, TAXI_A_BLOCK, 5),
    (1, Hangar, 0, 0),
    (1, Terminal(1), TERM1, 2),
    (1, Terminal(2), TERM2, 3),
    (1, Terminal(3), TERM3, 4),
    (2, Terminal(1), TERM1, 1),
    (3, Terminal(2), TERM2, 1),
    (4, Terminal(3), TERM3, 1),
    // junction B: terminals 4-6 and the helipads
    (5, Any, TAXI_B_BLOCK, 11),
    (5, Hangar, 0, 1),
    (5, Terminal(1), 0, 1),
    (5, Terminal(2), 0, 1),
    (5, Terminal(3), 0, 1),
    (5, Terminal(4), TERM4, 6),
    (5, Terminal(5), TERM5, 7),
    (5, Terminal(6), TERM6, 8),
    (5, Helipad(1), PAD1, 9),
    (5, Helipad(2), PAD2, 10),
    (6, Terminal(4), TERM4, 5),
    (7, Terminal(5), TERM5, 5),
    (8, Terminal(6), TERM6, 5),
    (9, Helipad(1), PAD1, 5),
    (9, HeliTakeoff, 0, 16),
    (9, Any, 0, 5),
    (10, Helipad(2), PAD2, 5),
    (10, HeliTakeoff, 0, 16),
    (10, Any, 0, 5),
    // junction C towards the runway
    (11, Any, TAXI_C_BLOCK, 12),
    (11, HeliTakeoff, 0, 16),
    (12, Any, OUT_WAY_BLOCK, 13),
    (13, Takeoff, RUNWAY_BLOCK, 14),
    (14, StartTakeoff, RUNWAY_BLOCK, 15),
    (15, EndTakeoff, 0, 17),
    (16, HeliTakeoff, 0, 17),
    // holding pattern, clockwise
    (17, Flying, 0, 18),
    (17, Landing, 0, 21),
    (17, HeliLanding, 0, 23),
    (18, Flying, 0, 19),
    (18, Landing, 0, 21),
    (18, HeliLanding, 0, 23),
    (19, Flying, 0, 20),
    (19, Landing, 0, 21),
    (19, HeliLanding, 0, 23),
    (20, Flying, 0, 17),
    (20, Landing, 0, 21),
    (20, HeliLanding, 0, 23),
    (21, Landing, RUNWAY_BLOCK, 22),
    (22, EndLanding, IN_WAY_BLOCK, 1),
    (22, Group, TAXI_A_BLOCK, 1),
    (22, Group, TAXI_B_BLOCK, 5),
    (22, Any, 0, 1),
    (23, HeliLanding, 0, 24),
    (24, HeliEndLanding, PRE_PAD_BLOCK, 5),
  ],
  moving: &[
    step(344.0, 280.0, South, EXACT),
    step(304.0, 216.0, West, TAXI_TURN),
    step(344.0, 248.0, East, EXACT),
    step(344.0, 200.0, East, EXACT),
    step(344.0, 152.0, East, EXACT),
    step(232.0, 216.0, West, TAXI_TURN),
    step(232.0, 280.0, North, EXACT),
    step(184.0, 280.0, North, EXACT),
    step(136.0, 280.0, North, EXACT),
    step(232.0, 152.0, South, EXACT),
    step(184.0, 152.0, South, EXACT),
    step(104.0, 216.0, West, TAXI_TURN),
    step(40.0, 152.0, South, TAXI_TURN),
    step(32.0, 40.0, East, TAXI_TURN),
    step(192.0, 40.0, East, CLIMB_OUT),
    step(540.0, 40.0, East, CLIMB_OUT),
    step(208.0, 152.0, North, MotionFlags::HELI_RAISE),
    step(192.0, 700.0, East, CIRCLE),
    step(700.0, 160.0, South, CIRCLE),
    step(192.0, -500.0, West, CIRCLE),
    step(-500.0, 160.0, North, CIRCLE),
    step(-300.0, 40.0, East, GLIDE),
    step(160.0, 40.0, East, MotionFlags::BRAKE),
    step(208.0, 200.0, South, HOVER),
    step(208.0, 200.0, South, MotionFlags::HELI_LOWER),
  ],
  entry_points: [17, 18, 19, 20],
  terminal_counts: &[3, 3],
  helipad_counts: &[2],
  flags: ClassFlags::PLANES.with(ClassFlags::HELICOPTERS),
  depots: &[Vec2::new(344.0, 280.0)],
  size_tiles: (6, 5),
  noise: 8,
  delta_z: 0.0,
};

const HELIPORT_TRANSITIONS: &[(u8, Heading, u64, u8)] = &[
  (0, Helipad(1), PAD1, 1),
  (1, HeliTakeoff, 0, 2),
  (2, Flying, 0, 3),
  (2, HeliLanding, 0, 4),
  (3, Flying, 0, 2),
  (3, HeliLanding, 0, 4),
  // approach hover; the pre-pad block serializes landings
  (4, HeliLanding, PRE_PAD_BLOCK, 5),
  (5, HeliEndLanding, PRE_PAD_BLOCK, 0),
  (5, HeliTakeoff, 0, 1),
  (5, Helipad(1), PAD1, 0),
];

const HELIPORT_MOVING: &[MovementStep] = &[
  step(32.0, 32.0, North, EXACT),
  step(32.0, 32.0, North, MotionFlags::HELI_RAISE),
  step(32.0, 500.0, East, CIRCLE),
  step(32.0, -450.0, West, CIRCLE),
  step(32.0, 80.0, South, HOVER),
  step(32.0, 32.0, South, MotionFlags::HELI_LOWER),
];

/// Single rooftop pad, no hangar. A helicopter that cannot get the pad
/// lifts off again and circles.
static HELIPORT: ClassSpec = ClassSpec {
  transitions: HELIPORT_TRANSITIONS,
  moving: HELIPORT_MOVING,
  entry_points: [2, 3, 2, 3],
  terminal_counts: &[],
  helipad_counts: &[1],
  flags: ClassFlags::HELICOPTERS,
  depots: &[],
  size_tiles: (1, 1),
  noise: 2,
  delta_z: 0.0,
};

/// Offshore platform. Same automaton as the heliport, on an elevated deck.
static OIL_RIG: ClassSpec = ClassSpec {
  transitions: HELIPORT_TRANSITIONS,
  moving: HELIPORT_MOVING,
  entry_points: [2, 3, 2, 3],
  terminal_counts: &[],
  helipad_counts: &[1],
  flags: ClassFlags::HELICOPTERS,
  depots: &[],
  size_tiles: (1, 1),
  noise: 0,
  delta_z: 54.0,
};

/// Dedicated helicopter station: two pads in separate groups plus a hangar.
static HELISTATION: ClassSpec = ClassSpec {
  transitions: &[
    (0, Hangar, 0, 1),
    (0, Group, PAD1, 2),
    (0, Group, PAD2, 3),
    (0, Any, 0, 1),
    (1, Any, TAXI_A_BLOCK, 6),
    (1, Hangar, 0, 0),
    (1, Helipad(1), PAD1, 2),
    (1, Helipad(2), PAD2, 3),
    (2, Helipad(1), PAD1, 1),
    (2, HeliTakeoff, 0, 6),
    (2, Any, 0, 1),
    (3, Helipad(2), PAD2, 1),
    (3, HeliTakeoff, 0, 6),
    (3, Any, 0, 1),
    (4, Flying, 0, 5),
    (4, HeliLanding, 0, 7),
    (5, Flying, 0, 4),
    (5, HeliLanding, 0, 7),
    (6, HeliTakeoff, 0, 4),
    (7, HeliLanding, 0, 8),
    (8, HeliEndLanding, PRE_PAD_BLOCK, 1),
    (8, Group, PAD1, 2),
    (8, Group, PAD2, 3),
    (8, Any, 0, 1),
  ],
  moving: &[
    step(224.0, 96.0, South, EXACT),
    step(160.0, 64.0, West, TAXI_TURN),
    step(96.0, 96.0, North, EXACT),
    step(96.0, 32.0, South, EXACT),
    step(128.0, 600.0, East, CIRCLE),
    step(128.0, -500.0, West, CIRCLE),
    step(32.0, 64.0, North, MotionFlags::HELI_RAISE),
    step(160.0, 120.0, South, HOVER),
    step(160.0, 96.0, South, MotionFlags::HELI_LOWER),
  ],
  entry_points: [4, 5, 4, 5],
  terminal_counts: &[],
  helipad_counts: &[1, 1],
  flags: ClassFlags::HELICOPTERS,
  depots: &[Vec2::new(224.0, 96.0)],
  size_tiles: (4, 2),
  noise: 5,
  delta_z: 0.0,
};
