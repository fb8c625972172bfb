use crate::{
  cruise_altitude,
  entities::{
    aircraft::{Aircraft, SubUnitKind},
    airport::Airport,
  },
  geometry::{angle_between_points, calculate_glide_altitude, move_point, Facing},
  layout::{AirportLayout, MotionFlags},
  APPROACH_SPEED, CLIMB_RATE, DESCENT_RATE, HELI_HOVER_ALTITUDE,
  HELI_VERTICAL_RATE, HOLD_ALTITUDE, HOLD_SPEED, MAX_TAXI_SPEED,
};

use super::events::{AircraftEvent, EffectKind, EventKind};

/// Arrival radius for airborne and apron positions.
pub const ARRIVE_DISTANCE: f32 = 4.0;
/// Arrival radius for holding pattern and approach fixes.
pub const LOOSE_ARRIVE_DISTANCE: f32 = 16.0;

const ROTOR_FRAMES: u8 = 4;
/// Downwash kicks up dust below this height while lifting or setting down.
const ROTOR_WASH_HEIGHT: f32 = 16.0;
/// Speed a plane must roll at before it rotates, as a share of top speed.
const ROTATE_SPEED_FRACTION: f32 = 0.8;

/// Move `v` one tick towards the movement step of its current automaton
/// position. Returns true once the aircraft has arrived there.
pub fn update_motion(
  v: &mut Aircraft,
  airport: &Airport,
  layout: &AirportLayout,
  events: &mut Vec<AircraftEvent>,
) -> bool {
  let step = *layout.moving(v.ground.pos);
  let target = airport.origin + step.offset;
  let ground = layout.delta_z;
  let before = (v.pos, v.z);

  let limit = speed_limit(v, step.flags);
  let advance = v.update_speed(limit);

  let to_target = target - v.pos;
  let distance = to_target.length();

  if distance > f32::EPSILON {
    let desired = Facing::from_degrees(angle_between_points(v.pos, target));
    if step.flags.contains(MotionFlags::SLOW_TURN) {
      v.facing = v.facing.rotate_toward(desired);
    } else {
      v.facing = desired;
    }
  }

  if advance > 0.0 {
    // Close enough to snap: avoids orbiting a point that the 45 degree
    // turn granularity can never quite line up on.
    if distance <= advance + ARRIVE_DISTANCE {
      v.pos = target;
    } else {
      v.pos = move_point(v.pos, v.facing.to_degrees(), advance);
    }
  }

  update_altitude(v, step.flags, distance, ground);
  let arrived = check_arrival(v, &step, target, distance, ground);

  let vertical = step.flags.contains(MotionFlags::HELI_RAISE)
    || step.flags.contains(MotionFlags::HELI_LOWER);
  if vertical && distance <= ARRIVE_DISTANCE && v.z - ground < ROTOR_WASH_HEIGHT
  {
    events.push(AircraftEvent::new(v.id, EventKind::Effect {
      kind: EffectKind::RotorDust,
      pos: v.pos,
    }));
  }

  update_sub_units(v, ground);
  if (v.pos, v.z) != before {
    events.push(AircraftEvent::new(v.id, EventKind::Moved));
  }

  arrived
}

fn speed_limit(v: &Aircraft, flags: MotionFlags) -> f32 {
  if flags.contains(MotionFlags::LAND) {
    APPROACH_SPEED
  } else if flags.contains(MotionFlags::HOLD) {
    HOLD_SPEED
  } else if flags.contains(MotionFlags::NO_SPEED_CLAMP) {
    v.max_speed()
  } else {
    MAX_TAXI_SPEED
  }
}

fn update_altitude(
  v: &mut Aircraft,
  flags: MotionFlags,
  distance: f32,
  ground: f32,
) {
  if flags.contains(MotionFlags::TAKEOFF) {
    // no climb until rotation speed
    if v.cur_speed >= v.max_speed() * ROTATE_SPEED_FRACTION {
      let cruise = ground + cruise_altitude(v.facing, v.max_speed());
      v.z = (v.z + CLIMB_RATE).min(cruise);
    }
  } else if flags.contains(MotionFlags::HOLD) {
    let hold = ground + HOLD_ALTITUDE;
    if v.z > hold {
      v.z = (v.z - DESCENT_RATE).max(hold);
    } else if v.z < hold {
      v.z = (v.z + CLIMB_RATE).min(hold);
    }
  } else if flags.contains(MotionFlags::LAND) {
    let slope = ground + calculate_glide_altitude(distance);
    if v.z > slope {
      v.z = (v.z - DESCENT_RATE * 2.0).max(slope);
    }
  } else if flags.contains(MotionFlags::BRAKE) && v.z > ground {
    v.z = (v.z - DESCENT_RATE * 2.0).max(ground);
  }
}

fn check_arrival(
  v: &mut Aircraft,
  step: &crate::layout::MovementStep,
  target: glam::Vec2,
  distance: f32,
  ground: f32,
) -> bool {
  // Helicopter vertical phases: get over the point, then move only up or
  // down until the band is reached.
  if step.flags.contains(MotionFlags::HELI_RAISE) {
    if distance > ARRIVE_DISTANCE {
      return false;
    }
    v.stop();
    v.z += HELI_VERTICAL_RATE;
    return v.z >= ground + HELI_HOVER_ALTITUDE;
  }
  if step.flags.contains(MotionFlags::HELI_LOWER) {
    if distance > ARRIVE_DISTANCE {
      return false;
    }
    v.stop();
    v.z = (v.z - HELI_VERTICAL_RATE).max(ground);
    return v.z <= ground;
  }

  if step.flags.contains(MotionFlags::EXACT_POS) {
    if v.pos != target {
      return false;
    }
    if v.facing != step.facing {
      // pivot in place to the parking orientation
      v.facing = if step.flags.contains(MotionFlags::SLOW_TURN) {
        v.facing.rotate_toward(step.facing)
      } else {
        step.facing
      };
    }
    return v.facing == step.facing;
  }

  let threshold = if step.flags.contains(MotionFlags::SLOW_TURN) {
    LOOSE_ARRIVE_DISTANCE
  } else {
    ARRIVE_DISTANCE
  };
  distance <= threshold
}

fn update_sub_units(v: &mut Aircraft, ground: f32) {
  let spinning =
    v.is_helicopter() && (v.z > ground || v.cur_speed > 0.0);

  for unit in &mut v.sub_units {
    match unit.kind {
      SubUnitKind::Shadow => unit.z = ground,
      SubUnitKind::Rotor => {
        unit.z = v.z;
        if spinning {
          unit.frame = (unit.frame + 1) % ROTOR_FRAMES;
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entities::aircraft::AircraftCategory,
    layout::{AirportClass, Layouts},
    OwnerId,
  };
  use glam::Vec2;
  use internment::Intern;

  fn airfield() -> (Layouts, Airport) {
    let layouts = Layouts::build_all().unwrap();
    let airport = Airport::new(
      Intern::from_ref("WFD"),
      AirportClass::Airfield,
      Vec2::ZERO,
      OwnerId(1),
    );
    (layouts, airport)
  }

  fn plane_at(pos: u8) -> Aircraft {
    let mut v = Aircraft::new(
      Intern::from_ref("AAL0001"),
      AircraftCategory::SmallPlane,
      OwnerId(1),
      Intern::from_ref("WFD"),
    );
    v.ground.pos = pos;
    v.ground.previous_pos = pos;
    v
  }

  mod update_motion {
    use super::*;

    #[test]
    fn test_taxi_reaches_exact_point() {
      let (layouts, airport) = airfield();
      let layout = layouts.get(AirportClass::Airfield);
      let mut events = Vec::new();

      // From the hangar door towards the east junction.
      let mut v = plane_at(1);
      let hangar = layout.moving(0);
      v.pos = airport.origin + hangar.offset;
      v.facing = hangar.facing;

      let mut arrived = false;
      for _ in 0..200 {
        if update_motion(&mut v, &airport, layout, &mut events) {
          arrived = true;
          break;
        }
      }

      let step = layout.moving(1);
      assert!(arrived);
      assert_eq!(v.pos, airport.origin + step.offset);
      assert_eq!(v.facing, step.facing);
      assert!(events.iter().any(|e| e.kind == EventKind::Moved));
    }

    #[test]
    fn test_taxi_speed_is_clamped() {
      let (layouts, airport) = airfield();
      let layout = layouts.get(AirportClass::Airfield);
      let mut events = Vec::new();

      let mut v = plane_at(1);
      v.pos = airport.origin + Vec2::new(400.0, 400.0);
      for _ in 0..50 {
        update_motion(&mut v, &airport, layout, &mut events);
      }
      assert!(v.cur_speed <= MAX_TAXI_SPEED);
    }

    #[test]
    fn test_holding_pattern_descends_to_hold_altitude() {
      let (layouts, airport) = airfield();
      let layout = layouts.get(AirportClass::Airfield);
      let mut events = Vec::new();

      let mut v = plane_at(11);
      v.pos = airport.origin + Vec2::new(128.0, 2000.0);
      v.z = 400.0;
      for _ in 0..400 {
        update_motion(&mut v, &airport, layout, &mut events);
      }
      assert_eq!(v.z, HOLD_ALTITUDE);
    }

    #[test]
    fn test_landing_glide_ends_on_the_ground() {
      let (layouts, airport) = airfield();
      let layout = layouts.get(AirportClass::Airfield);
      let mut events = Vec::new();

      // Approach fix towards position 15, then the runway threshold.
      let mut v = plane_at(15);
      v.pos = airport.origin + Vec2::new(-800.0, 24.0);
      v.z = HOLD_ALTITUDE;

      for _ in 0..500 {
        if update_motion(&mut v, &airport, layout, &mut events) {
          break;
        }
      }
      assert!(v.z < HOLD_ALTITUDE);

      v.ground.pos = 16;
      for _ in 0..500 {
        if update_motion(&mut v, &airport, layout, &mut events) {
          break;
        }
      }
      assert_eq!(v.z, 0.0);
    }

    #[test]
    fn test_heli_raise_is_vertical() {
      let (layouts, airport) = airfield();
      let layout = layouts.get(AirportClass::Airfield);
      let mut events = Vec::new();

      let mut v = plane_at(10);
      v.category = AircraftCategory::Helicopter;
      let step = layout.moving(10);
      v.pos = airport.origin + step.offset;

      let mut arrived = false;
      for _ in 0..100 {
        if update_motion(&mut v, &airport, layout, &mut events) {
          arrived = true;
          break;
        }
      }

      assert!(arrived);
      assert_eq!(v.pos, airport.origin + step.offset);
      assert!(v.z >= HELI_HOVER_ALTITUDE);
      assert_eq!(v.cur_speed, 0.0);
      assert!(events.iter().any(|e| matches!(
        e.kind,
        EventKind::Effect {
          kind: EffectKind::RotorDust,
          ..
        }
      )));
    }

    #[test]
    fn test_rotor_spins_in_flight() {
      let (layouts, airport) = airfield();
      let layout = layouts.get(AirportClass::Airfield);
      let mut events = Vec::new();

      let mut v = plane_at(11);
      v.category = AircraftCategory::Helicopter;
      v.z = HOLD_ALTITUDE;
      v.pos = airport.origin + Vec2::new(0.0, 2000.0);

      let before = v.sub_units[1].frame;
      update_motion(&mut v, &airport, layout, &mut events);
      assert_ne!(v.sub_units[1].frame, before);
      // the shadow stays on the ground
      assert_eq!(v.sub_units[0].z, 0.0);
    }
  }
}
