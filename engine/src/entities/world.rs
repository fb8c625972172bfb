use glam::Vec2;
use internment::Intern;
use tracing::{info, trace};
use turborand::{rng::Rng, SeededCore};

use crate::{
  config::Tuning,
  cruise_altitude,
  entities::{
    aircraft::{
      events::{AircraftEvent, EventKind},
      motion::update_motion,
      state::{advance_one_step, NextStop, StepCtx},
      Aircraft, AircraftCategory, AircraftCondition,
    },
    airport::Airport,
  },
  geometry::approach_quadrant,
  layout::{AirportClass, Heading, LayoutError, Layouts},
  OwnerId,
};

/// The whole simulation: airports, aircraft, and the tick loop driving
/// them. Iteration order is insertion order, which keeps runs with the
/// same seed and the same command sequence identical.
#[derive(Debug)]
pub struct World {
  pub layouts: Layouts,
  pub airports: Vec<Airport>,
  pub aircraft: Vec<Aircraft>,
  pub events: Vec<AircraftEvent>,
  pub rng: Rng,
  pub tuning: Tuning,
  pub ticks: u64,
}

impl World {
  pub fn new(tuning: Tuning) -> Result<Self, LayoutError> {
    Self::with_seed(tuning, 0)
  }

  pub fn with_seed(tuning: Tuning, seed: u64) -> Result<Self, LayoutError> {
    Ok(Self {
      layouts: Layouts::build_all()?,
      airports: Vec::new(),
      aircraft: Vec::new(),
      events: Vec::new(),
      rng: Rng::with_seed(seed),
      tuning,
      ticks: 0,
    })
  }

  pub fn airport(&self, id: Intern<String>) -> Option<&Airport> {
    self.airports.iter().find(|airport| airport.id == id)
  }

  pub fn aircraft(&self, id: Intern<String>) -> Option<&Aircraft> {
    self.aircraft.iter().find(|aircraft| aircraft.id == id)
  }

  pub fn add_airport(
    &mut self,
    id: Intern<String>,
    class: AirportClass,
    origin: Vec2,
    owner: OwnerId,
  ) {
    self.airports.push(Airport::new(id, class, origin, owner));
  }

  /// Demolish an airport. Aircraft bound for it divert to the next stop
  /// on their schedule that still exists.
  pub fn remove_airport(&mut self, id: Intern<String>) {
    let Some(index) =
      self.airports.iter().position(|airport| airport.id == id)
    else {
      return;
    };
    self.airports.swap_remove(index);

    for aircraft_index in 0..self.aircraft.len() {
      if self.aircraft[aircraft_index].ground.target_airport == id {
        self.reroute(aircraft_index);
      }
    }
  }

  /// Build a new aircraft at `airport_id`, parked in its hangar (or
  /// holding overhead for classes without one). Returns the callsign.
  pub fn build_aircraft(
    &mut self,
    airport_id: Intern<String>,
    category: AircraftCategory,
    owner: OwnerId,
  ) -> Option<Intern<String>> {
    let airport = self.airports.iter().find(|a| a.id == airport_id)?;
    let layout = self.layouts.get(airport.class);

    let accepted = match category {
      AircraftCategory::Helicopter => layout.flags.helicopters(),
      _ => layout.flags.planes(),
    };
    if !accepted {
      return None;
    }

    let id = Intern::from(Aircraft::random_callsign(&mut self.rng));
    let aircraft = Aircraft::spawned(id, category, owner, airport, layout);
    self.aircraft.push(aircraft);

    Some(id)
  }

  /// Divert an aircraft to the hangar at its current airport for
  /// servicing; its schedule resumes afterwards.
  pub fn send_to_hangar(&mut self, id: Intern<String>) {
    if let Some(aircraft) =
      self.aircraft.iter_mut().find(|aircraft| aircraft.id == id)
    {
      let airport = aircraft.ground.target_airport;
      aircraft.schedule.insert_service(airport);
    }
  }

  /// The holding position an aircraft approaching `airport` should enter
  /// at, picked by which side it comes in from.
  pub fn entry_point_for(&self, aircraft: &Aircraft, airport: &Airport) -> u8 {
    let layout = self.layouts.get(airport.class);
    let center = airport.origin + layout.footprint() / 2.0;
    layout.entry_points[approach_quadrant(aircraft.pos, center)]
  }

  pub fn drain_events(&mut self) -> Vec<AircraftEvent> {
    std::mem::take(&mut self.events)
  }

  /// Advance the simulation by one tick: every active aircraft moves, and
  /// those that arrive at an automaton position take one automaton step.
  pub fn tick(&mut self) {
    self.ticks += 1;

    for index in 0..self.aircraft.len() {
      if let AircraftCondition::Wrecked { age } =
        &mut self.aircraft[index].condition
      {
        *age += 1;
        continue;
      }

      let target = self.aircraft[index].ground.target_airport;
      let Some(airport_index) =
        self.airports.iter().position(|airport| airport.id == target)
      else {
        self.reroute(index);
        continue;
      };

      // the airport may have been rebuilt as a smaller class
      let size = self
        .layouts
        .get(self.airports[airport_index].class)
        .size();
      if self.aircraft[index].ground.pos >= size {
        self.reroute(index);
        continue;
      }

      let arrived = {
        let World {
          layouts,
          airports,
          aircraft,
          events,
          ..
        } = self;
        let airport = &airports[airport_index];
        let layout = layouts.get(airport.class);
        update_motion(&mut aircraft[index], airport, layout, events)
      };
      if !arrived {
        continue;
      }

      let next_stop =
        self.aircraft[index].schedule.destination().and_then(|dest| {
          self.airports.iter().find(|a| a.id == dest).map(|a| NextStop {
            id: a.id,
            class: a.class,
            origin: a.origin,
          })
        });

      let World {
        layouts,
        airports,
        aircraft,
        events,
        rng,
        tuning,
        ..
      } = self;
      let mut ctx = StepCtx {
        layouts,
        tuning,
        rng,
        events,
        next_stop,
      };
      advance_one_step(
        &mut aircraft[index],
        &mut airports[airport_index],
        &mut ctx,
      );
    }

    self.cleanup();
  }

  /// Point the aircraft at the next stop on its schedule that still
  /// exists, skipping orders for demolished airports.
  fn reroute(&mut self, index: usize) {
    let orders = self.aircraft[index].schedule.orders.len();
    let mut stop = None;
    for _ in 0..=orders {
      let destination = self.aircraft[index].schedule.destination();
      if let Some(dest) = destination {
        if let Some(airport) = self.airports.iter().find(|a| a.id == dest) {
          stop = Some(NextStop {
            id: airport.id,
            class: airport.class,
            origin: airport.origin,
          });
          break;
        }
      }
      if orders == 0 {
        break;
      }
      self.aircraft[index].schedule.advance();
    }

    let Some(stop) = stop else {
      trace!(
        "{} has no reachable destination",
        self.aircraft[index].id
      );
      return;
    };

    let layout = self.layouts.get(stop.class);
    let aircraft = &mut self.aircraft[index];
    let center = stop.origin + layout.footprint() / 2.0;
    let entry = layout.entry_points[approach_quadrant(aircraft.pos, center)];

    aircraft.ground.target_airport = stop.id;
    aircraft.ground.pos = entry;
    aircraft.ground.previous_pos = entry;
    aircraft.ground.state = Heading::Flying;
    aircraft.z = aircraft.z.max(
      layout.delta_z + cruise_altitude(aircraft.facing, aircraft.max_speed()),
    );
    aircraft.load_ticks = 0;
    aircraft.service_ticks = 0;

    info!("{} rerouted to {}", aircraft.id, stop.id);
    self
      .events
      .push(AircraftEvent::new(aircraft.id, EventKind::Rerouted {
        to: stop.id,
      }));
  }

  fn cleanup(&mut self) {
    let wreck_ticks = self.tuning.wreck_ticks;
    self.aircraft.retain(|aircraft| {
      !matches!(aircraft.condition, AircraftCondition::Wrecked { age } if age >= wreck_ticks)
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entities::order::Schedule;

  fn quick_tuning() -> Tuning {
    Tuning {
      crash_chance: 0.0,
      short_strip_crash_chance: 0.0,
      load_ticks: 5,
      service_ticks: 5,
      wreck_ticks: 20,
    }
  }

  fn two_airfields() -> (World, Intern<String>, Intern<String>) {
    let mut world = World::with_seed(quick_tuning(), 42).unwrap();
    let a = Intern::from_ref("WFD");
    let b = Intern::from_ref("EFD");
    world.add_airport(a, AirportClass::Airfield, Vec2::ZERO, OwnerId(1));
    world.add_airport(
      b,
      AirportClass::Airfield,
      Vec2::new(2500.0, 0.0),
      OwnerId(1),
    );
    (world, a, b)
  }

  mod scheduling {
    use super::*;

    #[test]
    fn test_round_trip_reaches_the_other_field() {
      let (mut world, a, b) = two_airfields();
      let id = world
        .build_aircraft(a, AircraftCategory::SmallPlane, OwnerId(1))
        .unwrap();
      {
        let aircraft = world
          .aircraft
          .iter_mut()
          .find(|aircraft| aircraft.id == id)
          .unwrap();
        aircraft.schedule = Schedule::round_trip(b, a);
      }

      let mut docked_at_b = false;
      let mut back_at_a = false;
      for _ in 0..20_000 {
        world.tick();
        let aircraft = world.aircraft(id).unwrap();
        if aircraft.ground.target_airport == b
          && matches!(aircraft.ground.state, Heading::Terminal(_))
        {
          docked_at_b = true;
        }
        if docked_at_b
          && aircraft.ground.target_airport == a
          && matches!(aircraft.ground.state, Heading::Terminal(_))
        {
          back_at_a = true;
          break;
        }
      }

      assert!(docked_at_b);
      assert!(back_at_a);
      assert!(world.airport(b).unwrap().visited);
    }

    #[test]
    fn test_blocks_stay_exclusive_with_traffic() {
      let (mut world, a, b) = two_airfields();
      for _ in 0..3 {
        let id = world
          .build_aircraft(a, AircraftCategory::SmallPlane, OwnerId(1))
          .unwrap();
        let aircraft = world
          .aircraft
          .iter_mut()
          .find(|aircraft| aircraft.id == id)
          .unwrap();
        aircraft.schedule = Schedule::round_trip(b, a);
      }

      for _ in 0..10_000 {
        world.tick();

        // no two aircraft on the same airport may occupy the same
        // nonzero block
        for airport in &world.airports {
          let layout = world.layouts.get(airport.class);
          let on_field: Vec<u64> = world
            .aircraft
            .iter()
            .filter(|v| v.ground.target_airport == airport.id)
            .map(|v| layout.node(v.ground.pos).block)
            .collect();
          for (i, lhs) in on_field.iter().enumerate() {
            for rhs in on_field.iter().skip(i + 1) {
              assert_eq!(lhs & rhs, 0);
            }
          }
        }
      }
    }
  }

  mod demolition {
    use super::*;

    #[test]
    fn test_removal_reroutes_en_route_aircraft() {
      let (mut world, a, b) = two_airfields();
      let id = world
        .build_aircraft(a, AircraftCategory::SmallPlane, OwnerId(1))
        .unwrap();
      {
        let aircraft = world
          .aircraft
          .iter_mut()
          .find(|aircraft| aircraft.id == id)
          .unwrap();
        aircraft.schedule = Schedule::round_trip(b, a);
      }

      // let it get airborne towards B
      for _ in 0..5_000 {
        world.tick();
        let aircraft = world.aircraft(id).unwrap();
        if aircraft.ground.target_airport == b {
          break;
        }
      }
      assert_eq!(world.aircraft(id).unwrap().ground.target_airport, b);

      world.remove_airport(b);

      let aircraft = world.aircraft(id).unwrap();
      assert_eq!(aircraft.ground.target_airport, a);
      assert_eq!(aircraft.ground.state, Heading::Flying);
      let layout = world.layouts.get(AirportClass::Airfield);
      assert!(layout
        .entry_points
        .contains(&aircraft.ground.pos));
      assert!(world
        .drain_events()
        .iter()
        .any(|e| e.kind == EventKind::Rerouted { to: a }));
    }
  }

  mod wrecks {
    use super::*;

    #[test]
    fn test_wrecks_age_and_clear() {
      let (mut world, a, _) = two_airfields();
      let id = world
        .build_aircraft(a, AircraftCategory::SmallPlane, OwnerId(1))
        .unwrap();
      {
        let aircraft = world
          .aircraft
          .iter_mut()
          .find(|aircraft| aircraft.id == id)
          .unwrap();
        aircraft.condition = AircraftCondition::Wrecked { age: 0 };
      }

      for _ in 0..19 {
        world.tick();
      }
      assert!(world.aircraft(id).is_some());
      world.tick();
      assert!(world.aircraft(id).is_none());
    }
  }

  mod queries {
    use super::*;

    #[test]
    fn test_entry_point_for_every_quadrant_and_class() {
      let mut world = World::with_seed(quick_tuning(), 3).unwrap();
      let id = Intern::from_ref("ANY");
      let v = Aircraft::new(
        Intern::from_ref("JBU0004"),
        AircraftCategory::Helicopter,
        OwnerId(1),
        id,
      );

      for class in AirportClass::ALL {
        world.add_airport(id, class, Vec2::splat(500.0), OwnerId(1));
        let airport = world.airport(id).unwrap();
        let layout = world.layouts.get(class);
        let center = airport.origin + layout.footprint() / 2.0;

        for offset in [
          Vec2::new(0.0, 3000.0),
          Vec2::new(3000.0, 0.0),
          Vec2::new(0.0, -3000.0),
          Vec2::new(-3000.0, 0.0),
        ] {
          let mut probe = v.clone();
          probe.pos = center + offset;
          let entry = world.entry_point_for(&probe, airport);
          assert!(entry < layout.size());
          assert_eq!(layout.node(entry).heading, Heading::Flying);
        }
        world.remove_airport(id);
      }
    }
  }

  mod commands {
    use super::*;

    #[test]
    fn test_build_aircraft_rejects_wrong_category() {
      let mut world = World::with_seed(quick_tuning(), 1).unwrap();
      let port = Intern::from_ref("HLP");
      world.add_airport(port, AirportClass::Heliport, Vec2::ZERO, OwnerId(1));

      assert!(world
        .build_aircraft(port, AircraftCategory::SmallPlane, OwnerId(1))
        .is_none());

      let heli = world
        .build_aircraft(port, AircraftCategory::Helicopter, OwnerId(1))
        .unwrap();
      // no hangar: spawns holding overhead
      let aircraft = world.aircraft(heli).unwrap();
      assert_eq!(aircraft.ground.state, Heading::Flying);
    }

    #[test]
    fn test_send_to_hangar_services_then_resumes() {
      let (mut world, a, b) = two_airfields();
      let id = world
        .build_aircraft(a, AircraftCategory::SmallPlane, OwnerId(1))
        .unwrap();
      {
        let aircraft = world
          .aircraft
          .iter_mut()
          .find(|aircraft| aircraft.id == id)
          .unwrap();
        aircraft.schedule = Schedule::round_trip(b, a);
      }
      world.send_to_hangar(id);

      let mut serviced = false;
      for _ in 0..2_000 {
        world.tick();
        if world.aircraft(id).unwrap().service_ticks > 0 {
          serviced = true;
          break;
        }
      }
      assert!(serviced);
    }
  }
}
