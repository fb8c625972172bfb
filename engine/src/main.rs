use engine::{
  config::Tuning,
  entities::{
    aircraft::{events::EventKind, AircraftCategory},
    order::Schedule,
    world::World,
  },
  layout::AirportClass,
  OwnerId,
};
use glam::Vec2;
use internment::Intern;
use tracing::{error, info};

fn main() {
  tracing_subscriber::fmt::init();

  let mut world = match World::with_seed(Tuning::default(), 42) {
    Ok(world) => world,
    Err(err) => {
      error!("airport layout validation failed: {err}");
      std::process::exit(1);
    }
  };

  let wfd = Intern::from_ref("WFD");
  let rgn = Intern::from_ref("RGN");
  let hlp = Intern::from_ref("HLP");
  world.add_airport(wfd, AirportClass::Airfield, Vec2::ZERO, OwnerId(1));
  world.add_airport(
    rgn,
    AirportClass::Regional,
    Vec2::new(4000.0, 1500.0),
    OwnerId(1),
  );
  world.add_airport(
    hlp,
    AirportClass::Heliport,
    Vec2::new(1800.0, -1200.0),
    OwnerId(1),
  );

  for _ in 0..2 {
    if let Some(id) =
      world.build_aircraft(wfd, AircraftCategory::SmallPlane, OwnerId(1))
    {
      if let Some(aircraft) =
        world.aircraft.iter_mut().find(|aircraft| aircraft.id == id)
      {
        aircraft.schedule = Schedule::round_trip(rgn, wfd);
      }
      info!("built {id} at {wfd}");
    }
  }
  if let Some(id) =
    world.build_aircraft(rgn, AircraftCategory::Helicopter, OwnerId(1))
  {
    if let Some(aircraft) =
      world.aircraft.iter_mut().find(|aircraft| aircraft.id == id)
    {
      aircraft.schedule = Schedule::round_trip(hlp, rgn);
    }
    info!("built {id} at {rgn}");
  }

  for _ in 0..20_000 {
    world.tick();
    for event in world.drain_events() {
      if event.kind != EventKind::Moved {
        info!("{}: {:?}", event.id, event.kind);
      }
    }
  }

  info!(
    "simulated {} ticks with {} aircraft",
    world.ticks,
    world.aircraft.len()
  );
}
