use glam::Vec2;
use internment::Intern;
use tracing::{info, warn};
use turborand::{rng::Rng, TurboRand};

use crate::{
  blocks::{clear_block, has_block, set_blocks},
  config::Tuning,
  entities::{airport::Airport, order::Disposition},
  geometry::approach_quadrant,
  layout::{AirportClass, AirportLayout, Heading, Layouts},
  terminals::{find_free_helipad, find_free_terminal},
};

use super::{
  events::{AircraftEvent, EffectKind, EventKind, SoundKind},
  Aircraft, AircraftCondition,
};

/// Snapshot of the aircraft's next scheduled stop, taken before the state
/// machine borrows the current airport mutably.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextStop {
  pub id: Intern<String>,
  pub class: AirportClass,
  pub origin: Vec2,
}

pub struct StepCtx<'a> {
  pub layouts: &'a Layouts,
  pub tuning: &'a Tuning,
  pub rng: &'a mut Rng,
  pub events: &'a mut Vec<AircraftEvent>,
  pub next_stop: Option<NextStop>,
}

/// Advance the ground automaton one step, after the motion controller has
/// reported arrival at the current position. Either the position's handler
/// runs (when its heading matches the aircraft state), or the aircraft
/// moves on along the route matching its state.
pub fn advance_one_step(
  v: &mut Aircraft,
  airport: &mut Airport,
  ctx: &mut StepCtx,
) {
  let layout = ctx.layouts.get(airport.class);
  debug_assert!(v.ground.pos < layout.size());

  clear_block(v, layout, &mut airport.blocks);

  let node = layout.node(v.ground.pos);
  if node.heading == v.ground.state {
    let prev = v.ground.pos;
    handle_state(v, airport, layout, ctx);
    if v.ground.state != Heading::Flying {
      v.ground.previous_pos = prev;
    }
    return;
  }

  v.ground.previous_pos = v.ground.pos;
  if let Some(route) = node.select(v.ground.state) {
    if set_blocks(v, node, route, layout, &mut airport.blocks) {
      v.ground.pos = route.next;
    }
  }
}

fn handle_state(
  v: &mut Aircraft,
  airport: &mut Airport,
  layout: &AirportLayout,
  ctx: &mut StepCtx,
) {
  match v.ground.state {
    Heading::Hangar => in_hangar(v, airport, layout, ctx),
    Heading::Terminal(_) | Heading::Helipad(_) => {
      at_stand(v, airport, layout, ctx)
    }
    Heading::Takeoff => {
      ctx
        .events
        .push(AircraftEvent::new(v.id, EventKind::Sound(SoundKind::TakeoffRoll)));
      v.ground.state = Heading::StartTakeoff;
    }
    Heading::StartTakeoff => v.ground.state = Heading::EndTakeoff,
    Heading::EndTakeoff | Heading::HeliTakeoff => {
      become_airborne(v, layout, ctx)
    }
    Heading::Flying => flying(v, airport, layout),
    Heading::Landing => touchdown(v, airport, layout, ctx),
    Heading::EndLanding => end_landing(v, airport, layout),
    Heading::HeliLanding => v.ground.state = Heading::HeliEndLanding,
    Heading::HeliEndLanding => heli_end_landing(v, airport, layout),
    // not aircraft states
    Heading::Any | Heading::Group => {}
  }
}

fn in_hangar(
  v: &mut Aircraft,
  airport: &mut Airport,
  layout: &AirportLayout,
  ctx: &mut StepCtx,
) {
  // just rolled in
  if v.ground.previous_pos != v.ground.pos {
    v.stop();
    v.z = layout.delta_z;
    ctx
      .events
      .push(AircraftEvent::new(v.id, EventKind::EnteredHangar));
    if v.schedule.disposition(airport.id) == Disposition::Service {
      v.service_ticks = ctx.tuning.service_ticks;
      v.schedule.advance();
    }
    return;
  }

  if v.service_ticks > 0 {
    v.service_ticks -= 1;
    return;
  }

  // a service order for this airport can start right here
  if v.schedule.disposition(airport.id) == Disposition::Service {
    v.service_ticks = ctx.tuning.service_ticks;
    v.schedule.advance();
    return;
  }

  let Some(destination) = v.schedule.destination() else {
    return;
  };

  let node = layout.node(v.ground.pos);
  if has_block(v, node, node.identity(), layout, &airport.blocks) {
    return;
  }

  if destination == airport.id {
    // load here before flying on
    let assigned = if v.is_helicopter() {
      find_free_helipad(v, layout, &mut airport.blocks)
    } else {
      find_free_terminal(v, layout, &mut airport.blocks)
    };
    if !assigned {
      return;
    }
  } else {
    v.ground.state = if v.is_helicopter() {
      Heading::HeliTakeoff
    } else {
      Heading::Takeoff
    };
  }
}

fn at_stand(
  v: &mut Aircraft,
  airport: &mut Airport,
  layout: &AirportLayout,
  ctx: &mut StepCtx,
) {
  // just docked
  if v.ground.previous_pos != v.ground.pos {
    v.stop();
    v.load_ticks = ctx.tuning.load_ticks;
    let first_visit = !airport.visited;
    airport.visited = true;
    ctx.events.push(AircraftEvent::new(
      v.id,
      EventKind::EnteredTerminal { first_visit },
    ));
    v.schedule.fulfill(airport.id);
    return;
  }

  if v.load_ticks > 0 {
    v.load_ticks -= 1;
    return;
  }

  let node = layout.node(v.ground.pos);
  match v.schedule.disposition(airport.id) {
    Disposition::Undecided => {}
    Disposition::Service => {
      if !layout.has_depot() {
        // cannot be serviced here; drop the order
        v.schedule.advance();
      } else if !has_block(v, node, node.identity(), layout, &airport.blocks)
      {
        v.ground.state = Heading::Hangar;
      }
    }
    Disposition::Depart => {
      if !has_block(v, node, node.identity(), layout, &airport.blocks) {
        v.ground.state = if v.is_helicopter() {
          Heading::HeliTakeoff
        } else {
          Heading::Takeoff
        };
      }
    }
  }
}

fn become_airborne(v: &mut Aircraft, layout: &AirportLayout, ctx: &mut StepCtx) {
  v.ground.state = Heading::Flying;

  let entry = match ctx.next_stop {
    Some(stop) => {
      let dest = ctx.layouts.get(stop.class);
      let center = stop.origin + dest.footprint() / 2.0;
      v.ground.target_airport = stop.id;
      dest.entry_points[approach_quadrant(v.pos, center)]
    }
    // nowhere to go: hold over the field we just left
    None => layout.entry_points[0],
  };

  v.ground.pos = entry;
  v.ground.previous_pos = entry;
}

fn flying(v: &mut Aircraft, airport: &mut Airport, layout: &AirportLayout) {
  let node = layout.node(v.ground.pos);
  let want = if v.is_helicopter() {
    Heading::HeliLanding
  } else {
    Heading::Landing
  };

  let accepted = if v.is_helicopter() {
    layout.flags.helicopters()
  } else {
    layout.flags.planes()
  };

  if accepted && airport.is_usable_by(v.owner) {
    if let Some(route) = node.routes().find(|route| route.heading == want) {
      if set_blocks(v, node, route, layout, &mut airport.blocks) {
        v.ground.state = want;
        v.ground.pos = route.next;
        return;
      }
    }
  }

  // keep circling
  if let Some(route) =
    node.routes().find(|route| route.heading == Heading::Flying)
  {
    v.ground.pos = route.next;
  }
}

fn touchdown(
  v: &mut Aircraft,
  airport: &mut Airport,
  layout: &AirportLayout,
  ctx: &mut StepCtx,
) {
  ctx
    .events
    .push(AircraftEvent::new(v.id, EventKind::Sound(SoundKind::Touchdown)));

  let chance = if layout.flags.short_strip() && v.needs_long_strip() {
    ctx.tuning.short_strip_crash_chance
  } else {
    ctx.tuning.crash_chance
  };
  if ctx.rng.chance(chance as f64) {
    crash(v, airport, layout, ctx);
    return;
  }

  v.ground.state = Heading::EndLanding;
}

fn crash(
  v: &mut Aircraft,
  airport: &mut Airport,
  layout: &AirportLayout,
  ctx: &mut StepCtx,
) {
  let held = layout.node(v.ground.pos).block
    | layout.node(v.ground.previous_pos).block;
  airport.blocks.release(held);

  v.stop();
  v.condition = AircraftCondition::Wrecked { age: 0 };

  warn!("{} crashed at {}", v.id, airport.id);
  ctx.events.push(AircraftEvent::new(v.id, EventKind::Crashed));
  ctx.events.push(AircraftEvent::new(
    v.id,
    EventKind::Effect {
      kind: EffectKind::Explosion,
      pos: v.pos,
    },
  ));
  ctx
    .events
    .push(AircraftEvent::new(v.id, EventKind::Sound(SoundKind::Explosion)));
}

fn end_landing(v: &mut Aircraft, airport: &mut Airport, layout: &AirportLayout) {
  if !find_free_terminal(v, layout, &mut airport.blocks) {
    // every stand taken: wait it out in the hangar
    v.ground.state = Heading::Hangar;
  }
}

fn heli_end_landing(
  v: &mut Aircraft,
  airport: &mut Airport,
  layout: &AirportLayout,
) {
  if find_free_helipad(v, layout, &mut airport.blocks) {
    return;
  }

  if layout.has_depot() {
    v.ground.state = Heading::Hangar;
  } else {
    // no shelter here; lift off and try again
    info!("{} going around at {}", v.id, airport.id);
    v.ground.state = Heading::HeliTakeoff;
  }
}
