use glam::Vec2;
use internment::Intern;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
  TakeoffRoll,
  Touchdown,
  Explosion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
  Explosion,
  RotorDust,
}

/// Fire-and-forget notifications for the embedder: presentation-only, the
/// simulation never reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
  Moved,
  EnteredHangar,
  EnteredTerminal { first_visit: bool },
  Sound(SoundKind),
  Effect { kind: EffectKind, pos: Vec2 },
  Crashed,
  Rerouted { to: Intern<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftEvent {
  pub id: Intern<String>,
  pub kind: EventKind,
}

impl AircraftEvent {
  pub fn new(id: Intern<String>, kind: EventKind) -> Self {
    Self { id, kind }
  }
}
