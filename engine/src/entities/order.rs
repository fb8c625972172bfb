use internment::Intern;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
  /// Fly to an airport and load at one of its stands.
  Goto(Intern<String>),
  /// Fly to an airport and get serviced in its hangar.
  Service(Intern<String>),
  /// Stay put until told otherwise.
  Hold,
}

impl Order {
  pub fn airport(&self) -> Option<Intern<String>> {
    match self {
      Order::Goto(airport) | Order::Service(airport) => Some(*airport),
      Order::Hold => None,
    }
  }
}

/// What an aircraft standing at an airport should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
  Depart,
  Service,
  Undecided,
}

/// A wrapping list of orders with a cursor on the active one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
  pub orders: Vec<Order>,
  pub current: usize,
}

impl Schedule {
  pub fn new(orders: Vec<Order>) -> Self {
    Self { orders, current: 0 }
  }

  pub fn round_trip(a: Intern<String>, b: Intern<String>) -> Self {
    Self::new(vec![Order::Goto(a), Order::Goto(b)])
  }

  pub fn current(&self) -> Option<&Order> {
    self.orders.get(self.current)
  }

  /// Airport the active order points at, if any.
  pub fn destination(&self) -> Option<Intern<String>> {
    self.current().and_then(Order::airport)
  }

  pub fn advance(&mut self) {
    if !self.orders.is_empty() {
      self.current = (self.current + 1) % self.orders.len();
    }
  }

  /// Advance past the active order if it targets `airport`.
  pub fn fulfill(&mut self, airport: Intern<String>) {
    if self.destination() == Some(airport) {
      self.advance();
    }
  }

  pub fn disposition(&self, here: Intern<String>) -> Disposition {
    match self.current() {
      Some(Order::Goto(_)) => Disposition::Depart,
      Some(Order::Service(airport)) if *airport == here => Disposition::Service,
      Some(Order::Service(_)) => Disposition::Depart,
      Some(Order::Hold) | None => Disposition::Undecided,
    }
  }

  /// Divert to a hangar visit at `airport` before resuming the schedule.
  pub fn insert_service(&mut self, airport: Intern<String>) {
    self.orders.insert(self.current, Order::Service(airport));
  }
}
