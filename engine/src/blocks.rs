use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
  entities::aircraft::Aircraft,
  layout::{AirportLayout, AutomatonPosition, Route},
};

/// Per-airport occupancy mask: one bit per mutually exclusive area of the
/// field (terminals, helipads, taxi segments, the runway).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct BlockReservationTable {
  flags: u64,
}

impl BlockReservationTable {
  pub fn reserved(&self, mask: u64) -> bool {
    self.flags & mask != 0
  }

  pub fn reserve(&mut self, mask: u64) {
    self.flags |= mask;
  }

  pub fn release(&mut self, mask: u64) {
    self.flags &= !mask;
  }

  pub fn raw(&self) -> u64 {
    self.flags
  }
}

/// Whether taking `route` out of `node` would run into a reserved block.
/// Stops the aircraft dead when it would, so that it waits in place.
pub fn has_block(
  v: &mut Aircraft,
  node: &AutomatonPosition,
  route: Route,
  layout: &AirportLayout,
  blocks: &BlockReservationTable,
) -> bool {
  let next = layout.node(route.next);
  if next.block == 0 {
    return false;
  }

  let mut mask = next.block;
  // A candidate route that is not the node's own identity crosses the
  // candidate's block as well.
  if route != node.identity() {
    mask |= route.block;
  }

  if blocks.reserved(mask) {
    v.stop();
    return true;
  }

  false
}

/// Claim every block the aircraft needs to take `route` out of `node`.
/// Returns false (and stops the aircraft) without claiming anything when
/// any needed block is held by someone else.
pub fn set_blocks(
  v: &mut Aircraft,
  node: &AutomatonPosition,
  route: Route,
  layout: &AirportLayout,
  blocks: &mut BlockReservationTable,
) -> bool {
  let next = layout.node(route.next);

  // Standing in the destination's block already: free passage.
  if node.block & next.block == next.block {
    return true;
  }

  let mut mask = next.block;
  // Other routes out of this node with the same heading guard parallel
  // facilities; their blocks are claimed together.
  for other in node.routes() {
    if other != route && other.heading == route.heading && other.block != 0 {
      mask |= other.block;
    }
  }

  // A route whose own block equals the destination's was pre-claimed by
  // the stand allocator; do not check it against the table.
  if route.block == next.block {
    mask ^= next.block;
  }
  mask &= !node.block;

  if blocks.reserved(mask) {
    v.stop();
    return false;
  }

  blocks.reserve(mask);
  trace!(
    "{} claimed {:#x} moving {} -> {}",
    v.id, mask, node.position, route.next
  );

  true
}

/// Release the block of the position the aircraft just left. Called once
/// per arrival, before the state machine runs.
pub fn clear_block(
  v: &Aircraft,
  layout: &AirportLayout,
  blocks: &mut BlockReservationTable,
) {
  let previous = layout.node(v.ground.previous_pos).block;
  let current = layout.node(v.ground.pos).block;

  if previous != current {
    blocks.release(previous & !current);
    if previous != 0 {
      trace!(
        "{} released {:#x} at {}",
        v.id, previous, v.ground.pos
      );
    }
  }
}
