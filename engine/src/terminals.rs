use tracing::trace;

use crate::{
  blocks::BlockReservationTable,
  entities::aircraft::Aircraft,
  layout::{helipad_block, term_block, AirportLayout, Heading},
};

/// Assign the lowest-numbered free terminal to `v`: mark its block and put
/// the aircraft into the matching terminal state. Returns false when every
/// reachable terminal is occupied.
///
/// When the aircraft's current node carries group markers, only groups
/// whose gating block is free are searched, in marker order.
pub fn find_free_terminal(
  v: &mut Aircraft,
  layout: &AirportLayout,
  blocks: &mut BlockReservationTable,
) -> bool {
  let node = layout.node(v.ground.pos);
  let markers: Vec<_> = node.group_markers().collect();

  if layout.terminal_groups() > 1 && markers.len() == layout.terminal_groups()
  {
    let mut base = 0;
    for (group, marker) in markers.iter().enumerate() {
      let count = layout.terminal_counts[group];
      if !blocks.reserved(marker.block)
        && assign_terminal(v, blocks, base, base + count)
      {
        return true;
      }
      base += count;
    }

    return false;
  }

  assign_terminal(v, blocks, 0, layout.num_terminals())
}

/// Like [`find_free_terminal`], for helipads. Classes without helipads
/// park helicopters at a plane terminal instead.
pub fn find_free_helipad(
  v: &mut Aircraft,
  layout: &AirportLayout,
  blocks: &mut BlockReservationTable,
) -> bool {
  if layout.num_helipads() == 0 {
    return find_free_terminal(v, layout, blocks);
  }

  let node = layout.node(v.ground.pos);
  let markers: Vec<_> = node.group_markers().collect();

  if layout.helipad_groups() > 1 && markers.len() == layout.helipad_groups() {
    let mut base = 0;
    for (group, marker) in markers.iter().enumerate() {
      let count = layout.helipad_counts[group];
      if !blocks.reserved(marker.block)
        && assign_helipad(v, blocks, base, base + count)
      {
        return true;
      }
      base += count;
    }

    return false;
  }

  assign_helipad(v, blocks, 0, layout.num_helipads())
}

fn assign_terminal(
  v: &mut Aircraft,
  blocks: &mut BlockReservationTable,
  base: u8,
  limit: u8,
) -> bool {
  for index in base..limit {
    if !blocks.reserved(term_block(index)) {
      blocks.reserve(term_block(index));
      v.ground.state = Heading::Terminal(index + 1);
      trace!("{} assigned terminal {}", v.id, index + 1);
      return true;
    }
  }

  false
}

fn assign_helipad(
  v: &mut Aircraft,
  blocks: &mut BlockReservationTable,
  base: u8,
  limit: u8,
) -> bool {
  for index in base..limit {
    if !blocks.reserved(helipad_block(index)) {
      blocks.reserve(helipad_block(index));
      v.ground.state = Heading::Helipad(index + 1);
      trace!("{} assigned helipad {}", v.id, index + 1);
      return true;
    }
  }

  false
}
