//! Port-order assignment (`spec.md §4.D`): "assign implicit orders per
//! (direction, scope) group. Mandatory ports without explicit order get
//! negative slots `[-k, … -1]` so they sort before any user-specified
//! `order:0` port. Remaining ports fill non-negative slots, skipping
//! occupied indices."

use std::collections::HashSet;

use flow_weaver_ast::PortDefinition;

/// Assigns `order` to every port in `group` lacking an explicit one, then
/// sorts `group` by final order. `is_mandatory` identifies ports that must
/// sort before any user port — the control-flow triad and the scoped
/// `start/success/failure` triad (`spec.md §3`).
pub fn assign_port_order(group: &mut [(String, PortDefinition)], is_mandatory: impl Fn(&str) -> bool) {
    let occupied: HashSet<i32> = group.iter().filter_map(|(_, p)| p.order).collect();

    let mandatory_indices: Vec<usize> =
        group.iter().enumerate().filter(|(_, (n, p))| p.order.is_none() && is_mandatory(n)).map(|(i, _)| i).collect();
    let next_negative_base = -(mandatory_indices.len() as i32);
    for (slot, idx) in mandatory_indices.into_iter().enumerate() {
        group[idx].1.order = Some(next_negative_base + slot as i32);
    }

    let mut candidate = 0i32;
    let remaining_indices: Vec<usize> =
        group.iter().enumerate().filter(|(_, (_, p))| p.order.is_none()).map(|(i, _)| i).collect();
    for idx in remaining_indices {
        while occupied.contains(&candidate) {
            candidate += 1;
        }
        group[idx].1.order = Some(candidate);
        candidate += 1;
    }

    group.sort_by_key(|(_, p)| p.order.unwrap_or(0));
}
