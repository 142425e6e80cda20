//! Adjacency inference over shared connector identifiers.

use super::types::{ConnectionPair, ConnectionSnapshot};

/// Finds every pair of distinct models that share a connector identifier.
///
/// Visits index pairs `(i, j)` with `i < j` in `i`-major order and records
/// `(sources[i], sources[j])` when their connector sets intersect. Entries
/// with the same source never pair. Distinct index pairs naming the same two
/// sources are reported once each.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use connectivity_ctl::sim::connectivity::determine_connectivity;
/// use connectivity_ctl::sim::types::{ConnectionPair, ConnectionSnapshot, ConnectorId};
///
/// let ids = |s: &[&str]| s.iter().map(|x| ConnectorId::from(*x)).collect::<BTreeSet<_>>();
/// let snapshot = ConnectionSnapshot::new(
///     vec![ids(&["A"]), ids(&["A"]), ids(&["B"])],
///     vec!["pv".into(), "wind".into(), "battery".into()],
/// )
/// .unwrap();
///
/// assert_eq!(determine_connectivity(&snapshot), vec![ConnectionPair::new("pv", "wind")]);
/// ```
pub fn determine_connectivity(snapshot: &ConnectionSnapshot) -> Vec<ConnectionPair> {
    let mut pairs = Vec::new();
    for (i, (ids_a, source_a)) in snapshot.iter().enumerate() {
        for (ids_b, source_b) in snapshot.iter().skip(i + 1) {
            if source_a != source_b && !ids_a.is_disjoint(ids_b) {
                pairs.push(ConnectionPair::new(source_a, source_b));
            }
        }
    }
    pairs
}
