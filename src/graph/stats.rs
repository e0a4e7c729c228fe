//! Network statistics over the explicit bond set.

use crate::store::{Bond, Person};
use serde::Serialize;
use std::collections::HashMap;

/// Aggregate statistics for the whole network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkStats {
    pub total_people: usize,
    pub total_bonds: usize,
    /// Average bond endpoints per person (bonds * 2 / people).
    pub avg_connections: f64,
    pub most_connected: Option<MostConnected>,
    /// Bond count per relationship type.
    pub type_breakdown: HashMap<String, usize>,
}

/// The person with the most bond endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct MostConnected {
    pub id: String,
    pub name: String,
    pub connections: usize,
}

/// Compute network statistics from explicit bonds only; derived links are a
/// view and don't count as connections.
///
/// Endpoint occurrences are counted per person id, dangling endpoints
/// included, so `avg_connections` is over the raw bond list.
pub fn network_stats<'a>(people: &'a [Person], bonds: &'a [Bond]) -> NetworkStats {
    let mut connection_count: HashMap<&'a str, usize> = people
        .iter()
        .map(|p| (p.id.as_str(), 0))
        .collect();
    for bond in bonds {
        *connection_count.entry(bond.source_id()).or_insert(0) += 1;
        *connection_count.entry(bond.target_id()).or_insert(0) += 1;
    }

    // Strictly-greater comparison: a person with zero bonds never wins, and
    // ties go to the earlier person in list order.
    let mut most_connected: Option<MostConnected> = None;
    let mut max_connections = 0;
    for person in people {
        let connections = connection_count
            .get(person.id.as_str())
            .copied()
            .unwrap_or(0);
        if connections > max_connections {
            max_connections = connections;
            most_connected = Some(MostConnected {
                id: person.id.clone(),
                name: person.name.clone(),
                connections,
            });
        }
    }

    let mut type_breakdown: HashMap<String, usize> = HashMap::new();
    for bond in bonds {
        *type_breakdown.entry(bond.bond_type.clone()).or_insert(0) += 1;
    }

    let avg_connections = if people.is_empty() {
        0.0
    } else {
        (bonds.len() * 2) as f64 / people.len() as f64
    };

    NetworkStats {
        total_people: people.len(),
        total_bonds: bonds.len(),
        avg_connections,
        most_connected,
        type_breakdown,
    }
}
