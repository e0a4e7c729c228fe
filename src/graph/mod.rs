//! Graph module: implicit link derivation and network statistics.
//!
//! The store holds only explicit bonds; this module computes the view the
//! renderer actually draws, augmenting the explicit set with derived 2nd-
//! and 3rd-degree connections.

mod derive;
mod stats;

pub use derive::derive_implicit_links;
pub use stats::{network_stats, MostConnected, NetworkStats};

use crate::store::{Bond, EndpointRef};
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Degree label on derived 2nd-degree links.
pub const SECOND_DEGREE: &str = "second_degree";
/// Degree label on derived 3rd-degree links.
pub const THIRD_DEGREE: &str = "third_degree";

/// A graph edge: an explicit bond, or a derived connection.
///
/// `category` is 1 for explicit bonds (original fields preserved verbatim),
/// 2 or 3 for derived links whose `type` is fixed to [`SECOND_DEGREE`] /
/// [`THIRD_DEGREE`]. Renderers pick stroke styles off this field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    #[serde(flatten)]
    pub bond: Bond,
    pub category: u8,
}

impl Link {
    /// Wrap an explicit bond as a first-degree link, all fields intact.
    pub fn explicit(bond: Bond) -> Self {
        Self { bond, category: 1 }
    }

    /// A derived link at the given distance (2 or 3). `source` is the
    /// traversal origin that discovered the pair.
    pub(crate) fn derived(source: &str, target: &str, distance: u8) -> Self {
        let label = if distance == 2 {
            SECOND_DEGREE
        } else {
            THIRD_DEGREE
        };
        Self {
            bond: Bond {
                id: None,
                source: EndpointRef::Id(source.to_string()),
                target: EndpointRef::Id(target.to_string()),
                bond_type: label.to_string(),
                lore: None,
                created_at: None,
                extra: Map::new(),
            },
            category: distance,
        }
    }
}
