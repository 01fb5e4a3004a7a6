//! Extras group inclusion ordering.

use super::catalog::ExtraDecl;
use crate::error::{PackagerError, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Orders groups so that every group follows the groups it includes.
///
/// # Errors
///
/// Returns [`PackagerError::DuplicateExtrasGroup`] for a repeated name,
/// [`PackagerError::UnknownExtrasGroup`] for an inclusion of an undeclared
/// group, and [`PackagerError::CyclicExtrasInclusion`] when inclusions loop.
pub(super) fn inclusion_order(extras: &[ExtraDecl]) -> Result<Vec<&ExtraDecl>> {
    let mut graph: DiGraph<&ExtraDecl, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for decl in extras {
        if nodes.contains_key(decl.name.as_str()) {
            return Err(PackagerError::DuplicateExtrasGroup {
                group: decl.name.clone(),
            });
        }
        nodes.insert(decl.name.as_str(), graph.add_node(decl));
    }

    for decl in extras {
        let Some(&includer) = nodes.get(decl.name.as_str()) else {
            continue;
        };
        for included in &decl.includes {
            let Some(&source) = nodes.get(included.as_str()) else {
                return Err(PackagerError::UnknownExtrasGroup {
                    group: decl.name.clone(),
                    included: included.clone(),
                });
            };
            // Included groups resolve first.
            graph.update_edge(source, includer, ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order
            .into_iter()
            .filter_map(|index| graph.node_weight(index).copied())
            .collect()),
        Err(cycle) => Err(PackagerError::CyclicExtrasInclusion {
            group: graph
                .node_weight(cycle.node_id())
                .map(|decl| decl.name.clone())
                .unwrap_or_default(),
        }),
    }
}
