//! Skill prerequisite graph.
//!
//! Provides the `SkillGraph` type, which represents prerequisite links
//! between skills as a directed acyclic graph. Built once when the skill
//! trees are loaded, so cycles are rejected before any player can try to
//! learn a skill.

use crate::error::ConfigError;
use crate::ids::SkillKey;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// A DAG of skills; an edge runs from a prerequisite to the skill that needs it.
///
/// # Examples
///
/// ```rust
/// use zzlevel::graph::SkillGraph;
/// use zzlevel::SkillKey;
///
/// let mut graph = SkillGraph::new();
/// let strength = SkillKey::new("COMBAT", "STRENGTH");
/// let crit = SkillKey::new("COMBAT", "CRITICAL_HIT");
///
/// // CRITICAL_HIT requires STRENGTH
/// graph.add_edge(crit.clone(), strength.clone());
/// assert!(graph.detect_cycles().is_ok());
///
/// // STRENGTH requiring CRITICAL_HIT closes a loop
/// graph.add_edge(strength, crit);
/// assert!(graph.detect_cycles().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SkillGraph {
    graph: DiGraph<SkillKey, ()>,
    node_map: HashMap<SkillKey, NodeIndex>,
}

impl SkillGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a node to the graph if it doesn't exist.
    ///
    /// Returns the existing node index when the skill is already present.
    pub fn add_node(&mut self, key: SkillKey) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&key) {
            idx
        } else {
            let idx = self.graph.add_node(key.clone());
            self.node_map.insert(key, idx);
            idx
        }
    }

    /// Record that `skill` requires `prerequisite`.
    ///
    /// Both nodes are added if missing.
    pub fn add_edge(&mut self, skill: SkillKey, prerequisite: SkillKey) {
        let skill_idx = self.add_node(skill);
        let prereq_idx = self.add_node(prerequisite);
        self.graph.add_edge(prereq_idx, skill_idx, ());
    }

    /// Detect prerequisite cycles.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the graph is acyclic
    /// * `Err(ConfigError::PrerequisiteCycle)` with the closed cycle path,
    ///   e.g. `[A, B, A]`, excluding skills that only lead into the cycle
    pub fn detect_cycles(&self) -> Result<(), ConfigError> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();

        for node_idx in self.graph.node_indices() {
            if !visited.contains(&node_idx) {
                let mut path = Vec::new();
                if let Some(cycle) = self.dfs_cycle(node_idx, &mut visited, &mut on_stack, &mut path)
                {
                    return Err(ConfigError::PrerequisiteCycle { path: cycle });
                }
            }
        }

        Ok(())
    }

    fn dfs_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<SkillKey>,
    ) -> Option<Vec<SkillKey>> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(self.graph[node].clone());

        for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs_cycle(neighbor, visited, on_stack, path) {
                    return Some(cycle);
                }
            } else if on_stack.contains(&neighbor) {
                let repeated = self.graph[neighbor].clone();
                let start = path.iter().position(|key| key == &repeated).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(repeated);
                return Some(cycle);
            }
        }

        on_stack.remove(&node);
        path.pop();
        None
    }
}

impl Default for SkillGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> SkillKey {
        SkillKey::new("T", name)
    }

    #[test]
    fn test_graph_add_nodes() {
        let mut graph = SkillGraph::new();
        let a = graph.add_node(key("A"));
        let b = graph.add_node(key("B"));
        assert_ne!(a, b);
        assert_eq!(graph.node_map.len(), 2);
    }

    #[test]
    fn test_graph_duplicate_nodes() {
        let mut graph = SkillGraph::new();
        let idx1 = graph.add_node(key("A"));
        let idx2 = graph.add_node(key("A"));
        assert_eq!(idx1, idx2);
        assert_eq!(graph.graph.node_count(), 1);
    }

    #[test]
    fn test_graph_no_cycle() {
        let mut graph = SkillGraph::new();
        graph.add_edge(key("B"), key("A"));
        graph.add_edge(key("C"), key("B"));
        assert!(graph.detect_cycles().is_ok());
    }

    #[test]
    fn test_cycle_path_3_node() {
        let mut graph = SkillGraph::new();
        graph.add_edge(key("B"), key("A"));
        graph.add_edge(key("C"), key("B"));
        graph.add_edge(key("A"), key("C"));

        match graph.detect_cycles() {
            Err(ConfigError::PrerequisiteCycle { path }) => {
                assert_eq!(path.len(), 4);
                assert_eq!(path[0], path[3]);
                assert!(path.contains(&key("A")));
                assert!(path.contains(&key("B")));
                assert!(path.contains(&key("C")));
            }
            other => panic!("Expected PrerequisiteCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_path_self_cycle() {
        let mut graph = SkillGraph::new();
        graph.add_edge(key("A"), key("A"));

        match graph.detect_cycles() {
            Err(ConfigError::PrerequisiteCycle { path }) => {
                assert_eq!(path, vec![key("A"), key("A")]);
            }
            other => panic!("Expected PrerequisiteCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_path_excludes_lead_in() {
        let mut graph = SkillGraph::new();
        // X -> Y -> A -> B -> A
        graph.add_edge(key("Y"), key("X"));
        graph.add_edge(key("A"), key("Y"));
        graph.add_edge(key("B"), key("A"));
        graph.add_edge(key("A"), key("B"));

        match graph.detect_cycles() {
            Err(ConfigError::PrerequisiteCycle { path }) => {
                assert!(!path.contains(&key("X")));
                assert!(!path.contains(&key("Y")));
                assert_eq!(path[0], path[path.len() - 1]);
            }
            other => panic!("Expected PrerequisiteCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cross_tree_cycle() {
        let mut graph = SkillGraph::new();
        let vitality = SkillKey::new("ENDURANCE", "VITALITY");
        let crit = SkillKey::new("COMBAT", "CRITICAL_HIT");
        let berserk = SkillKey::new("COMBAT", "BERSERK");
        graph.add_edge(berserk.clone(), crit.clone());
        graph.add_edge(berserk.clone(), vitality.clone());
        assert!(graph.detect_cycles().is_ok());

        graph.add_edge(vitality.clone(), berserk.clone());
        match graph.detect_cycles() {
            Err(ConfigError::PrerequisiteCycle { path }) => {
                assert!(path.contains(&vitality));
                assert!(path.contains(&berserk));
                assert!(!path.contains(&crit));
            }
            other => panic!("Expected PrerequisiteCycle, got {:?}", other),
        }
    }
}
