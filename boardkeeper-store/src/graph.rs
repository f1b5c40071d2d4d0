//! Dependency graph validation
//!
//! Tasks form a directed graph through `depends_on`. Dependencies on ids that
//! are not part of the set are allowed (they only make a task unready); a
//! cycle is the one thing rejected.

use crate::error::{Result, StoreError};
use crate::types::Task;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Adjacency view of a board's tasks
#[derive(Debug, Default)]
pub struct DependencyGraph<'a> {
    edges: HashMap<&'a str, Vec<&'a str>>,
    order: Vec<&'a str>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the adjacency map, deduplicating each task's edges
    pub fn from_tasks(tasks: &'a [Task]) -> Self {
        let mut graph = Self::default();
        for task in tasks {
            let id = task.id.as_str();
            let deps = graph.edges.entry(id).or_insert_with(|| {
                graph.order.push(id);
                Vec::new()
            });
            for dep in &task.depends_on {
                if !deps.contains(&dep.as_str()) {
                    deps.push(dep.as_str());
                }
            }
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Find a node that sits on a cycle, if any
    ///
    /// Depth-first with three-state marking; the stack is explicit so long
    /// dependency chains cannot overflow. O(V + E).
    pub fn find_cycle(&self) -> Option<&'a str> {
        let mut marks: HashMap<&'a str, Mark> = HashMap::with_capacity(self.order.len());
        let mut stack: Vec<(&'a str, usize)> = Vec::new();

        for &start in &self.order {
            if marks.contains_key(start) {
                continue;
            }
            marks.insert(start, Mark::InProgress);
            stack.push((start, 0));

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let deps = self.edges.get(node).map(Vec::as_slice).unwrap_or(&[]);

                if frame.1 < deps.len() {
                    let next = deps[frame.1];
                    frame.1 += 1;
                    match marks.get(next).copied() {
                        Some(Mark::InProgress) => return Some(next),
                        Some(Mark::Done) => {}
                        None if self.edges.contains_key(next) => {
                            marks.insert(next, Mark::InProgress);
                            stack.push((next, 0));
                        }
                        // Dangling dependency: nothing to traverse
                        None => {}
                    }
                } else {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }

        None
    }

    /// Fail with `InvalidDependency` if the graph contains a cycle
    ///
    /// `subject` names the task whose change is being validated.
    pub fn ensure_acyclic(&self, subject: &str) -> Result<()> {
        match self.find_cycle() {
            Some(node) => Err(StoreError::invalid_dependency(
                subject,
                format!("dependency cycle detected at {node}"),
            )),
            None => Ok(()),
        }
    }
}

/// Validate that `tasks` contain no dependency cycle
pub fn validate_dependencies(tasks: &[Task], subject: &str) -> Result<()> {
    DependencyGraph::from_tasks(tasks).ensure_acyclic(subject)
}
