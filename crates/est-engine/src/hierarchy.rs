//! Task forest construction: cycle detachment and rollups.
//!
//! Tasks live in an arena (`Vec`) in creation order and refer to their parent
//! by index, so cycles can be found and broken without any ownership links.

use std::collections::HashMap;

use est_core::entities::{Risk, Task, TaskForest};
use est_core::enums::{RiskKind, Severity};
use est_core::hours::Hours;
use est_schema::TaskStub;

/// A built forest plus the risks raised while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyOutcome {
    pub forest: TaskForest,
    pub risks: Vec<Risk>,
}

struct Arena<'a> {
    stubs: &'a [TaskStub],
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl<'a> Arena<'a> {
    fn new(stubs: &'a [TaskStub]) -> Self {
        let position: HashMap<&str, usize> = stubs
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let parent: Vec<Option<usize>> = stubs
            .iter()
            .map(|t| {
                let p = t.parent_id.as_deref()?;
                let found = position.get(p).copied();
                if found.is_none() {
                    tracing::warn!(task = %t.id, parent = p, "unknown parent; treating task as a root");
                }
                found
            })
            .collect();

        let mut arena = Self {
            stubs,
            parent,
            children: vec![Vec::new(); stubs.len()],
        };
        arena.index_children();
        arena
    }

    fn index_children(&mut self) {
        for list in &mut self.children {
            list.clear();
        }
        for (child, parent) in self.parent.iter().enumerate() {
            if let Some(p) = parent {
                self.children[*p].push(child);
            }
        }
    }

    /// Mark everything reachable from `root`; returns the nodes in pre-order.
    fn visit(&self, root: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            order.push(node);
            // Reverse so the first child is visited first.
            stack.extend(self.children[node].iter().rev().filter(|&&c| !visited[c]));
        }
    }

    /// Follow parent links from an unvisited `start` until a node repeats.
    /// Returns the cycle's members, starting at the repeated node.
    fn find_cycle(&self, start: usize) -> Vec<usize> {
        let mut seen_at: HashMap<usize, usize> = HashMap::new();
        let mut path = Vec::new();
        let mut node = start;
        loop {
            if let Some(&at) = seen_at.get(&node) {
                return path.split_off(at);
            }
            seen_at.insert(node, path.len());
            path.push(node);
            match self.parent[node] {
                Some(p) => node = p,
                // Unreachable for unvisited nodes; every such chain ends in a cycle.
                None => return Vec::new(),
            }
        }
    }

    fn cycle_risk(&self, members: &[usize], detached: usize) -> Risk {
        // Walk from the detached task towards its former ancestors.
        let start = members.iter().position(|&m| m == detached).unwrap_or(0);
        let mut names: Vec<String> = members[start..]
            .iter()
            .chain(&members[..start])
            .map(|&m| format!("'{}'", self.stubs[m].id))
            .collect();
        names.push(format!("'{}'", self.stubs[detached].id));
        Risk::new(
            RiskKind::CycleDetected,
            Severity::Medium,
            format!(
                "Task cycle {} detected; '{}' was detached and became a root",
                names.join(" -> "),
                self.stubs[detached].id
            ),
        )
    }
}

/// Build a forest from validated task stubs.
///
/// Every cycle is broken by detaching its earliest-created member as a new
/// root, with one `CycleDetected` risk per cycle. Rollups are computed in a
/// single post-order pass; an estimate on a task with children is ignored.
#[must_use]
pub fn build_forest(stubs: &[TaskStub]) -> HierarchyOutcome {
    let mut arena = Arena::new(stubs);
    let mut risks = Vec::new();
    let mut visited = vec![false; stubs.len()];
    let mut order = Vec::with_capacity(stubs.len());

    for root in (0..stubs.len()).filter(|&i| arena.parent[i].is_none()) {
        arena.visit(root, &mut visited, &mut order);
    }

    for start in 0..stubs.len() {
        if visited[start] {
            continue;
        }
        let members = arena.find_cycle(start);
        let Some(&detached) = members.iter().min() else {
            continue;
        };
        let risk = arena.cycle_risk(&members, detached);
        tracing::warn!(task = %stubs[detached].id, cycle_len = members.len(), "detaching task cycle");
        risks.push(risk);

        arena.parent[detached] = None;
        arena.index_children();
        arena.visit(detached, &mut visited, &mut order);
    }

    // Reverse pre-order puts every descendant before its ancestors.
    let mut rollup = vec![Hours::ZERO; stubs.len()];
    for &node in order.iter().rev() {
        rollup[node] = if arena.children[node].is_empty() {
            stubs[node].estimate_hours.unwrap_or(Hours::ZERO)
        } else {
            arena.children[node]
                .iter()
                .fold(Hours::ZERO, |acc, &c| acc.saturating_add(rollup[c]))
        };
    }

    let tasks: Vec<Task> = stubs
        .iter()
        .enumerate()
        .map(|(i, stub)| {
            let is_leaf = arena.children[i].is_empty();
            if !is_leaf && stub.estimate_hours.is_some() {
                tracing::debug!(task = %stub.id, "ignoring estimate on a task with subtasks");
            }
            Task {
                id: stub.id.clone(),
                parent_id: arena.parent[i].map(|p| stubs[p].id.clone()),
                title: stub.title.clone(),
                description: stub.description.clone(),
                difficulty: stub.difficulty,
                leaf_estimate_hours: if is_leaf { stub.estimate_hours } else { None },
                rolled_up_estimate_hours: rollup[i],
            }
        })
        .collect();

    let roots = tasks
        .iter()
        .filter(|t| t.is_root())
        .map(|t| t.id.clone())
        .collect();

    HierarchyOutcome {
        forest: TaskForest { tasks, roots },
        risks,
    }
}
