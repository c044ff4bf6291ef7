use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Difficulty;
use crate::hours::Hours;

/// A unit of work in the task hierarchy.
///
/// `leaf_estimate_hours` is only ever set on leaves. `rolled_up_estimate_hours`
/// is computed: the leaf estimate (0 when absent) for leaves, the sum of the
/// children's rollups otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[schemars(with = "Option<f64>")]
    pub leaf_estimate_hours: Option<Hours>,
    #[schemars(with = "f64")]
    pub rolled_up_estimate_hours: Hours,
}

impl Task {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A task forest: tasks in creation order plus the IDs of the roots.
///
/// Parent/child links are ID references into `tasks`; the forest owns every
/// task exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TaskForest {
    pub tasks: Vec<Task>,
    pub roots: Vec<String>,
}

impl TaskForest {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Children of `id`, in creation order.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks
            .iter()
            .filter(move |t| t.parent_id.as_deref() == Some(id))
    }

    /// Sum of the root rollups.
    #[must_use]
    pub fn total_hours(&self) -> Hours {
        self.roots
            .iter()
            .filter_map(|id| self.get(id))
            .map(|t| t.rolled_up_estimate_hours)
            .sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
