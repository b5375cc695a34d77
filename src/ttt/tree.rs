use crate::ttt::line::Line;

/// A task in the forest. `line` is the position of its `Line`; the tree never
/// copies line text, so edits made through the line store stay visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub line: usize,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub nodes: Vec<TaskNode>,
    pub roots: Vec<usize>,
}

impl Forest {
    pub fn node(&self, id: usize) -> &TaskNode {
        &self.nodes[id]
    }

    /// Node ids below `id`, depth first in file order.
    pub fn descendants(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }
}

/// Nest task lines by indentation. Non-task lines neither open nor close a
/// level, so a note between two siblings leaves them siblings.
pub fn build_forest(lines: &[Line]) -> Forest {
    let mut forest = Forest::default();
    let mut open: Vec<usize> = Vec::new();

    for line in lines.iter().filter(|line| line.is_task) {
        while let Some(&top) = open.last() {
            if lines[forest.nodes[top].line].indent >= line.indent {
                open.pop();
            } else {
                break;
            }
        }

        let id = forest.nodes.len();
        forest.nodes.push(TaskNode {
            line: line.position,
            children: Vec::new(),
        });
        match open.last() {
            Some(&parent) => forest.nodes[parent].children.push(id),
            None => forest.roots.push(id),
        }
        open.push(id);
    }

    forest
}
