use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::models::{Lesson, LessonId};

/// A top-level lesson together with its direct children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonNode {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub children: Vec<Lesson>,
}

/// Builds the two-level outline of a module from its published lessons.
///
/// Both levels are ordered by `order_index`; the sort is stable, so siblings
/// sharing an index keep their input order. A child whose parent is missing
/// from `lessons`, or whose parent is itself a child, is left out of the tree.
pub fn build_lesson_tree(lessons: Vec<Lesson>) -> Vec<LessonNode> {
    let (mut top_level, children): (Vec<Lesson>, Vec<Lesson>) =
        lessons.into_iter().partition(Lesson::is_top_level);
    top_level.sort_by_key(|lesson| lesson.order_index);

    let mut nodes: Vec<LessonNode> = top_level
        .into_iter()
        .map(|lesson| LessonNode {
            lesson,
            children: Vec::new(),
        })
        .collect();

    let positions: HashMap<LessonId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.lesson.id, idx))
        .collect();

    for child in children {
        let parent_id = child.parent_id;
        match parent_id.and_then(|id| positions.get(&id)) {
            Some(&idx) => nodes[idx].children.push(child),
            None => {
                warn!(
                    lesson_id = child.id,
                    parent_id = ?parent_id,
                    "dropping lesson whose parent is not a published top-level lesson"
                );
            }
        }
    }

    for node in &mut nodes {
        node.children.sort_by_key(|lesson| lesson.order_index);
    }

    nodes
}

/// Flattens the tree into reading order: every top-level lesson followed by
/// its children.
pub fn linearize(tree: &[LessonNode]) -> Vec<&Lesson> {
    let mut linear = Vec::with_capacity(tree.iter().map(|n| 1 + n.children.len()).sum());
    for node in tree {
        linear.push(&node.lesson);
        linear.extend(node.children.iter());
    }
    linear
}

/// Previous and next lesson ids around `lesson_id` in reading order, or
/// `None` when the lesson is not part of the sequence.
pub fn neighbours(
    linear: &[&Lesson],
    lesson_id: LessonId,
) -> Option<(Option<LessonId>, Option<LessonId>)> {
    let pos = linear.iter().position(|lesson| lesson.id == lesson_id)?;
    let previous = pos.checked_sub(1).map(|p| linear[p].id);
    let next = linear.get(pos + 1).map(|lesson| lesson.id);
    Some((previous, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::fixtures::lesson;

    fn ids(linear: &[&Lesson]) -> Vec<LessonId> {
        linear.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_tree_sorts_both_levels_by_order_index() {
        let lessons = vec![
            lesson(20, None, 1),
            lesson(22, Some(20), 5),
            lesson(10, None, 0),
            lesson(21, Some(20), 2),
            lesson(11, Some(10), 0),
        ];

        let tree = build_lesson_tree(lessons);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].lesson.id, 10);
        assert_eq!(tree[1].lesson.id, 20);
        assert_eq!(tree[0].children.iter().map(|l| l.id).collect::<Vec<_>>(), vec![11]);
        assert_eq!(tree[1].children.iter().map(|l| l.id).collect::<Vec<_>>(), vec![21, 22]);
    }

    #[test]
    fn test_equal_order_index_keeps_input_order() {
        let lessons = vec![
            lesson(3, None, 0),
            lesson(1, None, 0),
            lesson(2, None, 0),
            lesson(5, Some(1), 4),
            lesson(4, Some(1), 4),
        ];

        let tree = build_lesson_tree(lessons);

        let top: Vec<_> = tree.iter().map(|n| n.lesson.id).collect();
        assert_eq!(top, vec![3, 1, 2]);
        let children: Vec<_> = tree[1].children.iter().map(|l| l.id).collect();
        assert_eq!(children, vec![5, 4]);
    }

    #[test]
    fn test_orphan_child_is_dropped() {
        // Parent 99 is unpublished and therefore absent.
        let lessons = vec![lesson(1, None, 0), lesson(2, Some(99), 0), lesson(3, Some(1), 0)];

        let tree = build_lesson_tree(lessons);
        let linear = linearize(&tree);

        assert_eq!(ids(&linear), vec![1, 3]);
    }

    #[test]
    fn test_grandchild_is_dropped() {
        let lessons = vec![lesson(1, None, 0), lesson(2, Some(1), 0), lesson(3, Some(2), 0)];

        let tree = build_lesson_tree(lessons);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, 2);
    }

    #[test]
    fn test_every_attached_child_appears_once() {
        let lessons = vec![
            lesson(1, None, 0),
            lesson(2, None, 1),
            lesson(3, Some(1), 0),
            lesson(4, Some(2), 0),
            lesson(5, Some(2), 1),
        ];

        let tree = build_lesson_tree(lessons.clone());
        let linear = linearize(&tree);

        assert_eq!(linear.len(), lessons.len());
        for l in &lessons {
            assert_eq!(linear.iter().filter(|x| x.id == l.id).count(), 1);
        }
    }

    #[test]
    fn test_linear_order_matches_tree_flattening() {
        let lessons = vec![
            lesson(7, None, 2),
            lesson(8, Some(7), 1),
            lesson(9, Some(7), 0),
            lesson(1, None, 0),
            lesson(4, None, 1),
            lesson(5, Some(4), 0),
        ];

        let tree = build_lesson_tree(lessons);
        let mut flattened = Vec::new();
        for node in &tree {
            flattened.push(node.lesson.id);
            for child in &node.children {
                flattened.push(child.id);
            }
        }

        assert_eq!(ids(&linearize(&tree)), flattened);
        assert_eq!(flattened, vec![1, 4, 5, 7, 9, 8]);
    }

    #[test]
    fn test_empty_input() {
        let tree = build_lesson_tree(Vec::new());
        assert!(tree.is_empty());
        assert!(linearize(&tree).is_empty());
    }

    #[test]
    fn test_neighbours() {
        let tree = build_lesson_tree(vec![
            lesson(1, None, 0),
            lesson(2, None, 1),
            lesson(3, Some(2), 0),
        ]);
        let linear = linearize(&tree);

        assert_eq!(neighbours(&linear, 1), Some((None, Some(2))));
        assert_eq!(neighbours(&linear, 2), Some((Some(1), Some(3))));
        assert_eq!(neighbours(&linear, 3), Some((Some(2), None)));
        assert_eq!(neighbours(&linear, 42), None);
    }

    #[test]
    fn test_node_serializes_flat_with_children() {
        let tree = build_lesson_tree(vec![lesson(1, None, 0), lesson(2, Some(1), 0)]);
        let json = serde_json::to_value(&tree[0]).expect("serialize node");

        assert_eq!(json["id"], 1);
        assert_eq!(json["children"][0]["id"], 2);
        assert_eq!(json["children"][0]["parent_id"], 1);
    }
}
