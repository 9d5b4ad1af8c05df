use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::models::{Lesson, LessonId};
use crate::progression::tree::LessonNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleProgress {
    /// Top-level lessons only, the "N materi" shown in the outline.
    pub display_count: usize,
    /// Every lesson in reading order; the denominator of `percentage`.
    pub total_lessons: usize,
    pub completed_count: usize,
    pub percentage: u8,
}

/// Narrows a user's global completion set to the lessons of one sequence.
pub fn completed_within(linear: &[&Lesson], completed: &HashSet<LessonId>) -> HashSet<LessonId> {
    linear
        .iter()
        .map(|lesson| lesson.id)
        .filter(|id| completed.contains(id))
        .collect()
}

/// Lessons the user may open under strict sequential access.
///
/// The first lesson is always open and each later lesson opens once its
/// predecessor is completed. Completed lessons stay open for review even if
/// an earlier lesson was never finished.
pub fn unlocked_lessons(linear: &[&Lesson], completed: &HashSet<LessonId>) -> BTreeSet<LessonId> {
    let mut unlocked = BTreeSet::new();

    if let Some(first) = linear.first() {
        unlocked.insert(first.id);
    }

    for pair in linear.windows(2) {
        if completed.contains(&pair[0].id) {
            unlocked.insert(pair[1].id);
        }
    }

    unlocked.extend(
        linear
            .iter()
            .map(|lesson| lesson.id)
            .filter(|id| completed.contains(id)),
    );

    unlocked
}

pub fn module_progress(tree: &[LessonNode], completed: &HashSet<LessonId>) -> ModuleProgress {
    let display_count = tree.len();
    let mut total_lessons = 0;
    let mut completed_count = 0;

    let all_ids = tree
        .iter()
        .flat_map(|node| std::iter::once(&node.lesson).chain(node.children.iter()))
        .map(|lesson| lesson.id);
    for id in all_ids {
        total_lessons += 1;
        if completed.contains(&id) {
            completed_count += 1;
        }
    }

    ModuleProgress {
        display_count,
        total_lessons,
        completed_count,
        percentage: rounded_percentage(completed_count, total_lessons),
    }
}

/// `round(100 * part / whole)` with halves rounded up, 0 for an empty whole.
fn rounded_percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u64;
    let whole = whole as u64;
    ((200 * part + whole) / (2 * whole)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::fixtures::lesson;
    use crate::progression::tree::{build_lesson_tree, linearize};

    fn set(ids: &[LessonId]) -> HashSet<LessonId> {
        ids.iter().copied().collect()
    }

    fn ordered(ids: &[LessonId]) -> BTreeSet<LessonId> {
        ids.iter().copied().collect()
    }

    // A(order 0), B(order 1) with child C(order 0).
    fn sample_tree() -> Vec<LessonNode> {
        build_lesson_tree(vec![
            lesson(1, None, 0),
            lesson(2, None, 1),
            lesson(3, Some(2), 0),
        ])
    }

    #[test]
    fn test_sample_module_scenario() {
        let tree = sample_tree();
        let linear = linearize(&tree);
        assert_eq!(linear.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        assert_eq!(unlocked_lessons(&linear, &set(&[])), ordered(&[1]));
        assert_eq!(unlocked_lessons(&linear, &set(&[1])), ordered(&[1, 2]));
        assert_eq!(unlocked_lessons(&linear, &set(&[1, 3])), ordered(&[1, 2, 3]));

        let progress = module_progress(&tree, &set(&[1, 3]));
        assert_eq!(progress.display_count, 2);
        assert_eq!(progress.total_lessons, 3);
        assert_eq!(progress.completed_count, 2);
        assert_eq!(progress.percentage, 67);
    }

    #[test]
    fn test_empty_sequence_unlocks_nothing() {
        assert!(unlocked_lessons(&[], &set(&[1, 2])).is_empty());
    }

    #[test]
    fn test_single_lesson_always_unlocked() {
        let only = lesson(5, None, 0);
        let linear = vec![&only];
        assert_eq!(unlocked_lessons(&linear, &set(&[])), ordered(&[5]));
        assert_eq!(unlocked_lessons(&linear, &set(&[5])), ordered(&[5]));
    }

    #[test]
    fn test_sequential_gate_holds_for_every_completion_pattern() {
        let tree = build_lesson_tree(vec![
            lesson(1, None, 0),
            lesson(2, Some(1), 0),
            lesson(3, Some(1), 1),
            lesson(4, None, 1),
            lesson(5, Some(4), 0),
        ]);
        let linear = linearize(&tree);
        let all: Vec<LessonId> = linear.iter().map(|l| l.id).collect();

        for mask in 0u32..(1 << all.len()) {
            let completed: HashSet<LessonId> = all
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, id)| *id)
                .collect();
            let unlocked = unlocked_lessons(&linear, &completed);

            assert!(unlocked.contains(&all[0]));
            for i in 1..all.len() {
                let expected = completed.contains(&all[i - 1]) || completed.contains(&all[i]);
                assert_eq!(unlocked.contains(&all[i]), expected, "mask {mask:b} position {i}");
            }
        }
    }

    #[test]
    fn test_completed_lessons_outside_sequence_are_ignored() {
        let tree = sample_tree();
        let linear = linearize(&tree);

        let unlocked = unlocked_lessons(&linear, &set(&[100, 200]));
        assert_eq!(unlocked, ordered(&[1]));

        let progress = module_progress(&tree, &set(&[100, 200]));
        assert_eq!(progress.completed_count, 0);
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn test_completed_within_filters_to_module() {
        let tree = sample_tree();
        let linear = linearize(&tree);
        assert_eq!(completed_within(&linear, &set(&[1, 3, 77])), set(&[1, 3]));
    }

    #[test]
    fn test_progress_bounds() {
        let tree = sample_tree();

        let none = module_progress(&tree, &set(&[]));
        assert_eq!(none.percentage, 0);

        let all = module_progress(&tree, &set(&[1, 2, 3]));
        assert_eq!(all.percentage, 100);
        assert_eq!(all.completed_count, all.total_lessons);
    }

    #[test]
    fn test_zero_lesson_module_reports_zero() {
        let progress = module_progress(&[], &set(&[1]));
        assert_eq!(progress.total_lessons, 0);
        assert_eq!(progress.display_count, 0);
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(rounded_percentage(1, 3), 33);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(1, 8), 13); // 12.5
        assert_eq!(rounded_percentage(1, 200), 1); // 0.5
        assert_eq!(rounded_percentage(1, 201), 0);
        assert_eq!(rounded_percentage(7, 7), 100);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let tree = sample_tree();
        let linear = linearize(&tree);
        let completed = set(&[1, 3]);

        assert_eq!(unlocked_lessons(&linear, &completed), unlocked_lessons(&linear, &completed));
        assert_eq!(module_progress(&tree, &completed), module_progress(&tree, &completed));
    }
}
