//! Breadth-first exploration scenarios: exhaustiveness, replay
//! fidelity, node accounting, and API-violation detection.

use choice_guide::{BfsChooser, BfsGuide, ChoiceError, Chooser, Guide};

const TREE_DEPTH: usize = 56;

/// Drive `generator` over fresh choosers until the guide exhausts,
/// collecting each traversal's outcome.
fn run_to_exhaustion<T>(
    guide: &mut BfsGuide,
    mut generator: impl FnMut(&mut BfsChooser<'_>) -> T,
    cap: usize,
) -> Vec<T> {
    let mut outcomes = Vec::new();
    for _ in 0..cap {
        match guide.make_chooser() {
            Some(mut chooser) => outcomes.push(generator(&mut chooser)),
            None => return outcomes,
        }
    }
    panic!("guide did not exhaust within {cap} traversals");
}

/// Index of the first heads in up to `TREE_DEPTH` flips, or
/// `TREE_DEPTH` when every flip comes up tails.
fn flip_until_heads(chooser: &mut BfsChooser<'_>) -> usize {
    for i in 0..TREE_DEPTH {
        if chooser.flip().unwrap() {
            return i;
        }
    }
    TREE_DEPTH
}

#[test]
fn test_flip_until_heads_exhausts_after_every_outcome() {
    let mut guide = BfsGuide::with_seed(1);
    let mut outcomes = run_to_exhaustion(&mut guide, flip_until_heads, 200);

    assert_eq!(outcomes.len(), TREE_DEPTH + 1);
    outcomes.sort_unstable();
    assert_eq!(outcomes, (0..=TREE_DEPTH).collect::<Vec<_>>());
    assert!(guide.is_exhausted());
}

#[test]
fn test_flip_until_heads_node_accounting() {
    let mut guide = BfsGuide::with_seed(2);
    run_to_exhaustion(&mut guide, flip_until_heads, 200);

    // One two-way decision node per flip position, plus one terminal
    // marker per outcome.
    let decisions = TREE_DEPTH as u64;
    let terminals = TREE_DEPTH as u64 + 1;
    assert_eq!(guide.total_nodes(), decisions + terminals);
    assert_eq!(guide.stats().frontier_len, 0);
}

#[test]
fn test_balanced_tree_visits_every_leaf_once() {
    let depth = 5;
    let mut guide = BfsGuide::with_seed(3);
    let outcomes = run_to_exhaustion(
        &mut guide,
        |chooser| {
            let mut value = 0usize;
            for _ in 0..depth {
                value = (value << 1) | chooser.choose(2).unwrap();
            }
            value
        },
        100,
    );

    assert_eq!(outcomes.len(), 1 << depth);
    let mut sorted = outcomes;
    sorted.sort_unstable();
    assert_eq!(sorted, (0..1 << depth).collect::<Vec<_>>());
}

#[test]
fn test_balanced_tree_saved_levels_are_monotone() {
    let depth = 6;
    let mut guide = BfsGuide::with_seed(4);
    let mut previous = None;
    loop {
        let mut chooser = match guide.make_chooser() {
            Some(chooser) => chooser,
            None => break,
        };
        for _ in 0..depth {
            chooser.choose(2).unwrap();
        }
        drop(chooser);
        let level = guide.max_saved_level();
        assert!(
            level >= previous,
            "saved level regressed from {previous:?} to {level:?}"
        );
        previous = level;
    }
    // The deepest decision nodes sit one level above the leaves.
    assert_eq!(previous, Some(depth - 1));
}

#[test]
fn test_arity_change_at_same_node_is_fatal() {
    let mut guide = BfsGuide::with_seed(5);
    {
        let mut chooser = guide.make_chooser().unwrap();
        chooser.choose(3).unwrap();
    }
    let mut chooser = guide.make_chooser().unwrap();
    assert_eq!(
        chooser.choose(4),
        Err(ChoiceError::ArityMismatch {
            expected: 3,
            found: 4
        })
    );
}

#[test]
fn test_unimportant_choices_do_not_branch() {
    let with_unimportant = |chooser: &mut BfsChooser<'_>| {
        let first = chooser.choose(2).unwrap();
        let _label = chooser.choose_unimportant();
        let second = chooser.choose(2).unwrap();
        (first, second)
    };
    let without = |chooser: &mut BfsChooser<'_>| {
        let first = chooser.choose(2).unwrap();
        let second = chooser.choose(2).unwrap();
        (first, second)
    };

    let mut guide_a = BfsGuide::with_seed(6);
    let runs_a = run_to_exhaustion(&mut guide_a, with_unimportant, 50).len();
    let mut guide_b = BfsGuide::with_seed(6);
    let runs_b = run_to_exhaustion(&mut guide_b, without, 50).len();

    assert_eq!(runs_a, runs_b);
    assert_eq!(guide_a.total_nodes(), guide_b.total_nodes());
}

#[test]
fn test_weighted_arity_drives_the_tree() {
    // The weights shape only the off-frontier draw; exhaustion still
    // covers each alternative exactly once.
    let mut guide = BfsGuide::with_seed(7);
    let mut outcomes = run_to_exhaustion(
        &mut guide,
        |chooser| chooser.choose_weighted(&[1, 1, 8]).unwrap(),
        20,
    );
    outcomes.sort_unstable();
    assert_eq!(outcomes, vec![0, 1, 2]);
}

#[test]
fn test_exploration_is_deterministic_per_seed() {
    let generator = |chooser: &mut BfsChooser<'_>| {
        let mut path = Vec::new();
        loop {
            let choice = chooser.choose(3).unwrap();
            path.push(choice);
            if choice != 0 || path.len() == 3 {
                return path;
            }
        }
    };

    let mut guide_a = BfsGuide::with_seed(1234);
    let mut guide_b = BfsGuide::with_seed(1234);
    let runs_a = run_to_exhaustion(&mut guide_a, generator, 100);
    let runs_b = run_to_exhaustion(&mut guide_b, generator, 100);
    assert_eq!(runs_a, runs_b);

    let mut guide_c = BfsGuide::with_seed(4321);
    let runs_c = run_to_exhaustion(&mut guide_c, generator, 100);
    assert_eq!(runs_a.len(), runs_c.len());
}

#[test]
fn test_abandoned_bootstrap_still_counts_a_path() {
    let mut guide = BfsGuide::with_seed(8);
    {
        let _chooser = guide.make_chooser().unwrap();
        // Dropped without making any choice.
    }
    assert_eq!(guide.total_nodes(), 1);
    assert!(guide.make_chooser().is_none());
    assert!(guide.is_exhausted());
}
