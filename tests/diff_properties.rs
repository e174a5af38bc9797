//! Property tests for the positional diff and time slicing.

use proptest::collection::vec;
use proptest::prelude::*;
use spark_fiber::*;

fn tag() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "b", "c"])
}

fn list(tags: &[&'static str]) -> Element {
    create_element(
        "ul",
        Props::new(),
        tags.iter().map(|t| create_element(*t, Props::new(), vec![]).into()).collect(),
    )
}

fn setup() -> (Scheduler<MemoryHost>, NodeId) {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    (Scheduler::new(host), container)
}

proptest! {
    #[test]
    fn prop_positional_diff_counts(
        before in vec(tag(), 0..6),
        after in vec(tag(), 0..6),
    ) {
        let (mut scheduler, container) = setup();
        scheduler.render(list(&before), container);
        scheduler.tick(&Unbounded).unwrap();

        scheduler.render(list(&after), container);
        let tick = scheduler.tick(&Unbounded).unwrap();
        let report = *tick.committed().unwrap();

        let same = before.iter().zip(&after).filter(|(a, b)| a == b).count();
        prop_assert_eq!(report.updates, same + 1);
        prop_assert_eq!(report.placements, after.len() - same);
        prop_assert_eq!(report.deletions, before.len() - same);
        prop_assert_eq!(report.patches, 0);

        let host = scheduler.host();
        let ul = host.children(container)[0];
        let rendered: Vec<String> = host
            .children(ul)
            .iter()
            .map(|&n| host.tag(n).unwrap().to_string())
            .collect();
        let mut expected: Vec<String> = after.iter().map(|t| t.to_string()).collect();
        expected.sort();
        let mut sorted = rendered.clone();
        sorted.sort();
        // Placements land at the end, so only the multiset is guaranteed.
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn prop_same_input_is_idempotent(tags in vec(tag(), 0..8)) {
        let (mut scheduler, container) = setup();
        scheduler.render(list(&tags), container);
        scheduler.tick(&Unbounded).unwrap();
        scheduler.host_mut().take_calls();

        scheduler.render(list(&tags), container);
        scheduler.tick(&Unbounded).unwrap();

        prop_assert!(scheduler.host().calls().is_empty());
    }

    #[test]
    fn prop_slicing_does_not_change_the_result(
        tags in vec(tag(), 0..8),
        slice in 1usize..5,
    ) {
        let (mut whole, whole_container) = setup();
        whole.render(list(&tags), whole_container);
        whole.tick(&Unbounded).unwrap();

        let (mut sliced, sliced_container) = setup();
        sliced.render(list(&tags), sliced_container);
        let mut units = 0;
        loop {
            let tick = sliced.tick(&UnitDeadline::new(slice)).unwrap();
            prop_assert!(tick.units <= slice);
            units += tick.units;
            if tick.committed().is_some() {
                break;
            }
            prop_assert_eq!(sliced.host().mutation_count(), 0);
        }

        // root, ul, then one unit per item
        prop_assert_eq!(units, tags.len() + 2);
        prop_assert_eq!(
            sliced.host().inner_markup(sliced_container),
            whole.host().inner_markup(whole_container)
        );
    }
}
