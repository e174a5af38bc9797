//! End-to-end render scenarios against the in-memory host.

use std::cell::RefCell;
use std::rc::Rc;

use spark_fiber::*;
use test_case::test_case;

fn setup() -> (Scheduler<MemoryHost>, NodeId) {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    (Scheduler::new(host), container)
}

fn commit(scheduler: &mut Scheduler<MemoryHost>) -> CommitReport {
    let report = scheduler.tick(&Unbounded).expect("tick failed");
    *report.committed().expect("pass did not commit")
}

fn el(tag: &str, children: Vec<Child>) -> Element {
    create_element(tag, Props::new(), children)
}

fn page(body: &str) -> Element {
    el("div", vec![el("h1", vec!["A".into()]).into(), el("p", vec![body.into()]).into()])
}

/// The call log with node ids replaced by their tags.
fn describe(host: &MemoryHost) -> Vec<String> {
    let tag = |node: NodeId| host.tag(node).map(|t| t.to_string()).unwrap_or_default();
    host.calls()
        .iter()
        .map(|call| match call {
            HostCall::Create { tag: t, .. } => format!("create {t}"),
            HostCall::Append { parent, child } => format!("append {} > {}", tag(*parent), tag(*child)),
            HostCall::Remove { parent, child } => format!("remove {} > {}", tag(*parent), tag(*child)),
            HostCall::Patch { node, patch } => format!("patch {} {patch:?}", tag(*node)),
            HostCall::Destroy { tag: t, .. } => format!("destroy {t}"),
        })
        .collect()
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_initial_render_creates_then_inserts_in_preorder() {
    let (mut scheduler, container) = setup();

    scheduler.render(page("B"), container);
    let report = commit(&mut scheduler);

    assert_eq!(
        describe(scheduler.host()),
        vec![
            "create div",
            "create h1",
            "create TEXT_ELEMENT",
            "create p",
            "create TEXT_ELEMENT",
            "append root > div",
            "append div > h1",
            "append h1 > TEXT_ELEMENT",
            "append div > p",
            "append p > TEXT_ELEMENT",
        ]
    );
    assert_eq!(report.placements, 5);
    assert_eq!(report.insertions, 5);
    assert_eq!(
        scheduler.host().inner_markup(container),
        "<div><h1>A</h1><p>B</p></div>"
    );
}

#[test]
fn test_text_change_patches_only_the_text_node() {
    let (mut scheduler, container) = setup();
    scheduler.render(page("B"), container);
    commit(&mut scheduler);

    let host = scheduler.host();
    let div = host.children(container)[0];
    let p = host.children(div)[1];
    let text_b = host.children(p)[0];
    scheduler.host_mut().take_calls();

    scheduler.render(page("C"), container);
    let report = commit(&mut scheduler);

    assert_eq!(
        scheduler.host().calls(),
        &[HostCall::Patch {
            node: text_b,
            patch: PropPatch::SetProperty {
                name: NODE_VALUE.to_string(),
                value: PropValue::from("C"),
            },
        }]
    );
    assert_eq!(report.patches, 1);
    assert_eq!(report.placements, 0);
    assert_eq!(report.deletions, 0);
    assert_eq!(
        scheduler.host().inner_markup(container),
        "<div><h1>A</h1><p>C</p></div>"
    );
}

// =============================================================================
// Diffing properties
// =============================================================================

#[test]
fn test_rerender_with_same_input_is_idempotent() {
    let (mut scheduler, container) = setup();
    scheduler.render(page("B"), container);
    commit(&mut scheduler);
    let nodes_before = scheduler.host().node_count();
    let div_before = scheduler.host().children(container).to_vec();
    scheduler.host_mut().take_calls();

    scheduler.render(page("B"), container);
    let report = commit(&mut scheduler);

    assert_eq!(report.placements, 0);
    assert_eq!(report.deletions, 0);
    assert_eq!(report.updates, 5);
    assert_eq!(report.patches, 0);
    assert!(scheduler.host().calls().is_empty());
    assert_eq!(scheduler.host().node_count(), nodes_before);
    assert_eq!(scheduler.host().children(container), div_before.as_slice());
}

#[test]
fn test_type_change_replaces_instead_of_updating() {
    let (mut scheduler, container) = setup();
    scheduler.render(el("div", vec![el("h1", vec![]).into()]), container);
    commit(&mut scheduler);
    scheduler.host_mut().take_calls();

    scheduler.render(el("div", vec![el("h2", vec![]).into()]), container);
    let report = commit(&mut scheduler);

    assert_eq!(report.deletions, 1);
    assert_eq!(report.placements, 1);
    // Only the surrounding div is an update.
    assert_eq!(report.updates, 1);
    assert_eq!(
        describe(scheduler.host()),
        vec!["create h2", "remove div > h1", "destroy h1", "append div > h2"]
    );
    assert_eq!(scheduler.host().inner_markup(container), "<div><h2></h2></div>");
}

#[test_case(3, 1 ; "three to one")]
#[test_case(4, 4 ; "unchanged length")]
#[test_case(5, 0 ; "to empty")]
#[test_case(2, 1 ; "drop last")]
fn test_shrinking_list(before: usize, after: usize) {
    let items = |n: usize| el("ul", (0..n).map(|_| el("li", vec![]).into()).collect());
    let (mut scheduler, container) = setup();
    scheduler.render(items(before), container);
    commit(&mut scheduler);

    scheduler.render(items(after), container);
    let report = commit(&mut scheduler);

    assert_eq!(report.deletions, before - after);
    assert_eq!(report.removals, before - after);
    assert_eq!(report.updates, after + 1);
    assert_eq!(report.placements, 0);

    let ul = scheduler.host().children(container)[0];
    assert_eq!(scheduler.host().children(ul).len(), after);
}

#[test]
fn test_props_delta_is_minimal() {
    let (mut scheduler, container) = setup();
    let card = |title: &str, extra: bool| {
        let mut props = Props::new().with("id", "card").with("title", title);
        if extra {
            props.insert("hidden", true);
        }
        create_element("section", props, vec![])
    };

    scheduler.render(card("one", true), container);
    commit(&mut scheduler);
    scheduler.host_mut().take_calls();

    scheduler.render(card("two", false), container);
    let report = commit(&mut scheduler);

    let section = scheduler.host().children(container)[0];
    assert_eq!(report.patches, 2);
    assert_eq!(
        scheduler.host().calls(),
        &[
            HostCall::Patch {
                node: section,
                patch: PropPatch::ClearProperty { name: "hidden".into() },
            },
            HostCall::Patch {
                node: section,
                patch: PropPatch::SetProperty { name: "title".into(), value: "two".into() },
            },
        ]
    );
}

// =============================================================================
// Interruptible work
// =============================================================================

/// Nodes are created detached while rendering, so `Create` calls may appear
/// before the final tick. Nothing attached to the container changes until then.
#[test]
fn test_yielding_never_mutates_the_host_before_the_final_tick() {
    let (mut scheduler, container) = setup();
    scheduler.render(page("B"), container);

    let mut ticks = 0;
    loop {
        let report = scheduler.tick(&UnitDeadline::new(1)).unwrap();
        ticks += 1;
        assert_eq!(report.units, 1);

        if report.committed().is_some() {
            break;
        }
        assert_eq!(report.outcome, TickOutcome::Yielded);
        assert_eq!(scheduler.host().mutation_count(), 0);
        assert!(scheduler.host().children(container).is_empty());
    }

    assert_eq!(ticks, 6);
    assert_eq!(scheduler.host().mutation_count(), 5);
    assert_eq!(
        scheduler.host().inner_markup(container),
        "<div><h1>A</h1><p>B</p></div>"
    );
}

#[test]
fn test_superseded_pass_is_never_committed() {
    let (mut scheduler, container) = setup();
    scheduler.render(page("B"), container);
    commit(&mut scheduler);
    scheduler.host_mut().take_calls();

    scheduler.render(el("span", vec![]), container);
    scheduler.tick(&UnitDeadline::new(1)).unwrap();

    scheduler.render(page("D"), container);
    let report = commit(&mut scheduler);

    assert_eq!(report.deletions, 0);
    assert_eq!(report.placements, 0);
    assert_eq!(
        scheduler.host().inner_markup(container),
        "<div><h1>A</h1><p>D</p></div>"
    );
}

// =============================================================================
// Host node lifetime
// =============================================================================

#[test]
fn test_replaced_nodes_are_released() {
    let (mut scheduler, container) = setup();

    for i in 0..100 {
        let tag = if i % 2 == 0 { "a" } else { "b" };
        scheduler.render(el(tag, vec![]), container);
        commit(&mut scheduler);
    }

    assert_eq!(scheduler.host().children(container).len(), 1);
    // The container plus the one live child.
    assert_eq!(scheduler.host().node_count(), 2);
}

#[test]
fn test_deleted_subtrees_are_released() {
    let (mut scheduler, container) = setup();
    scheduler.render(page("B"), container);
    commit(&mut scheduler);
    assert_eq!(scheduler.host().node_count(), 6);

    scheduler.render(el("span", vec![]), container);
    commit(&mut scheduler);

    assert_eq!(scheduler.host().node_count(), 2);
    assert_eq!(scheduler.host().inner_markup(container), "<span></span>");
}

#[test]
fn test_nodes_of_a_superseded_pass_are_released() {
    let (mut scheduler, container) = setup();
    scheduler.render(page("B"), container);
    commit(&mut scheduler);

    // Root, then the section, whose node is created but never attached.
    scheduler.render(el("section", vec![el("i", vec![]).into()]), container);
    let tick = scheduler.tick(&UnitDeadline::new(2)).unwrap();
    assert_eq!(tick.outcome, TickOutcome::Yielded);
    assert_eq!(scheduler.host().node_count(), 7);

    scheduler.render(page("D"), container);
    commit(&mut scheduler);

    assert_eq!(scheduler.host().node_count(), 6);
    assert_eq!(
        scheduler.host().inner_markup(container),
        "<div><h1>A</h1><p>D</p></div>"
    );
}

// =============================================================================
// Hooks
// =============================================================================

type Slot = Rc<RefCell<Option<SetState<i64>>>>;

fn counter(slot: Slot) -> Component {
    Component::new("Counter", move |cx, _| {
        let (count, set) = cx.use_state(1i64);
        *slot.borrow_mut() = Some(set.clone());

        let click = EventHandler::new(move |_| set.update(|c| c + 1));
        create_element(
            "h1",
            Props::new().with("onClick", click),
            vec![format!("Counter: {count}").into()],
        )
    })
}

fn setter(slot: &Slot) -> SetState<i64> {
    slot.borrow().clone().expect("component has not rendered")
}

#[test]
fn test_queued_updates_apply_in_call_order() {
    let (mut scheduler, container) = setup();
    let slot: Slot = Rc::default();
    scheduler.render(component(&counter(slot.clone()), Props::new()), container);
    commit(&mut scheduler);

    let set = setter(&slot);
    set.update(|c| c + 1);
    set.update(|c| c * 2);
    assert!(scheduler.has_pending_work());

    commit(&mut scheduler);

    assert_eq!(scheduler.host().inner_markup(container), "<h1>Counter: 4</h1>");
}

#[test]
fn test_state_persists_across_rerenders() {
    let (mut scheduler, container) = setup();
    let slot: Slot = Rc::default();
    scheduler.render(component(&counter(slot.clone()), Props::new()), container);
    commit(&mut scheduler);

    setter(&slot).set(10);
    commit(&mut scheduler);
    setter(&slot).update(|c| c + 5);
    commit(&mut scheduler);

    assert_eq!(scheduler.host().inner_markup(container), "<h1>Counter: 15</h1>");
}

#[test]
fn test_click_listener_drives_state() {
    let (mut scheduler, container) = setup();
    let slot: Slot = Rc::default();
    scheduler.render(component(&counter(slot), Props::new()), container);
    commit(&mut scheduler);

    let h1 = scheduler.host().find(container, "h1").unwrap();
    for _ in 0..3 {
        assert_eq!(scheduler.host().dispatch(h1, "click").unwrap(), 1);
        commit(&mut scheduler);
        // The fresh handler replaced the old one; it was not stacked.
        assert_eq!(scheduler.host().listener_count(h1, "click"), 1);
    }

    assert_eq!(scheduler.host().inner_markup(container), "<h1>Counter: 4</h1>");
    assert_eq!(scheduler.host().find(container, "h1"), Some(h1));
}

#[test]
fn test_sibling_components_keep_separate_state() {
    let (mut scheduler, container) = setup();
    let first: Slot = Rc::default();
    let second: Slot = Rc::default();
    let a = counter(first.clone());
    let b = counter(second.clone());

    let app = el(
        "div",
        vec![component(&a, Props::new()).into(), component(&b, Props::new()).into()],
    );
    scheduler.render(app, container);
    commit(&mut scheduler);

    setter(&second).update(|c| c + 9);
    let report = commit(&mut scheduler);

    // Both counters swap their click handler; only the second changes text.
    assert_eq!(report.patches, 5);
    assert_eq!(
        scheduler.host().inner_markup(container),
        "<div><h1>Counter: 1</h1><h1>Counter: 10</h1></div>"
    );
}

#[test]
fn test_update_in_yielded_pass_restarts_from_root() {
    let (mut scheduler, container) = setup();
    let slot: Slot = Rc::default();
    scheduler.render(component(&counter(slot.clone()), Props::new()), container);
    commit(&mut scheduler);

    setter(&slot).update(|c| c + 1);
    let first = scheduler.tick(&UnitDeadline::new(1)).unwrap();
    assert_eq!(first.outcome, TickOutcome::Yielded);
    let passes = scheduler.passes();

    // Another update lands on the committed cell while the pass is in flight.
    setter(&slot).update(|c| c * 10);
    commit(&mut scheduler);

    assert_eq!(scheduler.passes(), passes + 1);
    assert_eq!(scheduler.host().inner_markup(container), "<h1>Counter: 20</h1>");
}

#[test]
fn test_removing_a_component_removes_its_host_nodes() {
    let (mut scheduler, container) = setup();
    let toggle: Rc<RefCell<Option<SetState<bool>>>> = Rc::default();
    let toggle_in = toggle.clone();

    let card = Component::new("Card", |_, props| {
        let title = props.get("title").map(|v| v.to_string()).unwrap_or_default();
        create_element("h2", Props::new(), vec![title.into()])
    });
    let app = Component::new("App", move |cx, _| {
        let (open, set) = cx.use_state(true);
        *toggle_in.borrow_mut() = Some(set);
        if open {
            component(&card, Props::new().with("title", "hello"))
        } else {
            create_element("p", Props::new(), vec!["closed".into()])
        }
    });

    scheduler.render(component(&app, Props::new()), container);
    commit(&mut scheduler);
    assert_eq!(scheduler.host().inner_markup(container), "<h2>hello</h2>");

    toggle.borrow().clone().unwrap().set(false);
    let report = commit(&mut scheduler);

    assert_eq!(report.deletions, 1);
    assert_eq!(report.removals, 1);
    assert_eq!(scheduler.host().inner_markup(container), "<p>closed</p>");
}

#[test]
fn test_update_before_first_commit_waits_for_it() {
    let (mut scheduler, container) = setup();
    let slot: Slot = Rc::default();
    scheduler.render(component(&counter(slot.clone()), Props::new()), container);

    // Root and Counter rendered, nothing committed yet.
    scheduler.tick(&UnitDeadline::new(2)).unwrap();
    setter(&slot).update(|c| c + 1);

    commit(&mut scheduler);
    assert_eq!(scheduler.host().inner_markup(container), "<h1>Counter: 1</h1>");
    assert!(scheduler.has_pending_work());

    commit(&mut scheduler);
    assert_eq!(scheduler.host().inner_markup(container), "<h1>Counter: 2</h1>");
}

#[test]
fn test_update_during_render_settles() {
    let slot: Slot = Rc::default();
    let slot_in = slot.clone();
    let stepper = Component::new("Stepper", move |cx, _| {
        let (n, set) = cx.use_state(0i64);
        if (1..3).contains(&n) {
            set.update(|c| c + 1);
        }
        *slot_in.borrow_mut() = Some(set);
        create_element("p", Props::new(), vec![n.into()])
    });

    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let config = SchedulerConfig::default().with_max_ticks(Some(20));
    let mut handle = mount(host, container, component(&stepper, Props::new()), config);
    handle.run_until_idle().unwrap();
    assert_eq!(handle.host().inner_markup(container), "<p>0</p>");

    setter(&slot).update(|c| c + 1);
    let report = handle.run_until_idle().unwrap();

    assert_eq!(report.commits.len(), 1);
    assert_eq!(handle.host().inner_markup(container), "<p>3</p>");
    assert!(!handle.scheduler().has_pending_work());
}
