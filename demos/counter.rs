//! Counter Example - state, events, and incremental commits
//!
//! This example demonstrates:
//! - A function component holding state with `use_state`
//! - An `onClick` listener that queues a state update
//! - Time-sliced render passes settling into minimal host patches
//! - Painting the resulting document to the terminal
//!
//! Run with: RUST_LOG=spark_fiber=debug cargo run --example counter

use std::io::{self, Write};

use spark_fiber::{
    Component, EventHandler, Props, SchedulerConfig, TerminalHost, component, create_element,
    mount,
};
use tracing_subscriber::EnvFilter;

fn counter() -> Component {
    Component::new("Counter", |cx, props| {
        let (count, set_count) = cx.use_state(1i64);
        let step = props.get("step").and_then(|v| v.as_str()).unwrap_or("1");
        let step: i64 = step.parse().unwrap_or(1);

        let click = EventHandler::new(move |_| set_count.update(move |c| c + step));
        create_element(
            "div",
            Props::new(),
            vec![
                create_element(
                    "h1",
                    Props::new().with("onClick", click).with("color", "cyan"),
                    vec![format!("Counter: {count}").into()],
                )
                .into(),
                create_element("p", Props::new(), vec!["click the heading".into()]).into(),
            ],
        )
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut host = TerminalHost::new();
    let container = host.create_container("root");
    let app = component(&counter(), Props::new().with("step", "2"));

    let mut handle = mount(host, container, app, SchedulerConfig::default());
    let report = handle.run_until_idle()?;

    let mut out = io::stdout();
    writeln!(out, "=== spark-fiber Counter Example ===\n")?;
    writeln!(out, "mounted in {} ticks, {} units", report.ticks, report.units)?;
    handle.host().paint(&mut out, container)?;

    for click in 1..=3 {
        let heading = handle
            .host()
            .document()
            .find(container, "h1")
            .ok_or("heading not rendered")?;
        handle.host().document().dispatch(heading, "click")?;

        let report = handle.run_until_idle()?;
        let patches: usize = report.commits.iter().map(|c| c.patches).sum();
        writeln!(out, "\nclick {click}: {patches} patches")?;
        handle.host().paint(&mut out, container)?;
    }

    out.flush()?;
    Ok(())
}
