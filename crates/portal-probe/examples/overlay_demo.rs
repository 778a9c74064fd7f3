//! Overlay Demo - Resolving Portal-Rendered Panels
//!
//! Builds a small Material-like page in the mock browser and drives a select,
//! a nested menu and a snack-bar through the overlay protocol.
//!
//! # Running
//!
//! ```bash
//! PORTAL_PROBE_LOG=debug cargo run --example overlay_demo -p portal-probe
//! ```

#![allow(clippy::uninlined_format_args)]

use portal_probe::mock::{MockNode, Mutation, OverlayPage, Reaction};
use portal_probe::{
    keys, logging, Component, Menu, Notification, OverlayConfig, OverlayResolver, ProbeError,
    ProbeResult, Select,
};
use std::time::Duration;

fn main() -> ProbeResult<()> {
    let _ = logging::init_tracing();
    println!("=== Portal Probe Overlay Demo ===\n");

    let config = OverlayConfig::default();
    let page = OverlayPage::new();

    demo_select(&page, &config)?;
    demo_menu(&page, &config)?;
    demo_snackbar(&page, &config)?;
    demo_containers(&page, &config)?;

    println!("\n=== Overlay Demo Complete ===");
    Ok(())
}

fn demo_select(page: &OverlayPage, config: &OverlayConfig) -> ProbeResult<()> {
    println!("--- Demo 1: Select ---\n");
    let b = &page.browser;
    let host = b.append(page.main, MockNode::new("mat-select").class("mat-mdc-select"));
    let value = b.append(host, MockNode::new("span").class("mat-mdc-select-value"));
    let pane = page.add_pane(false);
    let panel = b.append(pane, MockNode::new("div").class("mat-mdc-select-panel"));
    for flavour in ["Vanilla", "Chocolate", "Pistachio"] {
        let option = b.append(
            panel,
            MockNode::new("mat-option").class("mat-mdc-option").text(flavour),
        );
        b.on_click(
            option,
            Reaction::after(
                Duration::from_millis(40),
                vec![
                    Mutation::SetText(value, flavour.to_owned()),
                    Mutation::SetVisible(pane, false),
                ],
            ),
        );
    }
    b.on_click(
        host,
        Reaction::after(Duration::from_millis(60), vec![Mutation::SetVisible(pane, true)]),
    );
    b.on_key(host, keys::ESCAPE, Reaction::now(vec![Mutation::SetVisible(pane, false)]));

    let select = Select::new(Component::new(host.handle(), page.shared()), config);
    println!("Options: {:?}", select.option_texts()?);
    select.select_by_text("Pistachio")?;
    println!("Selected: {}", select.value_text()?);

    match select.select_by_text("Mint") {
        Err(ProbeError::NotFound { query }) => println!("Unknown option rejected: {}", query),
        other => println!("Unexpected: {:?}", other),
    }
    select.close()?;
    Ok(())
}

fn demo_menu(page: &OverlayPage, config: &OverlayConfig) -> ProbeResult<()> {
    println!("\n--- Demo 2: Nested Menu ---\n");
    let b = &page.browser;
    let trigger = b.append(page.main, MockNode::new("button").text("Edit"));
    let backdrop = page.add_backdrop(false);
    let outer = page.add_pane(false);
    let outer_panel = b.append(outer, MockNode::new("div").class("mat-mdc-menu-panel"));
    let item = |label: &str| MockNode::new("button").class("mat-mdc-menu-item").text(label);
    b.append(outer_panel, item("Undo"));
    let transform = b.append(outer_panel, item("Transform").attr("aria-haspopup", "menu"));
    let inner = page.add_pane(false);
    let inner_panel = b.append(inner, MockNode::new("div").class("mat-mdc-menu-panel"));
    b.append(inner_panel, item("Uppercase"));
    b.append(inner_panel, item("Lowercase"));

    b.on_click(
        trigger,
        Reaction::now(vec![Mutation::SetVisible(outer, true), Mutation::SetVisible(backdrop, true)]),
    );
    b.on_click(
        transform,
        Reaction::after(Duration::from_millis(25), vec![Mutation::SetVisible(inner, true)]),
    );
    b.on_click(
        backdrop,
        Reaction::now(vec![
            Mutation::SetVisible(outer, false),
            Mutation::SetVisible(inner, false),
            Mutation::SetVisible(backdrop, false),
        ]),
    );

    let menu = Menu::new(Component::new(trigger.handle(), page.shared()), config);
    for entry in menu.items()? {
        println!("Item: {} (submenu: {})", entry.text()?, entry.is_expandable()?);
    }
    let submenu = menu.item("Transform")?.expand()?;
    let labels: Vec<String> = submenu
        .items()?
        .iter()
        .map(|i| i.text())
        .collect::<ProbeResult<_>>()?;
    println!("Submenu: {:?}", labels);

    match menu.item("Uppercase")?.expand() {
        Err(ProbeError::ControlNotExpandable { control }) => {
            println!("Leaf item cannot expand: {}", control);
        }
        other => println!("Unexpected: {:?}", other.map(|_| ())),
    }
    menu.close()?;
    Ok(())
}

fn demo_snackbar(page: &OverlayPage, config: &OverlayConfig) -> ProbeResult<()> {
    println!("\n--- Demo 3: Snack-bar ---\n");
    let pane = page.add_unmounted_pane();
    page.browser.append(
        pane,
        MockNode::new("div").class("mat-mdc-snack-bar-container").text("Changes saved"),
    );
    page.browser
        .schedule(Duration::from_millis(30), vec![Mutation::Attach(pane)]);
    page.browser
        .schedule(Duration::from_millis(150), vec![Mutation::Remove(pane)]);

    let snack = Notification::new(page.shared(), config);
    println!("Shown: {}", snack.wait_text()?);
    snack.wait_dismissed()?;
    println!("Dismissed");
    Ok(())
}

fn demo_containers(page: &OverlayPage, config: &OverlayConfig) -> ProbeResult<()> {
    println!("\n--- Demo 4: Containers ---\n");
    let resolver = OverlayResolver::new(page.shared(), config);
    let containers = resolver.find_containers(&config.overlay_root)?;
    let visible = containers.iter().filter(|c| c.visible()).count();
    println!("Mounted panes: {}, visible: {}", containers.len(), visible);
    println!(
        "Top: {:?}",
        resolver
            .find_top_visible_container(&config.overlay_root)?
            .map(|c| c.component().handle().to_string())
    );
    println!(
        "Clicks: {}, sleeps: {}",
        page.browser.click_count(),
        page.browser.sleep_count()
    );
    Ok(())
}
