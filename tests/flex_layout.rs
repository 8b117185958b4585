//! Flex layout through the scene: batching, measurement-driven re-layout
//! and bottom-up size propagation.
//!
//! Run with: cargo test --test flex_layout -- --nocapture

use std::cell::Cell;
use std::rc::Rc;

use spark_scene::{Config, Dimensions, HeadlessRenderer, NodeId, RendererEvent, Scene};

fn setup() -> (Scene, HeadlessRenderer) {
    let engine = HeadlessRenderer::new();
    let scene = Scene::new(Box::new(engine.clone()), Config::default());
    (scene, engine)
}

fn boxed(scene: &mut Scene, width: f64, height: f64) -> NodeId {
    let id = scene.create_element("view");
    scene.set_property(id, "width", width);
    scene.set_property(id, "height", height);
    id
}

fn flex_row(scene: &mut Scene, width: Option<f64>, height: f64) -> NodeId {
    let row = scene.create_element("view");
    scene.set_property(row, "display", "flex");
    if let Some(width) = width {
        scene.set_property(row, "width", width);
    }
    scene.set_property(row, "height", height);
    row
}

fn x_of(scene: &Scene, id: NodeId) -> f64 {
    scene.number(id, "x").unwrap_or(f64::NAN)
}

#[test]
fn flex_start_places_children_with_gap() {
    let (mut scene, engine) = setup();
    let root = scene.root();
    let row = flex_row(&mut scene, Some(1000.0), 200.0);
    scene.set_property(row, "gap", 10);
    let kids: Vec<NodeId> = [100.0, 50.0, 150.0]
        .into_iter()
        .map(|w| boxed(&mut scene, w, 40.0))
        .collect();
    for &kid in &kids {
        scene.insert_node(row, kid, None);
    }
    scene.insert_node(root, row, None);
    scene.run_microtasks();

    let xs: Vec<f64> = kids.iter().map(|&k| x_of(&scene, k)).collect();
    assert_eq!(xs, vec![0.0, 110.0, 170.0]);

    let last = scene.node(kids[2]).and_then(|n| n.handle()).expect("committed");
    assert_eq!(engine.number(last, "x"), Some(170.0));
}

#[test]
fn align_items_uses_cross_axis() {
    let (mut scene, _) = setup();
    let root = scene.root();
    let row = flex_row(&mut scene, Some(1000.0), 100.0);
    scene.set_property(row, "alignItems", "center");
    let kid = boxed(&mut scene, 100.0, 40.0);
    scene.insert_node(row, kid, None);
    scene.insert_node(root, row, None);
    scene.run_microtasks();

    assert_eq!(scene.number(kid, "y"), Some(30.0));
}

#[test]
fn excluded_children_keep_their_position() {
    let (mut scene, _) = setup();
    let root = scene.root();
    let row = flex_row(&mut scene, Some(1000.0), 100.0);
    let a = boxed(&mut scene, 100.0, 40.0);
    let overlay = boxed(&mut scene, 100.0, 40.0);
    let b = boxed(&mut scene, 100.0, 40.0);
    scene.set_property(overlay, "flexItem", false);
    scene.set_property(overlay, "x", 500);
    for id in [a, overlay, b] {
        scene.insert_node(row, id, None);
    }
    scene.insert_node(root, row, None);
    scene.run_microtasks();

    assert_eq!(x_of(&scene, overlay), 500.0);
    assert_eq!(x_of(&scene, b), 100.0);
}

#[test]
fn insert_into_rendered_row_places_new_child() {
    let (mut scene, engine) = setup();
    let root = scene.root();
    let row = flex_row(&mut scene, Some(1000.0), 100.0);
    let a = boxed(&mut scene, 100.0, 40.0);
    scene.insert_node(row, a, None);
    scene.insert_node(root, row, None);
    scene.run_microtasks();

    let b = boxed(&mut scene, 60.0, 40.0);
    scene.insert_node(row, b, None);

    // Placed before commit, so the engine never sees it at 0
    let handle = scene.node(b).and_then(|n| n.handle()).expect("committed");
    let created = engine.node(handle).expect("engine node");
    assert_eq!(created.props.get("x").and_then(|v| v.as_number()), Some(100.0));
}

#[test]
fn autosized_row_propagates_once() {
    let (mut scene, _) = setup();
    let root = scene.root();
    let column = scene.create_element("view");
    scene.set_property(column, "display", "flex");
    scene.set_property(column, "flexDirection", "column");
    scene.set_property(column, "width", 500);
    scene.set_property(column, "height", 500);

    let row = flex_row(&mut scene, None, 50.0);
    let kids: Vec<NodeId> = [100.0, 50.0, 150.0]
        .into_iter()
        .map(|w| boxed(&mut scene, w, 40.0))
        .collect();
    scene.set_property(row, "gap", 10);
    for &kid in &kids {
        scene.insert_node(row, kid, None);
    }
    scene.insert_node(column, row, None);
    scene.insert_node(root, column, None);
    scene.run_microtasks();

    assert!(scene.node(row).is_some_and(|n| n.is_autosized()));
    assert_eq!(scene.number(row, "width"), Some(320.0));

    let parent_passes = Rc::new(Cell::new(0));
    let count = parent_passes.clone();
    scene.set_on_layout(column, move |_, _, _, _| {
        count.set(count.get() + 1);
        false
    });

    scene.set_property(kids[0], "width", 200);
    scene.update_layout(row, None, None);
    assert_eq!(scene.number(row, "width"), Some(420.0));
    assert_eq!(parent_passes.get(), 1);

    // Same content, same size: the parent is left alone
    scene.update_layout(row, None, None);
    assert_eq!(parent_passes.get(), 1);
}

#[test]
fn fixed_boundary_keeps_container_size() {
    let (mut scene, _) = setup();
    let root = scene.root();
    let row = flex_row(&mut scene, None, 50.0);
    scene.set_property(row, "flexBoundary", "fixed");
    let kid = boxed(&mut scene, 100.0, 40.0);
    scene.insert_node(row, kid, None);
    scene.insert_node(root, row, None);
    scene.run_microtasks();

    assert_eq!(scene.number(row, "width"), Some(1920.0));
}

#[test]
fn text_measurement_drives_layout() {
    let (mut scene, engine) = setup();
    let root = scene.root();
    let row = flex_row(&mut scene, Some(1000.0), 100.0);
    let label = scene.create_element("text");
    let leaf = scene.create_text_node("Hi");
    scene.insert_node(label, leaf, None);
    let icon = boxed(&mut scene, 50.0, 50.0);
    scene.insert_node(row, label, None);
    scene.insert_node(row, icon, None);
    scene.insert_node(root, row, None);
    scene.run_microtasks();

    // Unmeasured text aborts the pass
    assert_eq!(x_of(&scene, icon), 0.0);

    let label_handle = scene.node(label).and_then(|n| n.handle()).expect("label");
    let committed = engine.node(label_handle).expect("text node");
    assert!(committed.is_text);
    assert_eq!(committed.props.get("text").and_then(|v| v.as_str()), Some("Hi"));
    assert_eq!(committed.props.get("fontFamily").and_then(|v| v.as_str()), Some("Ubuntu"));

    scene.handle_event(label_handle, RendererEvent::Loaded { dimensions: Dimensions::new(80.0, 20.0) });
    assert_eq!(scene.number(label, "width"), Some(80.0));
    assert_eq!(x_of(&scene, icon), 80.0);

    // One-shot: a stray load does not resize
    scene.handle_event(label_handle, RendererEvent::Loaded { dimensions: Dimensions::new(200.0, 20.0) });
    assert_eq!(scene.number(label, "width"), Some(80.0));

    // New text re-arms measurement
    scene.replace_text(leaf, "Hello");
    scene.handle_event(label_handle, RendererEvent::Loaded { dimensions: Dimensions::new(120.0, 20.0) });
    assert_eq!(x_of(&scene, icon), 120.0);
}

#[test]
fn contained_single_line_text_is_sized_up_front() {
    let (mut scene, _) = setup();
    let root = scene.root();
    let label = scene.create_element("text");
    scene.set_property(label, "contain", "width");
    scene.set_property(label, "maxLines", 1);
    scene.set_property(label, "x", 20);
    scene.set_property(label, "marginRight", 10);
    let leaf = scene.create_text_node("Title");
    scene.insert_node(label, leaf, None);
    scene.insert_node(root, label, None);

    assert_eq!(scene.number(label, "width"), Some(1890.0));
    assert_eq!(scene.number(label, "height"), Some(100.0));
    assert!(scene.node(label).is_some_and(|n| !n.is_autosized()));
}
