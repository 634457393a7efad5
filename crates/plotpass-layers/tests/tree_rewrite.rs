use plotpass_core::{AbortSignal, Layer, LineCap, Path, Point, StrokeStyle, TravelBudget};
use plotpass_engine::{plan, PlanOptions};
use plotpass_layers::{render_layers, split_tree, LayerTree, DEFAULT_TOLERANCE};

fn line(x0: f64, y: f64, x1: f64) -> Path {
    Path::new(vec![Point::new(x0, y), Point::new(x1, y)]).unwrap()
}

fn sample_layers() -> Vec<Layer> {
    vec![
        Layer::new(1, "Secondary", "#0000ff").with_paths(vec![line(0.0, 10.0, 800.0)]),
        Layer::new(0, "Primary", "#ff0000").with_paths(vec![
            line(0.0, 0.0, 1500.0),
            line(1500.0, 5.0, 0.0),
            line(0.0, 20.0, 1500.0),
        ]),
        Layer::new(2, "Unused", "#00ff00"),
    ]
}

#[test]
fn test_from_layers_round_trip() {
    let layers = sample_layers();
    let tree = LayerTree::from_layers(&layers, DEFAULT_TOLERANCE);
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.to_layers(), layers);
}

#[test]
fn test_apply_budget_replaces_nodes() {
    let mut tree = LayerTree::from_layers(&sample_layers(), DEFAULT_TOLERANCE);
    let plan = tree.apply_budget(TravelBudget::from_meters(Some(2.0)));

    assert_eq!(
        tree.labels(),
        vec![
            "Primary (pass 1/3)",
            "Primary (pass 2/3)",
            "Primary (pass 3/3)",
            "Secondary",
        ]
    );
    assert_eq!(plan.total_layers, 4);
    assert_eq!(plan.split_layers, 1);
    assert_eq!(tree.layers()[3].base_label, "Secondary");
}

#[test]
fn test_split_tree_leaves_source_untouched() {
    let tree = LayerTree::from_layers(&sample_layers(), DEFAULT_TOLERANCE);
    let (nodes, plan) = split_tree(&tree, TravelBudget::from_mm(1000.0));
    assert_eq!(nodes.len(), plan.passes.len());
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.labels(), vec!["Secondary", "Primary", "Unused"]);
}

#[test]
fn test_render_matches_engine_pipeline() {
    let layers = sample_layers();
    for budget in [None, TravelBudget::from_mm(700.0), TravelBudget::from_meters(Some(2.0))] {
        for optimize in [true, false] {
            let options = PlanOptions { optimize };
            let (_, tree_plan) =
                render_layers(&layers, budget, options, DEFAULT_TOLERANCE, AbortSignal::new())
                    .unwrap();
            let engine_plan = plan(&layers, budget, options);
            assert_eq!(tree_plan, engine_plan);
        }
    }
}

#[test]
fn test_render_reorders_for_travel() {
    // Left, right, then center: cheapest insertion draws them left to right
    let layers = vec![Layer::new(0, "Ink", "#000").with_paths(vec![
        line(0.0, 0.0, 10.0),
        line(40.0, 0.0, 50.0),
        line(20.0, 0.0, 30.0),
    ])];
    let (tree, _) = render_layers(
        &layers,
        None,
        PlanOptions::default(),
        DEFAULT_TOLERANCE,
        AbortSignal::new(),
    )
    .unwrap();

    let starts: Vec<f64> = tree.to_layers()[0].paths.iter().map(|p| p.start().x).collect();
    assert_eq!(starts, vec![0.0, 20.0, 40.0]);
}

#[test]
fn test_stroke_style_survives_tree() {
    let style = StrokeStyle {
        width: Some(0.3),
        cap: Some(LineCap::Round),
        ..StrokeStyle::default()
    };
    let path = Path::with_style(vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0)], style.clone())
        .unwrap();
    let mut tree = LayerTree::from_layers(
        &[Layer::new(0, "Ink", "#000").with_paths(vec![path])],
        DEFAULT_TOLERANCE,
    );
    let plan = tree.apply_budget(TravelBudget::from_mm(10.0));

    assert_eq!(plan.passes.len(), 3);
    for node in tree.layers() {
        assert!(node.commands.iter().all(|c| c.style() == &style));
    }
}

#[test]
fn test_duplicate_stroke_and_order_keep_their_layers() {
    let layers = vec![
        Layer::new(0, "A", "#000").with_paths(vec![line(0.0, 0.0, 10.0)]),
        Layer::new(0, "B", "#000").with_paths(vec![line(0.0, 5.0, 10.0)]),
    ];
    let (tree, tree_plan) =
        render_layers(&layers, None, PlanOptions::default(), DEFAULT_TOLERANCE, AbortSignal::new())
            .unwrap();

    assert_eq!(tree.labels(), vec!["A", "B"]);
    assert_eq!(tree_plan, plan(&layers, None, PlanOptions::default()));
}
