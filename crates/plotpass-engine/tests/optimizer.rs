use plotpass_engine::{optimize_layer, pen_up_travel, OptimizerState, Orientation, Path, Point};

fn segment(x0: f64, x1: f64) -> Path {
    Path::new(vec![Point::new(x0, 0.0), Point::new(x1, 0.0)]).unwrap()
}

fn first_x(path: &Path) -> f64 {
    path.start().x
}

#[test]
fn test_collinear_paths_converge_to_spatial_order() {
    // Arrival order: far right, center, left
    let paths = vec![segment(88.0, 92.0), segment(48.0, 52.0), segment(3.0, 7.0)];
    let ordered = optimize_layer("#000000", paths);

    let xs: Vec<f64> = ordered.iter().map(first_x).collect();
    assert_eq!(xs, vec![3.0, 48.0, 88.0]);
}

#[test]
fn test_path_reversed_when_cheaper() {
    let mut state = OptimizerState::new();
    state.register_path("red", segment(0.0, 10.0));

    // Drawn backwards this path ends at x=11; flipping it saves travel
    let placement = state.register_path("red", segment(20.0, 11.0));
    assert_eq!(placement.index, 1);
    assert_eq!(placement.orientation, Orientation::Reversed);
    assert!((placement.cost - 1.0).abs() < 1e-9);

    let group = state.group("red").unwrap();
    assert_eq!(group.paths()[1].start(), Point::new(11.0, 0.0));
    assert_eq!(group.paths()[1].end(), Point::new(20.0, 0.0));
    assert!((group.pen_up_travel() - 1.0).abs() < 1e-9);
}

#[test]
fn test_insertion_between_existing_paths() {
    let mut state = OptimizerState::new();
    state.register_path("ink", segment(0.0, 10.0));
    state.register_path("ink", segment(40.0, 50.0));

    let placement = state.register_path("ink", segment(20.0, 30.0));
    assert_eq!(placement.index, 1);
    assert_eq!(placement.orientation, Orientation::Forward);

    let xs: Vec<f64> = state.take("ink").iter().map(first_x).collect();
    assert_eq!(xs, vec![0.0, 20.0, 40.0]);
}

#[test]
fn test_colors_are_independent() {
    let mut state = OptimizerState::new();
    state.register_path("red", segment(50.0, 60.0));
    state.register_path("blue", segment(0.0, 1.0));
    let placement = state.register_path("red", segment(0.0, 1.0));

    // Index is relative to the red sequence only
    assert_eq!(placement.index, 0);
    assert_eq!(state.group("red").unwrap().len(), 2);
    assert_eq!(state.group("blue").unwrap().len(), 1);
    assert_eq!(state.colors().collect::<Vec<_>>(), vec!["red", "blue"]);
}

#[test]
fn test_optimization_reduces_travel() {
    let paths: Vec<Path> = [70.0, 10.0, 50.0, 30.0, 90.0, 0.0]
        .iter()
        .map(|&x| segment(x, x + 5.0))
        .collect();
    let before = pen_up_travel(&paths);
    let ordered = optimize_layer("ink", paths);
    assert_eq!(ordered.len(), 6);
    assert!(pen_up_travel(&ordered) < before);
}

#[test]
fn test_take_unknown_color_is_empty() {
    let mut state = OptimizerState::new();
    assert!(state.take("missing").is_empty());
    assert!(state.group("missing").is_none());
}
