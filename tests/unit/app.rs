use crate::foundation::config::FieldLayout;

use super::*;

fn app(t_cells: usize) -> FlowApp {
    let layout = FieldLayout {
        x_cells: 2,
        y_cells: 1,
        t_cells,
        t_start: 10.0,
        t_end: 10.0 + t_cells as f32,
        ..FieldLayout::default()
    };
    let values = vec![0.0; layout.total_floats().unwrap()];
    let field = FlowField::from_values(layout, values).unwrap();
    FlowApp::new(FlowConfig::default(), field).unwrap()
}

#[test]
fn only_t_and_escape_are_bound() {
    assert_eq!(
        command_for_key(KeyCode::KeyT),
        Some(ViewerCommand::AdvanceTime)
    );
    assert_eq!(command_for_key(KeyCode::Escape), Some(ViewerCommand::Quit));
    for other in [KeyCode::KeyR, KeyCode::Space, KeyCode::ArrowRight, KeyCode::Enter] {
        assert_eq!(command_for_key(other), None);
    }
}

#[test]
fn advance_wraps_and_keeps_running() {
    let mut app = app(3);
    assert!(app.apply(ViewerCommand::AdvanceTime));
    assert!(app.apply(ViewerCommand::AdvanceTime));
    assert_eq!(app.frame().time_index(), 2);
    assert!(app.apply(ViewerCommand::AdvanceTime));
    assert_eq!(app.frame().time_index(), 0);
}

#[test]
fn quit_stops_without_touching_time() {
    let mut app = app(3);
    assert!(!app.apply(ViewerCommand::Quit));
    assert_eq!(app.frame().time_index(), 0);
}

#[test]
fn title_shows_step_and_time() {
    let mut app = app(4);
    assert_eq!(app.title(), "flowvis  t=10.000 (1/4)");
    app.apply(ViewerCommand::AdvanceTime);
    assert_eq!(app.title(), "flowvis  t=11.000 (2/4)");
}
