use chart_layout::core::Rect;
use chart_layout::layout::{PieOptions, layout_pie};
use chart_layout::telemetry::{DEFAULT_FILTER, init_default_tracing, init_tracing_with};

#[test]
fn tracing_installs_at_most_once() {
    assert!(DEFAULT_FILTER.contains("chart_layout"));

    let first = init_default_tracing();
    assert_eq!(first, cfg!(feature = "telemetry"));
    assert!(!init_tracing_with("trace"));

    let slices = layout_pie(&[1.0, 3.0], Rect::new(0.0, 0.0, 100.0, 100.0), &PieOptions::default())
        .expect("pie layout with a subscriber installed");
    assert_eq!(slices.len(), 2);
}
