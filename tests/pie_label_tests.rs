use approx::assert_relative_eq;
use chart_layout::core::Rect;
use chart_layout::layout::{
    LabelSide, PieLabelInput, PieLabelOptions, PieOptions, layout_pie, layout_pie_labels,
};
use chart_layout::ChartError;

fn label(index: usize, mid_angle: f64) -> PieLabelInput {
    PieLabelInput {
        index,
        mid_angle,
        width: 40.0,
        height: 20.0,
    }
}

#[test]
fn crowded_labels_are_pushed_apart() {
    let options = PieLabelOptions::new(100.0, 100.0, 50.0, 400.0);
    let inputs = [label(0, 0.0), label(1, 0.0), label(2, 0.0)];
    let placed = layout_pie_labels(&inputs, &options).expect("labels");

    assert_eq!(placed.len(), 3);
    assert!(placed.iter().all(|label| label.side == LabelSide::Right));
    assert!(placed.iter().all(|label| label.x > 100.0));

    let mut ys: Vec<(f64, f64)> = placed.iter().map(|label| (label.y, label.height)).collect();
    ys.sort_by(|a, b| a.0.total_cmp(&b.0));
    for pair in ys.windows(2) {
        assert!(pair[1].0 >= pair[0].0 + pair[0].1 - 1e-9);
    }
    let ys: Vec<f64> = ys.iter().map(|(y, _)| *y).collect();
    assert_eq!(ys, vec![80.0, 100.0, 120.0]);

    // Shifted labels keep a horizontal outer leader segment.
    let shifted = placed
        .iter()
        .find(|label| label.y != 100.0)
        .expect("at least one label moved");
    assert_eq!(shifted.line_points[1][1], shifted.y);
    assert_eq!(shifted.line_points[2], [shifted.x, shifted.y]);
    assert_relative_eq!(shifted.line_points[1][0], 100.0 + 50.0 + 15.0, epsilon = 1e-9);
}

#[test]
fn labels_split_by_side_and_keep_input_order() {
    let options = PieLabelOptions::new(100.0, 100.0, 50.0, 400.0).with_line_length(10.0);
    let inputs = [label(3, 180.0), label(1, 10.0), label(7, 200.0)];
    let placed = layout_pie_labels(&inputs, &options).expect("labels");

    let indices: Vec<usize> = placed.iter().map(|label| label.index).collect();
    assert_eq!(indices, vec![3, 1, 7]);
    assert_eq!(placed[0].side, LabelSide::Left);
    assert_eq!(placed[1].side, LabelSide::Right);
    assert_eq!(placed[2].side, LabelSide::Left);

    // Leader lines start on the slice edge and end at the label.
    let first = placed[0];
    assert_relative_eq!(first.line_points[0][0], 50.0, epsilon = 1e-9);
    assert_relative_eq!(first.line_points[0][1], 100.0, epsilon = 1e-9);
    assert_eq!(first.line_points[2], [first.x, first.y]);
    assert!(first.x < 100.0);
}

#[test]
fn labels_from_pie_slices() {
    let view = Rect::new(0.0, 0.0, 200.0, 200.0);
    let slices = layout_pie(&[1.0, 1.0], view, &PieOptions::default()).expect("pie");
    let inputs: Vec<PieLabelInput> = slices
        .iter()
        .map(|slice| PieLabelInput::from_slice(slice, 30.0, 12.0))
        .collect();

    assert_relative_eq!(inputs[0].mid_angle, slices[0].mid_angle(), epsilon = 1e-12);
    let placed = layout_pie_labels(&inputs, &PieLabelOptions::new(100.0, 100.0, 75.0, 200.0))
        .expect("labels");
    assert_eq!(placed.len(), 2);
    assert_ne!(placed[0].side, placed[1].side);
}

#[test]
fn invalid_label_options_are_rejected() {
    let result = layout_pie_labels(&[], &PieLabelOptions::new(0.0, 0.0, -1.0, 100.0));
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));

    let result = layout_pie_labels(&[], &PieLabelOptions::new(f64::NAN, 0.0, 1.0, 100.0));
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));
}
