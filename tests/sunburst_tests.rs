use std::f64::consts::PI;

use approx::assert_relative_eq;
use chart_layout::core::{Length, Rect};
use chart_layout::layout::{
    SunburstLevel, SunburstNode, SunburstOptions, SunburstSort, layout_sunburst,
};
use chart_layout::ChartError;

fn view() -> Rect {
    Rect::new(0.0, 0.0, 200.0, 200.0)
}

fn tree() -> Vec<SunburstNode> {
    vec![
        SunburstNode::branch(
            "fruit",
            vec![SunburstNode::leaf("apple", 3.0), SunburstNode::leaf("pear", 1.0)],
        ),
        SunburstNode::leaf("bread", 4.0),
    ]
}

#[test]
fn branch_total_sums_children() {
    let roots = tree();
    assert_eq!(roots[0].total(), 4.0);
    let with_nan = SunburstNode::branch(
        "mixed",
        vec![SunburstNode::leaf("a", 2.0), SunburstNode::leaf("b", f64::NAN)],
    );
    assert_eq!(with_nan.total(), 2.0);
}

#[test]
fn rings_split_parent_sweep() {
    let sectors = layout_sunburst(&tree(), view(), &SunburstOptions::default()).expect("sunburst");
    let names: Vec<&str> = sectors.iter().map(|sector| sector.name.as_str()).collect();
    assert_eq!(names, vec!["fruit", "apple", "pear", "bread"]);

    let fruit = &sectors[0];
    assert_eq!(fruit.depth, 0);
    assert_relative_eq!(fruit.angle, PI, epsilon = 1e-12);
    assert_relative_eq!(fruit.sector.start_angle, -PI / 2.0, epsilon = 1e-12);
    assert_eq!((fruit.sector.r0, fruit.sector.r), (0.0, 37.5));

    let apple = &sectors[1];
    let pear = &sectors[2];
    assert_eq!(pear.path, vec![0, 1]);
    assert_eq!(apple.depth, 1);
    assert_eq!((apple.sector.r0, apple.sector.r), (37.5, 75.0));
    assert_relative_eq!(apple.angle + pear.angle, fruit.angle, epsilon = 1e-12);
    assert_relative_eq!(apple.angle, PI * 0.75, epsilon = 1e-12);
    assert_relative_eq!(pear.sector.end_angle, fruit.sector.end_angle, epsilon = 1e-12);

    let ring_total: f64 = sectors
        .iter()
        .filter(|sector| sector.depth == 0)
        .map(|sector| sector.angle)
        .sum();
    assert_relative_eq!(ring_total, PI * 2.0, epsilon = 1e-12);
}

#[test]
fn sort_orders_siblings() {
    let roots = vec![SunburstNode::leaf("small", 1.0), SunburstNode::leaf("big", 3.0)];

    let desc = layout_sunburst(&roots, view(), &SunburstOptions::default()).expect("sunburst");
    assert_eq!(desc[0].name, "big");
    assert_eq!(desc[0].path, vec![1]);

    let asc = layout_sunburst(
        &roots,
        view(),
        &SunburstOptions::default().with_sort(SunburstSort::Asc),
    )
    .expect("sunburst");
    assert_eq!(asc[0].name, "small");

    let counter = layout_sunburst(
        &roots,
        view(),
        &SunburstOptions::default()
            .with_sort(SunburstSort::None)
            .with_clockwise(false),
    )
    .expect("sunburst");
    assert_eq!(counter[0].name, "small");
    assert!(counter[0].sector.end_angle < counter[0].sector.start_angle);
}

#[test]
fn min_angle_floor_takes_from_the_rest() {
    let roots = vec![SunburstNode::leaf("tiny", 1.0), SunburstNode::leaf("huge", 99.0)];
    let sectors = layout_sunburst(
        &roots,
        view(),
        &SunburstOptions::default()
            .with_sort(SunburstSort::None)
            .with_min_angle(36.0),
    )
    .expect("sunburst");

    assert_relative_eq!(sectors[0].angle, PI / 5.0, epsilon = 1e-12);
    assert_relative_eq!(sectors[1].angle, PI * 1.8, epsilon = 1e-12);
}

#[test]
fn zero_sum_siblings_share_evenly() {
    let roots = vec![SunburstNode::leaf("a", 0.0), SunburstNode::leaf("b", 0.0)];
    let sectors = layout_sunburst(&roots, view(), &SunburstOptions::default()).expect("sunburst");
    assert!(sectors.iter().all(|sector| (sector.angle - PI).abs() < 1e-12));
}

#[test]
fn levels_override_ring_radii() {
    let levels = vec![
        SunburstLevel::default(),
        SunburstLevel {
            r0: Some(Length::Absolute(50.0)),
            r: Some(Length::percent(100.0)),
        },
    ];
    let sectors = layout_sunburst(
        &tree(),
        view(),
        &SunburstOptions::default()
            .with_radius(10.0, "80%")
            .with_levels(levels),
    )
    .expect("sunburst");

    let fruit = &sectors[0];
    assert_eq!((fruit.sector.r0, fruit.sector.r), (10.0, 45.0));
    let apple = &sectors[1];
    assert_eq!((apple.sector.r0, apple.sector.r), (50.0, 100.0));
}

#[test]
fn invalid_sunburst_options_are_rejected() {
    let result = layout_sunburst(&tree(), view(), &SunburstOptions::default().with_min_angle(360.0));
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));

    let empty = layout_sunburst(&[], view(), &SunburstOptions::default()).expect("empty sunburst");
    assert!(empty.is_empty());
}
