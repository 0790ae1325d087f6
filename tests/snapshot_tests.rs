use chart_layout::core::{Axis, IntervalScale, Length, NiceExtentOptions, OrdinalScale, Rect};
use chart_layout::layout::{
    BarOptions, BarOrientation, BarSeries, BoxplotOptions, PieOptions, SunburstOptions,
    layout_bar_grid, layout_pie, prepare_boxplot_data,
};
use chart_layout::visual::VisualMappingOptions;
use chart_layout::{BarRect, SectorLayout};
use serde_json::json;

#[test]
fn bar_rect_snapshot() {
    let base_axis = Axis::new(OrdinalScale::new(["a", "b"]), 0.0, 200.0);
    let mut scale = IntervalScale::new(0.0, 100.0);
    scale.nice_extent(NiceExtentOptions::default().with_split_number(5));
    let value_axis = Axis::new(scale, 100.0, 0.0);

    let series = BarSeries::new(0, vec![0.0, 1.0], vec![50.0, f64::NAN])
        .with_options(BarOptions::default().with_bar_width(20.0));
    let layouts = layout_bar_grid(&[series], &base_axis, &value_axis, BarOrientation::Vertical)
        .expect("bar layout");

    let json = serde_json::to_value(&layouts[0]).expect("serialize layout");
    assert_eq!(
        json,
        json!({
            "series_index": 0,
            "stack_id": "__stack_0",
            "band_width": 100.0,
            "offset": -10.0,
            "width": 20.0,
            "rects": [
                { "x": 40.0, "y": 100.0, "width": 20.0, "height": -50.0 },
                null
            ]
        })
    );
}

#[test]
fn pie_slice_snapshot() {
    let slices = layout_pie(
        &[1.0, 1.0],
        Rect::new(0.0, 0.0, 100.0, 100.0),
        &PieOptions::default().with_radius(10.0, 40.0),
    )
    .expect("pie");

    let json = serde_json::to_value(slices[0]).expect("serialize slice");
    assert_eq!(
        json,
        json!({
            "index": 0,
            "value": 1.0,
            "percent": 50.0,
            "sector": {
                "cx": 50.0,
                "cy": 50.0,
                "r0": 10.0,
                "r": 40.0,
                "start_angle": -90.0,
                "end_angle": 90.0,
                "clockwise": true
            }
        })
    );
}

#[test]
fn boxplot_data_snapshot() {
    let data = prepare_boxplot_data(
        &[vec![12.0, 232.0, 443.0], vec![3843.0, 5545.0, 1232.0]],
        &BoxplotOptions::default(),
    )
    .expect("boxplot data");

    let json = serde_json::to_value(&data).expect("serialize boxplot");
    assert_eq!(json["box_data"][0], json!([12.0, 122.0, 232.0, 337.5, 443.0]));
    assert_eq!(json["outliers"], json!([]));
    assert_eq!(json["axis_data"], json!(["0", "1"]));
}

#[test]
fn geometry_round_trips() {
    let rect = BarRect {
        x: 1.5,
        y: -2.0,
        width: 3.0,
        height: 4.25,
    };
    let restored: BarRect =
        serde_json::from_str(&serde_json::to_string(&rect).expect("serialize rect"))
            .expect("deserialize rect");
    assert_eq!(restored, rect);

    let sector = SectorLayout {
        cx: 10.0,
        cy: 20.0,
        r0: 0.0,
        r: 30.0,
        start_angle: 0.5,
        end_angle: 1.5,
        clockwise: false,
    };
    let restored: SectorLayout =
        serde_json::from_str(&serde_json::to_string(&sector).expect("serialize sector"))
            .expect("deserialize sector");
    assert_eq!(restored, sector);
}

#[test]
fn config_defaults_fill_missing_fields() {
    let pie: PieOptions = serde_json::from_value(json!({ "rose_type": "area" })).expect("pie options");
    assert_eq!(pie.start_angle, 90.0);
    assert_eq!(pie.radius, [Length::Absolute(0.0), Length::percent(75.0)]);
    assert!(pie.clockwise);

    let sunburst: SunburstOptions =
        serde_json::from_value(json!({ "radius": [0, "90%"], "sort": "asc" })).expect("sunburst options");
    assert_eq!(sunburst.radius[1], Length::Text("90%".to_owned()));
    assert_eq!(sunburst.center, SunburstOptions::default().center);

    let options: VisualMappingOptions = serde_json::from_value(json!({
        "type": "symbolSize",
        "mappingMethod": "piecewise",
        "pieceList": [{ "interval": [0, 10] }, { "value": 20, "visual": { "symbolSize": 4 } }],
        "visual": [2, 8]
    }))
    .expect("visual options");
    assert_eq!(options.piece_list.len(), 2);
    assert_eq!(options.piece_list[0].close, [true, true]);
    assert!(options.piece_list[1].visual.is_some());
    assert!(!options.loop_mapping);
}
