//! Data value to visual channel mapping.
//!
//! A [`VisualMapping`] is built once from [`VisualMappingOptions`] and then
//! queried per data item. Values are first normalized by the mapping method
//! (linear, piecewise, category, fixed) and then turned into a visual by the
//! visual type (color, opacity, symbol size, ...).

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::number::linear_map;
use crate::core::types::Extent;
use crate::error::{ChartError, ChartResult};
use crate::visual::color::{Color, fast_lerp};

/// Category index that selects the default visual.
pub const CATEGORY_DEFAULT_VISUAL_INDEX: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualType {
    Color,
    ColorHue,
    ColorSaturation,
    ColorLightness,
    ColorAlpha,
    Opacity,
    Symbol,
    SymbolSize,
    LiftZ,
}

impl VisualType {
    pub const ALL: [Self; 9] = [
        Self::Color,
        Self::ColorHue,
        Self::ColorSaturation,
        Self::ColorLightness,
        Self::ColorAlpha,
        Self::Opacity,
        Self::Symbol,
        Self::SymbolSize,
        Self::LiftZ,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::ColorHue => "colorHue",
            Self::ColorSaturation => "colorSaturation",
            Self::ColorLightness => "colorLightness",
            Self::ColorAlpha => "colorAlpha",
            Self::Opacity => "opacity",
            Self::Symbol => "symbol",
            Self::SymbolSize => "symbolSize",
            Self::LiftZ => "liftZ",
        }
    }

    /// `color` and every type that edits a channel of it.
    #[must_use]
    pub const fn is_color_family(self) -> bool {
        matches!(
            self,
            Self::Color
                | Self::ColorHue
                | Self::ColorSaturation
                | Self::ColorLightness
                | Self::ColorAlpha
        )
    }

    const fn is_partial_color(self) -> bool {
        self.is_color_family() && !matches!(self, Self::Color)
    }

    /// Types mapped through a numeric `[min, max]` visual range.
    const fn is_numeric(self) -> bool {
        self.is_partial_color() || matches!(self, Self::Opacity | Self::SymbolSize)
    }
}

impl fmt::Display for VisualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VisualType {
    type Err = ChartError;

    fn from_str(text: &str) -> ChartResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == text)
            .ok_or_else(|| ChartError::InvalidConfig(format!("unknown visual type `{text}`")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMethod {
    Linear,
    Piecewise,
    Category,
    Fixed,
}

/// A single visual: a number (size, opacity, hue) or text (color, symbol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisualValue {
    Number(f64),
    Text(String),
}

impl VisualValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl From<f64> for VisualValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for VisualValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for VisualValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Visual option as written by users: a list, a per-category map, or one
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisualSpec {
    List(Vec<VisualValue>),
    ByCategory(IndexMap<String, VisualValue>),
    Single(VisualValue),
}

impl<T: Into<VisualValue>> From<Vec<T>> for VisualSpec {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<VisualValue> for VisualSpec {
    fn from(value: VisualValue) -> Self {
        Self::Single(value)
    }
}

/// Raw data value fed to a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Number(f64),
    Category(String),
}

impl DataValue {
    /// Numeric view; numeric-looking category names parse, others are NaN.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Category(name) => name.trim().parse().unwrap_or(f64::NAN),
        }
    }

    fn category_key(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Category(name) => name.clone(),
        }
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_owned())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

/// One piece of a piecewise mapping: an exact `value` or an `interval`
/// with per-end closure, optionally carrying its own visuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualPiece {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub interval: Option<[f64; 2]>,
    #[serde(default = "default_close")]
    pub close: [bool; 2],
    #[serde(default)]
    pub visual: Option<IndexMap<VisualType, VisualValue>>,
}

fn default_close() -> [bool; 2] {
    [true, true]
}

impl VisualPiece {
    #[must_use]
    pub fn exact(value: f64) -> Self {
        Self {
            value: Some(value),
            interval: None,
            close: default_close(),
            visual: None,
        }
    }

    #[must_use]
    pub fn interval(min: f64, max: f64, close: [bool; 2]) -> Self {
        Self {
            value: None,
            interval: Some([min, max]),
            close,
            visual: None,
        }
    }

    #[must_use]
    pub fn with_visual(mut self, kind: VisualType, value: impl Into<VisualValue>) -> Self {
        self.visual
            .get_or_insert_with(IndexMap::new)
            .insert(kind, value.into());
        self
    }

    fn validate(&self) -> ChartResult<()> {
        if self.value.is_some_and(f64::is_nan) {
            return Err(ChartError::InvalidConfig("piece value must not be NaN".to_owned()));
        }
        match (self.value, self.interval) {
            (None, None) => Err(ChartError::InvalidConfig(
                "piece needs a value or an interval".to_owned(),
            )),
            (_, Some([min, max])) if min.is_nan() || max.is_nan() || min > max => Err(
                ChartError::InvalidConfig(format!("invalid piece interval [{min}, {max}]")),
            ),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualMappingOptions {
    #[serde(rename = "type")]
    pub visual_type: VisualType,
    pub mapping_method: MappingMethod,
    /// Required by linear mappings.
    #[serde(default)]
    pub data_extent: Option<Extent>,
    /// Ascending, non-overlapping pieces for piecewise mappings.
    #[serde(default)]
    pub piece_list: Vec<VisualPiece>,
    /// Category names; without them category values are ordinal indices.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default, rename = "loop")]
    pub loop_mapping: bool,
    pub visual: VisualSpec,
}

impl VisualMappingOptions {
    #[must_use]
    pub fn new(visual_type: VisualType, mapping_method: MappingMethod, visual: impl Into<VisualSpec>) -> Self {
        Self {
            visual_type,
            mapping_method,
            data_extent: None,
            piece_list: Vec::new(),
            categories: None,
            loop_mapping: false,
            visual: visual.into(),
        }
    }

    #[must_use]
    pub fn with_data_extent(mut self, min: f64, max: f64) -> Self {
        self.data_extent = Some([min, max]);
        self
    }

    #[must_use]
    pub fn with_pieces(mut self, pieces: Vec<VisualPiece>) -> Self {
        self.piece_list = pieces;
        self
    }

    #[must_use]
    pub fn with_categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_loop(mut self, loop_mapping: bool) -> Self {
        self.loop_mapping = loop_mapping;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        match self.mapping_method {
            MappingMethod::Linear => match self.data_extent {
                Some([min, max]) if min.is_finite() && max.is_finite() => {}
                _ => {
                    return Err(ChartError::InvalidConfig(
                        "linear visual mapping needs a finite data extent".to_owned(),
                    ));
                }
            },
            MappingMethod::Piecewise => {
                if self.piece_list.is_empty() {
                    return Err(ChartError::InvalidConfig(
                        "piecewise visual mapping needs at least one piece".to_owned(),
                    ));
                }
                for piece in &self.piece_list {
                    piece.validate()?;
                }
            }
            MappingMethod::Category | MappingMethod::Fixed => {}
        }
        let empty = match &self.visual {
            VisualSpec::List(values) => values.is_empty(),
            VisualSpec::ByCategory(values) => values.is_empty(),
            VisualSpec::Single(_) => false,
        };
        if empty {
            return Err(ChartError::InvalidConfig(format!(
                "{} visual mapping has no visual values",
                self.visual_type
            )));
        }
        Ok(self)
    }
}

/// Built mapping, read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualMapping {
    visual_type: VisualType,
    method: MappingMethod,
    data_extent: Extent,
    pieces: Vec<VisualPiece>,
    has_special_visual: bool,
    categories: Option<Vec<String>>,
    category_map: IndexMap<String, usize>,
    loop_mapping: bool,
    visual: Vec<Option<VisualValue>>,
    default_visual: Option<VisualValue>,
    parsed_colors: Vec<Color>,
    numeric_range: Extent,
}

impl VisualMapping {
    pub fn new(options: VisualMappingOptions) -> ChartResult<Self> {
        let options = options.validate()?;
        let visual_type = options.visual_type;
        let method = options.mapping_method;

        let mut category_map = IndexMap::new();
        let mut default_visual = None;
        let visual: Vec<Option<VisualValue>> = match (&options.categories, method) {
            (Some(categories), MappingMethod::Category) => {
                for (index, name) in categories.iter().enumerate() {
                    category_map.insert(name.clone(), index);
                }
                let (visual, default) = category_visuals(&options.visual, &category_map);
                default_visual = default;
                // Categories without a visual fall back to the default one.
                for (index, name) in categories.iter().enumerate().rev() {
                    if visual.get(index).is_none_or(Option::is_none) {
                        category_map.shift_remove(name);
                    }
                }
                visual
            }
            _ => {
                let mut values = flatten_visual(&options.visual);
                let needs_pair = !matches!(visual_type, VisualType::Color | VisualType::Symbol);
                if method != MappingMethod::Category && needs_pair && values.len() == 1 {
                    values.push(values[0].clone());
                }
                values.into_iter().map(Some).collect()
            }
        };

        let parsed_colors = if visual_type == VisualType::Color {
            let mut parsed = Vec::with_capacity(visual.len());
            for value in visual.iter().flatten().chain(default_visual.as_ref()) {
                parsed.push(parse_visual_color(value)?);
            }
            parsed
        } else {
            Vec::new()
        };

        let numeric_range = if visual_type.is_numeric()
            && matches!(method, MappingMethod::Linear | MappingMethod::Piecewise)
        {
            numeric_pair(visual_type, &visual)?
        } else {
            [0.0, 0.0]
        };

        let has_special_visual = options.piece_list.iter().any(|piece| piece.visual.is_some());
        debug!(
            visual_type = visual_type.name(),
            method = ?method,
            visuals = visual.len(),
            categories = category_map.len(),
            "visual mapping built"
        );

        Ok(Self {
            visual_type,
            method,
            data_extent: options.data_extent.unwrap_or([0.0, 1.0]),
            pieces: options.piece_list,
            has_special_visual,
            categories: options.categories,
            category_map,
            loop_mapping: options.loop_mapping,
            visual,
            default_visual,
            parsed_colors,
            numeric_range,
        })
    }

    #[must_use]
    pub fn visual_type(&self) -> VisualType {
        self.visual_type
    }

    #[must_use]
    pub fn mapping_method(&self) -> MappingMethod {
        self.method
    }

    /// Normalized visual list; `None` entries are categories without a visual.
    #[must_use]
    pub fn visual(&self) -> &[Option<VisualValue>] {
        &self.visual
    }

    #[must_use]
    pub fn default_visual(&self) -> Option<&VisualValue> {
        self.default_visual.as_ref()
    }

    /// Category name to visual index, after dropping categories without one.
    #[must_use]
    pub fn category_map(&self) -> &IndexMap<String, usize> {
        &self.category_map
    }

    #[must_use]
    pub fn pieces(&self) -> &[VisualPiece] {
        &self.pieces
    }

    /// Normalizes `value` for this mapping method.
    ///
    /// Linear and piecewise give `[0, 1]` (NaN when no piece is near),
    /// category gives the visual index or `-1`, fixed gives `0`.
    #[must_use]
    pub fn normalize(&self, value: &DataValue) -> f64 {
        match self.method {
            MappingMethod::Linear => linear_map(value.as_number(), self.data_extent, [0.0, 1.0], true),
            MappingMethod::Piecewise => {
                let last = self.pieces.len().saturating_sub(1) as f64;
                find_piece_index(value.as_number(), &self.pieces, true).map_or(f64::NAN, |index| {
                    linear_map(index as f64, [0.0, last], [0.0, 1.0], true)
                })
            }
            MappingMethod::Category => self.category_index(value),
            MappingMethod::Fixed => 0.0,
        }
    }

    fn category_index(&self, value: &DataValue) -> f64 {
        match &self.categories {
            Some(categories) => {
                let key = value.category_key();
                match self.category_map.get(&key) {
                    Some(&index) => index as f64,
                    None => {
                        if !categories.contains(&key) {
                            warn!(category = %key, "unknown visual category");
                        }
                        CATEGORY_DEFAULT_VISUAL_INDEX
                    }
                }
            }
            None => {
                let ordinal = value.as_number();
                if ordinal.is_finite() && ordinal >= 0.0 && ordinal.fract() == 0.0 {
                    ordinal
                } else {
                    CATEGORY_DEFAULT_VISUAL_INDEX
                }
            }
        }
    }

    /// Maps `value` to its visual. `None` when nothing applies (no piece,
    /// category without visual and no default).
    #[must_use]
    pub fn map_value_to_visual(&self, value: &DataValue) -> Option<VisualValue> {
        let normalized = self.normalize(value);
        self.normalized_to_visual(normalized, value)
    }

    fn normalized_to_visual(&self, normalized: f64, value: &DataValue) -> Option<VisualValue> {
        if self.visual_type == VisualType::LiftZ {
            return self.map_fixed();
        }
        match self.method {
            MappingMethod::Fixed => self.map_fixed(),
            MappingMethod::Category => self.map_category(normalized),
            MappingMethod::Linear => self.map_continuous(normalized),
            MappingMethod::Piecewise => self
                .specified_visual(value)
                .or_else(|| self.map_continuous(normalized)),
        }
    }

    fn map_continuous(&self, normalized: f64) -> Option<VisualValue> {
        match self.visual_type {
            VisualType::Color => {
                fast_lerp(normalized, &self.parsed_colors).map(|color| color.to_rgba_string().into())
            }
            VisualType::Symbol => self.map_to_array(normalized),
            _ => Some(VisualValue::Number(linear_map(
                normalized,
                [0.0, 1.0],
                self.numeric_range,
                true,
            ))),
        }
    }

    fn map_to_array(&self, normalized: f64) -> Option<VisualValue> {
        if normalized.is_nan() || self.visual.is_empty() {
            return None;
        }
        let last = (self.visual.len() - 1) as f64;
        let index = linear_map(normalized, [0.0, 1.0], [0.0, last], true).round() as usize;
        self.visual.get(index).cloned().flatten()
    }

    fn map_category(&self, normalized: f64) -> Option<VisualValue> {
        if normalized == CATEGORY_DEFAULT_VISUAL_INDEX || normalized.is_nan() {
            return self.default_visual.clone();
        }
        let mut index = normalized as usize;
        if self.loop_mapping && !self.visual.is_empty() {
            index %= self.visual.len();
        }
        self.visual.get(index).cloned().flatten()
    }

    fn map_fixed(&self) -> Option<VisualValue> {
        self.visual.first().cloned().flatten()
    }

    fn specified_visual(&self, value: &DataValue) -> Option<VisualValue> {
        if !self.has_special_visual {
            return None;
        }
        let index = find_piece_index(value.as_number(), &self.pieces, false)?;
        self.pieces[index]
            .visual
            .as_ref()
            .and_then(|visuals| visuals.get(&self.visual_type))
            .cloned()
    }

    /// Parsed color for `value` on a color mapping; `value` is used as
    /// already normalized when `is_normalized` is set.
    #[must_use]
    pub fn map_color(&self, value: &DataValue, is_normalized: bool) -> Option<Color> {
        if self.visual_type != VisualType::Color {
            return None;
        }
        let normalized = if is_normalized {
            value.as_number()
        } else {
            self.normalize(value)
        };
        if self.method == MappingMethod::Category {
            let visual = self.map_category(normalized)?;
            return visual.as_text().and_then(|text| Color::parse(text).ok());
        }
        fast_lerp(normalized, &self.parsed_colors)
    }

    /// Writes this mapping's visual for `value` into `visuals`.
    ///
    /// Partial color types rewrite the existing `color` entry; it must be
    /// present and parseable.
    pub fn apply_visual(
        &self,
        value: &DataValue,
        visuals: &mut IndexMap<VisualType, VisualValue>,
    ) -> ChartResult<()> {
        let mapped = self.map_value_to_visual(value);
        if !self.visual_type.is_partial_color() {
            match mapped {
                Some(visual) => {
                    visuals.insert(self.visual_type, visual);
                }
                None => {
                    visuals.shift_remove(&self.visual_type);
                }
            }
            return Ok(());
        }

        let Some(channel) = mapped.as_ref().and_then(VisualValue::as_number) else {
            trace!(visual_type = self.visual_type.name(), "no channel value mapped");
            return Ok(());
        };
        let base = visuals
            .get(&VisualType::Color)
            .and_then(VisualValue::as_text)
            .ok_or_else(|| {
                ChartError::InvalidColor(format!("{} needs a base color", self.visual_type))
            })?;
        let base = Color::parse(base)?;
        let modified = match self.visual_type {
            VisualType::ColorHue => base.modify_hsl(Some(channel), None, None),
            VisualType::ColorSaturation => base.modify_hsl(None, Some(channel), None),
            VisualType::ColorLightness => base.modify_hsl(None, None, Some(channel)),
            _ => base.with_alpha(channel),
        };
        visuals.insert(VisualType::Color, modified.to_rgba_string().into());
        Ok(())
    }
}

fn flatten_visual(spec: &VisualSpec) -> Vec<VisualValue> {
    match spec {
        VisualSpec::List(values) => values.clone(),
        VisualSpec::ByCategory(values) => values.values().cloned().collect(),
        VisualSpec::Single(value) => vec![value.clone()],
    }
}

/// Category visuals by index, plus the default visual. Map keys that are
/// not categories set the default.
fn category_visuals(
    spec: &VisualSpec,
    category_map: &IndexMap<String, usize>,
) -> (Vec<Option<VisualValue>>, Option<VisualValue>) {
    match spec {
        VisualSpec::List(values) => (values.iter().cloned().map(Some).collect(), None),
        VisualSpec::Single(value) => (Vec::new(), Some(value.clone())),
        VisualSpec::ByCategory(values) => {
            let mut visual: Vec<Option<VisualValue>> = Vec::new();
            let mut default = None;
            for (name, value) in values {
                match category_map.get(name) {
                    Some(&index) => {
                        if visual.len() <= index {
                            visual.resize(index + 1, None);
                        }
                        visual[index] = Some(value.clone());
                    }
                    None => default = Some(value.clone()),
                }
            }
            (visual, default)
        }
    }
}

fn parse_visual_color(value: &VisualValue) -> ChartResult<Color> {
    match value {
        VisualValue::Text(text) => Color::parse(text),
        VisualValue::Number(number) => Err(ChartError::InvalidColor(format!(
            "color visual must be a string, got {number}"
        ))),
    }
}

fn numeric_pair(visual_type: VisualType, visual: &[Option<VisualValue>]) -> ChartResult<Extent> {
    let number = |index: usize| {
        visual
            .get(index)
            .and_then(Option::as_ref)
            .and_then(VisualValue::as_number)
            .ok_or_else(|| {
                ChartError::InvalidConfig(format!("{visual_type} visual range must be numeric"))
            })
    };
    Ok([number(0)?, number(1)?])
}

/// Orders visual types so `color` comes before the partial color types that
/// edit it and `opacity` is applied last.
#[must_use]
pub fn prepare_visual_types(types: impl IntoIterator<Item = VisualType>) -> Vec<VisualType> {
    let mut types: Vec<VisualType> = types.into_iter().collect();
    types.sort_by_key(|kind| match kind {
        VisualType::Color => 0,
        kind if kind.is_partial_color() => 1,
        VisualType::Opacity => 3,
        _ => 2,
    });
    types
}

/// Whether `a` reads the visual produced by `b`. Color types depend on
/// `color`; every other type only on itself.
#[must_use]
pub fn depends_on(a: VisualType, b: VisualType) -> bool {
    if b == VisualType::Color {
        a.is_color_family()
    } else {
        a == b
    }
}

fn little_than(close: bool, a: f64, b: f64) -> bool {
    if close { a <= b } else { a < b }
}

/// Index of the piece containing `value`.
///
/// Exact-value pieces win over intervals. With `find_closest_when_outside`
/// a value matching nothing goes to the piece with the nearest bound, and
/// infinities go to the first or last piece.
#[must_use]
pub fn find_piece_index(value: f64, pieces: &[VisualPiece], find_closest_when_outside: bool) -> Option<usize> {
    let mut possible = None;
    let mut best = f64::INFINITY;
    let mut update_possible = |bound: f64, index: usize| {
        let distance = (bound - value).abs();
        if distance < best {
            best = distance;
            possible = Some(index);
        }
    };

    for (index, piece) in pieces.iter().enumerate() {
        if let Some(piece_value) = piece.value {
            if piece_value == value {
                return Some(index);
            }
            if find_closest_when_outside {
                update_possible(piece_value, index);
            }
        }
    }

    for (index, piece) in pieces.iter().enumerate() {
        let Some([min, max]) = piece.interval else {
            continue;
        };
        let [close_min, close_max] = piece.close;
        let inside = if min == f64::NEG_INFINITY {
            little_than(close_max, value, max)
        } else if max == f64::INFINITY {
            little_than(close_min, min, value)
        } else {
            little_than(close_min, min, value) && little_than(close_max, value, max)
        };
        if inside {
            return Some(index);
        }
        if find_closest_when_outside {
            update_possible(min, index);
            update_possible(max, index);
        }
    }

    if !find_closest_when_outside || pieces.is_empty() {
        return None;
    }
    if value == f64::INFINITY {
        Some(pieces.len() - 1)
    } else if value == f64::NEG_INFINITY {
        Some(0)
    } else {
        possible
    }
}
