//! Visual encodings: color handling and value-to-visual mapping.

pub mod color;
pub mod mapping;

pub use color::{Color, fast_lerp, lerp_to_string};
pub use mapping::{
    CATEGORY_DEFAULT_VISUAL_INDEX, DataValue, MappingMethod, VisualMapping, VisualMappingOptions,
    VisualPiece, VisualSpec, VisualType, VisualValue, depends_on, find_piece_index,
    prepare_visual_types,
};
