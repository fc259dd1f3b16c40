//! Core terrain-flattening modules

pub mod accumulate;
pub mod gamma_area;
pub mod grid;
pub mod weights;

// Re-export main types
pub use accumulate::{sum_weights, AccumulatedSurface, WeightAccumulator};
pub use gamma_area::{compute_gamma_area, compute_gamma_area_from, OrientedAreaProvider};
pub use grid::{azimuth_slant_range_grid, DEFAULT_GROUPING_AREA_FACTOR, SPEED_OF_LIGHT};
pub use weights::{
    gamma_weights, gamma_weights_bilinear, gamma_weights_nearest, GammaWeightsMethod,
};
