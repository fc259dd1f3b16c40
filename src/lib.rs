//! gammaflat: radiometric terrain flattening for SAR backscatter
//!
//! This library computes the terrain-flattening normalization surface of the
//! gamma flattening technique: for every terrain sample of a DEM tile it
//! accumulates the ground area facing the sensor onto a sensor-geometry
//! grid and resamples the result back onto the samples. Dividing recorded
//! backscatter by this surface removes terrain-slope-induced brightness
//! variation.
//!
//! The pipeline is: derive the accumulation grid from sensor metadata
//! ([`azimuth_slant_range_grid`]), compute per-facet gamma areas
//! ([`compute_gamma_area`]), then distribute them over the grid with the
//! nearest-cell or bilinear policy ([`gamma_weights_nearest`],
//! [`gamma_weights_bilinear`]) built on the scatter-sum accumulator
//! ([`sum_weights`]).

pub mod core;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    AttrValue, FlattenError, FlattenResult, GridParams, ProductAttributes, ProductType,
    TerrainSamples,
};

pub use self::core::{
    azimuth_slant_range_grid, compute_gamma_area, compute_gamma_area_from, gamma_weights,
    gamma_weights_bilinear, gamma_weights_nearest, sum_weights, AccumulatedSurface,
    GammaWeightsMethod, OrientedAreaProvider, WeightAccumulator,
    DEFAULT_GROUPING_AREA_FACTOR, SPEED_OF_LIGHT,
};
