use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// SAR product type relevant to grid derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    /// Single-look complex (slant-range geometry)
    Slc,
    /// Ground-range detected (already ground-projected)
    Grd,
}

impl ProductType {
    /// Classify a `product_type` metadata value; anything but "SLC" is
    /// treated as ground-projected
    pub fn from_name(name: &str) -> Self {
        if name == "SLC" {
            ProductType::Slc
        } else {
            ProductType::Grd
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Slc => write!(f, "SLC"),
            ProductType::Grd => write!(f, "GRD"),
        }
    }
}

/// A single sensor-metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Text(String),
    Number(f64),
}

/// Key/value sensor-metadata record consumed by grid derivation.
///
/// Required keys are looked up lazily; a missing or wrongly-typed key is a
/// metadata error, never a silent default.
#[derive(Debug, Clone, Default)]
pub struct ProductAttributes {
    values: HashMap<String, AttrValue>,
}

impl ProductAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), AttrValue::Text(value.to_string()));
    }

    pub fn set_number(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), AttrValue::Number(value));
    }

    /// Look up a text attribute
    pub fn text_attr(&self, key: &str) -> FlattenResult<&str> {
        match self.values.get(key) {
            Some(AttrValue::Text(s)) => Ok(s),
            Some(AttrValue::Number(_)) => Err(FlattenError::Metadata(format!(
                "attribute '{}' is numeric, expected text",
                key
            ))),
            None => Err(FlattenError::Metadata(format!(
                "missing required attribute '{}'",
                key
            ))),
        }
    }

    /// Look up a numeric attribute
    pub fn num_attr(&self, key: &str) -> FlattenResult<f64> {
        match self.values.get(key) {
            Some(AttrValue::Number(v)) => Ok(*v),
            Some(AttrValue::Text(_)) => Err(FlattenError::Metadata(format!(
                "attribute '{}' is text, expected a number",
                key
            ))),
            None => Err(FlattenError::Metadata(format!(
                "missing required attribute '{}'",
                key
            ))),
        }
    }
}

/// Accumulation-grid parameters in sensor geometry
///
/// Defines the affine map from physical time coordinates to grid-cell
/// indices: `index = (time - time0) / interval`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    /// Two-way slant-range time of the first grid cell (seconds)
    pub slant_range_time0: f64,
    /// Slant-range time per grid cell (seconds)
    pub slant_range_time_interval_s: f64,
    /// Slant-range cell spacing (meters)
    pub slant_range_spacing_m: f64,
    /// Azimuth time of the first grid line
    pub azimuth_time0: DateTime<Utc>,
    /// Azimuth time per grid line (seconds)
    pub azimuth_time_interval_s: f64,
    /// Azimuth cell spacing (meters)
    pub azimuth_spacing_m: f64,
}

impl GridParams {
    /// Check that all intervals and spacings are strictly positive
    pub fn validate(&self) -> FlattenResult<()> {
        let checks = [
            ("slant_range_time_interval_s", self.slant_range_time_interval_s),
            ("slant_range_spacing_m", self.slant_range_spacing_m),
            ("azimuth_time_interval_s", self.azimuth_time_interval_s),
            ("azimuth_spacing_m", self.azimuth_spacing_m),
        ];
        for (name, value) in checks {
            if !(value > 0.0) {
                return Err(FlattenError::InvalidParameter(format!(
                    "{} must be strictly positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Terrain-facet samples in sensor geometry, one entry per DEM cell.
///
/// Struct-of-arrays layout; all fields share ordering and cardinality.
/// Immutable once built, consumed by the distribution policies.
#[derive(Debug, Clone)]
pub struct TerrainSamples {
    /// Zero-Doppler azimuth time each ground point images to
    pub azimuth_time: Vec<DateTime<Utc>>,
    /// Two-way slant-range time each ground point images to (seconds)
    pub slant_range_time: Array1<f64>,
    /// Ground area facing the sensor (square meters, >= 0)
    pub gamma_area: Array1<f64>,
}

impl TerrainSamples {
    pub fn new(
        azimuth_time: Vec<DateTime<Utc>>,
        slant_range_time: Array1<f64>,
        gamma_area: Array1<f64>,
    ) -> FlattenResult<Self> {
        if azimuth_time.len() != slant_range_time.len()
            || azimuth_time.len() != gamma_area.len()
        {
            return Err(FlattenError::InvalidParameter(format!(
                "terrain sample fields must share cardinality: {} azimuth times, {} slant-range times, {} gamma areas",
                azimuth_time.len(),
                slant_range_time.len(),
                gamma_area.len()
            )));
        }
        Ok(Self {
            azimuth_time,
            slant_range_time,
            gamma_area,
        })
    }

    pub fn len(&self) -> usize {
        self.azimuth_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.azimuth_time.is_empty()
    }
}

/// Error types for terrain-flattening computation
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for terrain-flattening operations
pub type FlattenResult<T> = Result<T, FlattenError>;
