use crate::types::{FlattenError, FlattenResult, GridParams, ProductAttributes, ProductType};
use chrono::{DateTime, Utc};

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Default accumulation-grid coarsening relative to native pixel spacing
/// (azimuth, range)
pub const DEFAULT_GROUPING_AREA_FACTOR: (f64, f64) = (3.0, 3.0);

/// Derive the accumulation-grid parameters from sensor metadata.
///
/// The grid is coarser than the native pixel grid by the grouping-area
/// factor, trading resolution for a denser sample-per-cell ratio. For SLC
/// products the range pixel spacing is first projected to ground range via
/// the mid-swath incidence angle; detected products are already
/// ground-projected. The slant-range time interval follows from the two-way
/// light-travel relation.
///
/// Required attributes: `product_type`, `range_pixel_spacing`,
/// `azimuth_time_interval`, `azimuth_pixel_spacing`, and for SLC products
/// `incidence_angle_mid_swath` (radians). A missing attribute or a
/// non-positive spacing, interval or grouping factor is an error.
pub fn azimuth_slant_range_grid(
    attrs: &ProductAttributes,
    slant_range_time0: f64,
    azimuth_time0: DateTime<Utc>,
    grouping_area_factor: (f64, f64),
) -> FlattenResult<GridParams> {
    let (factor_azimuth, factor_range) = grouping_area_factor;
    if !(factor_azimuth > 0.0) || !(factor_range > 0.0) {
        return Err(FlattenError::InvalidParameter(format!(
            "grouping area factor must be strictly positive, got ({}, {})",
            factor_azimuth, factor_range
        )));
    }

    let product_type = ProductType::from_name(attrs.text_attr("product_type")?);
    let range_pixel_spacing = attrs.num_attr("range_pixel_spacing")?;

    let slant_range_spacing_m = match product_type {
        ProductType::Slc => {
            let incidence_angle = attrs.num_attr("incidence_angle_mid_swath")?;
            range_pixel_spacing * incidence_angle.sin() * factor_range
        }
        ProductType::Grd => range_pixel_spacing * factor_range,
    };

    let slant_range_time_interval_s = slant_range_spacing_m * 2.0 / SPEED_OF_LIGHT;

    let grid = GridParams {
        slant_range_time0,
        slant_range_time_interval_s,
        slant_range_spacing_m,
        azimuth_time0,
        azimuth_time_interval_s: attrs.num_attr("azimuth_time_interval")? * factor_azimuth,
        azimuth_spacing_m: attrs.num_attr("azimuth_pixel_spacing")? * factor_azimuth,
    };
    grid.validate()?;

    log::debug!(
        "accumulation grid: azimuth {:.3} m / {:.6e} s, slant range {:.3} m / {:.6e} s",
        grid.azimuth_spacing_m,
        grid.azimuth_time_interval_s,
        grid.slant_range_spacing_m,
        grid.slant_range_time_interval_s
    );
    Ok(grid)
}
