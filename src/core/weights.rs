use crate::core::accumulate::sum_weights;
use crate::types::{FlattenError, FlattenResult, GridParams, TerrainSamples};
use chrono::{DateTime, Utc};
use ndarray::Array1;

/// Area-distribution policy turning fractional grid positions into
/// weighted cell contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GammaWeightsMethod {
    /// Whole area into the single nearest cell
    Nearest,
    /// Area split over the four neighboring cells by overlap fraction
    Bilinear,
}

impl std::str::FromStr for GammaWeightsMethod {
    type Err = FlattenError;

    fn from_str(s: &str) -> FlattenResult<Self> {
        match s {
            "nearest" => Ok(GammaWeightsMethod::Nearest),
            "bilinear" => Ok(GammaWeightsMethod::Bilinear),
            other => Err(FlattenError::InvalidParameter(format!(
                "unknown gamma weights method '{}', expected 'nearest' or 'bilinear'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for GammaWeightsMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GammaWeightsMethod::Nearest => write!(f, "nearest"),
            GammaWeightsMethod::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Normalized gamma area per terrain sample with the chosen policy
pub fn gamma_weights(
    samples: &TerrainSamples,
    grid: &GridParams,
    method: GammaWeightsMethod,
) -> FlattenResult<Array1<f64>> {
    match method {
        GammaWeightsMethod::Nearest => gamma_weights_nearest(samples, grid),
        GammaWeightsMethod::Bilinear => gamma_weights_bilinear(samples, grid),
    }
}

/// Seconds from `t0` to `t`, keeping sub-second precision
fn seconds_between(t: DateTime<Utc>, t0: DateTime<Utc>) -> f64 {
    let delta = t - t0;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 * 1e-9,
        // Beyond the i64 nanosecond range; microseconds still cover it
        None => match delta.num_microseconds() {
            Some(micros) => micros as f64 * 1e-6,
            None => delta.num_milliseconds() as f64 * 1e-3,
        },
    }
}

/// Continuous (fractional) accumulation-grid indices of every sample
fn grid_indices(samples: &TerrainSamples, grid: &GridParams) -> (Vec<f64>, Vec<f64>) {
    let azimuth_index: Vec<f64> = samples
        .azimuth_time
        .iter()
        .map(|&t| seconds_between(t, grid.azimuth_time0) / grid.azimuth_time_interval_s)
        .collect();
    let slant_range_index: Vec<f64> = samples
        .slant_range_time
        .iter()
        .map(|&t| (t - grid.slant_range_time0) / grid.slant_range_time_interval_s)
        .collect();
    (azimuth_index, slant_range_index)
}

/// Nearest-cell area distribution.
///
/// Each sample's whole gamma area goes to the cell its fractional grid
/// position rounds to. Rounding is half-away-from-zero (`f64::round`), so a
/// sample exactly on a cell boundary lands in the cell further from index
/// zero. Returns the accumulated area density at every sample, normalized
/// by the grid cell area.
pub fn gamma_weights_nearest(
    samples: &TerrainSamples,
    grid: &GridParams,
) -> FlattenResult<Array1<f64>> {
    grid.validate()?;
    let (azimuth_index, slant_range_index) = grid_indices(samples, grid);

    let azimuth_cell: Vec<i64> = azimuth_index.iter().map(|&x| x.round() as i64).collect();
    let slant_range_cell: Vec<i64> =
        slant_range_index.iter().map(|&x| x.round() as i64).collect();

    log::info!("compute gamma areas 1/1");
    let gamma_area = samples.gamma_area.to_vec();
    let tot_area = sum_weights(&gamma_area, &azimuth_cell, &slant_range_cell, None)?;

    let cell_area = grid.azimuth_spacing_m * grid.slant_range_spacing_m;
    Ok(Array1::from_iter(tot_area.into_iter().map(|a| a / cell_area)))
}

/// Bilinear four-corner area distribution.
///
/// Each sample's gamma area is split over the four cells surrounding its
/// fractional grid position, weighted by the bilinear overlap fractions.
/// The corners are `floor(idx)` and `floor(idx) + 1` along each axis, so an
/// exactly-integer position degenerates to weight 1 on the floor corner and
/// weight 0 on its neighbor; all four passes are issued regardless and the
/// weights always sum to 1. Spreading across cell boundaries avoids the
/// aliasing of nearest-cell rounding when DEM sampling is finer than the
/// accumulation grid. Returns the accumulated area density at every sample,
/// normalized by the grid cell area.
pub fn gamma_weights_bilinear(
    samples: &TerrainSamples,
    grid: &GridParams,
) -> FlattenResult<Array1<f64>> {
    grid.validate()?;
    let n = samples.len();
    let (azimuth_index, slant_range_index) = grid_indices(samples, grid);

    let azimuth_cell0: Vec<i64> = azimuth_index.iter().map(|&x| x.floor() as i64).collect();
    let slant_range_cell0: Vec<i64> =
        slant_range_index.iter().map(|&x| x.floor() as i64).collect();
    let azimuth_frac: Vec<f64> = azimuth_index
        .iter()
        .zip(&azimuth_cell0)
        .map(|(&x, &c)| x - c as f64)
        .collect();
    let slant_range_frac: Vec<f64> = slant_range_index
        .iter()
        .zip(&slant_range_cell0)
        .map(|(&x, &c)| x - c as f64)
        .collect();

    let mut tot_area = vec![0.0; n];
    for (pass, &(az_step, rg_step)) in [(0i64, 0i64), (0, 1), (1, 0), (1, 1)].iter().enumerate() {
        log::info!("compute gamma areas {}/4", pass + 1);

        let weighted: Vec<f64> = (0..n)
            .map(|k| {
                let w_az = if az_step == 0 {
                    1.0 - azimuth_frac[k]
                } else {
                    azimuth_frac[k]
                };
                let w_rg = if rg_step == 0 {
                    1.0 - slant_range_frac[k]
                } else {
                    slant_range_frac[k]
                };
                samples.gamma_area[k] * w_az * w_rg
            })
            .collect();
        let azimuth_cell: Vec<i64> = azimuth_cell0.iter().map(|&c| c + az_step).collect();
        let slant_range_cell: Vec<i64> =
            slant_range_cell0.iter().map(|&c| c + rg_step).collect();

        let corner_area = sum_weights(&weighted, &azimuth_cell, &slant_range_cell, None)?;
        for (total, corner) in tot_area.iter_mut().zip(corner_area) {
            *total += corner;
        }
    }

    let cell_area = grid.azimuth_spacing_m * grid.slant_range_spacing_m;
    Ok(Array1::from_iter(tot_area.into_iter().map(|a| a / cell_area)))
}
