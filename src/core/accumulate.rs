use crate::types::{FlattenError, FlattenResult};
use ndarray::Array2;
use rayon::prelude::*;
use std::collections::HashMap;

/// Samples per parallel grouping chunk
const GROUP_CHUNK: usize = 64 * 1024;

/// Incremental scatter-sum reduction over grid-cell indices.
///
/// Samples tagged with an `(azimuth_index, slant_range_index)` pair are
/// grouped by exact index equality and their weights summed. The grouped
/// sums stay sparse: only index pairs actually touched are stored, so the
/// extent of the grid in index space never matters. Accumulators built from
/// independent batches merge by summation, in any order.
#[derive(Debug, Default)]
pub struct WeightAccumulator {
    groups: HashMap<(i64, i64), f64>,
}

impl WeightAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group-and-sum one batch of weighted samples.
    ///
    /// All three slices must share cardinality. Chunks of the batch are
    /// reduced on worker threads into local maps and merged afterwards.
    pub fn push(
        &mut self,
        values: &[f64],
        azimuth_index: &[i64],
        slant_range_index: &[i64],
    ) -> FlattenResult<()> {
        if values.len() != azimuth_index.len() || values.len() != slant_range_index.len() {
            return Err(FlattenError::InvalidParameter(format!(
                "values ({}), azimuth_index ({}) and slant_range_index ({}) must share cardinality",
                values.len(),
                azimuth_index.len(),
                slant_range_index.len()
            )));
        }

        let batch = values
            .par_chunks(GROUP_CHUNK)
            .zip(azimuth_index.par_chunks(GROUP_CHUNK))
            .zip(slant_range_index.par_chunks(GROUP_CHUNK))
            .map(|((v, az), rg)| {
                let mut local: HashMap<(i64, i64), f64> = HashMap::new();
                for k in 0..v.len() {
                    *local.entry((az[k], rg[k])).or_insert(0.0) += v[k];
                }
                local
            })
            .reduce(HashMap::new, merge_groups);

        self.groups = merge_groups(std::mem::take(&mut self.groups), batch);
        Ok(())
    }

    /// Combine with another accumulator by summing per index pair
    pub fn merge(&mut self, other: WeightAccumulator) {
        self.groups = merge_groups(std::mem::take(&mut self.groups), other.groups);
    }

    /// Grouped sums keyed by `(azimuth_index, slant_range_index)`
    pub fn groups(&self) -> &HashMap<(i64, i64), f64> {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Finalize into a surface over the populated index support,
    /// optionally multilook-smoothed
    pub fn into_surface(
        self,
        multilook: Option<(usize, usize)>,
    ) -> FlattenResult<AccumulatedSurface> {
        let mut surface = AccumulatedSurface::from_groups(&self.groups);
        if let Some(window) = multilook {
            surface.cells = multilook_smooth(&surface.cells, window)?;
        }
        Ok(surface)
    }
}

fn merge_groups(
    a: HashMap<(i64, i64), f64>,
    b: HashMap<(i64, i64), f64>,
) -> HashMap<(i64, i64), f64> {
    // Fold the smaller map into the larger one
    let (mut acc, other) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (key, value) in other {
        *acc.entry(key).or_insert(0.0) += value;
    }
    acc
}

/// Grouped weight sums laid out densely over the populated index support.
///
/// Rows are the distinct azimuth indices actually present (sorted), columns
/// the distinct slant-range indices. Cross-product cells that no sample
/// touched hold NaN, meaning "no value"; smoothing and lookup propagate the
/// marker instead of substituting zero.
#[derive(Debug, Clone)]
pub struct AccumulatedSurface {
    azimuth_axis: Vec<i64>,
    slant_range_axis: Vec<i64>,
    cells: Array2<f64>,
}

impl AccumulatedSurface {
    fn from_groups(groups: &HashMap<(i64, i64), f64>) -> Self {
        let mut azimuth_axis: Vec<i64> = groups.keys().map(|&(az, _)| az).collect();
        let mut slant_range_axis: Vec<i64> = groups.keys().map(|&(_, rg)| rg).collect();
        azimuth_axis.sort_unstable();
        azimuth_axis.dedup();
        slant_range_axis.sort_unstable();
        slant_range_axis.dedup();

        let mut cells =
            Array2::from_elem((azimuth_axis.len(), slant_range_axis.len()), f64::NAN);
        for (&(az, rg), &value) in groups {
            let i = azimuth_axis.binary_search(&az).unwrap_or_else(|p| p);
            let j = slant_range_axis.binary_search(&rg).unwrap_or_else(|p| p);
            cells[[i, j]] = value;
        }

        Self {
            azimuth_axis,
            slant_range_axis,
            cells,
        }
    }

    /// Distinct azimuth indices in the support, ascending
    pub fn azimuth_axis(&self) -> &[i64] {
        &self.azimuth_axis
    }

    /// Distinct slant-range indices in the support, ascending
    pub fn slant_range_axis(&self) -> &[i64] {
        &self.slant_range_axis
    }

    pub fn is_empty(&self) -> bool {
        self.azimuth_axis.is_empty() || self.slant_range_axis.is_empty()
    }

    /// Value at the nearest populated index along each axis.
    ///
    /// Exact matches win; an equidistant tie takes the lower index. Returns
    /// NaN when the looked-up cell holds no value.
    pub fn sample(&self, azimuth_index: i64, slant_range_index: i64) -> f64 {
        if self.is_empty() {
            return f64::NAN;
        }
        let i = nearest_position(&self.azimuth_axis, azimuth_index);
        let j = nearest_position(&self.slant_range_axis, slant_range_index);
        self.cells[[i, j]]
    }
}

/// Position of the axis value nearest to `key`; ties take the lower value
fn nearest_position(axis: &[i64], key: i64) -> usize {
    match axis.binary_search(&key) {
        Ok(pos) => pos,
        Err(0) => 0,
        Err(pos) if pos == axis.len() => axis.len() - 1,
        Err(pos) => {
            let below = key - axis[pos - 1];
            let above = axis[pos] - key;
            if below <= above {
                pos - 1
            } else {
                pos
            }
        }
    }
}

/// Centered two-axis moving average over the surface support.
///
/// A cell is reported only when at least `wa * wr / 2 + 1` positions of its
/// window hold data; otherwise it becomes NaN. Windows clip at the support
/// boundary rather than padding with zeros. For even window sizes the extra
/// cell trails on the high-index side.
fn multilook_smooth(
    cells: &Array2<f64>,
    (window_azimuth, window_range): (usize, usize),
) -> FlattenResult<Array2<f64>> {
    if window_azimuth == 0 || window_range == 0 {
        return Err(FlattenError::InvalidParameter(format!(
            "multilook window sizes must be positive, got ({}, {})",
            window_azimuth, window_range
        )));
    }

    let min_valid = window_azimuth * window_range / 2 + 1;
    let (rows, cols) = cells.dim();
    let mut smoothed = Array2::from_elem((rows, cols), f64::NAN);

    for i in 0..rows {
        let lo_i = i.saturating_sub((window_azimuth - 1) / 2);
        let hi_i = (i + window_azimuth / 2).min(rows - 1);
        for j in 0..cols {
            let lo_j = j.saturating_sub((window_range - 1) / 2);
            let hi_j = (j + window_range / 2).min(cols - 1);

            let mut sum = 0.0;
            let mut count = 0usize;
            for ii in lo_i..=hi_i {
                for jj in lo_j..=hi_j {
                    let value = cells[[ii, jj]];
                    if !value.is_nan() {
                        sum += value;
                        count += 1;
                    }
                }
            }
            if count >= min_valid {
                smoothed[[i, j]] = sum / count as f64;
            }
        }
    }

    Ok(smoothed)
}

/// Scatter-sum weighted samples over grid cells and resample the result
/// back onto every input sample.
///
/// Samples are grouped by exact index pair and their `values` summed; with
/// `multilook` set the grouped surface is smoothed first. Each input sample
/// then reads the surface back at its own index pair (nearest populated
/// index), so the output shares the input's ordering and cardinality. Empty
/// input yields an empty output. A multilook window larger than the
/// populated support yields NaN for most or all samples; that is expected
/// sparse-coverage behavior, not an error.
pub fn sum_weights(
    values: &[f64],
    azimuth_index: &[i64],
    slant_range_index: &[i64],
    multilook: Option<(usize, usize)>,
) -> FlattenResult<Vec<f64>> {
    let mut accumulator = WeightAccumulator::new();
    accumulator.push(values, azimuth_index, slant_range_index)?;
    log::debug!(
        "grouped {} samples into {} grid cells",
        values.len(),
        accumulator.groups().len()
    );

    let surface = accumulator.into_surface(multilook)?;

    let weights_sum = azimuth_index
        .par_iter()
        .zip(slant_range_index.par_iter())
        .map(|(&az, &rg)| surface.sample(az, rg))
        .collect();

    Ok(weights_sum)
}
