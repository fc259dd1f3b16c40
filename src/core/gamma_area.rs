use crate::types::{FlattenError, FlattenResult};
use ndarray::{Array1, Array2};

/// External geometry collaborator that turns terrain positions into
/// per-facet oriented (vector) areas.
///
/// Rows are samples, the three columns the ECEF vector components. The
/// output must preserve the ordering and cardinality of the input.
pub trait OrientedAreaProvider {
    fn compute_dem_oriented_area(&self, dem_ecef: &Array2<f64>) -> FlattenResult<Array2<f64>>;
}

/// Per-facet ground area projected toward the sensor.
///
/// `gamma_area = max(0, oriented_area . -look_direction)` per row; facets
/// facing away from the sensor contribute exactly zero area. Both inputs
/// are `n x 3` and share row ordering.
pub fn compute_gamma_area(
    dem_oriented_area: &Array2<f64>,
    dem_direction: &Array2<f64>,
) -> FlattenResult<Array1<f64>> {
    if dem_oriented_area.dim() != dem_direction.dim() {
        return Err(FlattenError::InvalidParameter(format!(
            "oriented area {:?} and look direction {:?} must share shape",
            dem_oriented_area.dim(),
            dem_direction.dim()
        )));
    }
    if dem_oriented_area.ncols() != 3 {
        return Err(FlattenError::InvalidParameter(format!(
            "oriented area and look direction need 3 vector components, got {}",
            dem_oriented_area.ncols()
        )));
    }

    let n = dem_oriented_area.nrows();
    let mut gamma_area = Array1::<f64>::zeros(n);
    for k in 0..n {
        let mut dot = 0.0;
        for axis in 0..3 {
            dot += dem_oriented_area[[k, axis]] * -dem_direction[[k, axis]];
        }
        gamma_area[k] = dot.max(0.0);
    }
    Ok(gamma_area)
}

/// Convenience wrapper composing the geometry collaborator with
/// [`compute_gamma_area`]
pub fn compute_gamma_area_from<P: OrientedAreaProvider>(
    provider: &P,
    dem_ecef: &Array2<f64>,
    dem_direction: &Array2<f64>,
) -> FlattenResult<Array1<f64>> {
    let dem_oriented_area = provider.compute_dem_oriented_area(dem_ecef)?;
    compute_gamma_area(&dem_oriented_area, dem_direction)
}
