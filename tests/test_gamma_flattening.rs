use approx::assert_abs_diff_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use gammaflat::{
    azimuth_slant_range_grid, compute_gamma_area_from, gamma_weights, sum_weights,
    FlattenResult, GammaWeightsMethod, GridParams, OrientedAreaProvider, ProductAttributes,
    TerrainSamples, DEFAULT_GROUPING_AREA_FACTOR,
};
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sensor_attrs() -> ProductAttributes {
    let mut attrs = ProductAttributes::new();
    attrs.set_text("product_type", "SLC");
    attrs.set_number("range_pixel_spacing", 10.0);
    attrs.set_number("incidence_angle_mid_swath", PI / 6.0);
    attrs.set_number("azimuth_time_interval", 2e-3);
    attrs.set_number("azimuth_pixel_spacing", 14.0);
    attrs
}

fn azimuth_time0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 3, 17, 8, 15).unwrap()
}

/// Terrain samples uniformly covering `cells x cells` grid cells with
/// `per_cell x per_cell` samples each, together carrying one cell area per
/// cell.
fn uniform_samples(grid: &GridParams, cells: usize, per_cell: usize) -> TerrainSamples {
    let cell_area = grid.azimuth_spacing_m * grid.slant_range_spacing_m;
    let sample_area = cell_area / (per_cell * per_cell) as f64;
    let step = 1.0 / per_cell as f64;

    let mut azimuth_time = Vec::new();
    let mut slant_range_time = Vec::new();
    let mut gamma_area = Vec::new();
    for i in 0..cells * per_cell {
        let azimuth_index = i as f64 * step;
        let nanos = (azimuth_index * grid.azimuth_time_interval_s * 1e9).round() as i64;
        for j in 0..cells * per_cell {
            let slant_range_index = j as f64 * step;
            azimuth_time.push(grid.azimuth_time0 + Duration::nanoseconds(nanos));
            slant_range_time
                .push(grid.slant_range_time0 + slant_range_index * grid.slant_range_time_interval_s);
            gamma_area.push(sample_area);
        }
    }
    TerrainSamples::new(
        azimuth_time,
        Array1::from_vec(slant_range_time),
        Array1::from_vec(gamma_area),
    )
    .unwrap()
}

#[test]
fn test_grid_derivation_from_slc_metadata() {
    let grid = azimuth_slant_range_grid(
        &sensor_attrs(),
        5.3e-3,
        azimuth_time0(),
        DEFAULT_GROUPING_AREA_FACTOR,
    )
    .expect("grid derivation failed");

    assert_abs_diff_eq!(grid.slant_range_spacing_m, 15.0, epsilon = 1e-9);
    assert_abs_diff_eq!(grid.azimuth_spacing_m, 42.0, epsilon = 1e-9);
    assert!(grid.validate().is_ok());
}

#[test]
fn test_uniform_illumination_normalizes_to_one() {
    init_logging();
    let grid = azimuth_slant_range_grid(
        &sensor_attrs(),
        5.3e-3,
        azimuth_time0(),
        DEFAULT_GROUPING_AREA_FACTOR,
    )
    .unwrap();

    // Five samples per cell axis keeps sample fractions away from the
    // half-cell rounding boundary of the nearest policy
    let cells = 8;
    let per_cell = 5;
    let samples = uniform_samples(&grid, cells, per_cell);

    let nearest = gamma_weights(&samples, &grid, GammaWeightsMethod::Nearest).unwrap();
    let bilinear = gamma_weights(&samples, &grid, GammaWeightsMethod::Bilinear).unwrap();
    assert_eq!(nearest.len(), samples.len());
    assert_eq!(bilinear.len(), samples.len());

    // Interior samples of a uniform field see a normalization factor of 1;
    // cells near the tile edge miss mass from outside the tile.
    let n_per_axis = cells * per_cell;
    let mut checked = 0;
    for i in 0..n_per_axis {
        for j in 0..n_per_axis {
            let az_index = i as f64 / per_cell as f64;
            let rg_index = j as f64 / per_cell as f64;
            let interior = az_index > 1.5
                && az_index < (cells - 2) as f64
                && rg_index > 1.5
                && rg_index < (cells - 2) as f64;
            if interior {
                let k = i * n_per_axis + j;
                assert_abs_diff_eq!(bilinear[k], 1.0, epsilon = 1e-6);
                assert_abs_diff_eq!(nearest[k], 1.0, epsilon = 1e-6);
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}

struct TiltedPlane {
    /// Oriented facet area (square meters, ECEF components)
    facet_area: [f64; 3],
}

impl OrientedAreaProvider for TiltedPlane {
    fn compute_dem_oriented_area(&self, dem_ecef: &Array2<f64>) -> FlattenResult<Array2<f64>> {
        let mut area = Array2::zeros(dem_ecef.dim());
        for mut row in area.rows_mut() {
            row[0] = self.facet_area[0];
            row[1] = self.facet_area[1];
            row[2] = self.facet_area[2];
        }
        Ok(area)
    }
}

#[test]
fn test_gamma_area_feeds_the_pipeline() {
    init_logging();
    let grid = azimuth_slant_range_grid(
        &sensor_attrs(),
        5.3e-3,
        azimuth_time0(),
        DEFAULT_GROUPING_AREA_FACTOR,
    )
    .unwrap();

    // Two facets of 630 m^2 (one accumulation cell) tilted toward the
    // sensor, one facet tilted away
    let provider = TiltedPlane {
        facet_area: [0.0, 0.0, 630.0],
    };
    let positions = Array2::<f64>::zeros((3, 3));
    let mut direction = Array2::<f64>::zeros((3, 3));
    direction[[0, 2]] = -1.0;
    direction[[1, 2]] = -1.0;
    direction[[2, 2]] = 1.0;

    let gamma_area = compute_gamma_area_from(&provider, &positions, &direction).unwrap();
    assert_abs_diff_eq!(gamma_area[0], 630.0, epsilon = 1e-9);
    assert_eq!(gamma_area[2], 0.0);

    // Facets 0 and 1 share a cell, facet 2 sits alone and away-facing
    let azimuth_time = vec![
        grid.azimuth_time0,
        grid.azimuth_time0,
        grid.azimuth_time0 + Duration::milliseconds(60),
    ];
    let slant_range_time = Array1::from_vec(vec![
        grid.slant_range_time0,
        grid.slant_range_time0,
        grid.slant_range_time0 + 10.0 * grid.slant_range_time_interval_s,
    ]);
    let samples = TerrainSamples::new(azimuth_time, slant_range_time, gamma_area).unwrap();

    let result = gamma_weights(&samples, &grid, GammaWeightsMethod::Nearest).unwrap();
    // 2 x 630 m^2 into one 630 m^2 cell
    assert_abs_diff_eq!(result[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result[1], 2.0, epsilon = 1e-9);
    assert_eq!(result[2], 0.0);
}

#[test]
fn test_multilook_smooths_accumulated_weights() {
    init_logging();
    // A 5x5 fully populated support, one hot cell in the middle
    let mut values = Vec::new();
    let mut az = Vec::new();
    let mut rg = Vec::new();
    for i in 0..5i64 {
        for j in 0..5i64 {
            values.push(if i == 2 && j == 2 { 25.0 } else { 0.0 });
            az.push(i);
            rg.push(j);
        }
    }

    let plain = sum_weights(&values, &az, &rg, None).unwrap();
    let looked = sum_weights(&values, &az, &rg, Some((3, 3))).unwrap();

    // The hot cell spreads over its 3x3 neighborhood
    let center = (2 * 5 + 2) as usize;
    assert_abs_diff_eq!(plain[center], 25.0, epsilon = 1e-12);
    assert_abs_diff_eq!(looked[center], 25.0 / 9.0, epsilon = 1e-9);
    // A neighbor inside the window picks up smoothed mass
    assert_abs_diff_eq!(looked[center - 1], 25.0 / 9.0, epsilon = 1e-9);
    // An edge cell away from the hot spot keeps its zero; its clipped
    // window still holds enough valid cells to report a value
    assert_abs_diff_eq!(looked[2], 0.0, epsilon = 1e-12);
}
