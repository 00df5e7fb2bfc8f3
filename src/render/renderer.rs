//! Density visualization of propagated times and longitudes.
//!
//! Every known entity with both a time and a longitude estimate is counted
//! into a (longitude, time) histogram. Two images are written:
//!
//! - `<prefix>.png`: the histogram alone
//! - `<prefix>-grid.png`: the histogram with longitude and century gridlines

use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::axis::{LongitudeAxis, TimeAxis};
use super::errors::RenderError;
use super::histogram::{DensityGrid, HistogramBuilder, PlotTally};
use super::raster::{Raster, GRID_COLOR};
use crate::config::RenderConfig;
use crate::graph::EntityId;
use crate::propagation::{Scalar, ValueAggregator};

/// Geometry and styling of the rendered images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub longitude: LongitudeAxis,
    pub time: TimeAxis,
    /// Blue-channel increment per entity in a cell.
    pub density_step: u32,
    /// Degrees between vertical gridlines.
    pub longitude_grid_step: u32,
    /// First year with a horizontal gridline.
    pub grid_first_year: i64,
    /// Last year with a horizontal gridline.
    pub grid_last_year: i64,
    /// Years between horizontal gridlines.
    pub grid_year_step: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            longitude: LongitudeAxis::new(10),
            time: TimeAxis::new(-5000 * 372, 2015 * 372 + 1, 2001, 8),
            density_step: 10,
            longitude_grid_step: 10,
            grid_first_year: 0,
            grid_last_year: 2000,
            grid_year_step: 100,
        }
    }
}

impl RenderOptions {
    /// Build options from the `[render]` configuration section.
    pub fn from_config(config: &RenderConfig) -> Result<Self, String> {
        if config.start_year >= config.end_year {
            return Err(format!(
                "render.start_year ({}) must be before render.end_year ({})",
                config.start_year, config.end_year
            ));
        }
        if config.rows == 0 || config.longitude_resolution == 0 {
            return Err("render.rows and render.longitude_resolution must be positive".to_string());
        }
        if config.time_exponent < 1 {
            return Err("render.time_exponent must be at least 1".to_string());
        }
        if config.longitude_grid_step == 0 || config.grid_year_step == 0 {
            return Err("grid steps must be positive".to_string());
        }

        let time = TimeAxis::from_years(
            config.start_year,
            config.end_year,
            config.rows,
            config.time_exponent,
        )
        .ok_or_else(|| "render time range overflows the day unit".to_string())?;

        Ok(Self {
            longitude: LongitudeAxis::new(config.longitude_resolution),
            time,
            density_step: config.density_step,
            longitude_grid_step: config.longitude_grid_step,
            grid_first_year: config.grid_first_year,
            grid_last_year: config.grid_last_year,
            grid_year_step: config.grid_year_step,
        })
    }
}

/// Outcome of a [`DensityRenderer::render`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// Entities looked up.
    pub considered: usize,
    #[serde(flatten)]
    pub tally: PlotTally,
    /// Cells holding at least one entity.
    pub occupied_pixels: usize,
    pub image_path: PathBuf,
    pub grid_image_path: PathBuf,
}

/// Builds the histogram and writes both images.
#[derive(Debug, Clone)]
pub struct DensityRenderer {
    options: RenderOptions,
}

impl DensityRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Count `ids` into the (longitude, time) grid.
    pub fn histogram<T: Scalar, L: Scalar>(
        &self,
        ids: &FxHashSet<EntityId>,
        time: &ValueAggregator<T>,
        longitude: &ValueAggregator<L>,
    ) -> (DensityGrid, PlotTally) {
        let ids: Vec<EntityId> = ids.iter().copied().collect();
        HistogramBuilder::new(self.options.longitude, self.options.time).build(
            &ids,
            time,
            longitude,
        )
    }

    /// Draw longitude and century gridlines over `raster`.
    pub fn overlay_grid(&self, raster: &mut Raster) {
        let step = i64::from(self.options.longitude_grid_step);
        let mut longitude = -180 + step;
        while longitude < 180 {
            if let Some(x) = self.options.longitude.column(longitude) {
                raster.draw_vertical_line(x, GRID_COLOR);
            }
            longitude += step;
        }

        let mut year = self.options.grid_first_year;
        while year <= self.options.grid_last_year {
            if let Some(y) = self.options.time.year_row(year) {
                raster.draw_horizontal_line(y, GRID_COLOR);
            }
            year += i64::from(self.options.grid_year_step);
        }
    }

    /// Render `ids` to `<prefix>.png` and `<prefix>-grid.png`.
    pub fn render<T: Scalar, L: Scalar>(
        &self,
        prefix: &Path,
        ids: &FxHashSet<EntityId>,
        time: &ValueAggregator<T>,
        longitude: &ValueAggregator<L>,
    ) -> Result<RenderStats, RenderError> {
        let (grid, tally) = self.histogram(ids, time, longitude);
        let occupied_pixels = grid.occupied_count();
        info!(
            "{} located entities out of {} ({} pixels used)",
            tally.plotted,
            ids.len(),
            occupied_pixels
        );
        debug!(
            "{} entities without both values, {} out of range",
            tally.missing_value, tally.out_of_range
        );

        let (image_path, grid_image_path) = output_paths(prefix);

        let mut raster = Raster::from_density(&grid, self.options.density_step);
        info!("Writing {}", image_path.display());
        raster.write_png(&image_path)?;

        self.overlay_grid(&mut raster);
        info!("Writing {}", grid_image_path.display());
        raster.write_png(&grid_image_path)?;

        Ok(RenderStats {
            considered: ids.len(),
            tally,
            occupied_pixels,
            image_path,
            grid_image_path,
        })
    }
}

/// `<prefix>.png` and `<prefix>-grid.png`.
pub fn output_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut name = prefix.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    (with_suffix(".png"), with_suffix("-grid.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyStore;
    use crate::propagation::{DiffusionConfig, Mean, Min};

    fn small_options() -> RenderOptions {
        RenderOptions {
            longitude: LongitudeAxis::new(1),
            time: TimeAxis::from_years(0, 100, 50, 1).unwrap(),
            density_step: 10,
            longitude_grid_step: 90,
            grid_first_year: 0,
            grid_last_year: 100,
            grid_year_step: 50,
        }
    }

    #[test]
    fn test_output_paths() {
        let (image, grid) = output_paths(Path::new("out/wikidata"));
        assert_eq!(image, PathBuf::from("out/wikidata.png"));
        assert_eq!(grid, PathBuf::from("out/wikidata-grid.png"));
    }

    #[test]
    fn test_options_from_default_config() {
        let options = RenderOptions::from_config(&RenderConfig::default()).unwrap();
        assert_eq!(options, RenderOptions::default());
        assert_eq!(options.longitude.columns(), 3601);
        assert_eq!(options.time.rows, 2001);
    }

    #[test]
    fn test_options_reject_inverted_range() {
        let config = RenderConfig {
            start_year: 2000,
            end_year: 1000,
            ..RenderConfig::default()
        };
        assert!(RenderOptions::from_config(&config).is_err());
    }

    #[test]
    fn test_options_reject_flat_time_axis() {
        let config = RenderConfig {
            time_exponent: 0,
            ..RenderConfig::default()
        };
        assert!(RenderOptions::from_config(&config).is_err());
    }

    #[test]
    fn test_overlay_grid_positions() {
        let renderer = DensityRenderer::new(RenderOptions::default());
        let mut raster = Raster::new(3601, 2001);

        renderer.overlay_grid(&mut raster);

        for longitude in (-170..=170).step_by(10) {
            let x = ((longitude + 180) * 10) as usize;
            assert_eq!(raster.get(x, 1000), Some(GRID_COLOR), "longitude {longitude}");
        }
        assert_eq!(raster.get(0, 1000), Some([0, 0, 0]));
        assert_eq!(raster.get(3600, 1000), Some([0, 0, 0]));
        assert_eq!(raster.get(5, 133), Some(GRID_COLOR));
        assert_eq!(raster.get(5, 1967), Some(GRID_COLOR));
    }

    #[test]
    fn test_render_writes_both_images() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("scene");

        let mut graph = AdjacencyStore::new();
        graph.add_undirected_edge(1, 2);
        let mut time = ValueAggregator::new(Min, DiffusionConfig::default());
        let mut longitude = ValueAggregator::new(Mean, DiffusionConfig::default());
        time.add_value(1, 50 * 372i64);
        longitude.add_value(2, 10.0f32);
        longitude.add_value(3, 20.0f32);
        time.propagate(&graph);
        longitude.propagate(&graph);

        let ids: FxHashSet<EntityId> = [1, 2, 3, 4].into_iter().collect();
        let renderer = DensityRenderer::new(small_options());
        let stats = renderer.render(&prefix, &ids, &time, &longitude).unwrap();

        assert_eq!(stats.considered, 4);
        assert_eq!(stats.tally.plotted, 2);
        assert_eq!(stats.tally.missing_value, 2);
        assert_eq!(stats.occupied_pixels, 1);
        assert!(stats.image_path.exists());
        assert!(stats.grid_image_path.exists());
        assert_eq!(stats.grid_image_path, dir.path().join("scene-grid.png"));
    }
}
