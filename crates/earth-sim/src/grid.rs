//! 2D longitude/latitude grid with pole-crossing topology.

use crate::cell::Cell;
use crate::state::SimulationState;
use earth_core::constants::{
    AVERAGE_EARTH_TEMPERATURE_K, EARTH_SURFACE_AREA_KM2, MAX_GRID_SPACING,
    RADIATION_PERIOD_MINUTES,
};
use earth_core::{Error, GridIndex, Result};
use serde::{Deserialize, Serialize};

/// Share of the tightest cell's temperature that may leave it in one
/// convection pass. Must stay at or below 1 for the update to be a convex
/// combination.
const CONVECTION_RATE: f64 = 0.5;

/// The four topological neighbours of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    pub north: GridIndex,
    pub south: GridIndex,
    pub east: GridIndex,
    pub west: GridIndex,
}

/// A grid of cells covering the whole globe.
///
/// Rows wrap east-west. A north/south step off the top or bottom row
/// crosses the pole and lands in the same row half way around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    spacing: u32,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Conductance per km of shared edge (km)
    conductance: f64,
}

impl Grid {
    /// Build a grid with every cell at the average Earth temperature
    pub fn new(spacing: u32) -> Result<Self> {
        Self::with_temperature(spacing, AVERAGE_EARTH_TEMPERATURE_K)
    }

    pub fn with_temperature(spacing: u32, temperature: f64) -> Result<Self> {
        if spacing == 0 || spacing > MAX_GRID_SPACING {
            return Err(Error::InvalidSpacing(spacing));
        }

        let width = (360 / spacing) as usize;
        let height = (180 / spacing) as usize;

        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            let latitude = row_latitude(y, height, spacing);
            for x in 0..width {
                cells.push(Cell::new(
                    latitude,
                    column_longitude(x, spacing),
                    spacing,
                    temperature,
                ));
            }
        }

        let tightest = cells
            .iter()
            .map(|cell| cell.area() / cell.perimeter())
            .fold(f64::INFINITY, f64::min);

        Ok(Self {
            spacing,
            width,
            height,
            cells,
            conductance: CONVECTION_RATE * tightest,
        })
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: GridIndex) -> &Cell {
        &self.cells[self.offset(index)]
    }

    pub fn get_mut(&mut self, index: GridIndex) -> &mut Cell {
        let offset = self.offset(index);
        &mut self.cells[offset]
    }

    /// Iterator over all cells with their indices
    pub fn iter(&self) -> impl Iterator<Item = (GridIndex, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_at(i), cell))
    }

    /// Latitude of row `y`'s southern grid line
    pub fn latitude_of_row(&self, y: usize) -> f64 {
        row_latitude(y, self.height, self.spacing)
    }

    pub fn longitude_of_column(&self, x: usize) -> f64 {
        column_longitude(x, self.spacing)
    }

    /// Index of the cell containing a geographic coordinate.
    ///
    /// Longitude 180 aliases -180. Out-of-range values are limited to the
    /// nearest cell.
    pub fn index_of(&self, latitude: f64, longitude: f64) -> GridIndex {
        let spacing = self.spacing as f64;
        let longitude = if longitude >= 180.0 {
            longitude - 360.0
        } else {
            longitude
        };

        let x = ((longitude + 180.0) / spacing).floor();
        let y = (latitude / spacing + self.height as f64 / 2.0).floor();

        GridIndex::new(
            limit(x, self.width - 1),
            limit(y, self.height - 1),
        )
    }

    pub fn east_neighbor(&self, index: GridIndex) -> GridIndex {
        GridIndex::new((index.x + 1) % self.width, index.y)
    }

    pub fn west_neighbor(&self, index: GridIndex) -> GridIndex {
        GridIndex::new((index.x + self.width - 1) % self.width, index.y)
    }

    pub fn north_neighbor(&self, index: GridIndex) -> GridIndex {
        if index.y + 1 < self.height {
            GridIndex::new(index.x, index.y + 1)
        } else {
            self.across_pole(index)
        }
    }

    pub fn south_neighbor(&self, index: GridIndex) -> GridIndex {
        if index.y > 0 {
            GridIndex::new(index.x, index.y - 1)
        } else {
            self.across_pole(index)
        }
    }

    pub fn neighbors(&self, index: GridIndex) -> Neighbors {
        Neighbors {
            north: self.north_neighbor(index),
            south: self.south_neighbor(index),
            east: self.east_neighbor(index),
            west: self.west_neighbor(index),
        }
    }

    /// Apply one radiation period of solar heating and cooling in place.
    pub fn calculate_radiant_heating(&mut self, sun_longitude: f64) {
        self.calculate_radiant_heating_over(sun_longitude, RADIATION_PERIOD_MINUTES);
    }

    /// Apply `minutes` of solar heating and radiative cooling in place.
    ///
    /// The heating scale comes from [`Grid::solar_scale`], so the
    /// area-weighted mean temperature is the same before and after.
    pub fn calculate_radiant_heating_over(&mut self, sun_longitude: f64, minutes: u32) {
        let scale = self.solar_scale(sun_longitude);
        let periods = minutes as f64 / RADIATION_PERIOD_MINUTES as f64;

        for cell in &mut self.cells {
            let delta = radiant_heating(cell, sun_longitude, scale) - radiant_cooling(cell);
            cell.set_temperature(cell.temperature() + delta * periods);
        }
    }

    /// Heating multiplier under which the heat this grid absorbs from the
    /// sun at `sun_longitude` equals the heat it radiates.
    ///
    /// Both sums weight each cell's temperature change by its area. Zero
    /// when no cell is lit.
    pub fn solar_scale(&self, sun_longitude: f64) -> f64 {
        let mut absorbed = 0.0;
        let mut radiated = 0.0;
        for cell in &self.cells {
            let weight = cell.area() * surface_fraction(cell);
            absorbed += weight * solar_attenuation(cell.latitude(), cell.longitude(), sun_longitude);
            radiated += weight;
        }

        if absorbed > 0.0 {
            radiated / absorbed
        } else {
            0.0
        }
    }

    /// Diffuse heat between neighbours, reading only from `previous`.
    ///
    /// Every shared edge carries a flow proportional to its length and to
    /// the temperature difference across it. What one cell gains its
    /// neighbour loses, so the area-weighted mean is preserved, and each
    /// new temperature is a convex combination of old ones.
    ///
    /// # Panics
    ///
    /// If `previous` has a different shape.
    pub fn process_convection(&mut self, previous: &Grid) {
        assert_eq!(
            (self.width, self.height),
            (previous.width, previous.height),
            "grid shapes differ"
        );

        self.copy_temperatures_from(previous);

        // Each edge is visited once from either side, so each visit moves half
        let rate = previous.conductance / 2.0;
        for (i, cell) in previous.cells.iter().enumerate() {
            let index = previous.index_at(i);
            let neighbors = previous.neighbors(index);
            let edges = [
                (neighbors.north, cell.upper_width()),
                (neighbors.south, cell.lower_width()),
                (neighbors.east, cell.height()),
                (neighbors.west, cell.height()),
            ];

            for (neighbor, edge) in edges {
                let j = previous.offset(neighbor);
                let other = &previous.cells[j];
                let flow = rate * edge * (other.temperature() - cell.temperature());

                let gained = self.cells[i].temperature() + flow / cell.area();
                self.cells[i].set_temperature(gained);
                let lost = self.cells[j].temperature() - flow / other.area();
                self.cells[j].set_temperature(lost);
            }
        }
    }

    /// Copy every temperature from a grid of the same shape
    ///
    /// # Panics
    ///
    /// If `other` has a different shape.
    pub fn copy_temperatures_from(&mut self, other: &Grid) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "grid shapes differ"
        );
        for (cell, source) in self.cells.iter_mut().zip(&other.cells) {
            cell.set_temperature(source.temperature());
        }
    }

    pub fn fill_temperature(&mut self, temperature: f64) {
        for cell in &mut self.cells {
            cell.set_temperature(temperature);
        }
    }

    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(Cell::area).sum()
    }

    pub fn mean_temperature(&self) -> f64 {
        self.cells.iter().map(Cell::temperature).sum::<f64>() / self.cells.len() as f64
    }

    pub fn area_weighted_mean_temperature(&self) -> f64 {
        let weighted: f64 = self
            .cells
            .iter()
            .map(|cell| cell.temperature() * cell.area())
            .sum();
        weighted / self.total_area()
    }

    /// Package an immutable copy of the grid for hand-off
    pub fn snapshot(&self, sun_longitude: f64, running_minutes: u64) -> SimulationState {
        SimulationState::new(
            self.width,
            self.height,
            self.spacing,
            self.cells.clone(),
            sun_longitude,
            running_minutes,
        )
    }

    fn across_pole(&self, index: GridIndex) -> GridIndex {
        GridIndex::new((index.x + self.width / 2) % self.width, index.y)
    }

    fn offset(&self, index: GridIndex) -> usize {
        index.y * self.width + index.x
    }

    fn index_at(&self, offset: usize) -> GridIndex {
        GridIndex::new(offset % self.width, offset / self.width)
    }
}

/// Fraction of peak solar heating a cell receives.
///
/// Zero on the night side, where the wrap-corrected angle between the
/// cell and the sub-solar longitude is 90° or more.
pub fn solar_attenuation(latitude: f64, longitude: f64, sun_longitude: f64) -> f64 {
    let mut distance = (longitude - sun_longitude).abs() % 360.0;
    if distance > 180.0 {
        distance = 360.0 - distance;
    }

    if distance < 90.0 {
        (distance.to_radians().cos() * latitude.to_radians().cos()).max(0.0)
    } else {
        0.0
    }
}

/// Solar heating term for one radiation period
pub fn radiant_heating(cell: &Cell, sun_longitude: f64, scale: f64) -> f64 {
    let attenuation = solar_attenuation(cell.latitude(), cell.longitude(), sun_longitude);
    AVERAGE_EARTH_TEMPERATURE_K * surface_fraction(cell) * scale * attenuation
}

/// Radiative cooling term for one radiation period
pub fn radiant_cooling(cell: &Cell) -> f64 {
    surface_fraction(cell) * AVERAGE_EARTH_TEMPERATURE_K
}

fn surface_fraction(cell: &Cell) -> f64 {
    cell.area() / EARTH_SURFACE_AREA_KM2
}

fn row_latitude(y: usize, height: usize, spacing: u32) -> f64 {
    (y as f64 - height as f64 / 2.0) * spacing as f64
}

fn column_longitude(x: usize, spacing: u32) -> f64 {
    (x as u32 * spacing) as f64 - 180.0
}

fn limit(value: f64, max: usize) -> usize {
    if value <= 0.0 {
        0
    } else {
        (value as usize).min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const DIVISORS: [u32; 17] = [1, 2, 3, 4, 5, 6, 9, 10, 12, 15, 18, 20, 30, 36, 45, 60, 90];

    /// A field that varies with both latitude and longitude
    fn uneven_grid(spacing: u32) -> Grid {
        let mut grid = Grid::new(spacing).unwrap();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let cell = grid.get_mut(GridIndex::new(x, y));
                let temperature = 250.0 + cell.latitude() + 0.4 * cell.longitude().abs();
                cell.set_temperature(temperature);
            }
        }
        grid
    }

    fn total_heat(grid: &Grid) -> f64 {
        grid.cells().iter().map(|c| c.area() * c.temperature()).sum()
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(15).unwrap();
        assert_eq!(grid.width(), 24);
        assert_eq!(grid.height(), 12);
        assert_eq!(grid.cells().len(), 288);
        assert!(grid
            .cells()
            .iter()
            .all(|c| c.temperature() == AVERAGE_EARTH_TEMPERATURE_K));
    }

    #[test]
    fn test_invalid_spacing() {
        assert!(matches!(Grid::new(0), Err(Error::InvalidSpacing(0))));
        assert!(matches!(Grid::new(91), Err(Error::InvalidSpacing(91))));
        assert!(matches!(Grid::new(180), Err(Error::InvalidSpacing(180))));
        assert!(matches!(Grid::new(200), Err(Error::InvalidSpacing(200))));
    }

    #[test]
    fn test_coarsest_grid_has_real_area() {
        let grid = Grid::new(90).unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 2));
        let ratio = grid.total_area() / EARTH_SURFACE_AREA_KM2;
        assert!(ratio > 0.5, "ratio {ratio}");
        assert!(grid.cells().iter().all(|c| c.area() > 0.0));
    }

    #[test]
    fn test_latitudes_and_longitudes_span_globe() {
        let grid = Grid::new(15).unwrap();
        for x in 0..grid.width() {
            assert_eq!(grid.get(GridIndex::new(x, 0)).latitude(), -90.0);
            assert_eq!(
                grid.get(GridIndex::new(x, grid.height() - 1)).latitude(),
                75.0
            );
        }
        for y in 0..grid.height() {
            assert_eq!(grid.get(GridIndex::new(0, y)).longitude(), -180.0);
            assert_eq!(
                grid.get(GridIndex::new(grid.width() - 1, y)).longitude(),
                165.0
            );
        }
        assert_eq!(grid.latitude_of_row(6), 0.0);
        assert_eq!(grid.longitude_of_column(12), 0.0);
    }

    #[test]
    fn test_total_area_close_to_earth() {
        let grid = Grid::new(5).unwrap();
        let ratio = grid.total_area() / EARTH_SURFACE_AREA_KM2;
        assert!((0.95..1.05).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn test_index_of() {
        let grid = Grid::new(15).unwrap();
        assert_eq!(grid.index_of(0.0, 0.0), GridIndex::new(12, 6));
        assert_eq!(grid.index_of(0.0, 180.0), GridIndex::new(0, 6));
        assert_eq!(grid.index_of(0.0, -180.0), GridIndex::new(0, 6));
        assert_eq!(grid.index_of(-90.0, -180.0), GridIndex::new(0, 0));
        assert_eq!(grid.index_of(90.0, 179.9), GridIndex::new(23, 11));
        assert_eq!(grid.index_of(-120.0, -400.0), GridIndex::new(0, 0));
    }

    #[test]
    fn test_pole_crossing_neighbors() {
        let grid = Grid::new(15).unwrap();
        let top = GridIndex::new(3, 11);
        assert_eq!(grid.north_neighbor(top), GridIndex::new(15, 11));
        assert_eq!(grid.south_neighbor(top), GridIndex::new(3, 10));

        let bottom = GridIndex::new(20, 0);
        assert_eq!(grid.south_neighbor(bottom), GridIndex::new(8, 0));
        assert_eq!(grid.north_neighbor(bottom), GridIndex::new(20, 1));
    }

    #[test]
    fn test_east_west_wrap() {
        let grid = Grid::new(15).unwrap();
        assert_eq!(grid.east_neighbor(GridIndex::new(23, 4)), GridIndex::new(0, 4));
        assert_eq!(grid.west_neighbor(GridIndex::new(0, 4)), GridIndex::new(23, 4));
    }

    #[test]
    fn test_day_and_night_heating() {
        let grid = Grid::new(15).unwrap();
        let noon = grid.get(grid.index_of(0.0, 0.0));
        let midnight = grid.get(grid.index_of(0.0, 180.0));
        assert_eq!(noon.latitude(), 0.0);
        assert_eq!(noon.longitude(), 0.0);
        assert_eq!(midnight.longitude(), -180.0);

        let scale = grid.solar_scale(0.0);
        assert!(scale > 1.0, "scale {scale}");
        assert!(radiant_heating(noon, 0.0, scale) > 0.0);
        assert!(radiant_heating(noon, 0.0, scale) - radiant_cooling(noon) > 0.0);
        assert_eq!(radiant_heating(midnight, 0.0, scale), 0.0);
    }

    #[test]
    fn test_attenuation() {
        assert_abs_diff_eq!(solar_attenuation(0.0, 0.0, 0.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            solar_attenuation(60.0, 0.0, 0.0),
            0.5,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            solar_attenuation(0.0, 170.0, -170.0),
            20f64.to_radians().cos(),
            epsilon = 1e-12
        );
        assert_eq!(solar_attenuation(0.0, 90.0, 0.0), 0.0);
        assert_eq!(solar_attenuation(0.0, -100.0, 0.0), 0.0);
    }

    #[test]
    fn test_radiant_heating_mutates_in_place() {
        let mut grid = Grid::new(15).unwrap();
        grid.calculate_radiant_heating(0.0);

        let noon = grid.get(grid.index_of(0.0, 0.0)).temperature();
        let midnight = grid.get(grid.index_of(0.0, 180.0)).temperature();
        assert!(noon > AVERAGE_EARTH_TEMPERATURE_K);
        assert!(midnight < AVERAGE_EARTH_TEMPERATURE_K);
    }

    #[test]
    fn test_copy_isolation() {
        let original = Grid::new(15).unwrap();
        let mut copy = original.clone();
        copy.calculate_radiant_heating(0.0);
        copy.process_convection(&original);
        copy.fill_temperature(0.0);

        assert!(original
            .cells()
            .iter()
            .all(|c| c.temperature() == AVERAGE_EARTH_TEMPERATURE_K));
    }

    #[test]
    fn test_convection_reads_previous_grid_only() {
        let mut previous = Grid::new(15).unwrap();
        let hot = GridIndex::new(5, 6);
        previous.get_mut(hot).set_temperature(1000.0);

        let mut next = previous.clone();
        next.process_convection(&previous);

        // The hot cell keeps most of its heat and sheds the rest
        let cooled = next.get(hot).temperature();
        assert!(cooled < 1000.0 && cooled > 500.0, "hot cell at {cooled}");
        // Every neighbour picks up some of the heat
        let neighbors = previous.neighbors(hot);
        for index in [neighbors.north, neighbors.south, neighbors.east, neighbors.west] {
            assert!(next.get(index).temperature() > AVERAGE_EARTH_TEMPERATURE_K);
        }
        assert_eq!(previous.get(hot).temperature(), 1000.0);
        let heat = total_heat(&previous);
        assert_abs_diff_eq!(total_heat(&next), heat, epsilon = 1e-9 * heat);
    }

    #[test]
    fn test_convection_conserves_uneven_field() {
        let mut current = uneven_grid(15);
        let mut next = current.clone();
        let mean = current.area_weighted_mean_temperature();
        let (low, high) = extremes(&current);

        for _ in 0..200 {
            next.process_convection(&current);
            std::mem::swap(&mut current, &mut next);
        }

        assert_abs_diff_eq!(current.area_weighted_mean_temperature(), mean, epsilon = 1e-9);
        let (new_low, new_high) = extremes(&current);
        assert!(new_low >= low - 1e-9 && new_high <= high + 1e-9);
        assert!(new_high - new_low < high - low);
    }

    fn extremes(grid: &Grid) -> (f64, f64) {
        grid.cells().iter().map(Cell::temperature).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(low, high), t| (low.min(t), high.max(t)),
        )
    }

    #[test]
    fn test_heating_preserves_area_weighted_mean() {
        for spacing in [5, 10, 15, 30] {
            let mut grid = Grid::new(spacing).unwrap();
            for sun in [-180.0, -97.5, 0.0, 33.25, 179.75] {
                grid.calculate_radiant_heating_over(sun, 1);
                grid.calculate_radiant_heating(sun);
            }
            assert_abs_diff_eq!(
                grid.area_weighted_mean_temperature(),
                AVERAGE_EARTH_TEMPERATURE_K,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_heating_scales_with_elapsed_minutes() {
        let mut hour = Grid::new(15).unwrap();
        hour.calculate_radiant_heating(0.0);
        let mut minute = Grid::new(15).unwrap();
        minute.calculate_radiant_heating_over(0.0, 1);

        for (a, b) in hour.cells().iter().zip(minute.cells()) {
            let full = a.temperature() - AVERAGE_EARTH_TEMPERATURE_K;
            let part = b.temperature() - AVERAGE_EARTH_TEMPERATURE_K;
            assert_abs_diff_eq!(part * 60.0, full, epsilon = 1e-9);
        }
    }

    #[test]
    #[should_panic(expected = "grid shapes differ")]
    fn test_convection_rejects_mismatched_grid() {
        let previous = Grid::new(30).unwrap();
        let mut next = Grid::new(15).unwrap();
        next.process_convection(&previous);
    }

    #[test]
    #[should_panic(expected = "grid shapes differ")]
    fn test_copy_rejects_mismatched_grid() {
        let source = Grid::new(15).unwrap();
        let mut target = Grid::new(10).unwrap();
        target.copy_temperatures_from(&source);
    }

    #[test]
    fn test_convection_conserves_uniform_mean() {
        let mut grids = [Grid::new(10).unwrap(), Grid::new(10).unwrap()];
        let initial = grids[0].mean_temperature();

        let mut current = 0;
        for _ in 0..50 {
            let (first, second) = grids.split_at_mut(1);
            if current == 0 {
                second[0].process_convection(&first[0]);
            } else {
                first[0].process_convection(&second[0]);
            }
            current = 1 - current;
        }

        assert_abs_diff_eq!(grids[current].mean_temperature(), initial, epsilon = 1e-9);
        for cell in grids[current].cells() {
            assert_abs_diff_eq!(cell.temperature(), initial, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_copy_temperatures_from() {
        let mut source = Grid::new(30).unwrap();
        source.calculate_radiant_heating(45.0);
        let mut target = Grid::new(30).unwrap();
        target.copy_temperatures_from(&source);

        for (a, b) in source.cells().iter().zip(target.cells()) {
            assert_eq!(a.temperature(), b.temperature());
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut grid = Grid::new(30).unwrap();
        let snapshot = grid.snapshot(-180.0, 0);
        grid.fill_temperature(500.0);

        assert_eq!(snapshot.width(), grid.width());
        assert!(snapshot
            .cells()
            .iter()
            .all(|c| c.temperature() == AVERAGE_EARTH_TEMPERATURE_K));
    }

    #[test]
    fn test_area_weighted_mean_of_uniform_grid() {
        let grid = Grid::with_temperature(20, 250.0).unwrap();
        assert_abs_diff_eq!(grid.area_weighted_mean_temperature(), 250.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn prop_east_west_are_inverse(
            spacing in prop::sample::select(DIVISORS.to_vec()),
            x in 0usize..360,
            y in 0usize..180,
        ) {
            let grid = Grid::new(spacing).unwrap();
            let index = GridIndex::new(x % grid.width(), y % grid.height());
            prop_assert_eq!(grid.west_neighbor(grid.east_neighbor(index)), index);
            prop_assert_eq!(grid.east_neighbor(grid.west_neighbor(index)), index);
        }

        #[test]
        fn prop_north_south_are_inverse_away_from_poles(
            spacing in prop::sample::select(DIVISORS.to_vec()),
            x in 0usize..360,
            y in 0usize..180,
        ) {
            let grid = Grid::new(spacing).unwrap();
            let index = GridIndex::new(x % grid.width(), y % grid.height());
            if index.y + 1 < grid.height() {
                prop_assert_eq!(grid.south_neighbor(grid.north_neighbor(index)), index);
            }
            if index.y > 0 {
                prop_assert_eq!(grid.north_neighbor(grid.south_neighbor(index)), index);
            }
        }

        #[test]
        fn prop_pole_neighbor_is_half_way_around(
            spacing in prop::sample::select(DIVISORS.to_vec()),
            x in 0usize..360,
        ) {
            let grid = Grid::new(spacing).unwrap();
            let x = x % grid.width();
            let top = grid.height() - 1;
            let across = (x + grid.width() / 2) % grid.width();

            prop_assert_eq!(
                grid.north_neighbor(GridIndex::new(x, top)),
                GridIndex::new(across, top)
            );
            prop_assert_eq!(
                grid.south_neighbor(GridIndex::new(x, 0)),
                GridIndex::new(across, 0)
            );
        }

        #[test]
        fn prop_convection_conserves_heat_at_any_spacing(
            spacing in 2u32..=90,
            x in 0usize..360,
            y in 0usize..180,
            spike in 300.0f64..5000.0,
        ) {
            let mut previous = Grid::new(spacing).unwrap();
            let index = GridIndex::new(x % previous.width(), y % previous.height());
            previous.get_mut(index).set_temperature(spike);

            let mut next = previous.clone();
            next.process_convection(&previous);

            let before = total_heat(&previous);
            prop_assert!((total_heat(&next) - before).abs() <= 1e-9 * before);
            let (low, high) = extremes(&next);
            prop_assert!(low >= AVERAGE_EARTH_TEMPERATURE_K - 1e-9);
            prop_assert!(high <= spike + 1e-9);
        }

        #[test]
        fn prop_attenuation_in_unit_range(
            latitude in -90.0f64..90.0,
            longitude in -180.0f64..180.0,
            sun in -180.0f64..180.0,
        ) {
            let attenuation = solar_attenuation(latitude, longitude, sun);
            prop_assert!((0.0..=1.0).contains(&attenuation));
        }
    }
}
