//! A single grid cell.

use earth_core::constants::EARTH_CIRCUMFERENCE_KM;
use serde::{Deserialize, Serialize};

/// One grid element: fixed trapezoid geometry plus a mutable temperature.
///
/// The cell covers the latitude band `[latitude, latitude + spacing]`.
/// `upper_width` is the east-west extent along the northern edge and
/// `lower_width` along the southern edge; meridians converge toward the
/// poles so the edge nearer a pole is the shorter one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    latitude: f64,
    longitude: f64,
    side_length: f64,
    height: f64,
    upper_width: f64,
    lower_width: f64,
    perimeter: f64,
    area: f64,
    temperature: f64,
}

impl Cell {
    pub fn new(latitude: f64, longitude: f64, spacing: u32, temperature: f64) -> Self {
        let side_length = side_length(spacing);
        let upper_width = edge_width(latitude + spacing as f64, side_length);
        let lower_width = edge_width(latitude, side_length);
        let height =
            (side_length.powi(2) - (lower_width - upper_width).powi(2) / 4.0).sqrt();

        Self {
            latitude,
            longitude,
            side_length,
            height,
            upper_width,
            lower_width,
            perimeter: 2.0 * side_length + upper_width + lower_width,
            area: (upper_width + lower_width) / 2.0 * height,
            temperature,
        }
    }

    /// Latitude of the cell's southern grid line (degrees)
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// North-south extent (km)
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Length of the slanted east and west sides (km)
    pub fn side_length(&self) -> f64 {
        self.side_length
    }

    pub fn upper_width(&self) -> f64 {
        self.upper_width
    }

    pub fn lower_width(&self) -> f64 {
        self.lower_width
    }

    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    /// Surface area (km²)
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Temperature (K)
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }
}

/// Equatorial length spanned by `spacing` degrees of longitude (km)
fn side_length(spacing: u32) -> f64 {
    spacing as f64 / 360.0 * EARTH_CIRCUMFERENCE_KM
}

/// Width of a cell edge at the given latitude. Never negative, even when
/// rounding puts a pole edge a hair past ±90°.
fn edge_width(latitude: f64, side_length: f64) -> f64 {
    (latitude.to_radians().cos() * side_length).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_equator_cell_geometry() {
        let cell = Cell::new(0.0, 0.0, 15, 288.0);
        let side = 15.0 / 360.0 * EARTH_CIRCUMFERENCE_KM;

        assert_abs_diff_eq!(cell.side_length(), side, epsilon = 1e-9);
        assert_abs_diff_eq!(cell.lower_width(), side, epsilon = 1e-9);
        assert_abs_diff_eq!(
            cell.upper_width(),
            side * 15f64.to_radians().cos(),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            cell.perimeter(),
            2.0 * side + cell.upper_width() + cell.lower_width(),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            cell.area(),
            (cell.upper_width() + cell.lower_width()) / 2.0 * cell.height(),
            epsilon = 1e-6
        );
        assert!(cell.height() <= cell.side_length());
    }

    #[test]
    fn test_northern_cells_narrow_toward_pole() {
        for lat in [0.0, 15.0, 30.0, 45.0, 60.0, 75.0] {
            let cell = Cell::new(lat, 0.0, 15, 288.0);
            assert!(cell.upper_width() <= cell.lower_width(), "lat {lat}");
        }
    }

    #[test]
    fn test_southern_cells_narrow_toward_pole() {
        for lat in [-90.0, -75.0, -45.0, -15.0] {
            let cell = Cell::new(lat, 0.0, 15, 288.0);
            assert!(cell.lower_width() <= cell.upper_width(), "lat {lat}");
        }
    }

    #[test]
    fn test_polar_cells_have_positive_area() {
        let south = Cell::new(-90.0, 0.0, 15, 288.0);
        let north = Cell::new(75.0, 0.0, 15, 288.0);

        assert_abs_diff_eq!(south.lower_width(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(north.upper_width(), 0.0, epsilon = 1e-9);
        assert!(south.area() > 0.0);
        assert!(north.area() > 0.0);
        assert_abs_diff_eq!(south.area(), north.area(), epsilon = 1e-6);
    }

    #[test]
    fn test_set_temperature() {
        let mut cell = Cell::new(0.0, 0.0, 15, 288.0);
        cell.set_temperature(300.0);
        assert_eq!(cell.temperature(), 300.0);
    }
}
