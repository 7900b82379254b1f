//! Physical and calendar constants.

/// Mean radius of the Earth (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Equatorial circumference of the Earth (km)
pub const EARTH_CIRCUMFERENCE_KM: f64 = 40_030.14;

/// Surface area of the Earth (km²)
pub const EARTH_SURFACE_AREA_KM2: f64 = 5.10072e8;

/// Average temperature of the Earth (K). Every cell starts here.
pub const AVERAGE_EARTH_TEMPERATURE_K: f64 = 288.0;

/// Simulated minutes covered by one application of the heating and
/// cooling terms. Longer or shorter steps scale both terms linearly.
pub const RADIATION_PERIOD_MINUTES: u32 = 60;

/// Coarsest grid spacing (degrees). Anything wider leaves a single row
/// whose edges both sit on a pole.
pub const MAX_GRID_SPACING: u32 = 90;

/// Minutes in a simulated day; the sun completes one revolution per day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Unix timestamp of 2000-01-01T00:00:00Z, the simulated start instant.
pub const SIMULATION_EPOCH_UNIX: i64 = 946_684_800;
