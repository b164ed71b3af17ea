//! Road surface classification.
//!
//! Two measurements decide the label: surface temperature gates
//! whether a hazard is physically possible, the mean visible-band
//! reflectance separates ice from snow. Every reading gets exactly
//! one label; there is no error case.

use crate::model::SurfaceType;

/// Surface temperature (°C) at or above which the surface is always
/// read as asphalt, whatever the optics say.
pub const HAZARD_TEMP_CEILING_C: f64 = 7.0;

/// Visible-band reflectance at or below which the surface is read as
/// asphalt — dark pavement reflects almost nothing.
pub const HAZARD_REFLECTANCE_FLOOR: f64 = 4.0;

/// Visible-band reflectance at or above which a hazardous surface is
/// snow rather than ice. Snow scatters broadband; ice stays glassy.
pub const SNOW_REFLECTANCE_THRESHOLD: f64 = 20.0;

/// Classify a single reading.
///
/// Hazard requires both a cold surface (below
/// [`HAZARD_TEMP_CEILING_C`]) and elevated reflectance (above
/// [`HAZARD_REFLECTANCE_FLOOR`]); both bounds are exclusive. Hazardous
/// readings split on [`SNOW_REFLECTANCE_THRESHOLD`]: below it ice,
/// at or above it snow.
pub fn classify_surface(surface_temp_c: f64, vis_mean: f64) -> SurfaceType {
    if surface_temp_c < HAZARD_TEMP_CEILING_C && vis_mean > HAZARD_REFLECTANCE_FLOOR {
        if vis_mean < SNOW_REFLECTANCE_THRESHOLD {
            SurfaceType::Ice
        } else {
            SurfaceType::Snow
        }
    } else {
        SurfaceType::Asphalt
    }
}
