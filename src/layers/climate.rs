//! Atmosphere and soil colour ramps: moisture, temperature, humidity,
//! pressure and cloud cover.

use crate::cell::TerrainCell;
use crate::color::{lerp, normalize, Rgb};

pub const TEMPERATURE_RANGE: (f64, f64) = (-20.0, 30.0);
pub const PRESSURE_RANGE: (f64, f64) = (980.0, 1040.0);
/// Sea-level pressure assumed when the backend omits it.
pub const DEFAULT_PRESSURE: f64 = 1013.0;

const CLEAR_SKY: Rgb = Rgb::new(30, 60, 120);
const FULL_CLOUD: Rgb = Rgb::new(255, 255, 255);
const CLOUD_THRESHOLD: f64 = 0.01;

/// Wetter cells lose red and green, leaving blue.
pub fn moisture_color(cell: &TerrainCell) -> Rgb {
    let m = cell.moisture.clamp(0.0, 1.0);
    let rg = 255.0 * (1.0 - m);
    Rgb::from_channels(rg, rg, 255.0)
}

/// Blue → cyan → green → yellow → red with breakpoints at the quartiles.
pub fn temperature_color(cell: &TerrainCell) -> Rgb {
    let t = normalize(cell.temperature, TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);

    if t < 0.25 {
        let f = t * 4.0;
        Rgb::from_channels(0.0, 255.0 * f, 255.0)
    } else if t < 0.5 {
        let f = (t - 0.25) * 4.0;
        Rgb::from_channels(0.0, 255.0, 255.0 * (1.0 - f))
    } else if t < 0.75 {
        let f = (t - 0.5) * 4.0;
        Rgb::from_channels(255.0 * f, 255.0, 0.0)
    } else {
        let f = (t - 0.75) * 4.0;
        Rgb::from_channels(255.0, 255.0 * (1.0 - f), 0.0)
    }
}

/// Tan → light blue → dark blue over air humidity.
pub fn humidity_color(cell: &TerrainCell) -> Rgb {
    let h = cell.air_humidity.clamp(0.0, 1.0);

    if h < 0.5 {
        let f = h * 2.0;
        return Rgb::from_channels(
            245.0 - (245.0 - 173.0) * f,
            222.0 - (222.0 - 216.0) * f,
            179.0 + (230.0 - 179.0) * f,
        );
    }

    let f = (h - 0.5) * 2.0;
    Rgb::from_channels(
        173.0 - 173.0 * f,
        216.0 - 216.0 * f,
        230.0 - (230.0 - 139.0) * f,
    )
}

/// Low pressure blue, mid green, high orange.
pub fn pressure_color(cell: &TerrainCell) -> Rgb {
    let pressure = cell.atmospheric_pressure.unwrap_or(DEFAULT_PRESSURE);
    let p = normalize(pressure, PRESSURE_RANGE.0, PRESSURE_RANGE.1);

    if p < 0.5 {
        let f = p * 2.0;
        return Rgb::from_channels(f * 100.0, 150.0 + f * 105.0, 255.0 * (1.0 - f));
    }

    let f = (p - 0.5) * 2.0;
    Rgb::from_channels(100.0 + f * 155.0, 255.0 * (1.0 - f), 0.0)
}

/// Dark sky blue fading to white with cloud density.
pub fn cloud_color(cell: &TerrainCell) -> Rgb {
    let density = cell.cloud_density.clamp(0.0, 1.0);
    if density < CLOUD_THRESHOLD {
        return CLEAR_SKY;
    }
    lerp(CLEAR_SKY, FULL_CLOUD, density)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with<F: FnOnce(&mut TerrainCell)>(f: F) -> TerrainCell {
        let mut cell = TerrainCell::default();
        f(&mut cell);
        cell
    }

    #[test]
    fn test_moisture_extremes() {
        assert_eq!(moisture_color(&with(|c| c.moisture = 0.0)), Rgb::new(255, 255, 255));
        assert_eq!(moisture_color(&with(|c| c.moisture = 1.0)), Rgb::new(0, 0, 255));
        assert_eq!(moisture_color(&with(|c| c.moisture = 7.0)), Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_temperature_breakpoints() {
        assert_eq!(temperature_color(&with(|c| c.temperature = -20.0)), Rgb::new(0, 0, 255));
        assert_eq!(temperature_color(&with(|c| c.temperature = -7.5)), Rgb::new(0, 255, 255));
        assert_eq!(temperature_color(&with(|c| c.temperature = 5.0)), Rgb::new(0, 255, 0));
        assert_eq!(temperature_color(&with(|c| c.temperature = 17.5)), Rgb::new(255, 255, 0));
        assert_eq!(temperature_color(&with(|c| c.temperature = 30.0)), Rgb::new(255, 0, 0));
        assert_eq!(temperature_color(&with(|c| c.temperature = -60.0)), Rgb::new(0, 0, 255));
        assert_eq!(temperature_color(&with(|c| c.temperature = 45.0)), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_humidity_ramp() {
        assert_eq!(humidity_color(&with(|c| c.air_humidity = 0.0)), Rgb::new(245, 222, 179));
        assert_eq!(humidity_color(&with(|c| c.air_humidity = 0.5)), Rgb::new(173, 216, 230));
        assert_eq!(humidity_color(&with(|c| c.air_humidity = 1.0)), Rgb::new(0, 0, 139));
    }

    #[test]
    fn test_pressure_defaults_when_absent() {
        let absent = with(|c| c.atmospheric_pressure = None);
        let sea_level = with(|c| c.atmospheric_pressure = Some(DEFAULT_PRESSURE));
        assert_eq!(pressure_color(&absent), pressure_color(&sea_level));
        assert_eq!(pressure_color(&with(|c| c.atmospheric_pressure = Some(980.0))), Rgb::new(0, 150, 255));
        assert_eq!(pressure_color(&with(|c| c.atmospheric_pressure = Some(1010.0))), Rgb::new(100, 255, 0));
        assert_eq!(pressure_color(&with(|c| c.atmospheric_pressure = Some(1040.0))), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_cloud_ramp() {
        assert_eq!(cloud_color(&with(|c| c.cloud_density = 0.005)), CLEAR_SKY);
        assert_eq!(cloud_color(&with(|c| c.cloud_density = 1.0)), FULL_CLOUD);
        let half = cloud_color(&with(|c| c.cloud_density = 0.5));
        assert_eq!(half, Rgb::new(142, 157, 187));
    }
}
