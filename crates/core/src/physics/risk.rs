//! Fire risk score from surface weather.
//!
//! Weighted blend of three saturating factors:
//!
//! ```text
//! temp  = min(T / 40, 1)         40 °C saturates
//! hum   = 1 - H / 100            dry air raises risk
//! wind  = min(W / 30, 1)         30 km/h saturates
//! risk  = round(100 × (0.4·temp + 0.3·hum + 0.3·wind))
//! ```

/// Temperature (°C) at which the temperature factor saturates
const TEMPERATURE_SATURATION: f64 = 40.0;
/// Wind speed (km/h) at which the wind factor saturates
const WIND_SATURATION: f64 = 30.0;

const TEMPERATURE_WEIGHT: f64 = 0.4;
const HUMIDITY_WEIGHT: f64 = 0.3;
const WIND_WEIGHT: f64 = 0.3;

/// Clamp a factor into `[0, 1]`; NaN contributes nothing.
#[inline]
fn unit(factor: f64) -> f64 {
    if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    }
}

/// Compute the fire risk score in `[0, 100]`.
///
/// Each factor is clamped to `[0, 1]`, so negative or out-of-range inputs
/// cannot push the score outside its bounds.
///
/// # Example
/// ```
/// use fire_spread_core::compute_risk;
///
/// assert_eq!(compute_risk(40.0, 0.0, 30.0), 100);
/// assert_eq!(compute_risk(0.0, 100.0, 0.0), 0);
/// ```
pub fn compute_risk(temperature: f64, humidity: f64, wind_speed: f64) -> u8 {
    let temp_factor = unit(temperature / TEMPERATURE_SATURATION);
    let hum_factor = unit(1.0 - humidity / 100.0);
    let wind_factor = unit(wind_speed / WIND_SATURATION);

    let score = 100.0
        * (TEMPERATURE_WEIGHT * temp_factor + HUMIDITY_WEIGHT * hum_factor + WIND_WEIGHT * wind_factor);
    score.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bounds() {
        assert_eq!(compute_risk(40.0, 0.0, 30.0), 100);
        assert_eq!(compute_risk(0.0, 100.0, 0.0), 0);
    }

    #[test]
    fn test_risk_saturates() {
        assert_eq!(compute_risk(50.0, 0.0, 100.0), 100);
        assert_eq!(compute_risk(40.0, 0.0, 30.0), compute_risk(45.0, 0.0, 60.0));
    }

    #[test]
    fn test_risk_dashboard_defaults() {
        // 25 °C, 50 %, 10 km/h: 0.4·0.625 + 0.3·0.5 + 0.3·(1/3) = 0.5
        assert_eq!(compute_risk(25.0, 50.0, 10.0), 50);
    }

    #[test]
    fn test_risk_clamps_invalid_inputs() {
        assert_eq!(compute_risk(-20.0, 150.0, -5.0), 0);
        assert_eq!(compute_risk(1000.0, -50.0, 1000.0), 100);
        assert_eq!(compute_risk(f64::NAN, 100.0, f64::NAN), 0);
    }

    #[test]
    fn test_risk_monotonic_in_each_input() {
        let mut last = 0;
        for t in 0..=50 {
            let r = compute_risk(f64::from(t), 50.0, 10.0);
            assert!(r >= last);
            last = r;
        }
        let mut last = 100;
        for h in 0..=100 {
            let r = compute_risk(25.0, f64::from(h), 10.0);
            assert!(r <= last);
            last = r;
        }
    }
}
