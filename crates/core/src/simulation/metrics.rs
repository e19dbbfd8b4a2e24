//! Derived metrics: responder estimate and mitigation recommendations.
//!
//! Pure functions of the active fire set, the current parameters and the
//! responder rates in [`SimulationConfig`]. Nothing here mutates state.

use crate::config::SimulationConfig;
use crate::core_types::fire::FireEntity;
use crate::core_types::weather::SimulationParameters;
use serde::Serialize;
use std::fmt;

/// More active fires than this escalates to the major emergency protocol.
pub const MAJOR_EMERGENCY_FIRE_COUNT: usize = 5;
/// Summed intensity above which air support is recommended.
pub const AIR_SUPPORT_INTENSITY: f64 = 10.0;
/// Summed area heuristic above which ground tankers are recommended.
pub const GROUND_TANKER_AREA: f64 = 50.0;
/// Wind speed (km/h) above which a caution is issued.
pub const HIGH_WIND_SPEED: f64 = 30.0;
/// Relative humidity (%) below which pre-wetting is recommended.
pub const LOW_HUMIDITY: f64 = 30.0;

/// One recommendation. The `Display` impl is the text shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MitigationStrategy {
    NormalSurveillance,
    MajorEmergency,
    ProfessionalFirefighters,
    BasicEmergency,
    AirSupport,
    GroundTankers,
    HighWindCaution,
    PreWetting,
    RespondersRequired(u64),
    ContactAuthorities,
}

impl fmt::Display for MitigationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MitigationStrategy::NormalSurveillance => {
                f.write_str("No active fires. Normal surveillance status.")
            }
            MitigationStrategy::MajorEmergency => f.write_str("Activate major emergency protocol"),
            MitigationStrategy::ProfessionalFirefighters => {
                f.write_str("Deploy professional firefighting crews")
            }
            MitigationStrategy::BasicEmergency => f.write_str("Activate basic emergency protocol"),
            MitigationStrategy::AirSupport => {
                f.write_str("Use helicopters on high-intensity fronts")
            }
            MitigationStrategy::GroundTankers => f.write_str("Use water tankers and firebreaks"),
            MitigationStrategy::HighWindCaution => {
                f.write_str("Caution: strong winds can spread fires quickly")
            }
            MitigationStrategy::PreWetting => f.write_str("Consider pre-wetting surrounding areas"),
            MitigationStrategy::RespondersRequired(n) => {
                write!(f, "Approximately {n} responders required")
            }
            MitigationStrategy::ContactAuthorities => {
                f.write_str("Contact civil defense and local authorities")
            }
        }
    }
}

/// Aggregates over the active fire set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub active_fires: usize,
    pub total_intensity: f64,
    pub total_area: f64,
    pub required_responders: u64,
    pub strategies: Vec<MitigationStrategy>,
}

impl Default for DerivedMetrics {
    fn default() -> Self {
        DerivedMetrics {
            active_fires: 0,
            total_intensity: 0.0,
            total_area: 0.0,
            required_responders: 0,
            strategies: vec![MitigationStrategy::NormalSurveillance],
        }
    }
}

impl DerivedMetrics {
    /// Recompute everything from the fires that are still burning.
    pub fn compute(
        fires: &[FireEntity],
        params: &SimulationParameters,
        config: &SimulationConfig,
    ) -> Self {
        let active: Vec<&FireEntity> = fires.iter().filter(|f| f.active).collect();
        let total_intensity: f64 = active.iter().map(|f| f.intensity).sum();
        let total_area: f64 = active.iter().copied().map(FireEntity::area).sum();
        let required_responders =
            responders_for(active.len(), total_intensity, total_area, config);

        DerivedMetrics {
            active_fires: active.len(),
            total_intensity,
            total_area,
            required_responders,
            strategies: mitigation_strategies(
                active.len(),
                total_intensity,
                total_area,
                required_responders,
                params,
            ),
        }
    }
}

/// `round(fires·per_fire + intensity·per_intensity + area·per_area)`, 0 without fires.
pub fn required_responders(fires: &[FireEntity], config: &SimulationConfig) -> u64 {
    let active = fires.iter().filter(|f| f.active);
    let (count, intensity, area) = active.fold((0usize, 0.0, 0.0), |(n, i, a), f| {
        (n + 1, i + f.intensity, a + f.area())
    });
    responders_for(count, intensity, area, config)
}

fn responders_for(count: usize, intensity: f64, area: f64, config: &SimulationConfig) -> u64 {
    if count == 0 {
        return 0;
    }
    let raw = count as f64 * config.responders_per_fire
        + intensity * config.responders_per_intensity
        + area * config.responders_per_area;
    if raw.is_finite() && raw > 0.0 {
        raw.round() as u64
    } else {
        0
    }
}

/// Ordered recommendations for the current situation.
pub fn mitigation_strategies(
    active_fires: usize,
    total_intensity: f64,
    total_area: f64,
    required_responders: u64,
    params: &SimulationParameters,
) -> Vec<MitigationStrategy> {
    if active_fires == 0 {
        return vec![MitigationStrategy::NormalSurveillance];
    }

    let mut strategies = Vec::with_capacity(6);
    if active_fires > MAJOR_EMERGENCY_FIRE_COUNT {
        strategies.push(MitigationStrategy::MajorEmergency);
        strategies.push(MitigationStrategy::ProfessionalFirefighters);
    } else {
        strategies.push(MitigationStrategy::BasicEmergency);
    }
    if total_intensity > AIR_SUPPORT_INTENSITY {
        strategies.push(MitigationStrategy::AirSupport);
    }
    if total_area > GROUND_TANKER_AREA {
        strategies.push(MitigationStrategy::GroundTankers);
    }
    if *params.wind_speed() > HIGH_WIND_SPEED {
        strategies.push(MitigationStrategy::HighWindCaution);
    }
    if *params.humidity() < LOW_HUMIDITY {
        strategies.push(MitigationStrategy::PreWetting);
    }
    strategies.push(MitigationStrategy::RespondersRequired(required_responders));
    strategies.push(MitigationStrategy::ContactAuthorities);
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::fire::FireId;
    use crate::core_types::geo::LatLng;
    use crate::core_types::units::Degrees;

    fn fires(n: u64, intensity: f64) -> Vec<FireEntity> {
        (0..n)
            .map(|i| {
                FireEntity::with_intensity(
                    FireId::seed(i),
                    LatLng::new(0.0, i as f64),
                    Degrees::new(0.0),
                    intensity,
                )
            })
            .collect()
    }

    fn params(wind_speed: f64, humidity: f64) -> SimulationParameters {
        SimulationParameters::new(0.0, wind_speed, 25.0, humidity, 1.0).unwrap()
    }

    #[test]
    fn test_no_fires_means_surveillance() {
        let config = SimulationConfig::default();
        let metrics = DerivedMetrics::compute(&[], &params(50.0, 10.0), &config);
        assert_eq!(metrics.required_responders, 0);
        assert_eq!(metrics.strategies, vec![MitigationStrategy::NormalSurveillance]);
        assert_eq!(metrics, DerivedMetrics::default());
    }

    #[test]
    fn test_single_fresh_fire_responders() {
        let config = SimulationConfig::default();
        assert_eq!(required_responders(&fires(1, 1.0), &config), 7);

        // 5 + 2·1.0 + 0.1·(π·900/100) = 9.83 → 10
        let mut set = fires(1, 1.0);
        set[0].spread = 0.3;
        assert_eq!(required_responders(&set, &config), 10);
    }

    #[test]
    fn test_inactive_fires_ignored() {
        let config = SimulationConfig::default();
        let mut set = fires(3, 1.0);
        set[1] = set[1].retired();
        set[2] = set[2].retired();
        assert_eq!(required_responders(&set, &config), 7);
    }

    #[test]
    fn test_basic_strategy_order() {
        let config = SimulationConfig::default();
        let metrics = DerivedMetrics::compute(&fires(2, 1.0), &params(10.0, 50.0), &config);
        assert_eq!(
            metrics.strategies,
            vec![
                MitigationStrategy::BasicEmergency,
                MitigationStrategy::RespondersRequired(metrics.required_responders),
                MitigationStrategy::ContactAuthorities,
            ]
        );
    }

    #[test]
    fn test_escalated_strategies() {
        let config = SimulationConfig::default();
        let metrics = DerivedMetrics::compute(&fires(6, 2.0), &params(40.0, 20.0), &config);
        assert_eq!(metrics.total_intensity, 12.0);
        assert_eq!(
            metrics.strategies,
            vec![
                MitigationStrategy::MajorEmergency,
                MitigationStrategy::ProfessionalFirefighters,
                MitigationStrategy::AirSupport,
                MitigationStrategy::HighWindCaution,
                MitigationStrategy::PreWetting,
                MitigationStrategy::RespondersRequired(metrics.required_responders),
                MitigationStrategy::ContactAuthorities,
            ]
        );
    }

    #[test]
    fn test_large_area_recommends_tankers() {
        let config = SimulationConfig::default();
        let mut set = fires(1, 1.0);
        set[0].spread = 0.5; // π·2500/100 ≈ 78.5
        let metrics = DerivedMetrics::compute(&set, &params(10.0, 50.0), &config);
        assert!(metrics.strategies.contains(&MitigationStrategy::GroundTankers));
    }

    #[test]
    fn test_strategy_text() {
        assert_eq!(
            MitigationStrategy::RespondersRequired(12).to_string(),
            "Approximately 12 responders required"
        );
    }
}
