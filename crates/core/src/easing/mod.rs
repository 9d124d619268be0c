//! Easing curves used by motion phases.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing function applied to a phase's normalised progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    /// Overshoots past the target by an amount controlled by the factor,
    /// then settles back.
    BackOut(f32),
    /// Decaying oscillation around the target.
    ElasticOut { amplitude: f32, period: f32 },
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0).
    ///
    /// Progress is clamped first, and both endpoints are exact for every
    /// variant so a settled phase lands on its target value.
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::BackOut(overshoot) => {
                let p = t - 1.0;
                p * p * ((overshoot + 1.0) * p + overshoot) + 1.0
            }
            Easing::ElasticOut { amplitude, period } => elastic_out(t, amplitude, period),
        }
    }

    /// The curve that plays this one backwards, used for yoyo returns.
    pub fn mirrored(&self) -> Easing {
        match *self {
            Easing::EaseInQuad => Easing::EaseOutQuad,
            Easing::EaseOutQuad => Easing::EaseInQuad,
            Easing::EaseInCubic => Easing::EaseOutCubic,
            Easing::EaseOutCubic => Easing::EaseInCubic,
            Easing::EaseInQuart => Easing::EaseOutQuart,
            Easing::EaseOutQuart => Easing::EaseInQuart,
            other => other,
        }
    }
}

/// Exponentially decaying sine. An amplitude below 1 is raised to 1 so the
/// curve still starts at 0.
fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    let amplitude = amplitude.max(1.0);
    let period = if period > f32::EPSILON { period } else { 0.3 };
    let shift = period / (2.0 * PI) * (1.0 / amplitude).asin();
    amplitude * 2f32.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / period).sin() + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 12] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::BackOut(1.5),
        Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.4,
        },
    ];

    #[test]
    fn endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
            assert_eq!(easing.apply(-0.5), 0.0, "{easing:?}");
            assert_eq!(easing.apply(3.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn back_out_overshoots_target() {
        let peak = (1..100)
            .map(|i| Easing::BackOut(1.5).apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn elastic_out_oscillates_around_target() {
        let easing = Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.4,
        };
        let samples: Vec<f32> = (1..100).map(|i| easing.apply(i as f32 / 100.0)).collect();
        assert!(samples.iter().any(|v| *v > 1.0));
        assert!(samples.iter().any(|v| *v < 1.0));
        assert!((easing.apply(0.99) - 1.0).abs() < 0.01);
    }

    #[test]
    fn out_curves_lead_linear() {
        assert!(Easing::EaseOutCubic.apply(0.3) > 0.3);
        assert!(Easing::EaseInCubic.apply(0.3) < 0.3);
        assert_eq!(Easing::EaseOutCubic.mirrored(), Easing::EaseInCubic);
    }

    #[test]
    fn deserialises_from_config_names() {
        let easing: Easing = serde_json::from_str("\"ease_out_quart\"").unwrap();
        assert_eq!(easing, Easing::EaseOutQuart);

        let easing: Easing = serde_json::from_str("{\"back_out\": 1.5}").unwrap();
        assert_eq!(easing, Easing::BackOut(1.5));
    }
}
