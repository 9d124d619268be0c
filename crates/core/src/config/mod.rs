use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{easing::Easing, MotionError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub motion: MotionConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Parses and validates a JSON document. Missing sections and fields fall
    /// back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(?path, "loaded configuration file");
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.motion.validate()?;
        self.audio.validate()
    }
}

/// Tunables for every gesture. Defaults reproduce the game's feel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub hover: HoverConfig,
    pub select: SelectConfig,
    pub swap: SwapConfig,
    pub slosh: SloshConfig,
    pub pulse: PulseConfig,
    pub win: WinConfig,
    pub fade: FadeConfig,
}

impl MotionConfig {
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("hover.duration", self.hover.duration),
            ("select.duration", self.select.duration),
            ("swap.lift_duration", self.swap.lift_duration),
            ("swap.cross_duration", self.swap.cross_duration),
            ("swap.cross_overlap", self.swap.cross_overlap),
            ("swap.land_duration", self.swap.land_duration),
            ("slosh.whip_duration", self.slosh.whip_duration),
            ("slosh.rebound_duration", self.slosh.rebound_duration),
            ("slosh.settle_duration", self.slosh.settle_duration),
            ("slosh.hover_duration", self.slosh.hover_duration),
            ("pulse.duration", self.pulse.duration),
            ("win.step", self.win.step),
            ("win.stagger", self.win.stagger),
            ("fade.in_duration", self.fade.in_duration),
            ("fade.out_duration", self.fade.out_duration),
        ];
        for (field, value) in durations {
            non_negative(field, value)?;
        }

        let scales = [
            ("hover.scale", self.hover.scale),
            ("select.scale", self.select.scale),
            ("swap.scale", self.swap.scale),
            ("pulse.scale", self.pulse.scale),
        ];
        for (field, value) in scales {
            if !(value.is_finite() && value > 0.0) {
                return Err(MotionError::InvalidConfig {
                    field,
                    reason: "must be a positive number",
                });
            }
        }

        let amounts = [
            ("hover.lift", self.hover.lift),
            ("hover.rotation", self.hover.rotation),
            ("select.lift", self.select.lift),
            ("swap.lift", self.swap.lift),
            ("swap.slosh_intensity", self.swap.slosh_intensity),
            ("slosh.whip_factor", self.slosh.whip_factor),
            ("slosh.default_intensity", self.slosh.default_intensity),
            ("win.angle", self.win.angle),
        ];
        for (field, value) in amounts {
            if !value.is_finite() {
                return Err(MotionError::InvalidConfig {
                    field,
                    reason: "must be finite",
                });
            }
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MotionError::InvalidConfig {
            field,
            reason: "must be a non-negative number of seconds",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub lift: f32,
    pub scale: f32,
    pub rotation: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            lift: 6.0,
            scale: 1.08,
            rotation: 1.0,
            duration: 0.15,
            easing: Easing::EaseOutQuart,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    pub lift: f32,
    pub scale: f32,
    pub duration: f32,
    pub select_easing: Easing,
    pub release_easing: Easing,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            lift: 12.0,
            scale: 1.15,
            duration: 0.15,
            select_easing: Easing::BackOut(1.5),
            release_easing: Easing::EaseOutQuart,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    pub lift: f32,
    pub scale: f32,
    pub lift_duration: f32,
    pub lift_easing: Easing,
    pub cross_duration: f32,
    /// How long before the lift ends the crossing begins.
    pub cross_overlap: f32,
    pub cross_easing: Easing,
    pub land_duration: f32,
    pub land_easing: Easing,
    pub slosh_intensity: f32,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            lift: 25.0,
            scale: 1.12,
            lift_duration: 0.12,
            lift_easing: Easing::EaseOutCubic,
            cross_duration: 0.25,
            cross_overlap: 0.08,
            cross_easing: Easing::EaseInOutCubic,
            land_duration: 0.12,
            land_easing: Easing::EaseOutCubic,
            slosh_intensity: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SloshConfig {
    /// Multiplier applied to the intensity for the opening whip.
    pub whip_factor: f32,
    pub whip_duration: f32,
    pub whip_easing: Easing,
    pub rebound_duration: f32,
    pub rebound_easing: Easing,
    pub settle_duration: f32,
    pub settle_easing: Easing,
    pub hover_duration: f32,
    pub hover_easing: Easing,
    pub default_intensity: f32,
}

impl Default for SloshConfig {
    fn default() -> Self {
        Self {
            whip_factor: 1.5,
            whip_duration: 0.15,
            whip_easing: Easing::EaseOutCubic,
            rebound_duration: 0.25,
            rebound_easing: Easing::ElasticOut {
                amplitude: 1.0,
                period: 0.4,
            },
            settle_duration: 0.15,
            settle_easing: Easing::EaseOutCubic,
            hover_duration: 0.25,
            hover_easing: Easing::EaseOutCubic,
            default_intensity: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub scale: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            scale: 1.03,
            duration: 0.15,
            easing: Easing::EaseOutCubic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WinConfig {
    pub angle: f32,
    /// Duration of each oscillation step.
    pub step: f32,
    /// Delay between consecutive elements.
    pub stagger: f32,
    pub easing: Easing,
}

impl Default for WinConfig {
    fn default() -> Self {
        Self {
            angle: 4.0,
            step: 0.08,
            stagger: 0.04,
            easing: Easing::EaseOutCubic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    pub in_duration: f32,
    pub out_duration: f32,
    pub easing: Easing,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            in_duration: 0.25,
            out_duration: 0.15,
            easing: Easing::EaseOutCubic,
        }
    }
}

/// Initial state pushed into the sound backend by
/// [`SoundBoard::init`](crate::SoundBoard::init).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub volume: f32,
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.6,
            muted: false,
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(MotionError::InvalidConfig {
                field: "audio.volume",
                reason: "must lie between 0 and 1",
            });
        }
        Ok(())
    }
}
