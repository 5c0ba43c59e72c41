use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::constants::{CHANNELS_MONO, CHUNK_SIZE_SAMPLES, SAMPLE_RATE_HZ};
use crate::error::ConfigError;
use crate::paths::{InstallLayout, ResolvedPaths};

/// Sample encoding used on the capture path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 16-bit signed integer samples
    I16,
}

impl Default for SampleFormat {
    fn default() -> Self {
        Self::I16
    }
}

/// Capture device selection.
///
/// An explicit sum type instead of a nullable string, so "auto-detect
/// requested" can never be confused with "not yet set". An empty or
/// whitespace-only name (the only way an environment variable can express
/// "unset") also means auto-detect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<String>")]
pub enum InputDevice {
    #[default]
    AutoDetect,
    Specified(String),
}

impl From<Option<String>> for InputDevice {
    fn from(name: Option<String>) -> Self {
        match name {
            Some(n) if !n.trim().is_empty() => InputDevice::Specified(n),
            _ => InputDevice::AutoDetect,
        }
    }
}

impl InputDevice {
    pub fn name(&self) -> Option<&str> {
        match self {
            InputDevice::Specified(name) => Some(name),
            InputDevice::AutoDetect => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, InputDevice::AutoDetect)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sample_rate_hz: u32,
    pub chunk_size_samples: usize,
    pub channels: u16,
    pub sample_format: SampleFormat,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: SAMPLE_RATE_HZ,
            chunk_size_samples: CHUNK_SIZE_SAMPLES,
            channels: CHANNELS_MONO,
            sample_format: SampleFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub device: InputDevice,
    /// false selects the USB microphone backend instead of the I2S capture path
    pub use_i2s: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device: InputDevice::AutoDetect,
            use_i2s: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Class-map label names matched against classifier output.
    /// Order is display priority only.
    pub keywords: Vec<String>,
    /// Minimum confidence score to raise an alert.
    pub threshold: f32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            keywords: vec![
                "crying, sobbing".to_string(),
                "screaming".to_string(),
                "shout".to_string(),
                "gunshot".to_string(),
                "explosion".to_string(),
            ],
            threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub enable_led: bool,
    pub enable_sound: bool,
    /// GPIO pin driving the alert LED. Validity is platform-dependent.
    pub led_pin: u8,
    /// Seconds to hold the LED on after a detection.
    pub led_duration_secs: u32,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enable_led: true,
            enable_sound: true,
            led_pin: 18,
            led_duration_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizationSettings {
    pub enable_plot: bool,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self { enable_plot: true }
    }
}

/// Tunable parameters for the detection pipeline.
///
/// Built from three layered sources: built-in defaults, an optional
/// `config/default.toml`, and `SOUNDGUARD_*` environment variables
/// (`__` separates sections, `;` separates list items). Values are set
/// once at process start and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub capture: CaptureSettings,
    pub detection: DetectionSettings,
    pub alert: AlertSettings,
    pub visualization: VisualizationSettings,
}

impl Settings {
    /// Load settings from a specific config file path (tests, deployments)
    pub fn from_path(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(config_path.as_ref()).required(true))
            .add_source(
                Environment::with_prefix("SOUNDGUARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(";")
                    .with_list_parse_key("detection.keywords"),
            );

        let config = builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            tracing::info!("Loading configuration from: {}", config_path.display());
            builder = builder.add_source(File::from(config_path).required(true));
        } else {
            tracing::debug!(
                "No configuration file at 'config/default.toml'. Using defaults and environment variables."
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("SOUNDGUARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(";")
                .with_list_parse_key("detection.keywords"),
        );

        let config = builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the loaded values against the classifier's contract.
    ///
    /// Hard violations are collected into a single error; recoverable ones
    /// are logged and repaired in place.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.audio.sample_rate_hz != SAMPLE_RATE_HZ {
            errors.push(format!(
                "audio.sample_rate_hz must be {} (required by the classifier), got {}",
                SAMPLE_RATE_HZ, self.audio.sample_rate_hz
            ));
        }
        if self.audio.chunk_size_samples != self.audio.sample_rate_hz as usize {
            errors.push(format!(
                "audio.chunk_size_samples must equal the sample rate for 1-second windows, got {}",
                self.audio.chunk_size_samples
            ));
        }
        if self.audio.channels != CHANNELS_MONO {
            errors.push(format!(
                "audio.channels must be {} (mono), got {}",
                CHANNELS_MONO, self.audio.channels
            ));
        }

        if !self.detection.threshold.is_finite() {
            let fallback = DetectionSettings::default().threshold;
            tracing::warn!(
                "Non-finite detection.threshold {}. Defaulting to {}.",
                self.detection.threshold,
                fallback
            );
            self.detection.threshold = fallback;
        } else if !(0.0..=1.0).contains(&self.detection.threshold) {
            tracing::warn!(
                "detection.threshold {} outside [0.0, 1.0]. Clamping.",
                self.detection.threshold
            );
            self.detection.threshold = self.detection.threshold.clamp(0.0, 1.0);
        }

        if self.detection.keywords.is_empty() {
            errors.push("detection.keywords must not be empty".to_string());
        } else {
            let mut seen = std::collections::HashSet::new();
            let before = self.detection.keywords.len();
            self.detection.keywords.retain(|k| seen.insert(k.clone()));
            let removed = before - self.detection.keywords.len();
            if removed > 0 {
                tracing::warn!("Removed {} duplicate detection keyword(s).", removed);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}

/// Fully resolved configuration handed to the pipeline at startup.
///
/// Constructed once, then shared by reference with every consumer; no
/// component mutates it for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub settings: Settings,
    pub paths: ResolvedPaths,
}

impl DetectorConfig {
    /// Load settings from the layered sources and resolve asset paths
    /// from the executable's install root.
    pub fn load() -> Result<Self, ConfigError> {
        let layout = InstallLayout::discover()?;
        Ok(Self {
            settings: Settings::new()?,
            paths: ResolvedPaths::from_layout(&layout),
        })
    }

    /// Load with an explicit config file and install root.
    pub fn from_sources(
        config_file: impl AsRef<Path>,
        layout: &InstallLayout,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            settings: Settings::from_path(config_file)?,
            paths: ResolvedPaths::from_layout(layout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_model_contract() {
        let settings = Settings::default();
        assert_eq!(settings.audio.sample_rate_hz, 16_000);
        assert_eq!(settings.audio.chunk_size_samples, 16_000);
        assert_eq!(settings.audio.channels, 1);
        assert_eq!(settings.audio.sample_format, SampleFormat::I16);
    }

    #[test]
    fn default_keywords_are_ordered_and_unique() {
        let settings = Settings::default();
        assert_eq!(settings.detection.keywords.len(), 5);
        assert_eq!(settings.detection.keywords[0], "crying, sobbing");
        let mut seen = std::collections::HashSet::new();
        assert!(settings
            .detection
            .keywords
            .iter()
            .all(|k| seen.insert(k.clone())));
    }

    #[test]
    fn input_device_from_name() {
        assert_eq!(InputDevice::from(None), InputDevice::AutoDetect);
        assert_eq!(
            InputDevice::from(Some(String::new())),
            InputDevice::AutoDetect
        );
        assert_eq!(
            InputDevice::from(Some("   ".to_string())),
            InputDevice::AutoDetect
        );
        assert_eq!(
            InputDevice::from(Some("seeed-2mic-voicecard".to_string())),
            InputDevice::Specified("seeed-2mic-voicecard".to_string())
        );
    }

    #[test]
    fn input_device_accessors() {
        let auto = InputDevice::AutoDetect;
        assert!(auto.is_auto());
        assert_eq!(auto.name(), None);

        let named = InputDevice::Specified("hw:1,0".to_string());
        assert!(!named.is_auto());
        assert_eq!(named.name(), Some("hw:1,0"));
    }

    #[test]
    fn validate_rejects_wrong_sample_rate() {
        let mut settings = Settings::default();
        settings.audio.sample_rate_hz = 44_100;
        settings.audio.chunk_size_samples = 44_100;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("sample_rate_hz"));
    }

    #[test]
    fn validate_rejects_chunk_size_mismatch() {
        let mut settings = Settings::default();
        settings.audio.chunk_size_samples = 8_000;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("chunk_size_samples"));
    }

    #[test]
    fn validate_rejects_stereo() {
        let mut settings = Settings::default();
        settings.audio.channels = 2;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("channels"));
    }

    #[test]
    fn validate_clamps_out_of_range_threshold() {
        let mut settings = Settings::default();
        settings.detection.threshold = 1.5;
        settings.validate().unwrap();
        assert_eq!(settings.detection.threshold, 1.0);

        settings.detection.threshold = -0.2;
        settings.validate().unwrap();
        assert_eq!(settings.detection.threshold, 0.0);
    }

    #[test]
    fn validate_replaces_non_finite_threshold() {
        let mut settings = Settings::default();
        settings.detection.threshold = f32::NAN;
        settings.validate().unwrap();
        assert_eq!(settings.detection.threshold, 0.3);
    }

    #[test]
    fn validate_rejects_empty_keywords() {
        let mut settings = Settings::default();
        settings.detection.keywords.clear();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("keywords"));
    }

    #[test]
    fn validate_deduplicates_keywords_preserving_order() {
        let mut settings = Settings::default();
        settings.detection.keywords = vec![
            "gunshot".to_string(),
            "screaming".to_string(),
            "gunshot".to_string(),
        ];
        settings.validate().unwrap();
        assert_eq!(settings.detection.keywords, vec!["gunshot", "screaming"]);
    }

    #[test]
    fn toggling_a_feature_flag_leaves_everything_else_unchanged() {
        let base = Settings::default();

        let mut toggled = base.clone();
        toggled.capture.use_i2s = !base.capture.use_i2s;
        assert_eq!(toggled.audio, base.audio);
        assert_eq!(toggled.detection, base.detection);
        assert_eq!(toggled.alert, base.alert);
        assert_eq!(toggled.visualization, base.visualization);
        assert_eq!(toggled.capture.device, base.capture.device);

        let mut toggled = base.clone();
        toggled.alert.enable_led = !base.alert.enable_led;
        assert_eq!(toggled.audio, base.audio);
        assert_eq!(toggled.capture, base.capture);
        assert_eq!(toggled.detection, base.detection);
        assert_eq!(toggled.visualization, base.visualization);
        assert_eq!(toggled.alert.enable_sound, base.alert.enable_sound);
        assert_eq!(toggled.alert.led_pin, base.alert.led_pin);
        assert_eq!(toggled.alert.led_duration_secs, base.alert.led_duration_secs);

        let mut toggled = base.clone();
        toggled.visualization.enable_plot = !base.visualization.enable_plot;
        assert_eq!(toggled.audio, base.audio);
        assert_eq!(toggled.capture, base.capture);
        assert_eq!(toggled.detection, base.detection);
        assert_eq!(toggled.alert, base.alert);
    }
}
