//! Install-relative path resolution.
//!
//! Every asset location is derived from the install root, never from the
//! current working directory, so the pipeline resolves the same paths
//! regardless of where it was launched from.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Directory under the install root holding the classifier and its assets.
pub const APP_DIR_NAME: &str = "yamnet_audio_classification";

/// Model directory name within the app directory.
pub const MODEL_DIR_NAME: &str = "yamnet_model";

/// Class map CSV shipped inside the model's assets directory.
pub const CLASS_MAP_FILE: &str = "yamnet_class_map.csv";

/// Alarm sample, stored alongside (not inside) the app directory.
pub const ALARM_FILE: &str = "alarm.WAV";

/// Default detection log file name.
pub const LOG_FILE_NAME: &str = "audio_detection_log.txt";

/// Install root plus the joins for everything the pipeline opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    /// Layout rooted at an explicit directory (tests, packaging scenarios).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Derive the install root from the running executable's location.
    ///
    /// The binary lives directly under the install root, so the root is
    /// its parent directory.
    pub fn discover() -> Result<Self, ConfigError> {
        let exe = std::env::current_exe()
            .map_err(|e| ConfigError::InstallRoot(format!("cannot locate executable: {}", e)))?;
        let root = exe
            .parent()
            .ok_or_else(|| {
                ConfigError::InstallRoot("executable has no parent directory".to_string())
            })?
            .to_path_buf();
        tracing::debug!("Install root: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/yamnet_audio_classification`
    pub fn app_dir(&self) -> PathBuf {
        self.root.join(APP_DIR_NAME)
    }

    /// `<root>/yamnet_audio_classification/yamnet_model`
    pub fn model_dir(&self) -> PathBuf {
        self.app_dir().join(MODEL_DIR_NAME)
    }

    /// `<root>/yamnet_audio_classification/yamnet_model/assets/yamnet_class_map.csv`
    pub fn class_map(&self) -> PathBuf {
        self.model_dir().join("assets").join(CLASS_MAP_FILE)
    }

    /// `<root>/assets/alarm.WAV`; the alarm ships one level above the
    /// app directory.
    pub fn alarm_sound(&self) -> PathBuf {
        self.root.join("assets").join(ALARM_FILE)
    }

    /// `<root>/audio_detection_log.txt`
    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }

    /// Fail fast if any referenced asset is missing.
    ///
    /// Loading never touches the filesystem; callers that want a
    /// descriptive startup error instead of a distant open() failure run
    /// this before wiring up the pipeline.
    pub fn verify_assets(&self) -> Result<(), ConfigError> {
        for path in [self.model_dir(), self.class_map(), self.alarm_sound()] {
            if !path.exists() {
                return Err(ConfigError::MissingAsset { path });
            }
        }
        Ok(())
    }
}

/// Asset paths as consumed by the pipeline, resolved once at load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub log_file: PathBuf,
    pub alarm_sound: PathBuf,
    pub model_dir: PathBuf,
    pub class_map: PathBuf,
}

impl ResolvedPaths {
    pub fn from_layout(layout: &InstallLayout) -> Self {
        Self {
            log_file: layout.log_file(),
            alarm_sound: layout.alarm_sound(),
            model_dir: layout.model_dir(),
            class_map: layout.class_map(),
        }
    }
}
