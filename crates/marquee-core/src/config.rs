use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub breakpoints: BreakpointConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (session state lives here for the headless driver)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Loader overlay timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Period of the synthetic progress timer
    #[serde(default = "default_simulate_interval")]
    pub simulate_interval_ms: u64,
    /// Upper bound of the random increment per simulated tick
    #[serde(default = "default_simulate_max_step")]
    pub simulate_max_step: f64,
    /// Simulated progress stops advancing once it reaches this value
    #[serde(default = "default_soft_ceiling")]
    pub soft_ceiling: f64,
    /// Period of the completion timer
    #[serde(default = "default_complete_interval")]
    pub complete_interval_ms: u64,
    /// Fixed increment per completion tick
    #[serde(default = "default_complete_step")]
    pub complete_step: f64,
    /// Time the collapse animation gets before the overlay is removed
    #[serde(default = "default_collapse_grace")]
    pub collapse_grace_ms: u64,
    /// Hard ceiling on waiting for window-load and content readiness
    #[serde(default = "default_fallback_timeout")]
    pub fallback_timeout_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            simulate_interval_ms: default_simulate_interval(),
            simulate_max_step: default_simulate_max_step(),
            soft_ceiling: default_soft_ceiling(),
            complete_interval_ms: default_complete_interval(),
            complete_step: default_complete_step(),
            collapse_grace_ms: default_collapse_grace(),
            fallback_timeout_ms: default_fallback_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which the loader replays on the next visit
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

/// Viewport class thresholds (inclusive upper bounds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointConfig {
    #[serde(default = "default_mobile_max")]
    pub mobile_max: u32,
    #[serde(default = "default_tablet_max")]
    pub tablet_max: u32,
    /// Query parameter carrying the reload timestamp
    #[serde(default = "default_cache_bust_param")]
    pub cache_bust_param: String,
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self {
            mobile_max: default_mobile_max(),
            tablet_max: default_tablet_max(),
            cache_bust_param: default_cache_bust_param(),
        }
    }
}

/// What a transition-enabled click does before the page is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotReadyPolicy {
    /// Let the browser follow the link without the wipe
    #[default]
    AllowDefault,
    /// Swallow the click entirely
    Suppress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Wipe duration before navigation happens
    #[serde(default = "default_transition_duration")]
    pub duration_ms: u64,
    /// Attribute marking transition-enabled links
    #[serde(default = "default_marker_attribute")]
    pub marker_attribute: String,
    /// Final opacity of the dark scrim
    #[serde(default = "default_scrim_opacity")]
    pub scrim_opacity: f64,
    #[serde(default)]
    pub not_ready_policy: NotReadyPolicy,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_transition_duration(),
            marker_attribute: default_marker_attribute(),
            scrim_opacity: default_scrim_opacity(),
            not_ready_policy: NotReadyPolicy::default(),
        }
    }
}

/// Easing curves used by carousel animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump to the end value
    None,
    Linear,
    Cubic,
    /// 1 - (1-t)^5, the "power4.out" curve
    #[default]
    Quintic,
    /// Exponential ease-out
    EaseOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Pause between content-ready and the intro run
    #[serde(default = "default_intro_delay")]
    pub intro_delay_ms: u64,
    /// Duration of the intro translation
    #[serde(default = "default_intro_duration")]
    pub intro_duration_ms: u64,
    /// Duration of the item scale reveal (starts with the translation)
    #[serde(default = "default_reveal_duration")]
    pub reveal_duration_ms: u64,
    /// Intro travel distance as a multiple of the loop width
    #[serde(default = "default_intro_distance_factor")]
    pub intro_distance_factor: f64,
    #[serde(default)]
    pub intro_easing: EasingType,
    /// Wheel delta to velocity factor
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f64,
    /// Touch drag delta to velocity factor (applied inverted)
    #[serde(default = "default_touch_multiplier")]
    pub touch_multiplier: f64,
    /// Per-frame velocity retention
    #[serde(default = "default_decay")]
    pub decay: f64,
    /// Velocity below which the track stops moving
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Reference frame rate for the frame driver
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Scale each physics step by elapsed frames instead of assuming one frame per tick
    #[serde(default = "default_true")]
    pub normalize_frame_rate: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            intro_delay_ms: default_intro_delay(),
            intro_duration_ms: default_intro_duration(),
            reveal_duration_ms: default_reveal_duration(),
            intro_distance_factor: default_intro_distance_factor(),
            intro_easing: EasingType::default(),
            wheel_multiplier: default_wheel_multiplier(),
            touch_multiplier: default_touch_multiplier(),
            decay: default_decay(),
            epsilon: default_epsilon(),
            animation_fps: default_animation_fps(),
            normalize_frame_rate: default_true(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marquee")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_simulate_interval() -> u64 {
    100
}

fn default_simulate_max_step() -> f64 {
    5.0
}

fn default_soft_ceiling() -> f64 {
    90.0
}

fn default_complete_interval() -> u64 {
    20
}

fn default_complete_step() -> f64 {
    2.0
}

fn default_collapse_grace() -> u64 {
    1000
}

fn default_fallback_timeout() -> u64 {
    10_000
}

fn default_idle_timeout() -> u64 {
    300 // 5 minutes
}

fn default_mobile_max() -> u32 {
    767
}

fn default_tablet_max() -> u32 {
    1023
}

fn default_cache_bust_param() -> String {
    "_br".to_string()
}

fn default_transition_duration() -> u64 {
    1000
}

fn default_marker_attribute() -> String {
    "data-transition".to_string()
}

fn default_scrim_opacity() -> f64 {
    0.5
}

fn default_intro_delay() -> u64 {
    2000
}

fn default_intro_duration() -> u64 {
    2000
}

fn default_reveal_duration() -> u64 {
    1000
}

fn default_intro_distance_factor() -> f64 {
    1.5
}

fn default_wheel_multiplier() -> f64 {
    0.05
}

fn default_touch_multiplier() -> f64 {
    0.12
}

fn default_decay() -> f64 {
    0.94
}

fn default_epsilon() -> f64 {
    0.001
}

fn default_animation_fps() -> u32 {
    60
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;

        Ok(())
    }

    /// Always uses ~/.config/marquee/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("marquee")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Session state file used by the headless driver
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join("session.json")
    }

    /// Reject values that would stall timers or break the loop physics
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: &str| Err(crate::Error::Config(msg.to_string()));

        if self.loader.simulate_interval_ms == 0 || self.loader.complete_interval_ms == 0 {
            return invalid("loader intervals must be non-zero");
        }
        // NaN fails every comparison, so test for the valid range
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.loader.complete_step) {
            return invalid("loader.complete_step must be positive");
        }
        if !(self.loader.simulate_max_step.is_finite() && self.loader.simulate_max_step >= 0.0) {
            return invalid("loader.simulate_max_step must be non-negative");
        }
        if !(0.0..=100.0).contains(&self.loader.soft_ceiling) {
            return invalid("loader.soft_ceiling must lie in [0, 100]");
        }
        if self.breakpoints.mobile_max >= self.breakpoints.tablet_max {
            return invalid("breakpoints.mobile_max must be below tablet_max");
        }
        if !(0.0..1.0).contains(&self.carousel.decay) {
            return invalid("carousel.decay must lie in [0, 1)");
        }
        if !positive(self.carousel.epsilon) {
            return invalid("carousel.epsilon must be positive");
        }
        if !(0.0..=1.0).contains(&self.transition.scrim_opacity) {
            return invalid("transition.scrim_opacity must lie in [0, 1]");
        }
        let factors = [
            self.carousel.intro_distance_factor,
            self.carousel.wheel_multiplier,
            self.carousel.touch_multiplier,
        ];
        if factors.iter().any(|f| !f.is_finite()) {
            return invalid("carousel multipliers must be finite");
        }
        Ok(())
    }
}
