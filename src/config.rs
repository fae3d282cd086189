use std::path::Path;

use serde::Deserialize;

use crate::error::{MapError, Result};

/// Display-scale divisors: the zoom is divided by one of these to get the
/// declutter scale handed to the style sheet. Empirically tuned per screen
/// class and refresh quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScaleDivisors {
    pub hd_fast: u32,
    pub hd: u32,
    pub sd_fast: u32,
    pub sd: u32,
}

impl Default for ScaleDivisors {
    fn default() -> Self {
        Self {
            hd_fast: 7,
            hd: 12,
            sd_fast: 20,
            sd: 20,
        }
    }
}

impl ScaleDivisors {
    #[inline]
    pub fn pick(&self, hd_screen: bool, fast_refresh: bool) -> u32 {
        match (hd_screen, fast_refresh) {
            (true, true) => self.hd_fast,
            (true, false) => self.hd,
            (false, true) => self.sd_fast,
            (false, false) => self.sd,
        }
    }
}

/// Rendering configuration, loaded once at startup
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Zoom used when none is set and by `zoom_reset`
    pub default_zoom: u32,
    /// Lower bound overriding the built-in minimum zoom
    pub min_zoom: Option<u32>,
    /// Slack added around the visible area, in micro-degrees
    pub visibility_margin: i32,
    /// Point capacity of the draw batch buffers
    pub batch_capacity: usize,
    /// Repaint debounce interval
    pub flow_control_ms: u64,
    pub hd_screen: bool,
    pub scale_divisors: ScaleDivisors,
    /// Number of depth bands used to pick pens in the 3D view
    pub projection_areas: usize,
    /// Horizon applied when switching to the 3D view
    pub horizon: i32,
    pub labels: bool,
    pub metric: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_zoom: 20,
            min_zoom: None,
            visibility_margin: 1,
            batch_capacity: 4096,
            flow_control_ms: 50,
            hd_screen: true,
            scale_divisors: ScaleDivisors::default(),
            projection_areas: 3,
            horizon: -100,
            labels: true,
            metric: true,
        }
    }
}

impl RenderConfig {
    /// Load from a JSON file, or return defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::info!("No configuration file given, using defaults");
            return Ok(Self::default());
        };

        let mut bytes = std::fs::read(path).map_err(|e| MapError::io(path, e))?;
        let config: Self =
            simd_json::serde::from_slice(&mut bytes).map_err(|e| MapError::json(path, e))?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_capacity < 16 {
            return Err(MapError::config(format!(
                "batch_capacity must be at least 16, got {}",
                self.batch_capacity
            )));
        }
        let d = &self.scale_divisors;
        if d.hd_fast == 0 || d.hd == 0 || d.sd_fast == 0 || d.sd == 0 {
            return Err(MapError::config("scale divisors must be positive"));
        }
        if !(1..=8).contains(&self.projection_areas) {
            return Err(MapError::config(format!(
                "projection_areas must be in 1..=8, got {}",
                self.projection_areas
            )));
        }
        if self.visibility_margin < 0 {
            return Err(MapError::config("visibility_margin cannot be negative"));
        }
        if self.horizon > 0 {
            return Err(MapError::config("horizon must be zero or negative"));
        }
        Ok(())
    }
}

/// Runtime display toggles
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_squares: bool,
    pub show_areas: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_squares: false,
            show_areas: true,
            show_labels: true,
        }
    }
}
