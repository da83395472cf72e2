use anyhow::{Context, Result};

use crate::demo::Scene;
use crate::graphics::pixel::{Pixel, PixelFormat};
use crate::logging::LogLevel;

/// Geometry, channel order and initial fill of a new buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub width: i32,
    pub height: i32,
    pub format: PixelFormat,
    pub clear_color: Pixel,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            format: PixelFormat::default(),
            clear_color: Pixel::BLACK,
        }
    }
}

/// Demo options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub resolution: Resolution,
    pub format: PixelFormat,
    pub scene: Scene,
    pub seed: u32,
    /// Number of times the scene's step runs before the image is saved.
    pub frames: u32,
    pub output: String,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 512,
                height: 512,
            },
            format: PixelFormat::default(),
            scene: Scene::default(),
            seed: 0,
            frames: 64,
            output: "sera.png".to_string(),
            log_level: LogLevel::default(),
        }
    }
}

impl Options {
    /// Buffer settings for the selected resolution and format.
    pub fn render_config(&self) -> Result<RenderConfig> {
        let width = i32::try_from(self.resolution.width).context("Width too large")?;
        let height = i32::try_from(self.resolution.height).context("Height too large")?;
        Ok(RenderConfig {
            width,
            height,
            format: self.format,
            clear_color: Pixel::WHITE,
        })
    }
}

/// Apply `key = value` lines from a config file on top of `opts`.
///
/// Blank lines and lines starting with `#` are skipped. Unknown keys are
/// reported and ignored.
pub fn parse_config(text: &str, mut opts: Options) -> Result<Options> {
    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .with_context(|| format!("Line {}: expected key = value", number + 1))?;
        let (key, value) = (key.trim(), value.trim());
        let context = || format!("Line {}: invalid value for {}", number + 1, key);

        match key.to_lowercase().as_str() {
            "resolution" => opts.resolution = parse_resolution(value).with_context(context)?,
            "format" => opts.format = parse_pixel_format(value).with_context(context)?,
            "scene" => opts.scene = parse_scene(value).with_context(context)?,
            "seed" => opts.seed = value.parse().with_context(context)?,
            "frames" => opts.frames = value.parse().with_context(context)?,
            "output" => opts.output = value.to_string(),
            "log_level" | "loglevel" => opts.log_level = parse_log_level(value).with_context(context)?,
            _ => log::warn!("Ignoring unknown config key '{}' on line {}", key, number + 1),
        }
    }
    Ok(opts)
}

/// Load configuration from a file, or defaults when no path is given
pub fn load_config(path: Option<&str>) -> Result<Options> {
    let Some(path) = path else {
        return Ok(Options::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path))?;
    log::debug!("Loaded config from {}", path);
    parse_config(&text, Options::default())
}

/// Parse a resolution string in the format "WIDTHxHEIGHT"
pub fn parse_resolution(s: &str) -> Result<Resolution> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        anyhow::bail!("Resolution must be in WIDTHxHEIGHT format");
    }

    let width: u32 = parts[0].trim().parse().context("Invalid width value")?;
    let height: u32 = parts[1].trim().parse().context("Invalid height value")?;

    if width == 0 || height == 0 {
        anyhow::bail!("Resolution values must be positive");
    }
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        anyhow::bail!("Resolution values too large");
    }

    Ok(Resolution { width, height })
}

pub fn parse_pixel_format(s: &str) -> Result<PixelFormat> {
    s.parse::<PixelFormat>()
        .with_context(|| format!("Valid formats: {}", PixelFormat::ALL.map(|f| f.name()).join(", ")))
}

pub fn parse_scene(s: &str) -> Result<Scene> {
    s.parse::<Scene>()
        .with_context(|| format!("Valid scenes: {}", Scene::ALL.map(|scene| scene.name()).join(", ")))
}

pub fn parse_log_level(s: &str) -> Result<LogLevel> {
    s.parse::<LogLevel>()
        .context("Valid levels: nothing, user, error, warning, info, debug, all")
}
