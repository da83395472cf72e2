use crate::config::{parse_log_level, parse_pixel_format, parse_resolution, parse_scene, Options};
use anyhow::{Context, Result};
use clap::Parser;

/// sera - render a gallery scene into a PNG file
#[derive(Parser, Debug, Default)]
#[command(name = "sera-demo")]
#[command(version)]
#[command(about = "Software rasterizer demo: renders a scene to PNG", long_about = None)]
pub struct Cli {
    /// Image size (e.g., 512x512)
    #[arg(short, long, value_name = "WIDTHxHEIGHT")]
    pub res: Option<String>,

    /// Channel order of the render buffer (bgra, rgba, argb, abgr)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Scene to render (flood-fill, noise, pixels, lines, rects, boxes,
    /// circles, rings, blit, blit-scaled, blit-rotated, blend-modes)
    #[arg(short, long, value_name = "SCENE")]
    pub scene: Option<String>,

    /// Random seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u32>,

    /// Number of frames to run before saving
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub frames: Option<u32>,

    /// Output PNG path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Configuration file with key = value lines
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Log level (nothing, user, error, warning, info, debug, all)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Render every scene into the output directory instead of one file
    #[arg(long)]
    pub all: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref res) = self.res {
            opts.resolution = parse_resolution(res).context("Invalid resolution format")?;
        }

        if let Some(ref format) = self.format {
            opts.format = parse_pixel_format(format).context("Invalid pixel format")?;
        }

        if let Some(ref scene) = self.scene {
            opts.scene = parse_scene(scene).context("Invalid scene")?;
        }

        if let Some(seed) = self.seed {
            opts.seed = seed;
        }

        if let Some(frames) = self.frames {
            if frames == 0 {
                anyhow::bail!("Frame count must be positive");
            }
            opts.frames = frames;
        }

        if let Some(ref output) = self.output {
            opts.output = output.clone();
        }

        if let Some(ref level) = self.log_level {
            opts.log_level = parse_log_level(level).context("Invalid log level")?;
        }

        Ok(opts)
    }
}
