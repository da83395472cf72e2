//! Gallery scenes for the `sera-demo` binary
//!
//! Each scene runs a per-frame step against one buffer, driven by a seeded
//! [`RandState`] so a given seed always produces the same image. The result
//! can be written out as PNG with [`save_png`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::config::Options;
use crate::graphics::{BlendMode, Buffer, Pixel, RandState, Rect, Transform};

/// Offsets of the 3x3 stroke drawn around each random pixel.
const STROKE: [(i32, i32); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];

const SPRITE_SIZE: i32 = 96;
const NOISE_SIZE: i32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scene {
    FloodFill,
    Noise,
    Pixels,
    Lines,
    Rects,
    Boxes,
    #[default]
    Circles,
    Rings,
    Blit,
    BlitScaled,
    BlitRotated,
    BlendModes,
}

impl Scene {
    pub const ALL: [Scene; 12] = [
        Scene::FloodFill,
        Scene::Noise,
        Scene::Pixels,
        Scene::Lines,
        Scene::Rects,
        Scene::Boxes,
        Scene::Circles,
        Scene::Rings,
        Scene::Blit,
        Scene::BlitScaled,
        Scene::BlitRotated,
        Scene::BlendModes,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Scene::FloodFill => "flood-fill",
            Scene::Noise => "noise",
            Scene::Pixels => "pixels",
            Scene::Lines => "lines",
            Scene::Rects => "rects",
            Scene::Boxes => "boxes",
            Scene::Circles => "circles",
            Scene::Rings => "rings",
            Scene::Blit => "blit",
            Scene::BlitScaled => "blit-scaled",
            Scene::BlitRotated => "blit-rotated",
            Scene::BlendModes => "blend-modes",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown scene: {0}")]
pub struct ParseSceneError(pub String);

impl FromStr for Scene {
    type Err = ParseSceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase().replace('_', "-");
        Scene::ALL
            .into_iter()
            .find(|scene| scene.name() == lower)
            .ok_or_else(|| ParseSceneError(s.to_string()))
    }
}

/// State carried between frames of a scene.
pub struct Demo {
    scene: Scene,
    rng: RandState,
    sprite: Buffer,
    frame: u32,
}

impl Demo {
    pub fn new(scene: Scene, seed: u32) -> Result<Self> {
        Ok(Self {
            scene,
            rng: RandState::new(seed),
            sprite: build_sprite()?,
            frame: 0,
        })
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    fn random_color(&mut self) -> Pixel {
        Pixel::from(self.rng.next_u32().to_le_bytes())
    }

    fn random_point(&mut self, buffer: &Buffer) -> (i32, i32) {
        (self.rng.range(0, buffer.width()), self.rng.range(0, buffer.height()))
    }

    /// Run one frame of the scene.
    pub fn step(&mut self, buffer: &mut Buffer) -> Result<()> {
        match self.scene {
            Scene::FloodFill => {
                // Partition the buffer with a few lines, then repaint the
                // region around the origin.
                let (x0, y0) = self.random_point(buffer);
                let (x1, y1) = self.random_point(buffer);
                buffer.draw_line(Pixel::BLACK, x0, y0, x1, y1);
                let color = self.random_color().with_alpha(255);
                buffer.flood_fill(color, 0, 0);
            }
            Scene::Noise => {
                let mut noise = Buffer::new(NOISE_SIZE, NOISE_SIZE)?;
                let seed = self.rng.next_u32();
                let high = self.rng.range(127, 256);
                noise.noise(seed, 0, high, false);
                let sx = buffer.width() as f32 / NOISE_SIZE as f32;
                let sy = buffer.height() as f32 / NOISE_SIZE as f32;
                buffer.copy_pixels(&noise, 0, 0, None, sx, sy);
            }
            Scene::Pixels => {
                let (x, y) = self.random_point(buffer);
                let color = self.random_color();
                buffer.draw_pixel(color, x, y);
                for (dx, dy) in STROKE {
                    let color = self.random_color();
                    buffer.draw_pixel(color, x + dx, y + dy);
                }
            }
            Scene::Lines => {
                let (x0, y0) = self.random_point(buffer);
                let (x1, y1) = self.random_point(buffer);
                let color = self.random_color();
                buffer.draw_line(color, x0, y0, x1, y1);
            }
            Scene::Rects | Scene::Boxes => {
                let (x, y) = self.random_point(buffer);
                let (w, h) = (self.rng.range(0, 255), self.rng.range(0, 255));
                let color = self.random_color();
                if self.scene == Scene::Rects {
                    buffer.draw_rect(color, x, y, w, h);
                } else {
                    buffer.draw_box(color, x, y, w, h);
                }
            }
            Scene::Circles | Scene::Rings => {
                let (x, y) = self.random_point(buffer);
                let r = self.rng.range(0, 255);
                let color = self.random_color();
                if self.scene == Scene::Circles {
                    buffer.draw_circle(color, x, y, r);
                } else {
                    buffer.draw_ring(color, x, y, r);
                }
            }
            Scene::Blit => {
                let (x, y) = self.random_point(buffer);
                buffer.draw_buffer(&self.sprite, x - SPRITE_SIZE / 2, y - SPRITE_SIZE / 2, None, None);
            }
            Scene::BlitScaled => {
                let (x, y) = self.random_point(buffer);
                let scale = 0.5 + self.rng.range(0, 16) as f32 / 8.0;
                buffer.copy_pixels(&self.sprite, x, y, None, scale, scale);
            }
            Scene::BlitRotated => {
                buffer.clear(Pixel::WHITE);
                let ticks = (self.frame + 1) as f32 * 0.2;
                let rotation = ((self.frame + 1) as f32 * 1.6).to_radians();
                let scale = ticks.sin().abs() + 0.4;
                let pivot = SPRITE_SIZE as f32 / 2.0;
                let t = Transform::new(pivot, pivot, rotation, scale, scale);
                buffer.draw_buffer(&self.sprite, buffer.width() / 2, buffer.height() / 2, None, Some(t));
            }
            Scene::BlendModes => self.draw_blend_modes(buffer),
        }
        self.frame += 1;
        Ok(())
    }

    /// One cell per blend mode, each showing three overlapping discs over a
    /// horizontal gradient.
    fn draw_blend_modes(&mut self, buffer: &mut Buffer) {
        let cell_w = buffer.width() / 3;
        let cell_h = buffer.height() / 3;
        let radius = cell_w.min(cell_h) / 4;
        let alpha = self.rng.range(128, 256);

        for x in 0..buffer.width() {
            let v = (x * 255 / buffer.width().max(1)) as u8;
            buffer.draw_line(Pixel::rgb(v, v / 2, 255 - v), x, 0, x, buffer.height() - 1);
        }

        for (i, blend) in BlendMode::ALL.into_iter().enumerate() {
            let (col, row) = (i as i32 % 3, i as i32 / 3);
            let (cx, cy) = (col * cell_w + cell_w / 2, row * cell_h + cell_h / 2);
            buffer.set_clip(Rect::new(col * cell_w, row * cell_h, cell_w, cell_h));
            buffer.set_blend(blend);
            buffer.set_alpha(alpha);
            buffer.set_color(Pixel::rgb(255, 255, 0));
            buffer.draw_circle(Pixel::rgb(255, 0, 0), cx - radius / 2, cy - radius / 2, radius);
            buffer.draw_circle(Pixel::rgb(0, 255, 0), cx + radius / 2, cy - radius / 2, radius);
            buffer.draw_circle(Pixel::rgb(0, 0, 255), cx, cy + radius / 2, radius);
            buffer.reset();
        }
    }
}

/// Checkerboard tile with a disc, a ring and an alpha-mask overlay.
fn build_sprite() -> Result<Buffer> {
    let mut sprite = Buffer::new(SPRITE_SIZE, SPRITE_SIZE).context("Failed to create sprite")?;
    sprite.clear(Pixel::rgb(40, 40, 60));
    let cell = SPRITE_SIZE / 8;
    for y in 0..8 {
        for x in 0..8 {
            if (x + y) % 2 == 0 {
                sprite.draw_rect(Pixel::rgb(220, 200, 120), x * cell, y * cell, cell, cell);
            }
        }
    }
    let centre = SPRITE_SIZE / 2;
    sprite.draw_circle(Pixel::new(200, 30, 30, 200), centre, centre, SPRITE_SIZE / 3);
    sprite.draw_ring(Pixel::BLACK, centre, centre, SPRITE_SIZE / 3);
    sprite.draw_box(Pixel::BLACK, 0, 0, SPRITE_SIZE, SPRITE_SIZE);

    // Diagonal stripes as an 8-bit coverage mask, composited on top.
    let mask: Vec<u8> = (0..SPRITE_SIZE * SPRITE_SIZE)
        .map(|i| if ((i % SPRITE_SIZE) + (i / SPRITE_SIZE)) % 16 < 4 { 160 } else { 0 })
        .collect();
    let mut overlay = Buffer::new(SPRITE_SIZE, SPRITE_SIZE).context("Failed to create overlay")?;
    overlay.load_pixels8(&mask, None).context("Failed to load sprite mask")?;
    sprite.copy_pixels(&overlay, 0, 0, None, 1.0, 1.0);
    Ok(sprite)
}

/// Render `opts.frames` frames of the configured scene.
pub fn render(opts: &Options) -> Result<Buffer> {
    let config = opts.render_config()?;
    let mut buffer = Buffer::from_config(&config)
        .with_context(|| format!("Failed to create {}x{} buffer", config.width, config.height))?;
    let mut demo = Demo::new(opts.scene, opts.seed)?;
    log::info!("Rendering {} frames of '{}' with seed {}", opts.frames, opts.scene, opts.seed);
    for _ in 0..opts.frames.max(1) {
        demo.step(&mut buffer)?;
    }
    Ok(buffer)
}

/// Write the buffer as an RGBA PNG.
pub fn save_png(buffer: &Buffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let image = image::RgbaImage::from_raw(buffer.width() as u32, buffer.height() as u32, buffer.to_rgba_bytes())
        .context("Pixel data does not match buffer size")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;

    fn options(scene: Scene, frames: u32) -> Options {
        Options {
            resolution: Resolution {
                width: 96,
                height: 64,
            },
            scene,
            frames,
            seed: 11,
            ..Options::default()
        }
    }

    #[test]
    fn test_scene_names_round_trip() {
        for scene in Scene::ALL {
            assert_eq!(scene.name().parse::<Scene>().unwrap(), scene);
        }
        assert_eq!("BLIT_SCALED".parse::<Scene>().unwrap(), Scene::BlitScaled);
        assert!("sprites".parse::<Scene>().is_err());
    }

    #[test]
    fn test_every_scene_renders_deterministically() {
        for scene in Scene::ALL {
            let a = render(&options(scene, 4)).unwrap();
            let b = render(&options(scene, 4)).unwrap();
            assert_eq!(a, b, "{scene}");
            assert_eq!((a.width(), a.height()), (96, 64));
        }
    }

    #[test]
    fn test_scenes_draw_something() {
        for scene in Scene::ALL {
            let buffer = render(&options(scene, 8)).unwrap();
            let white = buffer.format().pack(Pixel::WHITE);
            assert!(buffer.pixels().iter().any(|&w| w != white), "{scene} left the buffer blank");
        }
    }

    #[test]
    fn test_blend_modes_restores_state() {
        let mut buffer = Buffer::new(30, 30).unwrap();
        let mut demo = Demo::new(Scene::BlendModes, 1).unwrap();
        demo.step(&mut buffer).unwrap();
        assert_eq!(demo.frame(), 1);
        assert_eq!(buffer.clip(), buffer.bounds());
        assert_eq!(buffer.mode(), crate::graphics::DrawMode::default());
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.png");
        let mut buffer = Buffer::new(4, 3).unwrap();
        buffer.draw_pixel(Pixel::rgb(255, 0, 0), 1, 2);
        save_png(&buffer, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        assert!(save_png(&buffer, dir.path().join("missing").join("x.png")).is_err());
    }
}
