//! Projection of rain records onto a terminal buffer.

use glyphfall_core::{Palette, Point, Rgb};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chars::PARTICLE_CHARS;
use crate::column::Tier;
use crate::rain::MatrixRain;
use crate::splash::ParticleColor;

/// Intensity below which nothing is drawn.
const VISIBLE_THRESHOLD: f32 = 0.05;

/// Logical pixels covered by one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Projection {
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell_width: cell_width.max(1.0),
            cell_height: cell_height.max(1.0),
        }
    }

    pub fn column(&self, x: f32) -> i32 {
        (x / self.cell_width).floor() as i32
    }

    pub fn row(&self, y: f32) -> i32 {
        (y / self.cell_height).floor() as i32
    }

    /// Pixel width of `columns` cells.
    pub fn width_px(&self, columns: u16) -> f32 {
        columns as f32 * self.cell_width
    }

    /// Pixel height of `rows` cells.
    pub fn height_px(&self, rows: u16) -> f32 {
        rows as f32 * self.cell_height
    }

    fn cell_center(&self, column: i32, row: i32) -> Point {
        Point::new(
            (column as f32 + 0.5) * self.cell_width,
            (row as f32 + 0.5) * self.cell_height,
        )
    }
}

/// Draws one controller's glyphs, particles and flashes.
///
/// `origin` is the screen cell of the container's top-left corner and may
/// lie outside the render area when the section is partly scrolled away.
#[derive(Debug)]
pub struct RainView<'a> {
    rain: &'a MatrixRain,
    palette: &'a Palette,
    projection: Projection,
    origin: (i32, i32),
    gain: f32,
}

impl<'a> RainView<'a> {
    pub fn new(rain: &'a MatrixRain, palette: &'a Palette, projection: Projection) -> Self {
        Self {
            rain,
            palette,
            projection,
            origin: (0, 0),
            gain: 1.0,
        }
    }

    pub fn origin(mut self, column: i32, row: i32) -> Self {
        self.origin = (column, row);
        self
    }

    /// Brightness multiplier for dim terminals.
    pub fn gain(mut self, gain: f32) -> Self {
        self.gain = gain.max(0.0);
        self
    }

    /// Screen position of a container-local pixel, if inside `area`.
    fn screen(&self, area: Rect, x: f32, y: f32) -> Option<(u16, u16)> {
        let column = self.origin.0 + self.projection.column(x);
        let row = self.origin.1 + self.projection.row(y);
        let inside = column >= area.left() as i32
            && column < area.right() as i32
            && row >= area.top() as i32
            && row < area.bottom() as i32;
        inside.then_some((column as u16, row as u16))
    }

    fn put(&self, area: Rect, buf: &mut Buffer, x: f32, y: f32, ch: char, color: Rgb) {
        let Some((column, row)) = self.screen(area, x, y) else {
            return;
        };
        let mut utf8 = [0u8; 4];
        let max_width = (area.right() - column) as usize;
        buf.set_stringn(
            column,
            row,
            ch.encode_utf8(&mut utf8),
            max_width,
            Style::new().fg(color.into()),
        );
    }

    fn render_flashes(&self, area: Rect, buf: &mut Buffer) {
        let section = self.rain.container().section;
        if section.is_empty() {
            return;
        }
        let center = section.local_center();
        let half_diagonal = (center.x * center.x + center.y * center.y).sqrt();
        let radius = half_diagonal * self.rain.tuning().flash_radius;
        let strength = self.rain.tuning().flash_alpha;

        for flash in self.rain.flashes() {
            if flash.opacity <= 0.0 || radius <= 0.0 {
                continue;
            }
            for row in area.top()..area.bottom() {
                for column in area.left()..area.right() {
                    let local = self
                        .projection
                        .cell_center(column as i32 - self.origin.0, row as i32 - self.origin.1);
                    if local.x < 0.0
                        || local.y < 0.0
                        || local.x >= section.width
                        || local.y >= section.height
                    {
                        continue;
                    }
                    let falloff = (1.0 - local.distance(center) / radius).max(0.0);
                    let alpha = flash.opacity * strength * falloff;
                    if alpha <= 0.01 {
                        continue;
                    }
                    if let Some(cell) = buf.cell_mut((column, row)) {
                        let under = match cell.bg {
                            Color::Rgb(r, g, b) => Rgb::new(r, g, b),
                            _ => self.palette.background,
                        };
                        cell.set_bg(under.lerp(self.palette.rain, alpha).into());
                    }
                }
            }
        }
    }

    fn render_glyphs(&self, area: Rect, buf: &mut Buffer) {
        let container_opacity = self.rain.opacity();
        for glyph in self.rain.columns().iter().flat_map(|c| c.glyphs.iter()) {
            let intensity = (glyph.opacity * container_opacity * self.gain).min(1.0);
            if intensity < VISIBLE_THRESHOLD {
                continue;
            }
            let base = match glyph.tier {
                Tier::Normal => self.palette.rain,
                Tier::Highlighted => self.palette.highlight,
            };
            let color = self.palette.background.lerp(base, intensity);
            self.put(area, buf, glyph.x, glyph.y, glyph.ch, color);
        }
    }

    fn render_particles(&self, area: Rect, buf: &mut Buffer) {
        let container_opacity = self.rain.opacity();
        for particle in self.rain.particles() {
            let intensity = (particle.opacity * container_opacity * self.gain).min(1.0);
            if intensity < VISIBLE_THRESHOLD || particle.scale <= 0.0 {
                continue;
            }
            let base = match particle.color {
                ParticleColor::Rain => self.palette.rain,
                ParticleColor::Accent => self.palette.accent,
            };
            let index = (particle.scale.floor() as usize).min(PARTICLE_CHARS.len() - 1);
            let color = self.palette.background.lerp(base, intensity);
            self.put(area, buf, particle.x, particle.y, PARTICLE_CHARS[index], color);
        }
    }
}

impl Widget for RainView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.rain.is_disposed() {
            return;
        }
        self.render_flashes(area, buf);
        self.render_glyphs(area, buf);
        self.render_particles(area, buf);
    }
}
