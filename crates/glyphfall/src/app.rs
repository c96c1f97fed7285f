//! The landing page application: input, frame loop and rendering.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use glyphfall_config::Config;
use glyphfall_engine::{Engine, SharedEngine};
use glyphfall_rain::{Container, MatrixRain, Projection, RainRegistry, RainView};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    DefaultTerminal, Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Widget},
};
use tracing::{debug, info, warn};

use crate::page::{Page, SECTIONS};

/// Glyph drawn for each filled cell of the progress bar.
const PROGRESS_CHAR: char = '▀';

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    engine: Rc<RefCell<Engine>>,
    registry: RainRegistry,
    page: Page,
    /// Whether rain layers are drawn.
    show_rain: bool,
}

impl App {
    /// Build the page for a `width` × `height` terminal and attach one rain
    /// controller per section.
    pub fn new(config: Config, seed: u64, width: u16, height: u16) -> Self {
        let projection = Projection::new(config.display.cell_width, config.display.cell_height);
        let page = Page::new(projection, width, height);
        let engine = Rc::new(RefCell::new(Engine::new()));
        // Known scroll state lets each scrub trigger report its starting progress.
        engine.borrow_mut().scroll_to(page.scroll_state());

        let mut app = Self {
            running: false,
            show_rain: config.display.show_rain,
            config,
            engine,
            registry: RainRegistry::new(),
            page,
        };
        app.attach_rain(seed);
        app
    }

    fn attach_rain(&mut self, seed: u64) {
        for index in 0..SECTIONS.len() {
            let container = Container::new(self.page.section_rect(index), self.page.viewport_px());
            let engine: SharedEngine = self.engine.clone();
            let tuning = self.config.rain.clone();
            let rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
            if let Err(err) = self.registry.attach(index, || {
                MatrixRain::new(container, Some(engine), tuning, rng)
            }) {
                warn!(index, %err, "rain not attached");
            }
        }
        debug!(controllers = self.registry.len(), seed, "rain attached");
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let interval = Duration::from_millis(self.config.display.frame_interval_ms.max(1));
        let mut last_frame = Instant::now();
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(interval.saturating_sub(last_frame.elapsed()))?;

            let now = Instant::now();
            self.step(now.duration_since(last_frame).as_secs_f32());
            last_frame = now;
        }
        self.registry.dispose_all();
        info!("glyphfall exiting");
        Ok(())
    }

    /// Advance animations by `dt` seconds and react to the current scroll.
    pub fn step(&mut self, dt: f32) {
        {
            let mut engine = self.engine.borrow_mut();
            engine.tick(dt);
            engine.scroll_to(self.page.scroll_state());
        }
        self.registry.update_all();
    }

    /// Renders the user interface.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = &self.config.palette;
        frame.render_widget(
            Block::new().style(Style::new().bg(palette.background.into())),
            area,
        );
        if self.show_rain {
            self.render_rain(frame.buffer_mut(), area);
        }
        self.render_headings(frame, area);
        self.render_progress(frame.buffer_mut(), area);
    }

    /// Screen rows covered by a section, clipped to `area`.
    fn section_area(&self, index: usize, area: Rect) -> Option<Rect> {
        let top = self.page.section_top(index);
        let bottom = top + i64::from(self.page.section_rows());
        let clip_top = top.max(i64::from(area.top()));
        let clip_bottom = bottom.min(i64::from(area.bottom()));
        (clip_top < clip_bottom).then(|| {
            Rect::new(
                area.x,
                clip_top as u16,
                area.width,
                (clip_bottom - clip_top) as u16,
            )
        })
    }

    fn render_rain(&self, buf: &mut Buffer, area: Rect) {
        let projection = self.page.projection();
        for (index, rain) in self.registry.iter() {
            let Some(clip) = self.section_area(index, area) else {
                continue;
            };
            let top = self.page.section_top(index) as i32;
            RainView::new(rain, &self.config.palette, projection)
                .origin(i32::from(area.x), top)
                .gain(self.config.display.intensity_gain)
                .render(clip, buf);
        }
    }

    fn render_headings(&self, frame: &mut Frame, area: Rect) {
        let palette = &self.config.palette;
        let middle = i64::from(self.page.section_rows()) / 2;
        for (index, section) in SECTIONS.iter().enumerate() {
            let title_row = self.page.section_top(index) + middle - 1;
            let lines = [
                (title_row, Line::from(section.title.bold().fg(palette.text))),
                (
                    title_row + 2,
                    Line::from(section.tagline.fg(palette.text.lerp(palette.background, 0.3))),
                ),
            ];
            for (row, line) in lines {
                if row < i64::from(area.top()) || row >= i64::from(area.bottom()) {
                    continue;
                }
                frame.render_widget(
                    line.centered(),
                    Rect::new(area.x, row as u16, area.width, 1),
                );
            }
        }
    }

    /// Fixed bar on the top row, teal fading to amber.
    fn render_progress(&self, buf: &mut Buffer, area: Rect) {
        if area.is_empty() {
            return;
        }
        let palette = &self.config.palette;
        let filled = (self.page.progress() * f32::from(area.width)).round() as u16;
        let span = f32::from(area.width.saturating_sub(1).max(1));
        for x in 0..filled.min(area.width) {
            let color = palette.rain.lerp(palette.accent, f32::from(x) / span);
            if let Some(cell) = buf.cell_mut((area.x + x, area.y)) {
                cell.set_char(PROGRESS_CHAR).set_fg(color.into());
            }
        }
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits at most `timeout` so frames keep their pace.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(width, height) => self.on_resize(width, height),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn on_key_event(&mut self, key: KeyEvent) {
        let step = i64::from(self.config.display.scroll_step_rows);
        let page = i64::from(self.page.height().saturating_sub(1).max(1));
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Down | KeyCode::Char('j')) => self.page.scroll_by(step),
            (_, KeyCode::Up | KeyCode::Char('k')) => self.page.scroll_by(-step),
            (_, KeyCode::PageDown | KeyCode::Char(' ')) => self.page.scroll_by(page),
            (_, KeyCode::PageUp) => self.page.scroll_by(-page),
            (_, KeyCode::Home | KeyCode::Char('g')) => self.page.scroll_home(),
            (_, KeyCode::End | KeyCode::Char('G')) => self.page.scroll_end(),
            (_, KeyCode::Char('r')) => self.toggle_rain(),
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        let step = i64::from(self.config.display.scroll_step_rows);
        match mouse.kind {
            MouseEventKind::ScrollDown => self.page.scroll_by(step),
            MouseEventKind::ScrollUp => self.page.scroll_by(-step),
            _ => {}
        }
    }

    /// Move sections to the new size; rain keeps its column counts.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.page.resize(width, height);
        let viewport = self.page.viewport_px();
        for (index, rain) in self.registry.iter_mut() {
            rain.relayout(self.page.section_rect(index), viewport);
        }
        debug!(width, height, "resized");
    }

    fn toggle_rain(&mut self) {
        self.show_rain = !self.show_rain;
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
