use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use flurry_config::{AppConfig, DisplayConfig};
use flurry_core::ConfigOverrides;
use flurry_effect::{PolledScheduler, SnowfallEffect, SystemClock};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Stylize},
    text::{Line, Span},
};
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::surface::TerminalSurface;

mod cli;
mod logging;
mod surface;

/// Particles added or removed per key press.
const COUNT_STEP: usize = 10;

type Effect = SnowfallEffect<TerminalSurface, PolledScheduler, SystemClock>;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    if let Some(path) = logging::init()? {
        info!(path = %path.display(), "logging enabled");
    }

    let config_path = cli.config.clone().or_else(AppConfig::default_path);
    let mut settings = match &config_path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::default(),
    };
    settings.effect = settings.effect.overlay(cli.overrides());
    settings.validate()?;

    if cli.print_config {
        let resolved = AppConfig {
            effect: ConfigOverrides::from_config(&settings.effect_config()),
            display: settings.display.clone(),
        };
        print!("{}", toml::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let (columns, rows) = crossterm::terminal::size()?;
    let app = App::new(settings, config_path, cli.seed, columns, rows)?;
    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}

/// The terminal host: owns the effect and feeds it frames and key presses.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    effect: Effect,
    display: DisplayConfig,
    /// Where `s` saves settings to.
    config_path: Option<PathBuf>,
    /// One-off message shown in the help bar.
    status: Option<String>,
}

impl App {
    /// Construct a new instance of [`App`] for a `columns` x `rows` terminal.
    pub fn new(
        settings: AppConfig,
        config_path: Option<PathBuf>,
        seed: Option<u64>,
        columns: u16,
        rows: u16,
    ) -> color_eyre::Result<Self> {
        let surface = TerminalSurface::new(columns, rows);
        let scheduler = PolledScheduler::new();
        let clock = SystemClock::new();
        let effect = match seed {
            Some(seed) => {
                SnowfallEffect::with_seed(surface, scheduler, clock, &settings.effect, seed)?
            }
            None => SnowfallEffect::new(surface, scheduler, clock, &settings.effect)?,
        };

        match effect.config().anchor_id.as_deref() {
            None | Some("screen" | "main") => {}
            Some(anchor) => warn!(anchor, "unknown anchor, attaching to the whole screen"),
        }

        Ok(Self {
            running: false,
            effect,
            display: settings.display,
            config_path,
            status: None,
        })
    }

    /// Run the application's main loop, redrawing at the configured refresh rate.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let interval = Duration::from_secs_f64(1.0 / f64::from(self.display.refresh_hz.max(1)));
        let mut next_frame = Instant::now();

        while self.running {
            if Instant::now() >= next_frame {
                terminal.draw(|frame| self.render(frame))?;
                next_frame = Instant::now() + interval;
            }
            self.handle_crossterm_events(next_frame.saturating_duration_since(Instant::now()))?;
        }

        let surface = self.effect.teardown();
        debug!(attached = surface.is_attached(), "effect detached");
        Ok(())
    }

    /// Renders the effect and the help bar.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let help_height = u16::from(self.display.show_help);
        let [main, help] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(help_height)]).areas(area);

        let canvas_area = attach_area(area, main, self.effect.config().anchor_id.as_deref());
        if self
            .effect
            .surface_mut()
            .resize(canvas_area.width, canvas_area.height)
        {
            debug!(
                columns = canvas_area.width,
                rows = canvas_area.height,
                "surface resized"
            );
        }

        // No-op while paused.
        self.effect.tick();

        let above = self.effect.config().paints_above();
        if !above {
            frame.render_widget(self.effect.surface().widget(), canvas_area);
        }
        if self.display.show_help {
            frame.render_widget(self.help_line(), help);
        }
        if above {
            frame.render_widget(self.effect.surface().widget(), canvas_area);
        }
    }

    fn help_line(&self) -> Line<'static> {
        let config = self.effect.config();
        let color = Color::Rgb(config.color.r, config.color.g, config.color.b);

        let summary = match &self.status {
            Some(status) => status.clone(),
            None => {
                let mut summary = format!(
                    "{} flakes · {} · {}",
                    self.effect.particle_count(),
                    config.direction.name(),
                    config.fill_mode.name()
                );
                if !self.effect.is_running() {
                    summary.push_str(" · paused");
                }
                summary
            }
        };

        Line::from(vec![
            "q".bold().fg(color),
            " quit  ".dark_gray(),
            "space".bold().fg(color),
            " pause  ".dark_gray(),
            "+/-".bold().fg(color),
            " flakes  ".dark_gray(),
            "d".bold().fg(color),
            " direction  ".dark_gray(),
            "f".bold().fg(color),
            " fill  ".dark_gray(),
            "s".bold().fg(color),
            " save  ".dark_gray(),
            Span::raw(summary),
        ])
        .centered()
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits at most `timeout` so frames stay on schedule.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(columns, rows) => {
                    self.effect.surface_mut().resize(columns, rows);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        self.status = None;
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char(' ') | KeyCode::Char('p')) => self.toggle_pause(),
            (_, KeyCode::Char('+') | KeyCode::Char('=')) => {
                let count = self.effect.particle_count().saturating_add(COUNT_STEP);
                self.reconfigure(ConfigOverrides::count(count));
            }
            (_, KeyCode::Char('-')) => {
                let count = self.effect.particle_count().saturating_sub(COUNT_STEP);
                self.reconfigure(ConfigOverrides::count(count));
            }
            (_, KeyCode::Char('d')) => {
                let direction = self.effect.config().direction.toggle();
                self.reconfigure(ConfigOverrides {
                    direction: Some(direction),
                    ..Default::default()
                });
            }
            (_, KeyCode::Char('f')) => {
                let fill_mode = self.effect.config().fill_mode.toggle();
                self.reconfigure(ConfigOverrides {
                    fill_mode: Some(fill_mode),
                    ..Default::default()
                });
            }
            (_, KeyCode::Char('s')) => self.save_settings(),
            _ => {}
        }
    }

    fn toggle_pause(&mut self) {
        if self.effect.is_running() {
            self.effect.pause();
        } else {
            self.effect.resume();
        }
    }

    fn reconfigure(&mut self, overrides: ConfigOverrides) {
        if let Err(err) = self.effect.reconfigure(&overrides) {
            warn!(%err, "reconfigure rejected");
            self.status = Some(err.to_string());
        }
    }

    /// Write the live effect settings to the settings file.
    fn save_settings(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.status = Some("no config directory available".to_string());
            return;
        };

        let settings = AppConfig {
            effect: ConfigOverrides::from_config(self.effect.config()),
            display: self.display.clone(),
        };
        self.status = Some(match settings.save_to(&path) {
            Ok(()) => {
                info!(path = %path.display(), "settings saved");
                format!("saved to {}", path.display())
            }
            Err(err) => {
                warn!(%err, "failed to save settings");
                err.to_string()
            }
        });
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// The region the snow canvas attaches to.
fn attach_area(screen: Rect, main: Rect, anchor_id: Option<&str>) -> Rect {
    match anchor_id {
        Some("main") => main,
        _ => screen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flurry_core::{Direction, FillMode};
    use ratatui::{Terminal, backend::TestBackend};

    fn app(effect: ConfigOverrides) -> App {
        let settings = AppConfig {
            effect,
            ..Default::default()
        };
        App::new(settings, None, Some(1), 40, 12).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_app_creation() {
        let app = app(ConfigOverrides::count(20));
        assert!(!app.running);
        assert!(app.effect.is_running());
        assert_eq!(app.effect.particle_count(), 20);
    }

    #[test]
    fn test_invalid_settings_fail_construction() {
        let settings = AppConfig {
            effect: ConfigOverrides {
                change_frequency: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(App::new(settings, None, None, 40, 12).is_err());
    }

    #[test]
    fn test_count_keys_reconfigure() {
        let mut app = app(ConfigOverrides::count(5));
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.effect.particle_count(), 15);
        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.effect.particle_count(), 0);
    }

    #[test]
    fn test_pause_key_toggles() {
        let mut app = app(ConfigOverrides::count(5));
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.effect.is_running());
        assert!(app.help_line().to_string().contains("paused"));
        press(&mut app, KeyCode::Char('p'));
        assert!(app.effect.is_running());
    }

    #[test]
    fn test_direction_and_fill_keys() {
        let mut app = app(ConfigOverrides::count(5));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.effect.config().direction, Direction::Up);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.effect.config().fill_mode, FillMode::PerParticle);
        assert_eq!(app.effect.particle_count(), 5);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(ConfigOverrides::count(1));
        app.running = true;
        app.on_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);

        app.running = true;
        press(&mut app, KeyCode::Esc);
        assert!(!app.running);
    }

    #[test]
    fn test_save_without_config_dir_reports_status() {
        let mut app = app(ConfigOverrides::count(1));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(
            app.status.as_deref(),
            Some("no config directory available")
        );
    }

    #[test]
    fn test_render_draws_snow() {
        let mut app = app(ConfigOverrides {
            snowflake_count: Some(200),
            direction: Some(Direction::Down),
            ..Default::default()
        });
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        for _ in 0..120 {
            terminal.draw(|frame| app.render(frame)).unwrap();
        }

        let buffer = terminal.backend().buffer();
        let braille = buffer
            .content()
            .iter()
            .filter(|cell| {
                cell.symbol()
                    .chars()
                    .any(|c| ('\u{2801}'..='\u{28FF}').contains(&c))
            })
            .count();
        assert!(braille > 0);
    }

    #[test]
    fn test_attach_area() {
        let screen = Rect::new(0, 0, 80, 24);
        let main = Rect::new(0, 0, 80, 23);
        assert_eq!(attach_area(screen, main, None), screen);
        assert_eq!(attach_area(screen, main, Some("screen")), screen);
        assert_eq!(attach_area(screen, main, Some("main")), main);
        assert_eq!(attach_area(screen, main, Some("footer")), screen);
    }
}
