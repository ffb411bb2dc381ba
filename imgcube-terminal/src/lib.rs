/// Terminal front end: drives a cube session and rasterizes it to ASCII
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use imgcube_core::{Axis, Direction, Session, SessionEvent, Twist};
use log::{info, warn};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::{AsciiRenderer, FaceArt, FaceImage, Viewport};

/// Degrees per arrow key press
const NUDGE: f64 = 5.0;

/// Partially typed manual turn, e.g. `x` then `3` then `+`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingTwist {
    axis: Option<Axis>,
    layer: Option<i8>,
}

impl PendingTwist {
    /// Feed one key; returns a turn once axis, layer and direction are known
    pub fn feed(&mut self, key: char) -> Option<Twist> {
        match key {
            'x' => self.axis = Some(Axis::X),
            'y' => self.axis = Some(Axis::Y),
            'z' => self.axis = Some(Axis::Z),
            '1' => self.layer = Some(-1),
            '2' => self.layer = Some(0),
            '3' => self.layer = Some(1),
            '+' | '=' | '-' => {
                let direction = if key == '-' {
                    Direction::Cw
                } else {
                    Direction::Ccw
                };
                let (axis, layer) = (self.axis?, self.layer?);
                *self = Self::default();
                return Some(Twist::new(axis, layer, direction));
            }
            _ => {}
        }
        None
    }

    fn label(&self) -> String {
        let axis = self.axis.map_or("_".to_string(), |a| a.to_string());
        let layer = self.layer.map_or("_".to_string(), |l| l.to_string());
        format!("{axis}{layer}")
    }
}

/// Paces the loop to a target rate and measures the rate achieved
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_time: Duration,
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FrameClock {
    pub fn new(target_fps: u32) -> Self {
        Self::starting_at(target_fps, Instant::now())
    }

    pub fn starting_at(target_fps: u32, start: Instant) -> Self {
        Self {
            frame_time: Duration::from_secs(1) / target_fps.max(1),
            window_start: start,
            frames: 0,
            fps: 0.0,
        }
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// Sleep still owed after a frame that took `elapsed`
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.frame_time.saturating_sub(elapsed)
    }

    /// Count a finished frame; the measured rate refreshes once a second
    pub fn record(&mut self, now: Instant) {
        self.frames += 1;
        let window = now.saturating_duration_since(self.window_start);
        if window >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / window.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Main application struct for the terminal cube
pub struct TerminalApp {
    session: Session,
    renderer: AsciiRenderer,
    saved_art: FaceArt,
    pending: PendingTwist,
    status: String,
    clock: FrameClock,
    running: bool,
}

impl TerminalApp {
    pub fn new(session: Session, target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let renderer = AsciiRenderer::new(width as usize, height as usize, session.cube());

        Ok(Self {
            saved_art: renderer.art().clone(),
            session,
            renderer,
            pending: PendingTwist::default(),
            status: String::new(),
            clock: FrameClock::new(target_fps),
            running: true,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.session.render(&mut self.renderer);

        while self.running {
            let frame_start = Instant::now();
            if event::poll(Duration::ZERO)? {
                self.handle_input()?;
            }
            self.update();
            self.render()?;

            std::thread::sleep(self.clock.remaining(frame_start.elapsed()));
            self.clock.record(Instant::now());
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char(' ') => match self.session.shuffle_default() {
                    Ok(_handle) => self.status = "shuffling".to_string(),
                    Err(err) => self.status = err.to_string(),
                },
                KeyCode::Char('c') => self.toggle_art(),
                KeyCode::Char('r') => self.session.reset_view(&mut self.renderer),
                KeyCode::Up => self.nudge(Axis::X, NUDGE),
                KeyCode::Down => self.nudge(Axis::X, -NUDGE),
                KeyCode::Left => self.nudge(Axis::Y, -NUDGE),
                KeyCode::Right => self.nudge(Axis::Y, NUDGE),
                KeyCode::Char(key) => {
                    if let Some(twist) = self.pending.feed(key) {
                        match self.session.twist(twist) {
                            Ok(_handle) => self.status = format!("twist {twist}"),
                            Err(err) => {
                                warn!("twist {twist} refused: {err}");
                                self.status = err.to_string();
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn nudge(&mut self, axis: Axis, degrees: f64) {
        self.session.rotate_view(axis, degrees, &mut self.renderer);
    }

    /// Swap between the face art and blank stickers
    fn toggle_art(&mut self) {
        if self.renderer.art().is_blank() {
            *self.renderer.art_mut() = self.saved_art.clone();
        } else {
            self.saved_art = self.renderer.art().clone();
            self.renderer.art_mut().clear();
        }
        self.session.render(&mut self.renderer);
    }

    fn update(&mut self) {
        match self.session.tick(&mut self.renderer) {
            Ok(events) => {
                for event in events {
                    if let SessionEvent::TurnCompleted(report) = event {
                        info!("{} turn settled after {} ticks", report.axis, report.ticks);
                        if !self.session.is_busy() {
                            self.status = if self.session.cube().is_solved() {
                                "solved".to_string()
                            } else {
                                "ready".to_string()
                            };
                        }
                    }
                }
            }
            Err(err) => {
                warn!("tick failed: {err}");
                self.status = err.to_string();
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "imgcube | FPS: {:.1} | {} | turn {} | Space=Shuffle x/y/z 1/2/3 +/-=Twist C=Art Arrows=View R=Reset Q=Quit",
                self.clock.fps(),
                self.status,
                self.pending.label()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
