/// Terminal front end for the garment viewer transform pipeline
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use fitroom_core::{
    transform, IndexedMesh, Mat4, TransformPipeline, TransformState, ViewerConfig, ViewerError,
};
use log::{debug, info};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Approximate pixel size of one terminal cell; cells are about twice as tall as wide
const CELL_PIXELS: (f32, f32) = (8.0, 16.0);

/// Pixels of wheel travel per scroll notch
const WHEEL_STEP: f32 = 100.0;

const CONTROLS: &str = "Drag=Rotate Wheel=Zoom Space=Auto-rotate R=Reset Q=Quit";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("viewer setup failed: {0}")]
    Viewer(#[from] ViewerError),
}

/// What a single input event asks the app to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Quit,
    ToggleRotation,
    Reset,
    PointerDown(f32, f32),
    PointerMove(f32, f32),
    PointerUp,
    Wheel(f32),
    Resize(u16, u16),
}

impl Command {
    /// Map a crossterm event onto a viewer command. Mouse cells are
    /// converted to approximate pixels so drag sensitivity keeps its meaning.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if *kind != KeyEventKind::Release => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
                    KeyCode::Char(' ') => Some(Command::ToggleRotation),
                    KeyCode::Char('r') => Some(Command::Reset),
                    _ => None,
                }
            }
            Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                let x = *column as f32 * CELL_PIXELS.0;
                let y = *row as f32 * CELL_PIXELS.1;
                match kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(Command::PointerDown(x, y)),
                    MouseEventKind::Drag(MouseButton::Left) => Some(Command::PointerMove(x, y)),
                    MouseEventKind::Up(MouseButton::Left) => Some(Command::PointerUp),
                    MouseEventKind::ScrollDown => Some(Command::Wheel(WHEEL_STEP)),
                    MouseEventKind::ScrollUp => Some(Command::Wheel(-WHEEL_STEP)),
                    _ => None,
                }
            }
            Event::Resize(width, height) => Some(Command::Resize(*width, *height)),
            _ => None,
        }
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    mesh: IndexedMesh,
    pipeline: TransformPipeline,
    state: TransformState,
    renderer: AsciiRenderer,
    running: bool,
    target_frame_time: Duration,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: IndexedMesh, config: ViewerConfig, target_fps: u32) -> Result<Self, AppError> {
        let (width, height) = terminal::size()?;
        Self::with_size(mesh, config, target_fps, width, height)
    }

    pub fn with_size(
        mesh: IndexedMesh,
        config: ViewerConfig,
        target_fps: u32,
        width: u16,
        height: u16,
    ) -> Result<Self, AppError> {
        let (px_width, px_height) = cells_to_pixels(width, height);
        let pipeline = TransformPipeline::new(config, px_width, px_height)?;
        let state = pipeline.initial_state();

        Ok(Self {
            mesh,
            pipeline,
            state,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            target_frame_time: Duration::from_millis(1000 / target_fps.max(1) as u64),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), cursor::Show, DisableMouseCapture, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                if let Some(command) = Command::from_event(&event::read()?) {
                    self.handle(command);
                }
            }

            let matrix = self.pipeline.frame(&mut self.state);
            self.render(&matrix)?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Quit => self.running = false,
            Command::ToggleRotation => {
                let enabled = self.state.toggle_rotation();
                debug!("auto-rotation {}", if enabled { "on" } else { "off" });
            }
            Command::Reset => self.pipeline.reset(&mut self.state),
            Command::PointerDown(x, y) => self.pipeline.pointer_down(&mut self.state, x, y),
            Command::PointerMove(x, y) => self.pipeline.pointer_move(&mut self.state, x, y),
            Command::PointerUp => self.pipeline.pointer_up(&mut self.state),
            Command::Wheel(delta_y) => self.pipeline.wheel(&mut self.state, delta_y),
            Command::Resize(width, height) => {
                let (px_width, px_height) = cells_to_pixels(width, height);
                if self.pipeline.resize(px_width, px_height).is_ok() {
                    self.renderer.resize(width as usize, height as usize);
                    info!("terminal resized to {width}x{height} cells");
                }
            }
        }
    }

    /// Rotation-only part of the current transform chain, for shading
    fn rotation(&self) -> Mat4 {
        let ops = self.pipeline.ops(&self.state);
        transform::compose(&Mat4::identity(), &ops[..2])
    }

    fn render(&mut self, matrix: &Mat4) -> io::Result<()> {
        let rotation = self.rotation();

        self.renderer.clear();
        self.renderer.render_mesh(&self.mesh, matrix, &rotation);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Fitroom | FPS: {:.1} | angle {:.2} | {CONTROLS}",
                self.fps, self.state.rotation_angle
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn cells_to_pixels(width: u16, height: u16) -> (f32, f32) {
    (width as f32 * CELL_PIXELS.0, height as f32 * CELL_PIXELS.1)
}
