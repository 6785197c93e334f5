/// Terminal front end: ASCII mesh viewer with a volume/weight overlay
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stlmass_core::{Estimate, Mesh, ViewerContext};

pub mod renderer;

pub use renderer::AsciiRenderer;

const ORBIT_STEP: f32 = 0.1;

/// Terminal session showing one mesh and its estimate
pub struct TerminalApp {
    viewer: ViewerContext,
    estimate: Estimate,
    title: String,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, estimate: Estimate, title: impl Into<String>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        let mut viewer = ViewerContext::new(mesh, width as u32, height as u32);
        viewer.orbit(0.3, 0.3, 0.0);

        Ok(Self {
            viewer,
            estimate,
            title: title.into(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Restore the terminal even if the loop failed
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => {
                self.viewer.resize(width as u32, height as u32);
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('w') | KeyCode::Up => self.viewer.orbit(ORBIT_STEP, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.viewer.orbit(-ORBIT_STEP, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.viewer.orbit(0.0, -ORBIT_STEP, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.viewer.orbit(0.0, ORBIT_STEP, 0.0),
            KeyCode::Char('e') => self.viewer.orbit(0.0, 0.0, ORBIT_STEP),
            KeyCode::Char('r') => self.viewer.orbit(0.0, 0.0, -ORBIT_STEP),
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render(&self.viewer);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | {} triangles | FPS: {:.1} | WASD/Arrows=Orbit E/R=Roll Q=Quit",
                self.title, self.estimate.triangle_count, self.fps
            )),
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::Green),
            Print(format!(
                "{} (density {} g/cm³)",
                self.estimate, self.estimate.density_g_per_cm3
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}
