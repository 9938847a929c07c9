//! Terminal presentation frontend for the soft3d rendering core.
//!
//! Binds the rasterizer's color buffer to a fixed-size grid of terminal
//! cells and feeds keyboard/mouse input back into the scene graph
//! between frames.

use std::f64::consts::PI;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use soft3d_core::{
    Attachment, Camera, Mesh, NodeId, Quaternion, Rasterizer, RenderMode, Rgb, Scene, Vec3,
};

/// Main application struct for terminal 3D rendering.
///
/// Owns the scene, steps it once per frame, renders synchronously, and
/// paces itself towards the target frame rate. Input is applied between
/// frames, never during rasterization.
pub struct TerminalApp {
    scene: Scene,
    root: NodeId,
    model: NodeId,
    camera: NodeId,
    rasterizer: Rasterizer,
    running: bool,
    spin: bool,
    last_tick: Instant,
    fps_window: Instant,
    frame_count: u32,
    fps: f32,
    drag_anchor: Option<(u16, u16)>,
}

const TARGET_FRAME_TIME: Duration = Duration::from_micros(1_000_000 / 60);

impl TerminalApp {
    /// Builds an app rendering `mesh` six units in front of the camera,
    /// sized to the current terminal.
    pub fn new(mesh: Mesh) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let (width, height) = (width as usize, height as usize);

        let mut scene = Scene::new();
        let root = scene.add_node(Vec3::ZERO, Quaternion::IDENTITY, Attachment::Empty);
        let camera = scene.add_node(
            Vec3::ZERO,
            Quaternion::IDENTITY,
            Attachment::Camera(Camera::new(
                width as f64 / height as f64,
                PI / 3.0,
                1.0,
                1000.0,
            )),
        );
        let model = scene.add_node(
            Vec3::new(0.0, 0.0, -6.0),
            Quaternion::IDENTITY,
            Attachment::Mesh(mesh),
        );
        scene
            .add_child(root, camera)
            .expect("camera node is freshly created");
        scene
            .add_child(root, model)
            .expect("model node is freshly created");

        let now = Instant::now();
        Ok(Self {
            scene,
            root,
            model,
            camera,
            rasterizer: Rasterizer::new(width, height, RenderMode::Perspective),
            running: true,
            spin: true,
            last_tick: now,
            fps_window: now,
            frame_count: 0,
            fps: 0.0,
            drag_anchor: None,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            let delta = self.last_tick.elapsed().as_secs_f64();
            self.last_tick = Instant::now();
            self.update(delta);

            // Render
            self.render()?;

            // Sleep off whatever is left of the frame budget.
            let elapsed = frame_start.elapsed();
            if elapsed < TARGET_FRAME_TIME {
                std::thread::sleep(TARGET_FRAME_TIME - elapsed);
            }

            // Update FPS counter
            self.frame_count += 1;
            if self.fps_window.elapsed().as_secs() >= 1 {
                self.fps = self.frame_count as f32 / self.fps_window.elapsed().as_secs_f32();
                self.frame_count = 0;
                self.fps_window = Instant::now();
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        let step = 0.1;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char(' ') => {
                self.spin = !self.spin;
            }
            KeyCode::Char('w') | KeyCode::Up => self.rotate_model(step, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.rotate_model(-step, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.rotate_model(0.0, -step, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.rotate_model(0.0, step, 0.0),
            KeyCode::Char('e') => self.rotate_model(0.0, 0.0, step),
            KeyCode::Char('r') => self.rotate_model(0.0, 0.0, -step),
            _ => {}
        }
    }

    fn rotate_model(&mut self, x: f64, y: f64, z: f64) {
        self.scene
            .rotate(self.model, Quaternion::from_euler(Vec3::new(x, y, z)));
    }

    /// Dragging with the left button orbits the camera; the drag distance
    /// maps to Euler angles scaled by the viewport size.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((last_x, last_y)) = self.drag_anchor {
                    let dx = mouse.column as f64 - last_x as f64;
                    let dy = mouse.row as f64 - last_y as f64;
                    let width = self.rasterizer.width() as f64;
                    let height = self.rasterizer.height() as f64;
                    let rotation = Quaternion::from_euler(Vec3::new(
                        dy * 2.0 / (PI * height),
                        dx * 2.0 / (PI * width),
                        0.0,
                    ));
                    self.scene.rotate(self.camera, rotation);
                }
                self.drag_anchor = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(_) => {
                self.drag_anchor = None;
            }
            _ => {}
        }
    }

    fn update(&mut self, delta: f64) {
        // Continuous slow rotation for demo effect
        if self.spin {
            self.scene.rotate(
                self.model,
                Quaternion::from_euler(Vec3::new(
                    PI * delta / 8.0,
                    PI * delta / 16.0,
                    PI * delta / 8.0,
                )),
            );
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.rasterizer
            .render_scene(&self.scene, self.root, self.camera)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        let mut stdout = stdout();
        let width = self.rasterizer.width();
        for y in 0..self.rasterizer.height() {
            queue!(stdout, cursor::MoveTo(0, y as u16))?;
            for pixel in &self.rasterizer.pixels()[y * width..(y + 1) * width] {
                let Rgb { r, g, b } = *pixel;
                queue!(stdout, SetForegroundColor(Color::Rgb { r, g, b }), Print('█'))?;
            }
        }

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "soft3d | FPS: {:.1} | WASD/Arrows=Rotate E/R=Roll Drag=Orbit Space=Pause Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
