//! soft3d terminal demo - rotating textured cuboid
//!
//! Renders a checkered cuboid, or an OBJ model given on the command line.
//!
//! Usage: soft3d-terminal [model.obj] [texture.png]
//!
//! Controls:
//!   - WASD / Arrow Keys: rotate the model
//!   - E/R: roll, Space: pause the spin
//!   - Mouse drag: orbit the camera
//!   - Q/ESC: quit

use std::env;
use std::io;
use std::sync::Arc;

use log::info;
use soft3d_core::{obj, Mesh, Rgb, Texture, Vec3};
use soft3d_terminal::TerminalApp;

fn checker_texture() -> Arc<Texture> {
    let (width, height) = (8, 8);
    let mut texels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            texels.push(if (x + y) % 2 == 0 {
                Rgb::new(230, 120, 40)
            } else {
                Rgb::new(40, 60, 90)
            });
        }
    }
    Arc::new(Texture::from_texels(width, height, texels))
}

fn main() -> io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mut mesh = match args.get(1) {
        Some(path) => obj::load_obj(path).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to load {path}: {e}"),
            )
        })?,
        None => {
            let mut cuboid = Mesh::cuboid(Vec3::new(2.5, 2.5, 2.5));
            cuboid.set_texture(checker_texture());
            cuboid
        }
    };

    if let Some(path) = args.get(2) {
        let texture = Texture::open(path).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to load texture {path}: {e}"),
            )
        })?;
        mesh.set_texture(Arc::new(texture));
    }

    info!("scene ready: {} faces", mesh.faces.len());

    let mut app = TerminalApp::new(mesh)?;
    app.run()
}
