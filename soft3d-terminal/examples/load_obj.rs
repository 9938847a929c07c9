//! Example: load and render an OBJ model in the terminal.
//!
//! Usage: cargo run --example load_obj -- path/to/model.obj [texture.png]

use std::env;
use std::io;
use std::sync::Arc;

use soft3d_core::{obj, Mesh, Texture, Vec3};
use soft3d_terminal::TerminalApp;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <obj-file> [texture]", args[0]);
        eprintln!("\nNo OBJ file provided, using default cuboid...");
        let cuboid = Mesh::cuboid(Vec3::new(2.5, 2.5, 2.5));
        let mut app = TerminalApp::new(cuboid)?;
        return app.run();
    }

    let obj_path = &args[1];
    println!("Loading OBJ file: {obj_path}");

    let mut mesh = obj::load_obj(obj_path).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to parse {obj_path}: {e}"),
        )
    })?;

    if let Some(texture_path) = args.get(2) {
        let texture = Texture::open(texture_path).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to load texture {texture_path}: {e}"),
            )
        })?;
        mesh.set_texture(Arc::new(texture));
    }

    println!("Loaded {} faces", mesh.faces.len());

    let mut app = TerminalApp::new(mesh)?;
    app.run()
}
