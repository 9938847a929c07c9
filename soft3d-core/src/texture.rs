//! Texture storage and nearest-pixel sampling.

use std::path::Path;

use crate::error::Result;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A 2D grid of RGB samples, shared between meshes via `Arc`.
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Rgb>,
}

impl Texture {
    /// Creates a texture from a row-major texel grid.
    ///
    /// # Panics
    ///
    /// Panics if `texels` does not hold exactly `width * height` samples.
    pub fn from_texels(width: usize, height: usize, texels: Vec<Rgb>) -> Self {
        assert_eq!(texels.len(), width * height);
        Self {
            width,
            height,
            texels,
        }
    }

    /// Loads and decodes a texture image from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Texture> {
        let image = image::open(path)?.to_rgb8();
        let (width, height) = (image.width() as usize, image.height() as usize);
        let texels = image
            .pixels()
            .map(|p| Rgb::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        Ok(Self::from_texels(width, height, texels))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples the nearest texel for normalized coordinates
    /// `(u, v) ∈ [0,1]²`.
    pub fn sample(&self, u: f64, v: f64) -> Rgb {
        let x = (u * (self.width - 1) as f64) as usize;
        let y = (v * (self.height - 1) as f64) as usize;
        self.texels[y * self.width + x]
    }
}
