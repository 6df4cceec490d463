use std::path::Path;

use anyhow::Context;

/// RGBA8 pixel.
pub type Rgba = [u8; 4];

/// Fully transparent black, returned for out-of-bounds samples.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// CPU-side RGBA8 image, row-major. Owned by a tileset and uploaded to the
/// GPU only by the renderer.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl PixelBuffer {
    /// Transparent buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bytes: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap raw RGBA8 bytes. Returns `None` when the length does not match.
    pub fn from_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        (bytes.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            bytes,
        })
    }

    /// Decode an image file (PNG) into RGBA8.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("Loading texture {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            bytes: img.into_raw(),
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True for the zero-sized placeholder.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGBA8 bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel at `(x, y)`; transparent when outside the image.
    pub fn sample(&self, x: i64, y: i64) -> Rgba {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return TRANSPARENT;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.bytes[i],
            self.bytes[i + 1],
            self.bytes[i + 2],
            self.bytes[i + 3],
        ]
    }

    /// Write a pixel; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, px: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.bytes[i..i + 4].copy_from_slice(&px);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_samples_are_transparent() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(1, 1, [1, 2, 3, 4]);
        assert_eq!(buf.sample(1, 1), [1, 2, 3, 4]);
        assert_eq!(buf.sample(-1, 0), TRANSPARENT);
        assert_eq!(buf.sample(2, 0), TRANSPARENT);
        assert_eq!(buf.sample(0, 7), TRANSPARENT);
    }

    #[test]
    fn from_rgba8_checks_length() {
        assert!(PixelBuffer::from_rgba8(2, 2, vec![0; 15]).is_none());
        assert!(PixelBuffer::from_rgba8(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn load_reports_missing_file_with_context() {
        let err = PixelBuffer::load(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(format!("{err:#}").contains("Loading texture"));
    }
}
