//! Frame buffer holding the final per-pixel colors.

use lumen_math::{Color, Interval};

/// Displayable range every stored channel is clamped to.
const DISPLAY_RANGE: Interval = Interval { min: 0.0, max: 1.0 };

/// Width x height grid of clamped colors, row-major from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Film {
    /// Create a film filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y), clamping it to the displayable range.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = Self::display_color(color);
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Raw rows for the render loop, which writes display colors itself.
    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Clamp each channel to [0, 1]; NaN becomes 0.
    pub fn display_color(color: Color) -> Color {
        let channel = |c: f32| if c.is_nan() { 0.0 } else { DISPLAY_RANGE.clamp(c) };
        Color::new(channel(color.x), channel(color.y), channel(color.z))
    }

    /// Convert to packed 8-bit RGB (for encoding).
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.to_array())
            .map(|c| (c * 255.0).round() as u8)
            .collect()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_starts_black() {
        let film = Film::new(3, 2);

        assert_eq!(film.pixels().len(), 6);
        assert!(film.pixels().iter().all(|&c| c == Color::ZERO));
    }

    #[test]
    fn test_set_clamps_to_display_range() {
        let mut film = Film::new(2, 2);
        film.set(1, 0, Color::new(2.0, -1.0, 0.5));
        film.set(0, 1, Color::new(f32::NAN, 0.25, 1.0));

        assert_eq!(film.get(1, 0), Color::new(1.0, 0.0, 0.5));
        assert_eq!(film.get(0, 1), Color::new(0.0, 0.25, 1.0));
        assert_eq!(film.get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_to_rgb8_row_major() {
        let mut film = Film::new(2, 1);
        film.set(0, 0, Color::new(1.0, 0.0, 0.2));
        film.set(1, 0, Color::new(0.5, 1.0, 0.0));

        assert_eq!(film.to_rgb8(), vec![255, 0, 51, 128, 255, 0]);
    }
}
