//! Carrier raster and its 8x8 tile partition.
//!
//! The carrier is reduced to 8-bit luma once, on construction. Tiles are
//! read-only views enumerated row-major: `(0,0) → (0,1) → … → (last, last)`.

use crate::config::BLOCK_SIZE;
use crate::error::{CoverlessError, Result};
use image::DynamicImage;

/// Grayscale carrier, one 8-bit sample per pixel, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

/// `round(0.299R + 0.587G + 0.114B)` in fixed point
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

impl Raster {
    /// Wrap grayscale samples
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(CoverlessError::InvalidRaster(format!(
                "{}x{} raster needs {} samples, got {}",
                width,
                height,
                expected,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Reduce interleaved RGB samples to luma
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(CoverlessError::InvalidRaster(format!(
                "{}x{} RGB raster needs {} samples, got {}",
                width,
                height,
                expected,
                rgb.len()
            )));
        }
        let samples = rgb
            .chunks_exact(3)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Self::new(width, height, samples)
    }

    /// Build from equal-length rows of grayscale samples
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        if rows.iter().any(|r| r.len() as u32 != width) {
            return Err(CoverlessError::InvalidRaster("ragged rows".into()));
        }
        Self::new(width, height, rows.concat())
    }

    /// Convert a decoded image. Grayscale images keep their samples,
    /// color images are reduced with [`luma`]; alpha is ignored.
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let samples = if image.color().has_color() {
            image
                .to_rgb8()
                .pixels()
                .map(|p| luma(p[0], p[1], p[2]))
                .collect()
        } else {
            image.to_luma8().into_raw()
        };
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Sample at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width as usize + x]
    }

    /// Fail unless both dimensions are multiples of the tile size
    pub fn validate_tiling(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)
    }

    /// (tile rows, tile columns)
    pub fn tile_grid(&self) -> (usize, usize) {
        (
            self.height as usize / BLOCK_SIZE,
            self.width as usize / BLOCK_SIZE,
        )
    }

    pub fn tile_count(&self) -> usize {
        let (rows, cols) = self.tile_grid();
        rows * cols
    }

    /// Row-major tile iterator. Fails before yielding anything if the
    /// dimensions do not tile evenly.
    pub fn tiles(&self) -> Result<impl Iterator<Item = Tile<'_>> + '_> {
        self.validate_tiling()?;
        let (rows, cols) = self.tile_grid();
        Ok((0..rows).flat_map(move |row| {
            (0..cols).map(move |col| Tile {
                raster: self,
                row,
                col,
            })
        }))
    }

    /// Sum of all samples modulo 2^32
    pub fn feature(&self) -> u32 {
        self.samples
            .iter()
            .fold(0u32, |acc, &s| acc.wrapping_add(s as u32))
    }
}

/// Carrier dimension check shared by the raster and the capacity query
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    let block = BLOCK_SIZE as u32;
    if width == 0 || height == 0 || width % block != 0 || height % block != 0 {
        return Err(CoverlessError::InvalidCarrierDimensions { width, height });
    }
    Ok(())
}

/// One 8x8 tile of a [`Raster`]
#[derive(Debug, Clone, Copy)]
pub struct Tile<'a> {
    raster: &'a Raster,
    row: usize,
    col: usize,
}

impl<'a> Tile<'a> {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Sample at tile-local row `y`, column `x`
    pub fn sample(&self, y: usize, x: usize) -> u8 {
        self.raster
            .get(self.col * BLOCK_SIZE + x, self.row * BLOCK_SIZE + y)
    }

    /// The 64 samples, row-major
    pub fn bytes(&self) -> [u8; BLOCK_SIZE * BLOCK_SIZE] {
        let mut out = [0u8; BLOCK_SIZE * BLOCK_SIZE];
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                out[y * BLOCK_SIZE + x] = self.sample(y, x);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> Raster {
        let samples = (0..width * height).map(|i| (i % 251) as u8).collect();
        Raster::new(width, height, samples).unwrap()
    }

    #[test]
    fn test_luma_rounding() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        // 0.299 * 100 + 0.587 * 150 + 0.114 * 200 = 140.75
        assert_eq!(luma(100, 150, 200), 141);
    }

    #[test]
    fn test_sample_count_checked() {
        assert!(Raster::new(8, 8, vec![0; 63]).is_err());
        assert!(Raster::from_rgb(8, 8, &[0; 64]).is_err());
    }

    #[test]
    fn test_from_rgb_converts_to_luma() {
        let mut rgb = [100, 150, 200].repeat(64);
        rgb[..6].copy_from_slice(&[255, 0, 0, 0, 255, 0]);
        let raster = Raster::from_rgb(8, 8, &rgb).unwrap();
        assert_eq!((raster.width(), raster.height()), (8, 8));
        assert_eq!(raster.get(0, 0), 76);
        assert_eq!(raster.get(1, 0), 150);
        assert!(raster.samples()[2..].iter().all(|&s| s == 141));
    }

    #[test]
    fn test_validate_tiling() {
        assert!(gradient(16, 24).validate_tiling().is_ok());
        match gradient(12, 8).validate_tiling() {
            Err(CoverlessError::InvalidCarrierDimensions { width: 12, height: 8 }) => {}
            other => panic!("expected InvalidCarrierDimensions, got {other:?}"),
        }
    }

    #[test]
    fn test_tiles_row_major() {
        let raster = gradient(24, 16);
        let order: Vec<(usize, usize)> = raster
            .tiles()
            .unwrap()
            .map(|t| (t.row(), t.col()))
            .collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_tile_bytes_view() {
        let raster = gradient(16, 16);
        let tile = raster.tiles().unwrap().nth(1).unwrap();
        let bytes = tile.bytes();
        assert_eq!(bytes[0], raster.get(8, 0));
        assert_eq!(bytes[9], raster.get(9, 1));
        assert_eq!(bytes[63], raster.get(15, 7));
    }

    #[test]
    fn test_feature_wraps() {
        let raster = Raster::new(8, 8, vec![255; 64]).unwrap();
        assert_eq!(raster.feature(), 255 * 64);
    }

    #[test]
    fn test_from_image_color_uses_luma() {
        let mut img = RgbImage::new(8, 8);
        for p in img.pixels_mut() {
            *p = Rgb([100, 150, 200]);
        }
        let raster = Raster::from_image(&DynamicImage::ImageRgb8(img));
        assert!(raster.samples().iter().all(|&s| s == 141));
    }
}
