//! Height fields sampled by [`HeightBias`](crate::guidance::HeightBias).

use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Normalized height in `[0, 1]` at texture coordinate `(u, v)`.
///
/// `None` means no data; callers treat it as height 0.
pub trait HeightField {
    fn sample(&self, u: f64, v: f64) -> Option<f64>;
}

impl<F> HeightField for F
where
    F: Fn(f64, f64) -> Option<f64>,
{
    fn sample(&self, u: f64, v: f64) -> Option<f64> {
        self(u, v)
    }
}

/// Same height everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatHeightField(pub f64);

impl HeightField for FlatHeightField {
    fn sample(&self, _u: f64, _v: f64) -> Option<f64> {
        Some(self.0.clamp(0.0, 1.0))
    }
}

#[derive(Debug, Error)]
pub enum HeightmapError {
    #[error("failed to read height map {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("height map {0} has no pixels")]
    Empty(PathBuf),
}

/// Height field backed by an image's luminance.
///
/// `v = 0` is the bottom image row, so grid row `y = 0` (south) reads the bottom of the map.
#[derive(Debug, Clone)]
pub struct ImageHeightField {
    width: u32,
    height: u32,
    luminance: Vec<f64>,
}

impl ImageHeightField {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HeightmapError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| HeightmapError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgb = img.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(HeightmapError::Empty(path.to_path_buf()));
        }
        Ok(Self::from_rgb(&rgb))
    }

    pub fn from_rgb(img: &RgbImage) -> Self {
        let luminance = img
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0.map(|c| c as f64 / 255.0);
                (0.2126 * r + 0.7152 * g + 0.0722 * b).clamp(0.0, 1.0)
            })
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            luminance,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl HeightField for ImageHeightField {
    fn sample(&self, u: f64, v: f64) -> Option<f64> {
        if self.luminance.is_empty() {
            return None;
        }
        let u = u.clamp(0.0, 0.999_999);
        let v = v.clamp(0.0, 0.999_999);
        let px = (u * self.width as f64) as usize;
        let height = self.height as usize;
        let py = height - 1 - ((v * height as f64) as usize).min(height - 1);
        self.luminance.get(py * self.width as usize + px).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient() -> RgbImage {
        // Left column black, right column white.
        RgbImage::from_fn(2, 2, |x, _y| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_luminance_sampling() {
        let field = ImageHeightField::from_rgb(&gradient());
        assert_eq!(field.sample(0.1, 0.5), Some(0.0));
        let white = field.sample(0.9, 0.5).unwrap();
        assert!((white - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinates_are_clamped() {
        let field = ImageHeightField::from_rgb(&gradient());
        assert_eq!(field.sample(-3.0, -1.0), Some(0.0));
        assert!(field.sample(1.0, 1.0).unwrap() > 0.99);
    }

    #[test]
    fn test_bottom_row_is_v_zero() {
        // White top row, black bottom row.
        let img = RgbImage::from_fn(1, 2, |_x, y| {
            if y == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let field = ImageHeightField::from_rgb(&img);
        assert_eq!(field.sample(0.5, 0.25), Some(0.0));
        assert!((field.sample(0.5, 0.75).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rows_map_to_v() {
        let img = RgbImage::from_fn(1, 2, |_x, y| if y == 0 { Rgb([255, 0, 0]) } else { Rgb([0, 255, 0]) });
        let field = ImageHeightField::from_rgb(&img);
        assert!((field.sample(0.5, 0.2).unwrap() - 0.7152).abs() < 1e-9);
        assert!((field.sample(0.5, 0.8).unwrap() - 0.2126).abs() < 1e-9);
    }

    #[test]
    fn test_load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("height.png");
        gradient().save(&path).unwrap();

        let field = ImageHeightField::load(&path).unwrap();
        assert_eq!(field.dimensions(), (2, 2));
        assert_eq!(field.sample(0.0, 0.0), Some(0.0));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ImageHeightField::load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, HeightmapError::Image { .. }));
    }

    #[test]
    fn test_flat_field_clamps() {
        assert_eq!(FlatHeightField(2.0).sample(0.0, 0.0), Some(1.0));
    }
}
