//! Pixel color sampling over decoded screenshots.
//!
//! Colors are compared as packed 24-bit `0xRRGGBB` values and rendered as
//! `"R,G,B"` strings, the form page objects assert against.
//!
//! [`average_color`] is a mode, not a mean: it samples an interior grid,
//! folds near-identical samples together and returns the most frequent one.
//! Anti-aliased edges then cannot drag the result toward a color that never
//! appears on screen.

use std::fmt;
use std::str::FromStr;

use image::{DynamicImage, GenericImageView};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Grid divisions per axis. Lines `1..SAMPLE_GRID` are sampled, so the
/// outermost row and column are never read.
pub const SAMPLE_GRID: u32 = 20;

/// Largest per-channel difference at which two samples count as one color.
pub const NEAR_TOLERANCE: u8 = 8;

// ============================================================================
// Rgb
// ============================================================================

/// Opaque 24-bit color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpacks `0xRRGGBB`. Bits above 24 are ignored.
    #[inline]
    #[must_use]
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    /// Packs into `0xRRGGBB`.
    #[inline]
    #[must_use]
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Returns `true` if every channel is within `tolerance` of `other`.
    #[inline]
    #[must_use]
    pub const fn is_near(self, other: Self, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let channels: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = channels.as_slice() else {
            return Err(Error::coercion("color", format!("'{s}'")));
        };

        let parse = |c: &str| {
            c.parse::<u8>()
                .map_err(|_| Error::coercion("color", format!("'{s}'")))
        };

        Ok(Self::new(parse(r)?, parse(g)?, parse(b)?))
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes screenshot bytes.
///
/// # Errors
///
/// [`Error::Screenshot`] if the bytes are not a readable image or the image
/// has no pixels.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| Error::screenshot(format!("failed to decode image: {e}")))?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::screenshot("image has zero dimensions"));
    }

    Ok(image)
}

// ============================================================================
// Sampling
// ============================================================================

/// Reads one pixel, dropping alpha.
///
/// # Errors
///
/// [`Error::Screenshot`] if `(x, y)` lies outside the image.
pub fn pixel(image: &DynamicImage, x: u32, y: u32) -> Result<Rgb> {
    let (width, height) = image.dimensions();
    if x >= width || y >= height {
        return Err(Error::screenshot(format!(
            "pixel ({x}, {y}) outside {width}x{height} image"
        )));
    }

    let [r, g, b, _] = image.get_pixel(x, y).0;
    let packed = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
    Ok(Rgb::from_packed(packed))
}

/// Color of the pixel at the image's geometric center.
///
/// # Errors
///
/// [`Error::Screenshot`] if the image is empty.
pub fn center_color(image: &DynamicImage) -> Result<Rgb> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::screenshot("image has zero dimensions"));
    }
    pixel(image, width / 2, height / 2)
}

/// Most frequent color over the interior sample grid.
///
/// Samples that are within [`NEAR_TOLERANCE`] of an earlier sample are
/// counted toward it. Ties go to the color seen first (row-major from the
/// top-left), so the result is deterministic.
///
/// # Errors
///
/// [`Error::Screenshot`] if the image is empty.
pub fn average_color(image: &DynamicImage) -> Result<Rgb> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::screenshot("image has zero dimensions"));
    }

    let mut buckets: Vec<(Rgb, usize)> = Vec::new();

    for j in 1..SAMPLE_GRID {
        let y = grid_line(height, j);
        for i in 1..SAMPLE_GRID {
            let x = grid_line(width, i);
            let sample = pixel(image, x, y)?;

            match buckets
                .iter_mut()
                .find(|(color, _)| color.is_near(sample, NEAR_TOLERANCE))
            {
                Some((_, count)) => *count += 1,
                None => buckets.push((sample, 1)),
            }
        }
    }

    let mut best = buckets[0];
    for &bucket in &buckets[1..] {
        if bucket.1 > best.1 {
            best = bucket;
        }
    }

    Ok(best.0)
}

/// Coordinate of grid line `index` along an axis of `extent` pixels.
#[inline]
fn grid_line(extent: u32, index: u32) -> u32 {
    ((u64::from(extent) * u64::from(index)) / u64::from(SAMPLE_GRID)) as u32
}

// ============================================================================
// Tests
// ============================================================================
