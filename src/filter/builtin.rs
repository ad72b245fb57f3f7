// SPDX-License-Identifier: MPL-2.0
//! Built-in per-frame filters.
//!
//! All filters preserve the input's dimensions and frame index and return
//! standard three-channel RGB frames; intensity-based filters (grayscale,
//! edge detection) expand their single-channel result back to RGB before
//! returning.

use crate::media::{luma_601, Frame};
use image_rs::{imageops, Rgb, RgbImage};

/// Gaussian blur radius used by [`blur`].
const BLUR_SIGMA: f32 = 1.7;

/// Unsharp-mask parameters used by [`sharpen`].
const SHARPEN_SIGMA: f32 = 1.0;
const SHARPEN_THRESHOLD: i32 = 3;

/// Converts a frame to grayscale (expanded back to RGB).
#[must_use]
pub fn grayscale(frame: &Frame) -> Frame {
    let luma = frame.to_luma();
    let mut image = RgbImage::new(frame.width(), frame.height());
    for (src, dst) in luma.pixels().zip(image.pixels_mut()) {
        let v = src.0[0];
        *dst = Rgb([v, v, v]);
    }
    Frame::new(image, frame.index())
}

/// Inverts every channel of every pixel. Self-inverse.
#[must_use]
pub fn invert(frame: &Frame) -> Frame {
    let mut image = frame.image().clone();
    imageops::invert(&mut image);
    Frame::new(image, frame.index())
}

/// Mirrors the frame left-to-right.
#[must_use]
pub fn flip_horizontal(frame: &Frame) -> Frame {
    Frame::new(imageops::flip_horizontal(frame.image()), frame.index())
}

/// Mirrors the frame top-to-bottom.
#[must_use]
pub fn flip_vertical(frame: &Frame) -> Frame {
    Frame::new(imageops::flip_vertical(frame.image()), frame.index())
}

/// Softens the frame with a fixed-radius gaussian blur.
#[must_use]
pub fn blur(frame: &Frame) -> Frame {
    Frame::new(imageops::blur(frame.image(), BLUR_SIGMA), frame.index())
}

/// Sharpens the frame with a fixed unsharp mask.
#[must_use]
pub fn sharpen(frame: &Frame) -> Frame {
    Frame::new(
        imageops::unsharpen(frame.image(), SHARPEN_SIGMA, SHARPEN_THRESHOLD),
        frame.index(),
    )
}

/// Sobel gradient-magnitude edge detection.
///
/// Computes horizontal and vertical Sobel gradients on the intensity
/// image and writes the clamped gradient magnitude to all three channels.
/// Border pixels, which lack a full 3x3 neighborhood, are black.
#[must_use]
pub fn edge_detect(frame: &Frame) -> Frame {
    let luma = frame.to_luma();
    let width = frame.width();
    let height = frame.height();
    let mut image = RgbImage::new(width, height);

    if width >= 3 && height >= 3 {
        let sample = |x: u32, y: u32| -> i32 { i32::from(luma.get_pixel(x, y).0[0]) };

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let gx = -sample(x - 1, y - 1) + sample(x + 1, y - 1)
                    - 2 * sample(x - 1, y)
                    + 2 * sample(x + 1, y)
                    - sample(x - 1, y + 1)
                    + sample(x + 1, y + 1);
                let gy = -sample(x - 1, y - 1) - 2 * sample(x, y - 1) - sample(x + 1, y - 1)
                    + sample(x - 1, y + 1)
                    + 2 * sample(x, y + 1)
                    + sample(x + 1, y + 1);

                let magnitude = f64::from(gx * gx + gy * gy).sqrt().min(255.0) as u8;
                image.put_pixel(x, y, Rgb([magnitude, magnitude, magnitude]));
            }
        }
    }

    Frame::new(image, frame.index())
}

/// Parameterized brightness / contrast / saturation adjustment.
///
/// Each parameter ranges over -100..=+100 percent and is clamped on
/// construction; zero is neutral. The adjustment is deterministic and
/// applies brightness, then contrast, then saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorAdjust {
    brightness: i32,
    contrast: i32,
    saturation: i32,
}

impl ColorAdjust {
    /// Creates an adjustment, clamping each parameter to -100..=+100.
    #[must_use]
    pub fn new(brightness: i32, contrast: i32, saturation: i32) -> Self {
        Self {
            brightness: brightness.clamp(-100, 100),
            contrast: contrast.clamp(-100, 100),
            saturation: saturation.clamp(-100, 100),
        }
    }

    /// Brightness offset in percent.
    #[must_use]
    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    /// Contrast change in percent.
    #[must_use]
    pub fn contrast(&self) -> i32 {
        self.contrast
    }

    /// Saturation change in percent.
    #[must_use]
    pub fn saturation(&self) -> i32 {
        self.saturation
    }

    /// Returns true if every parameter is at its neutral value.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.brightness == 0 && self.contrast == 0 && self.saturation == 0
    }
}

impl super::FrameFilter for ColorAdjust {
    fn apply(&self, frame: &Frame) -> Frame {
        if self.is_neutral() {
            return frame.clone();
        }

        let mut image = frame.image().clone();

        if self.brightness != 0 {
            image = imageops::brighten(&image, self.brightness);
        }
        if self.contrast != 0 {
            image = imageops::contrast(&image, self.contrast as f32);
        }
        if self.saturation != 0 {
            let factor = 1.0 + f64::from(self.saturation) / 100.0;
            for pixel in image.pixels_mut() {
                let luma = f64::from(luma_601(pixel.0));
                for channel in &mut pixel.0 {
                    let adjusted = luma + (f64::from(*channel) - luma) * factor;
                    *channel = adjusted.clamp(0.0, 255.0) as u8;
                }
            }
        }

        Frame::new(image, frame.index())
    }
}
