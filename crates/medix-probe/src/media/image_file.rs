use std::path::Path;

use image::{DynamicImage, ImageReader};
use tracing::debug;

use super::{Summarize, regular_file_size, size_kb};
use crate::{
    error::ProbeError,
    summary::{SummaryRow, round_to},
};

/// Mean value of each color channel present in the decoded grid, in [0, 255].
/// Alpha is never averaged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageColor {
    /// Red, green, blue: the decoder's native order.
    Rgb([f64; 3]),
    /// Single luminance channel of a grayscale image.
    Luma(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Channels of the decoded grid, alpha included.
    pub channels: u8,
    pub size_bytes: u64,
    pub average_color: AverageColor,
}

impl ImageInfo {
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub fn size_kb(&self) -> f64 {
        size_kb(self.size_bytes)
    }
}

impl Summarize for ImageInfo {
    fn summarize(&self, row: &mut SummaryRow) {
        row.insert("resolution", self.resolution());
        row.insert("width", self.width);
        row.insert("height", self.height);
        row.insert("channels", self.channels);
        row.insert("size_kb", round_to(self.size_kb(), 2));

        match self.average_color {
            AverageColor::Rgb([r, g, b]) => {
                row.insert("color_r", round_to(r, 1));
                row.insert("color_g", round_to(g, 1));
                row.insert("color_b", round_to(b, 1));
            }
            AverageColor::Luma(l) => row.insert("color_l", round_to(l, 1)),
        }
    }
}

pub(super) fn analyze(path: &Path) -> Result<ImageInfo, ProbeError> {
    let size_bytes = regular_file_size(path)?;

    let img = ImageReader::open(path)
        .map_err(|e| ProbeError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| ProbeError::io(path, e))?
        .decode()
        .map_err(|e| ProbeError::decode(path, e))?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(ProbeError::decode(path, "image has an empty pixel grid"));
    }

    let color = img.color();
    debug!(width, height, ?color, "decoded image");

    Ok(ImageInfo {
        width,
        height,
        channels: color.channel_count(),
        size_bytes,
        average_color: average_color(&img),
    })
}

fn average_color(img: &DynamicImage) -> AverageColor {
    if img.color().has_color() {
        let rgb = img.to_rgb8();
        let mut sums = [0u64; 3];
        for px in rgb.pixels() {
            for (sum, v) in sums.iter_mut().zip(px.0) {
                *sum += u64::from(v);
            }
        }
        let n = (rgb.width() as u64 * rgb.height() as u64) as f64;
        AverageColor::Rgb(sums.map(|s| s as f64 / n))
    } else {
        let luma = img.to_luma8();
        let sum: u64 = luma.pixels().map(|px| u64::from(px.0[0])).sum();
        let n = (luma.width() as u64 * luma.height() as u64) as f64;
        AverageColor::Luma(sum as f64 / n)
    }
}
