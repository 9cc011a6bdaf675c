use crate::utils::error::Result;
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSide {
    Reference,
    Candidate,
}

/// Summary of how far apart two decoded images are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDiff {
    pub differing_pixels: u64,
    pub max_channel_delta: u8,
    pub dimensions_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Identical,
    Different(PixelDiff),
    /// One side could not be decoded; callers treat this as a difference.
    Undecodable(ImageSide),
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageComparator;

impl ImageComparator {
    pub fn new() -> Self {
        Self
    }

    pub fn identical(&self, reference: &[u8], candidate: &[u8]) -> bool {
        self.compare(reference, candidate).is_identical()
    }

    pub fn compare(&self, reference: &[u8], candidate: &[u8]) -> Comparison {
        let reference = match decode(reference) {
            Ok(img) => img,
            Err(e) => {
                tracing::debug!("Reference image failed to decode: {}", e);
                return Comparison::Undecodable(ImageSide::Reference);
            }
        };
        let candidate = match decode(candidate) {
            Ok(img) => img,
            Err(e) => {
                tracing::debug!("Candidate image failed to decode: {}", e);
                return Comparison::Undecodable(ImageSide::Candidate);
            }
        };

        if reference.dimensions() != candidate.dimensions() {
            return Comparison::Different(PixelDiff {
                differing_pixels: u64::from(candidate.width()) * u64::from(candidate.height()),
                max_channel_delta: u8::MAX,
                dimensions_match: false,
            });
        }

        let diff = absolute_difference(&reference, &candidate);
        if diff.differing_pixels == 0 {
            Comparison::Identical
        } else {
            Comparison::Different(diff)
        }
    }
}

fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

// 兩張圖尺寸必須相同
fn absolute_difference(a: &RgbaImage, b: &RgbaImage) -> PixelDiff {
    let mut differing_pixels = 0u64;
    let mut max_channel_delta = 0u8;

    for (pa, pb) in a.pixels().zip(b.pixels()) {
        let delta = pa
            .0
            .iter()
            .zip(pb.0.iter())
            .map(|(x, y)| x.abs_diff(*y))
            .max()
            .unwrap_or(0);
        if delta > 0 {
            differing_pixels += 1;
            max_channel_delta = max_channel_delta.max(delta);
        }
    }

    PixelDiff {
        differing_pixels,
        max_channel_delta,
        dimensions_match: true,
    }
}
