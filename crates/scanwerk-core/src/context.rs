// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Image context: geometry and encoding of the image in flight.

use serde::{Deserialize, Serialize};

/// Pixel encoding of the octet stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelType {
    /// 1 bit per pixel, packed MSB first.
    Mono,
    Gray8,
    Gray16,
    Rgb8,
    Rgb16,
}

impl PixelType {
    /// Bits per pixel for this encoding.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelType::Mono => 1,
            PixelType::Gray8 => 8,
            PixelType::Gray16 => 16,
            PixelType::Rgb8 => 24,
            PixelType::Rgb16 => 48,
        }
    }
}

/// Physical orientation of the image as it leaves the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Geometry and encoding of the image currently flowing through the
/// pipeline.
///
/// The producer mutates this as it learns more about the image (sheet-fed
/// devices often discover the true height only at the end); consumers read
/// it to interpret incoming octets.  An instance flows with every marker
/// transition and is stale once `END_OF_IMAGE` has been emitted.
///
/// A `height` of zero means the extent is not yet known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Pixels per scan line.
    pub width: u32,
    /// Scan lines per image (zero when not yet known).
    pub height: u32,
    /// Pixel encoding of the payload octets.
    pub pixel_type: PixelType,
    /// Padding octets appended to every scan line.
    pub padding_line: u32,
    /// Padding octets appended to the whole image.
    pub padding_image: u32,
    /// Horizontal resolution in dots per inch.
    pub x_resolution: u32,
    /// Vertical resolution in dots per inch.
    pub y_resolution: u32,
    /// Orientation of the image on the media.
    pub orientation: Orientation,
    /// Octets produced so far for the current image (payload + padding).
    pub octets_seen: u64,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(0, 0, PixelType::Gray8)
    }
}

impl Context {
    pub fn new(width: u32, height: u32, pixel_type: PixelType) -> Self {
        Self {
            width,
            height,
            pixel_type,
            padding_line: 0,
            padding_image: 0,
            x_resolution: 300,
            y_resolution: 300,
            orientation: Orientation::default(),
            octets_seen: 0,
        }
    }

    /// Payload octets per scan line, excluding padding.
    pub fn payload_line_octets(&self) -> u64 {
        let bits = u64::from(self.width) * u64::from(self.pixel_type.bits_per_pixel());
        bits.div_ceil(8)
    }

    /// Octets per scan line as transferred, including padding.
    pub fn line_octets(&self) -> u64 {
        self.payload_line_octets() + u64::from(self.padding_line)
    }

    /// Payload octets per image, excluding all padding.  `None` while the
    /// height is unknown.
    pub fn payload_octets(&self) -> Option<u64> {
        (self.height > 0).then(|| self.payload_line_octets() * u64::from(self.height))
    }

    /// Total octets per image as transferred, including line and image
    /// padding.  `None` while the height is unknown.
    pub fn image_octets(&self) -> Option<u64> {
        (self.height > 0)
            .then(|| self.line_octets() * u64::from(self.height) + u64::from(self.padding_image))
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Line octet math, including the packed-mono rounding case.
    #[test]
    fn line_octets_per_pixel_type() {
        let mut ctx = Context::new(100, 10, PixelType::Gray8);
        assert_eq!(ctx.payload_line_octets(), 100);

        ctx.pixel_type = PixelType::Rgb8;
        assert_eq!(ctx.payload_line_octets(), 300);

        ctx.pixel_type = PixelType::Rgb16;
        assert_eq!(ctx.payload_line_octets(), 600);

        // 100 bits packed into 13 octets.
        ctx.pixel_type = PixelType::Mono;
        assert_eq!(ctx.payload_line_octets(), 13);
    }

    /// Padding contributes to transfer totals but not to payload totals.
    #[test]
    fn padding_counts_toward_transfer_size_only() {
        let mut ctx = Context::new(64, 4, PixelType::Gray8);
        ctx.padding_line = 8;
        ctx.padding_image = 16;

        assert_eq!(ctx.payload_octets(), Some(256));
        assert_eq!(ctx.image_octets(), Some((64 + 8) * 4 + 16));
    }

    /// An unknown height leaves the image totals undetermined.
    #[test]
    fn unknown_height_has_no_image_total() {
        let ctx = Context::new(64, 0, PixelType::Gray8);
        assert_eq!(ctx.payload_octets(), None);
        assert_eq!(ctx.image_octets(), None);
        // Per-line math still works.
        assert_eq!(ctx.line_octets(), 64);
    }
}
