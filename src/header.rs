use crate::{chunk::read_u32, DecodeError};
use core::convert::TryFrom;
use num_enum::TryFromPrimitive;

pub const IHDR_LENGTH: usize = 13;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, TryFromPrimitive)]
pub enum BitDepth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, TryFromPrimitive)]
pub enum ColorType {
    Grayscale = 0,
    Rgb = 2,
    Palette = 3,
    GrayscaleAlpha = 4,
    RgbAlpha = 6,
}

impl ColorType {
    /// Samples per pixel, `None` for indexed color.
    pub fn channels(&self) -> Option<usize> {
        match self {
            ColorType::Grayscale => Some(1),
            ColorType::Rgb => Some(3),
            ColorType::Palette => None,
            ColorType::GrayscaleAlpha => Some(2),
            ColorType::RgbAlpha => Some(4),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, TryFromPrimitive)]
pub enum CompressionMethod {
    Deflate = 0,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, TryFromPrimitive)]
pub enum FilterMethod {
    Adaptive = 0,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, TryFromPrimitive)]
pub enum InterlaceMethod {
    None = 0,
    Adam7 = 1,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, TryFromPrimitive)]
pub enum RenderingIntent {
    Perceptual = 0,
    RelativeColorimetric = 1,
    Saturation = 2,
    AbsoluteColorimetric = 3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub color_type: ColorType,
    pub channels: usize,
    pub compression_method: CompressionMethod,
    pub filter_method: FilterMethod,
    pub interlace_method: InterlaceMethod,
}

impl PngHeader {
    /// Parses and validates the 13 byte IHDR record.
    ///
    /// Only 8-bit, non-interlaced, non-indexed images make it through; the
    /// color type is rejected before a channel count is derived from it.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < IHDR_LENGTH {
            return Err(DecodeError::InvalidChunk);
        }

        let width = read_u32(data, 0);
        let height = read_u32(data, 4);

        let color_type =
            ColorType::try_from(data[9]).map_err(|_| DecodeError::InvalidColorType)?;
        let channels = color_type.channels().ok_or(DecodeError::NotSupportedInterlacedImage)?;

        let compression_method =
            CompressionMethod::try_from(data[10]).map_err(|_| DecodeError::WrongCompression)?;
        let filter_method =
            FilterMethod::try_from(data[11]).map_err(|_| DecodeError::InvalidFilterMethod)?;
        let interlace_method =
            InterlaceMethod::try_from(data[12]).map_err(|_| DecodeError::InvalidInterlaceMethod)?;
        if interlace_method != InterlaceMethod::None {
            return Err(DecodeError::NotSupportedInterlacedImage);
        }

        let bit_depth = BitDepth::try_from(data[8]).map_err(|_| DecodeError::InvalidBitDepth)?;
        if bit_depth != BitDepth::Eight {
            return Err(DecodeError::UnsupportedBitDepth);
        }

        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidDimensions);
        }

        Ok(PngHeader {
            width,
            height,
            bit_depth,
            color_type,
            channels,
            compression_method,
            filter_method,
            interlace_method,
        })
    }

    /// Bytes in one defiltered row.
    pub fn row_stride(&self) -> Result<usize, DecodeError> {
        (self.width as usize).checked_mul(self.channels).ok_or(DecodeError::IntegerOverflow)
    }

    /// Bytes in the decompressed scanline buffer, one filter byte per row included.
    pub fn scanline_data_len(&self) -> Result<usize, DecodeError> {
        self.row_stride()?
            .checked_add(1)
            .and_then(|filtered_row| filtered_row.checked_mul(self.height as usize))
            .ok_or(DecodeError::IntegerOverflow)
    }

    /// Capacity handed to the inflater, `(width + 1) * height * channels`.
    pub fn max_decompressed_len(&self) -> Result<usize, DecodeError> {
        (self.width as usize)
            .checked_add(1)
            .and_then(|len| len.checked_mul(self.height as usize))
            .and_then(|len| len.checked_mul(self.channels))
            .ok_or(DecodeError::IntegerOverflow)
    }

    pub fn image_len(&self) -> Result<usize, DecodeError> {
        self.row_stride()?.checked_mul(self.height as usize).ok_or(DecodeError::IntegerOverflow)
    }
}

/// Everything known about the image once IEND has been reached.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub color_type: ColorType,
    pub channels: usize,
    pub compression_method: CompressionMethod,
    pub filter_method: FilterMethod,
    pub interlace_method: InterlaceMethod,
    /// Raw gAMA value, the gamma times 100000.
    pub gamma: Option<u32>,
    /// Raw sRGB rendering intent byte.
    pub rendering_intent: Option<u8>,
}

impl ImageMetadata {
    pub(crate) fn new(
        header: &PngHeader,
        gamma: Option<u32>,
        rendering_intent: Option<u8>,
    ) -> Self {
        ImageMetadata {
            width: header.width,
            height: header.height,
            bit_depth: header.bit_depth,
            color_type: header.color_type,
            channels: header.channels,
            compression_method: header.compression_method,
            filter_method: header.filter_method,
            interlace_method: header.interlace_method,
            gamma,
            rendering_intent,
        }
    }

    pub fn gamma_value(&self) -> Option<f32> {
        self.gamma.map(|gamma| gamma as f32 / 100_000.0)
    }

    /// `None` if there was no sRGB chunk or its intent byte is out of range.
    pub fn srgb_intent(&self) -> Option<RenderingIntent> {
        self.rendering_intent.and_then(|intent| RenderingIntent::try_from(intent).ok())
    }
}
