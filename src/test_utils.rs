//! Builders for synthetic PNG streams.

use crate::{
    chunk::{checksum, PNG_MAGIC_BYTES},
    filter::{FilterType, Neighbors},
};
use alloc::vec::Vec;
use miniz_oxide::deflate::compress_to_vec_zlib;

/// An 8-bit, deflate, non-interlaced IHDR record.
pub fn ihdr_bytes(width: u32, height: u32, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = 8;
    data[9] = color_type;
    data
}

pub fn chunk_bytes(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() + 12);
    bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    bytes.extend_from_slice(tag);
    bytes.extend_from_slice(data);
    bytes.extend_from_slice(&checksum(&bytes[4..]).to_be_bytes());
    bytes
}

/// Filters `pixels` row by row, the inverse of what the decoder does.
/// `filters` is cycled over the rows.
pub fn filter_scanlines(
    pixels: &[u8],
    row_stride: usize,
    channels: usize,
    filters: &[FilterType],
) -> Vec<u8> {
    let mut scanlines = Vec::new();
    let mut previous_row: Option<&[u8]> = None;

    for (row, filter_type) in pixels.chunks_exact(row_stride).zip(filters.iter().cycle()) {
        scanlines.push(*filter_type as u8);

        for i in 0..row_stride {
            let neighbors = Neighbors::at(row, previous_row, i, channels);
            scanlines.push(row[i].wrapping_sub(filter_type.predict(neighbors)));
        }

        previous_row = Some(row);
    }

    scanlines
}

pub struct PngBuilder {
    bytes: Vec<u8>,
}

impl PngBuilder {
    pub fn new() -> Self {
        PngBuilder { bytes: PNG_MAGIC_BYTES.to_vec() }
    }

    pub fn chunk(mut self, tag: &[u8; 4], data: &[u8]) -> Self {
        self.bytes.extend_from_slice(&chunk_bytes(tag, data));
        self
    }

    pub fn header(self, width: u32, height: u32, color_type: u8) -> Self {
        self.chunk(b"IHDR", &ihdr_bytes(width, height, color_type))
    }

    /// Compresses `scanlines` and splits the zlib stream over `idat_count` IDAT chunks.
    pub fn image_data(mut self, scanlines: &[u8], idat_count: usize) -> Self {
        let compressed = compress_to_vec_zlib(scanlines, 6);
        let part_len = (compressed.len() + idat_count - 1) / idat_count;

        for part in compressed.chunks(part_len.max(1)) {
            self = self.chunk(b"IDAT", part);
        }
        self
    }

    pub fn end(self) -> Self {
        self.chunk(b"IEND", &[])
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A complete single-IDAT PNG holding `pixels`.
pub fn encode_png(
    width: u32,
    height: u32,
    color_type: u8,
    channels: usize,
    pixels: &[u8],
    filters: &[FilterType],
) -> Vec<u8> {
    let scanlines = filter_scanlines(pixels, width as usize * channels, channels, filters);

    PngBuilder::new().header(width, height, color_type).image_data(&scanlines, 1).end().build()
}

/// Deterministic, noisy pixel data so every filter has something to predict.
pub fn test_pixels(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491u32;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if i % 3 == 0 {
                (i % 251) as u8
            } else {
                state as u8
            }
        })
        .collect()
}
