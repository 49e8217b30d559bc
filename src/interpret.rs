use crate::{
    chunk::{read_u32, ChunkDescriptor, ChunkType},
    filter::defilter_image,
    header::{ImageMetadata, PngHeader},
    inflate::decompress,
    limits::Limits,
    try_zeroed, DecodeError, DecodedImage,
};
use alloc::vec::Vec;
use log::{debug, warn};

/// Applies chunks to the image being built, in file order.
pub(crate) struct ChunkInterpreter {
    limits: Limits,
    header: Option<PngHeader>,
    gamma: Option<u32>,
    rendering_intent: Option<u8>,
    compressed_data: Vec<u8>,
}

impl ChunkInterpreter {
    pub fn new(limits: Limits) -> Self {
        ChunkInterpreter {
            limits,
            header: None,
            gamma: None,
            rendering_intent: None,
            compressed_data: Vec::new(),
        }
    }

    /// Returns the decoded image once IEND has been interpreted.
    pub fn interpret(
        &mut self,
        input: &[u8],
        chunk: &ChunkDescriptor,
    ) -> Result<Option<DecodedImage>, DecodeError> {
        let data = chunk.data(input);

        match chunk.chunk_type {
            ChunkType::ImageHeader => self.read_header(data)?,
            ChunkType::ImageData => self.append_image_data(data)?,
            ChunkType::Palette => return Err(DecodeError::General),
            ChunkType::Gamma => {
                if data.len() < 4 {
                    return Err(DecodeError::InvalidChunk);
                }
                self.gamma = Some(read_u32(data, 0));
            },
            ChunkType::Srgb => {
                let intent = *data.first().ok_or(DecodeError::InvalidChunk)?;
                self.rendering_intent = Some(intent);
            },
            ChunkType::ImageEnd => return self.finish().map(Some),
            ChunkType::Unknown(tag) => {
                let tag = core::str::from_utf8(&tag).unwrap_or("????");
                warn!("skipping unrecognized chunk {}", tag);
            },
        }

        Ok(None)
    }

    fn read_header(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        if self.header.is_some() {
            return Err(DecodeError::DuplicateHeader);
        }

        let header = PngHeader::from_bytes(data)?;
        self.limits.check_dimensions(header.width, header.height)?;

        debug!(
            "IHDR: {}x{} {:?}, {} channel(s)",
            header.width, header.height, header.color_type, header.channels
        );

        self.header = Some(header);
        Ok(())
    }

    fn append_image_data(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        if self.header.is_none() {
            return Err(DecodeError::ImageDataBeforeHeader);
        }

        self.limits.reserve(data.len())?;
        self.compressed_data
            .try_reserve(data.len())
            .map_err(|_| DecodeError::AllocatingMemory)?;
        self.compressed_data.extend_from_slice(data);

        Ok(())
    }

    /// Inflates the accumulated IDAT payload and defilters it.
    fn finish(&mut self) -> Result<DecodedImage, DecodeError> {
        let header = self.header.as_ref().ok_or(DecodeError::ImageDataBeforeHeader)?;

        let capacity = header.max_decompressed_len()?;
        let expected = header.scanline_data_len()?;
        let image_len = header.image_len()?;

        debug!(
            "inflating {} bytes of IDAT data, up to {} bytes",
            self.compressed_data.len(),
            capacity
        );

        self.limits.reserve(capacity)?;
        let scanline_data = decompress(&self.compressed_data, capacity)?;

        if scanline_data.len() != expected {
            return Err(DecodeError::DecompressedSizeMismatch {
                expected,
                actual: scanline_data.len(),
            });
        }

        let compressed_len = self.compressed_data.len();
        self.compressed_data = Vec::new();
        self.limits.free(compressed_len);

        self.limits.reserve(image_len)?;
        let mut pixels = try_zeroed(image_len)?;
        defilter_image(header, &scanline_data, &mut pixels)?;

        drop(scanline_data);
        self.limits.free(capacity);

        debug!("defiltered {} rows into {} bytes", header.height, pixels.len());

        Ok(DecodedImage {
            metadata: ImageMetadata::new(header, self.gamma, self.rendering_intent),
            pixels,
        })
    }
}
