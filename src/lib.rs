//! A small PNG parser for 8-bit, non-interlaced grayscale and truecolor images.
//!
//! [`decode`] walks the chunk stream, checks every CRC, inflates the IDAT
//! payload and undoes the scanline filters, returning the raw samples with
//! one byte per channel and no padding between rows.
//!
//! ```no_run
//! # fn run(bytes: &[u8]) -> Result<(), png_parser::DecodeError> {
//! let image = png_parser::decode(bytes)?;
//! assert_eq!(
//!     image.pixels().len(),
//!     image.width() as usize * image.height() as usize * image.channels()
//! );
//! # Ok(())
//! # }
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(all(feature = "std", not(test)))]
extern crate std;

mod chunk;
mod error;
mod filter;
mod header;
mod inflate;
mod interpret;
mod limits;

#[cfg(test)]
mod test_utils;

pub use chunk::{checksum, ChunkDescriptor, ChunkType, PNG_MAGIC_BYTES};
pub use error::DecodeError;
pub use filter::FilterType;
pub use header::{
    BitDepth, ColorType, CompressionMethod, FilterMethod, ImageMetadata, InterlaceMethod,
    RenderingIntent,
};
pub use inflate::decompress;
pub use limits::Limits;

use alloc::vec::Vec;
use chunk::{check_signature, read_chunk_metadata, verify_crc};
use interpret::ChunkInterpreter;
use log::{debug, trace};

/// Pixels of a decoded image, `width * height * channels` bytes in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    metadata: ImageMetadata,
    pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    pub fn channels(&self) -> usize {
        self.metadata.channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

pub(crate) fn try_zeroed(len: usize) -> Result<Vec<u8>, DecodeError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| DecodeError::AllocatingMemory)?;
    buffer.resize(len, 0);
    Ok(buffer)
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum ChunkStage {
    Metadata,
    Crc,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum ParserState {
    Init,
    CheckingSignature,
    ReadingChunk(ChunkStage),
    ChunksRead,
    Done,
}

impl ParserState {
    /// The state after the work for `self` succeeded. `reached_end` is set
    /// once the chunk whose CRC was just checked is IEND.
    fn next(self, reached_end: bool) -> Self {
        match self {
            ParserState::Init => ParserState::CheckingSignature,
            ParserState::CheckingSignature => ParserState::ReadingChunk(ChunkStage::Metadata),
            ParserState::ReadingChunk(ChunkStage::Metadata) => {
                ParserState::ReadingChunk(ChunkStage::Crc)
            },
            ParserState::ReadingChunk(ChunkStage::Crc) if reached_end => ParserState::ChunksRead,
            ParserState::ReadingChunk(ChunkStage::Crc) => {
                ParserState::ReadingChunk(ChunkStage::Metadata)
            },
            ParserState::ChunksRead | ParserState::Done => ParserState::Done,
        }
    }
}

struct Parser<'a> {
    input: &'a [u8],
    state: ParserState,
    seek_offset: usize,
    current_chunk: Option<ChunkDescriptor>,
    chunks: Vec<ChunkDescriptor>,
    interpreter: ChunkInterpreter,
    image: Option<DecodedImage>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8], limits: Limits) -> Self {
        Parser {
            input,
            state: ParserState::Init,
            seek_offset: 0,
            current_chunk: None,
            chunks: Vec::new(),
            interpreter: ChunkInterpreter::new(limits),
            image: None,
        }
    }

    fn run_until(&mut self, target: ParserState) -> Result<(), DecodeError> {
        while self.state != target {
            self.step()?;
        }

        Ok(())
    }

    fn step(&mut self) -> Result<(), DecodeError> {
        let reached_end = match self.state {
            ParserState::Init => false,
            ParserState::CheckingSignature => {
                check_signature(self.input)?;
                self.seek_offset = PNG_MAGIC_BYTES.len();
                false
            },
            ParserState::ReadingChunk(ChunkStage::Metadata) => {
                self.current_chunk = Some(read_chunk_metadata(self.input, self.seek_offset)?);
                false
            },
            ParserState::ReadingChunk(ChunkStage::Crc) => match self.current_chunk.take() {
                Some(chunk) => {
                    verify_crc(self.input, &chunk)?;
                    trace!(
                        "chunk {:?} at offset {}, {} bytes",
                        chunk.chunk_type,
                        self.seek_offset,
                        chunk.length
                    );

                    self.chunks.try_reserve(1).map_err(|_| DecodeError::AllocatingMemory)?;
                    self.chunks.push(chunk);
                    self.seek_offset += chunk.byte_size();

                    chunk.chunk_type == ChunkType::ImageEnd
                },
                // Only reachable through a metadata read.
                None => return Err(DecodeError::InvalidChunk),
            },
            ParserState::ChunksRead => {
                self.interpret_chunks()?;
                false
            },
            ParserState::Done => false,
        };

        self.state = self.state.next(reached_end);
        Ok(())
    }

    fn interpret_chunks(&mut self) -> Result<(), DecodeError> {
        debug!("interpreting {} chunks", self.chunks.len());

        for chunk in &self.chunks {
            if let Some(image) = self.interpreter.interpret(self.input, chunk)? {
                self.image = Some(image);
                break;
            }
        }

        self.chunks = Vec::new();

        if self.image.is_none() {
            return Err(DecodeError::MissingBytes);
        }

        Ok(())
    }
}

/// Decodes a complete PNG file with the default [`Limits`].
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    decode_with_limits(bytes, Limits::default())
}

pub fn decode_with_limits(bytes: &[u8], limits: Limits) -> Result<DecodedImage, DecodeError> {
    let mut parser = Parser::new(bytes, limits);
    parser.run_until(ParserState::Done)?;

    parser.image.take().ok_or(DecodeError::MissingBytes)
}

/// Scans the chunk stream up to and including IEND, verifying every CRC,
/// without interpreting any chunk.
pub fn read_chunks(bytes: &[u8]) -> Result<Vec<ChunkDescriptor>, DecodeError> {
    let mut parser = Parser::new(bytes, Limits::default());
    parser.run_until(ParserState::ChunksRead)?;

    Ok(parser.chunks)
}
