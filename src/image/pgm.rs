//! Binary PGM (`P5`) raster decoding and encoding.
//!
//! The header is `P5`, width, height and maxval separated by whitespace, with
//! `#` comments running to the end of a line allowed between tokens. Exactly
//! one whitespace byte separates maxval from the raster. Samples are one byte
//! when `maxval < 256` and two bytes, most significant first, otherwise. All
//! samples are divided by maxval into the canonical `[0, 1]` domain.
//!
//! The byte order of 16-bit samples follows Netpbm (big-endian). Rasters
//! written by firmware that dumps 16-bit samples in native little-endian order
//! decode with swapped bytes and have to be re-encoded first.

use crate::image::Image;
use crate::util::alloc::{grid_len, try_with_capacity};
use crate::util::{KickerError, KickerResult};

const MAGIC: &[u8] = b"P5";

/// Parsed PGM header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PgmHeader {
    pub width: usize,
    pub height: usize,
    pub max_value: u16,
}

impl PgmHeader {
    /// Bytes per sample in the raster.
    pub fn sample_bytes(&self) -> usize {
        if self.max_value < 256 {
            1
        } else {
            2
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Skips whitespace and comment lines between header tokens.
    fn skip_separators(&mut self) {
        loop {
            while self
                .bytes
                .get(self.pos)
                .is_some_and(|b| b.is_ascii_whitespace())
            {
                self.pos += 1;
            }
            if self.bytes.get(self.pos) != Some(&b'#') {
                return;
            }
            while let Some(&b) = self.bytes.get(self.pos) {
                self.pos += 1;
                if b == b'\n' || b == b'\r' {
                    break;
                }
            }
        }
    }

    fn token(&mut self) -> KickerResult<&'a [u8]> {
        self.skip_separators();
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'#')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(KickerError::decode("truncated header"));
        }
        Ok(&self.bytes[start..self.pos])
    }

    fn number(&mut self, what: &str) -> KickerResult<usize> {
        let token = self.token()?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| KickerError::decode(format!("invalid {what} in header")))
    }
}

/// Parses the header and returns it with the offset of the first sample.
pub fn decode_header(bytes: &[u8]) -> KickerResult<(PgmHeader, usize)> {
    let mut cursor = Cursor { bytes, pos: 0 };
    if cursor.token()? != MAGIC {
        return Err(KickerError::decode("not a binary PGM (expected P5)"));
    }
    let width = cursor.number("width")?;
    let height = cursor.number("height")?;
    let max_value = cursor.number("maxval")?;
    if width == 0 || height == 0 {
        return Err(KickerError::decode(format!(
            "zero-sized raster {width}x{height}"
        )));
    }
    if max_value == 0 || max_value > usize::from(u16::MAX) {
        return Err(KickerError::decode(format!("maxval {max_value} out of range")));
    }
    match bytes.get(cursor.pos) {
        Some(b) if b.is_ascii_whitespace() => cursor.pos += 1,
        _ => return Err(KickerError::decode("missing separator before raster")),
    }
    let header = PgmHeader {
        width,
        height,
        max_value: max_value as u16,
    };
    Ok((header, cursor.pos))
}

/// Decodes a binary PGM into a normalized image.
pub fn decode(bytes: &[u8]) -> KickerResult<Image> {
    let (header, offset) = decode_header(bytes)?;
    let count = grid_len(header.width, header.height)?;
    let needed = count
        .checked_mul(header.sample_bytes())
        .ok_or_else(|| KickerError::decode("raster size overflows"))?;
    let raster = bytes
        .get(offset..)
        .filter(|raster| raster.len() >= needed)
        .ok_or_else(|| {
            KickerError::decode(format!(
                "truncated raster: expected {needed} bytes, got {}",
                bytes.len().saturating_sub(offset)
            ))
        })?;

    if header.sample_bytes() == 1 {
        Image::from_u8(
            &raster[..needed],
            header.width,
            header.height,
            header.max_value as u8,
        )
    } else {
        let mut samples = try_with_capacity(count)?;
        samples.extend(
            raster[..needed]
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]])),
        );
        Image::from_u16(&samples, header.width, header.height, header.max_value)
    }
}

/// Encodes 8-bit samples as a binary PGM with maxval 255.
pub fn encode_u8(data: &[u8], width: usize, height: usize) -> KickerResult<Vec<u8>> {
    let count = grid_len(width, height)?;
    if data.len() != count {
        return Err(KickerError::BufferTooSmall {
            needed: count,
            got: data.len(),
        });
    }
    let mut out = format!("P5\n{width} {height}\n255\n").into_bytes();
    out.extend_from_slice(data);
    Ok(out)
}

/// Encodes 16-bit samples as a binary PGM with the given maxval.
pub fn encode_u16(
    data: &[u16],
    width: usize,
    height: usize,
    max_value: u16,
) -> KickerResult<Vec<u8>> {
    let count = grid_len(width, height)?;
    if data.len() != count {
        return Err(KickerError::BufferTooSmall {
            needed: count,
            got: data.len(),
        });
    }
    if max_value < 256 {
        return Err(KickerError::config("16-bit PGM requires maxval >= 256"));
    }
    let mut out = format!("P5\n{width} {height}\n{max_value}\n").into_bytes();
    for &v in data {
        out.extend_from_slice(&v.min(max_value).to_be_bytes());
    }
    Ok(out)
}

/// Encodes a normalized image as an 8-bit binary PGM.
pub fn encode_image(image: &Image) -> KickerResult<Vec<u8>> {
    encode_u8(&image.to_u8(), image.width(), image.height())
}
