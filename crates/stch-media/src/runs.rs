//! Variable-length integers and the run-length pixel stream of form bits.
//!
//! The encoder always writes one literal run. The decoder also reads the
//! skip, byte-fill and word-fill runs found in existing files.

use stch_types::{WireReader, WireWriter};
use tracing::trace;

use crate::error::{MediaError, MediaResult};

/// Largest pixel count accepted in either direction.
pub const MAX_PIXELS: usize = 1 << 26;

const TWO_BYTE_LIMIT: u32 = 30 * 256 + 255;

const CODE_SKIP: u32 = 0;
const CODE_BYTE: u32 = 1;
const CODE_WORD: u32 = 2;
const CODE_LITERAL: u32 = 3;

/// Variable-length integer: one byte below 224, two bytes up to 7935,
/// otherwise `255` followed by a big-endian `u32`.
pub fn encode_int(value: i64) -> MediaResult<Vec<u8>> {
    let mut out = WireWriter::new();
    write_int(&mut out, value)?;
    Ok(out.into_bytes())
}

fn write_int(out: &mut WireWriter, value: i64) -> MediaResult<()> {
    if value < 0 {
        return Err(MediaError::NegativeInteger(value));
    }
    let v = u32::try_from(value).map_err(|_| MediaError::IntegerTooLarge(value))?;
    if v < 224 {
        out.write_u8(v as u8);
    } else if v <= TWO_BYTE_LIMIT {
        out.write_u8((224 + v / 256) as u8);
        out.write_u8((v % 256) as u8);
    } else {
        out.write_u8(255);
        out.write_u32(v);
    }
    Ok(())
}

pub fn decode_int(reader: &mut WireReader<'_>) -> MediaResult<u32> {
    let first = reader.read_u8()? as u32;
    match first {
        0..=223 => Ok(first),
        224..=254 => Ok((first - 224) * 256 + reader.read_u8()? as u32),
        _ => Ok(reader.read_u32()?),
    }
}

fn check_count(count: usize) -> MediaResult<()> {
    if count > MAX_PIXELS {
        return Err(MediaError::TooManyPixels(count));
    }
    Ok(())
}

fn write_run_header(out: &mut WireWriter, len: usize, code: u32) -> MediaResult<()> {
    check_count(len)?;
    write_int(out, (len as i64) << 2 | code as i64)
}

/// Pixel count followed by a single literal run of every word.
pub fn encode_pixels(pixels: &[u32]) -> MediaResult<Vec<u8>> {
    check_count(pixels.len())?;
    let mut out = WireWriter::with_capacity(pixels.len() * 4 + 10);
    write_int(&mut out, pixels.len() as i64)?;
    write_run_header(&mut out, pixels.len(), CODE_LITERAL)?;
    for pixel in pixels {
        out.write_u32(*pixel);
    }
    Ok(out.into_bytes())
}

/// Decode a pixel stream. Skipped runs leave zero words.
pub fn decode_pixels(bytes: &[u8]) -> MediaResult<Vec<u32>> {
    let mut reader = WireReader::new(bytes);
    let count = decode_int(&mut reader)? as usize;
    check_count(count)?;

    let mut pixels = vec![0u32; count];
    let mut i = 0;
    while i < count {
        let offset = reader.position();
        let header = decode_int(&mut reader)?;
        let run = (header >> 2) as usize;
        if run > count - i {
            return Err(MediaError::RunOverflow {
                offset,
                run,
                remaining: count - i,
            });
        }
        let target = &mut pixels[i..i + run];
        match header & 3 {
            CODE_SKIP => {}
            CODE_BYTE => {
                let byte = reader.read_u8()?;
                target.fill(u32::from_be_bytes([byte; 4]));
            }
            CODE_WORD => {
                let word = reader.read_u32()?;
                target.fill(word);
            }
            _ => {
                for pixel in target.iter_mut() {
                    *pixel = reader.read_u32()?;
                }
            }
        }
        i += run;
    }
    trace!(pixels = count, bytes = reader.position(), "decoded pixels");
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_boundaries() {
        assert_eq!(encode_int(0).unwrap(), vec![0]);
        assert_eq!(encode_int(223).unwrap(), vec![223]);
        assert_eq!(encode_int(224).unwrap(), vec![224, 0]);
        assert_eq!(encode_int(300).unwrap(), vec![225, 44]);
        assert_eq!(encode_int(7935).unwrap(), vec![254, 255]);
        assert_eq!(encode_int(7936).unwrap(), vec![255, 0, 0, 0x1F, 0x00]);
        assert_eq!(
            encode_int(100_000).unwrap(),
            vec![255, 0x00, 0x01, 0x86, 0xA0]
        );
    }

    #[test]
    fn negative_int_is_rejected() {
        assert_eq!(encode_int(-1), Err(MediaError::NegativeInteger(-1)));
        assert_eq!(
            encode_int(1 << 40),
            Err(MediaError::IntegerTooLarge(1 << 40))
        );
    }

    #[test]
    fn single_pixel_literal() {
        assert_eq!(
            encode_pixels(&[0x11223344]).unwrap(),
            vec![1, 7, 0x11, 0x22, 0x33, 0x44]
        );
    }

    #[test]
    fn empty_image() {
        let bytes = encode_pixels(&[]).unwrap();
        assert_eq!(bytes, vec![0, 3]);
        assert!(decode_pixels(&bytes).unwrap().is_empty());
    }

    #[test]
    fn decodes_every_run_code() {
        // 6 pixels: skip 1, byte-run 2, word-run 1, literal 2
        let bytes = [
            6,
            1 << 2,
            2 << 2 | 1,
            0xAB,
            1 << 2 | 2,
            0x01,
            0x02,
            0x03,
            0x04,
            2 << 2 | 3,
            0,
            0,
            0,
            9,
            0xFF,
            0xFF,
            0xFF,
            0xFF,
        ];
        assert_eq!(
            decode_pixels(&bytes).unwrap(),
            vec![0, 0xABABABAB, 0xABABABAB, 0x01020304, 9, 0xFFFFFFFF]
        );
    }

    #[test]
    fn run_past_end_is_rejected() {
        let bytes = [1, 2 << 2 | 2, 0, 0, 0, 0];
        assert!(matches!(
            decode_pixels(&bytes),
            Err(MediaError::RunOverflow { run: 2, remaining: 1, .. })
        ));
    }

    #[test]
    fn truncated_stream_is_rejected() {
        assert!(matches!(decode_pixels(&[2, 11, 0, 0]), Err(MediaError::Wire(_))));
    }

    proptest! {
        #[test]
        fn literal_round_trip(pixels in prop::collection::vec(any::<u32>(), 0..300)) {
            prop_assert_eq!(decode_pixels(&encode_pixels(&pixels).unwrap()).unwrap(), pixels);
        }

        #[test]
        fn int_round_trip(v in 0i64..=u32::MAX as i64) {
            let bytes = encode_int(v).unwrap();
            let mut reader = WireReader::new(&bytes);
            prop_assert_eq!(decode_int(&mut reader).unwrap() as i64, v);
            prop_assert!(reader.is_empty());
        }
    }
}
