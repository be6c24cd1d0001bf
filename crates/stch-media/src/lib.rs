//! Pixel codec for form bitmaps.
//!
//! Form bits are a run-length stream of 32-bit words: a pixel count, then
//! runs whose header packs a length and one of four data codes. Integers
//! in that stream use a 1, 2 or 5 byte variable-length form.
//!
//! [`encode_pixels`] writes the whole image as one literal run, and
//! [`decode_pixels`] reads all four run codes.

pub mod error;
pub mod form;
pub mod runs;

pub use error::{MediaError, MediaResult};
pub use form::{form_from_pixels, pixels_from_form};
pub use runs::{decode_int, decode_pixels, encode_int, encode_pixels, MAX_PIXELS};
