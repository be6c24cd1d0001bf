use stch_object::{Form, Object, ObjectGraph, Value};

use crate::error::{MediaError, MediaResult};
use crate::runs::{decode_pixels, encode_pixels};

fn dimension(value: i64) -> MediaResult<i16> {
    i16::try_from(value)
        .ok()
        .filter(|d| *d >= 0)
        .ok_or(MediaError::InvalidDimension(value))
}

/// Build a 32-bit-deep form whose bits are the literal encoding of `pixels`.
pub fn form_from_pixels(
    graph: &mut ObjectGraph,
    width: i64,
    height: i64,
    pixels: &[u32],
) -> MediaResult<Value> {
    let w = dimension(width)?;
    let h = dimension(height)?;
    if (w as usize) * (h as usize) != pixels.len() {
        return Err(MediaError::DimensionMismatch {
            width,
            height,
            pixels: pixels.len(),
        });
    }
    let bits = graph.byte_array(encode_pixels(pixels)?);
    Ok(graph.insert(Form::new(w, h, 32, bits)))
}

/// Decode the pixels of a 32-bit-deep form.
pub fn pixels_from_form(graph: &ObjectGraph, form: &Value) -> MediaResult<Vec<u32>> {
    let form = graph
        .object(form)
        .and_then(Object::as_form)
        .ok_or(MediaError::NotAForm)?;
    if form.depth() != 32 {
        return Err(MediaError::UnsupportedDepth(form.depth()));
    }
    let bits = graph
        .object(form.bits().get()?)
        .and_then(Object::as_bytes)
        .ok_or(MediaError::NotAForm)?;
    let pixels = decode_pixels(bits.data())?;

    let expected = form.width().max(0) as usize * form.height().max(0) as usize;
    if pixels.len() != expected {
        return Err(MediaError::DimensionMismatch {
            width: form.width() as i64,
            height: form.height() as i64,
            pixels: pixels.len(),
        });
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pixel_form() {
        let mut graph = ObjectGraph::new();
        let form = form_from_pixels(&mut graph, 1, 1, &[0]).unwrap();

        let object = graph.object(&form).and_then(Object::as_form).unwrap();
        assert_eq!((object.width(), object.height(), object.depth()), (1, 1, 32));
        assert_eq!(object.offset().get().unwrap(), &Value::Nil);

        let bits = graph
            .object(object.bits().get().unwrap())
            .and_then(Object::as_bytes)
            .unwrap();
        assert_eq!(bits.data(), &[1, 7, 0, 0, 0, 0]);
        assert_eq!(pixels_from_form(&graph, &form).unwrap(), vec![0]);
    }

    #[test]
    fn pixel_count_must_match() {
        let mut graph = ObjectGraph::new();
        assert!(matches!(
            form_from_pixels(&mut graph, 2, 2, &[0, 0, 0]),
            Err(MediaError::DimensionMismatch { pixels: 3, .. })
        ));
        assert_eq!(
            form_from_pixels(&mut graph, 40_000, 1, &[]),
            Err(MediaError::InvalidDimension(40_000))
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn non_forms_are_rejected() {
        let mut graph = ObjectGraph::new();
        let text = graph.utf8("nope");
        assert_eq!(pixels_from_form(&graph, &text), Err(MediaError::NotAForm));
        assert_eq!(pixels_from_form(&graph, &Value::Nil), Err(MediaError::NotAForm));
    }

    #[test]
    fn other_depths_are_unsupported() {
        let mut graph = ObjectGraph::new();
        let form = graph.insert(Form::new(1, 1, 8, Value::Nil));
        assert_eq!(
            pixels_from_form(&graph, &form),
            Err(MediaError::UnsupportedDepth(8))
        );
    }
}
