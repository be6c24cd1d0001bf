//! The fixed class identifier table.
//!
//! Every value in a stream starts with one of these bytes. Identifiers
//! 100 and up belong to user records; [`BACK_REFERENCE`] is not a class at
//! all and introduces a 24-bit position into the reference table.

pub const NIL: u8 = 1;
pub const TRUE: u8 = 2;
pub const FALSE: u8 = 3;
pub const SMALL_INTEGER: u8 = 4;
pub const SMALL_INTEGER_16: u8 = 5;
pub const LARGE_POSITIVE_INTEGER: u8 = 6;
pub const LARGE_NEGATIVE_INTEGER: u8 = 7;
pub const FLOAT: u8 = 8;

pub const STRING: u8 = 9;
pub const SYMBOL: u8 = 10;
pub const BYTE_ARRAY: u8 = 11;
pub const SOUND_BUFFER: u8 = 12;
pub const BITMAP: u8 = 13;
pub const UTF8: u8 = 14;

pub const ARRAY: u8 = 20;
pub const ORDERED_COLLECTION: u8 = 21;
pub const SET: u8 = 22;
pub const IDENTITY_SET: u8 = 23;
pub const DICTIONARY: u8 = 24;
pub const IDENTITY_DICTIONARY: u8 = 25;

pub const COLOR: u8 = 30;
pub const TRANSLUCENT_COLOR: u8 = 31;
pub const POINT: u8 = 32;
pub const RECTANGLE: u8 = 33;
pub const FORM: u8 = 34;
pub const COLOR_FORM: u8 = 35;

/// Marker byte for a back-reference.
pub const BACK_REFERENCE: u8 = 99;

/// First identifier available to user records.
pub const FIRST_USER_CLASS: u8 = 100;

/// Name of a fixed-format class, or `None` for unassigned and user ids.
pub fn name(id: u8) -> Option<&'static str> {
    let name = match id {
        NIL => "Nil",
        TRUE => "True",
        FALSE => "False",
        SMALL_INTEGER => "SmallInteger",
        SMALL_INTEGER_16 => "SmallInteger16",
        LARGE_POSITIVE_INTEGER => "LargePositiveInteger",
        LARGE_NEGATIVE_INTEGER => "LargeNegativeInteger",
        FLOAT => "Float",
        STRING => "String",
        SYMBOL => "Symbol",
        BYTE_ARRAY => "ByteArray",
        SOUND_BUFFER => "SoundBuffer",
        BITMAP => "Bitmap",
        UTF8 => "UTF8",
        ARRAY => "Array",
        ORDERED_COLLECTION => "OrderedCollection",
        SET => "Set",
        IDENTITY_SET => "IdentitySet",
        DICTIONARY => "Dictionary",
        IDENTITY_DICTIONARY => "IdentityDictionary",
        COLOR => "Color",
        TRANSLUCENT_COLOR => "TranslucentColor",
        POINT => "Point",
        RECTANGLE => "Rectangle",
        FORM => "Form",
        COLOR_FORM => "ColorForm",
        _ => return None,
    };
    Some(name)
}

/// Whether values of this class are written inline and never shared.
pub fn is_inline(id: u8) -> bool {
    (NIL..=FLOAT).contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_range() {
        assert!(is_inline(NIL));
        assert!(is_inline(FLOAT));
        assert!(!is_inline(STRING));
        assert!(!is_inline(FIRST_USER_CLASS));
    }

    #[test]
    fn names_cover_fixed_formats() {
        assert_eq!(name(UTF8), Some("UTF8"));
        assert_eq!(name(COLOR_FORM), Some("ColorForm"));
        assert_eq!(name(BACK_REFERENCE), None);
        assert_eq!(name(15), None);
        assert_eq!(name(124), None);
    }
}
