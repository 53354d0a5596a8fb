//! Character-level text decomposition for heading reveals.
//!
//! [`split_to_units`] is a pure function: it maps a string to ordered unit
//! descriptors and leaves materializing them to the caller (see
//! [`split_heading`](crate::split_heading)).
//!
//! Splitting happens on `char` boundaries, not grapheme clusters. A glyph
//! built from several code points (flags, combining accents, emoji with
//! modifiers) comes out as several units.

/// One character of a decomposed text, in reading order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextUnit {
    pub index: usize,
    pub text: String,
}

pub fn split_to_units(text: &str) -> Vec<TextUnit> {
    text.chars()
        .enumerate()
        .map(|(index, c)| TextUnit {
            index,
            text: c.to_string(),
        })
        .collect()
}

/// Concatenate units back into the text they came from.
pub fn join_units(units: &[TextUnit]) -> String {
    units.iter().map(|u| u.text.as_str()).collect()
}

/// Delay of unit `index` in a batch staggered by `stagger_ms`.
pub fn stagger_delay_ms(index: usize, stagger_ms: f32) -> f32 {
    index as f32 * stagger_ms
}
