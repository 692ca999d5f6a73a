//! Character sources the matcher can run against.
//!
//! The matcher addresses its input by char index, never by byte, so every
//! source must give constant-time access to the char at a given index.

/// Random access to a sequence of chars
pub trait CharIndexed {
    /// The number of chars in the input
    fn len(&self) -> usize;

    /// The char at `index`, or `None` past the end
    fn char_at(&self, index: usize) -> Option<char>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CharIndexed for [char] {
    fn len(&self) -> usize {
        <[char]>::len(self)
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.get(index).copied()
    }
}

impl CharIndexed for Vec<char> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.as_slice().get(index).copied()
    }
}

impl<T: CharIndexed + ?Sized> CharIndexed for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn char_at(&self, index: usize) -> Option<char> {
        (**self).char_at(index)
    }
}

/// A decoded `&str` that remembers where each char started, so that char
/// offsets reported by the matcher can be mapped back onto the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharVec {
    chars: Vec<char>,
    /// Byte offset of every char, plus the total length at the end
    offsets: Vec<usize>,
}

impl CharVec {
    pub fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            chars.push(c);
            offsets.push(offset);
        }
        offsets.push(text.len());
        CharVec { chars, offsets }
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    /// The byte offset of the char at `index`. `index == len()` maps to the
    /// end of the text.
    pub fn byte_offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// The char index starting at byte `offset`, if `offset` is a char
    /// boundary.
    pub fn char_index(&self, offset: usize) -> Option<usize> {
        self.offsets.binary_search(&offset).ok()
    }
}

impl CharIndexed for CharVec {
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }
}

impl From<&str> for CharVec {
    fn from(text: &str) -> Self {
        CharVec::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_access() {
        let chars = ['a', 'b'];
        let input: &[char] = &chars;
        assert_eq!(CharIndexed::len(input), 2);
        assert_eq!(input.char_at(1), Some('b'));
        assert_eq!(input.char_at(2), None);
        assert!(!CharIndexed::is_empty(input));
    }

    #[test]
    fn test_char_vec_offsets() {
        let text = CharVec::from("añb");
        assert_eq!(text.len(), 3);
        assert_eq!(text.char_at(1), Some('ñ'));
        assert_eq!(text.byte_offset(0), Some(0));
        assert_eq!(text.byte_offset(2), Some(3));
        assert_eq!(text.byte_offset(3), Some(4));
        assert_eq!(text.byte_offset(4), None);
        assert_eq!(text.char_index(3), Some(2));
        assert_eq!(text.char_index(2), None);
    }

    #[test]
    fn test_offsets_round_trip() {
        fn prop(text: String) -> bool {
            let chars = CharVec::new(&text);
            (0..=chars.len()).all(|i| {
                chars
                    .byte_offset(i)
                    .map_or(false, |offset| chars.char_index(offset) == Some(i))
            }) && chars.as_chars().iter().collect::<String>() == text
        }
        quickcheck::quickcheck(prop as fn(String) -> bool);
    }

    #[test]
    fn test_empty() {
        let text = CharVec::new("");
        assert!(text.is_empty());
        assert_eq!(text.byte_offset(0), Some(0));
    }
}
