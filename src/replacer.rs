use std::borrow::Cow;

use crate::regex::Captures;

/// Replacer describes types that can be used to replace matches in a string.
///
/// Strings are templates: `$n` and `${n}` expand to the text of group `n`
/// (empty if the group did not take part in the match) and `$$` is a literal
/// `$`. Closures compute the replacement from the [`Captures`] directly.
pub trait Replacer {
    /// Appends the replacement for one match to `dst`.
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String);

    /// The fixed replacement text, if it never refers to groups. Lets
    /// replacement skip computing captures.
    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        None
    }
}

impl<'a> Replacer for &'a str {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(*self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl<'a> Replacer for &'a String {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self.as_str(), dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl Replacer for String {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self.as_str(), dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl<'a> Replacer for Cow<'a, str> {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(&**self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl<F, T> Replacer for F
where
    F: FnMut(&Captures<'_>) -> T,
    T: AsRef<str>,
{
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        dst.push_str((*self)(caps).as_ref());
    }
}

/// A replacement string that is used as is, with no `$` expansion.
#[derive(Clone, Debug)]
pub struct NoExpand<'t>(pub &'t str);

impl<'t> Replacer for NoExpand<'t> {
    fn replace_append(&mut self, _: &Captures<'_>, dst: &mut String) {
        dst.push_str(self.0);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.0))
    }
}

fn no_expansion<T: AsRef<str>>(template: &T) -> Option<Cow<'_, str>> {
    let template = template.as_ref();
    if template.contains('$') {
        None
    } else {
        Some(Cow::Borrowed(template))
    }
}

/// One piece of a replacement template
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Piece<'t> {
    Literal(&'t str),
    Group(usize),
}

/// Splits a template into literal text and group references. A `$` that
/// does not start a valid reference is kept as literal text.
pub(crate) fn parse_template(template: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = template;
    while let Some(dollar) = rest.find('$') {
        if dollar > 0 {
            pieces.push(Piece::Literal(&rest[..dollar]));
        }
        let after = &rest[dollar + 1..];
        if let Some(tail) = after.strip_prefix('$') {
            pieces.push(Piece::Literal("$"));
            rest = tail;
            continue;
        }
        match group_ref(after) {
            Some((group, consumed)) => {
                pieces.push(Piece::Group(group));
                rest = &after[consumed..];
            }
            None => {
                pieces.push(Piece::Literal("$"));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    pieces
}

/// Parses `n` or `{n}` at the start of `text`.
fn group_ref(text: &str) -> Option<(usize, usize)> {
    if let Some(braced) = text.strip_prefix('{') {
        let close = braced.find('}')?;
        let group = braced[..close].parse().ok()?;
        return Some((group, close + 2));
    }
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let group = text[..digits].parse().ok()?;
    Some((group, digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        assert_eq!(
            parse_template("a$1b${2}c$$d"),
            vec![
                Piece::Literal("a"),
                Piece::Group(1),
                Piece::Literal("b"),
                Piece::Group(2),
                Piece::Literal("c"),
                Piece::Literal("$"),
                Piece::Literal("d"),
            ]
        );
    }

    #[test]
    fn test_invalid_references_stay_literal() {
        assert_eq!(
            parse_template("$x${y}$"),
            vec![
                Piece::Literal("$"),
                Piece::Literal("x"),
                Piece::Literal("$"),
                Piece::Literal("{y}"),
                Piece::Literal("$"),
            ]
        );
    }

    #[test]
    fn test_multi_digit_group() {
        assert_eq!(parse_template("$12"), vec![Piece::Group(12)]);
    }
}
