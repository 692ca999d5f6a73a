use crate::syntax::{CompileOptions, Syntax};

/// A POSIX named character class, as written inside `[[:name:]]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PosixClass {
    Alnum,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Xdigit,
    /// Word characters, as matched by `\w`. Not nameable in brackets.
    Word,
}

impl PosixClass {
    /// Look up a class by the name used inside `[: :]`
    pub fn from_name(name: &str) -> Option<PosixClass> {
        let class = match name {
            "alnum" => PosixClass::Alnum,
            "alpha" => PosixClass::Alpha,
            "blank" => PosixClass::Blank,
            "cntrl" => PosixClass::Cntrl,
            "digit" => PosixClass::Digit,
            "graph" => PosixClass::Graph,
            "lower" => PosixClass::Lower,
            "print" => PosixClass::Print,
            "punct" => PosixClass::Punct,
            "space" => PosixClass::Space,
            "upper" => PosixClass::Upper,
            "xdigit" => PosixClass::Xdigit,
            _ => return None,
        };
        Some(class)
    }

    /// Whether `c` belongs to the class. Under `icase`, `lower` and `upper`
    /// both accept any cased letter. Digits are ASCII only, so `alnum` is
    /// `alpha` plus `0` to `9`.
    pub fn matches(&self, c: char, icase: bool) -> bool {
        match self {
            PosixClass::Alnum => c.is_alphabetic() || c.is_ascii_digit(),
            PosixClass::Alpha => c.is_alphabetic(),
            PosixClass::Blank => c == ' ' || c == '\t',
            PosixClass::Cntrl => c.is_control(),
            PosixClass::Digit => c.is_ascii_digit(),
            PosixClass::Graph => !c.is_control() && !c.is_whitespace(),
            PosixClass::Lower => c.is_lowercase() || (icase && c.is_uppercase()),
            PosixClass::Print => !c.is_control(),
            PosixClass::Punct => c.is_ascii_punctuation(),
            PosixClass::Space => c.is_whitespace(),
            PosixClass::Upper => c.is_uppercase() || (icase && c.is_lowercase()),
            PosixClass::Xdigit => c.is_ascii_hexdigit(),
            PosixClass::Word => is_word_char(c),
        }
    }
}

/// Which side of a word a boundary assertion looks for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Either edge of a word (`\b`)
    Both,
    /// The start of a word (`\<`)
    Begin,
    /// The end of a word (`\>`)
    End,
}

/// A repetition of one token between `min` and `max` times
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repeat {
    pub token: Token,
    pub min: u32,
    /// `None` means unbounded
    pub max: Option<u32>,
    /// Prefer fewer repetitions
    pub stingy: bool,
}

/// A compiled matching unit. Each token owns its children, so a compiled tree
/// is acyclic and can be shared read-only between searches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A literal character
    Char { ch: char, icase: bool },
    /// An inclusive character range from a bracket expression
    Range { lo: char, hi: char, icase: bool },
    /// A named class, or a `\d`, `\s` or `\w` shorthand
    Class {
        class: PosixClass,
        negated: bool,
        icase: bool,
    },
    /// A bracket expression
    OneOf {
        items: Vec<Token>,
        negated: bool,
        /// A negated set that never matches `\n`
        excludes_newline: bool,
    },
    /// `.`
    Any { newline: bool, null: bool },
    /// `^` or `\A`. Carries the line separator in multi-line mode.
    Start { line_sep: Option<String> },
    /// `$` or `\Z`
    End { line_sep: Option<String> },
    /// `\b`, `\B`, `\<` or `\>`
    WordBoundary { kind: Boundary, negated: bool },
    /// `\1` through `\9`
    BackRef {
        group: usize,
        icase: bool,
        /// Known minimum length of the referenced group, or 0
        min_len: usize,
    },
    Repeated(Box<Repeat>),
    /// A parenthesized subexpression; `index` is `None` for `(?:...)`
    Group {
        body: Box<Token>,
        index: Option<usize>,
    },
    /// `(?=...)` or `(?!...)`
    LookAhead { body: Box<Token>, negated: bool },
    Sequence(Vec<Token>),
    /// Ordered branches, tried first to last
    Alternation(Vec<Token>),
}

impl Token {
    /// The minimum number of characters this token consumes on any match.
    pub fn min_len(&self) -> usize {
        match self {
            Token::Char { .. }
            | Token::Range { .. }
            | Token::Class { .. }
            | Token::OneOf { .. }
            | Token::Any { .. } => 1,
            Token::Start { .. }
            | Token::End { .. }
            | Token::WordBoundary { .. }
            | Token::LookAhead { .. } => 0,
            Token::BackRef { min_len, .. } => *min_len,
            Token::Repeated(repeat) => {
                repeat.token.min_len().saturating_mul(repeat.min as usize)
            }
            Token::Group { body, .. } => body.min_len(),
            Token::Sequence(tokens) => tokens
                .iter()
                .fold(0usize, |acc, t| acc.saturating_add(t.min_len())),
            Token::Alternation(branches) => {
                branches.iter().map(Token::min_len).min().unwrap_or(0)
            }
        }
    }

    /// Zero-width assertions, which can never be repeated on their own.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Token::Start { .. }
                | Token::End { .. }
                | Token::WordBoundary { .. }
                | Token::LookAhead { .. }
        )
    }

    /// Tokens that always consume exactly one character.
    pub fn is_single_char(&self) -> bool {
        matches!(
            self,
            Token::Char { .. }
                | Token::Range { .. }
                | Token::Class { .. }
                | Token::OneOf { .. }
                | Token::Any { .. }
        )
    }

    /// Whether a single-character token accepts `c`. Always false for every
    /// other kind of token.
    pub fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Char { ch, icase } => c == *ch || (*icase && eq_ignore_case(c, *ch)),
            Token::Range { lo, hi, icase } => {
                let within = |x: char| *lo <= x && x <= *hi;
                within(c) || (*icase && (within(simple_upper(c)) || within(simple_lower(c))))
            }
            Token::Class {
                class,
                negated,
                icase,
            } => class.matches(c, *icase) != *negated,
            Token::OneOf {
                items,
                negated,
                excludes_newline,
            } => {
                if *excludes_newline && c == '\n' {
                    return false;
                }
                items.iter().any(|item| item.matches_char(c)) != *negated
            }
            Token::Any { newline, null } => {
                (*newline || c != '\n') && (*null || c != '\0')
            }
            _ => false,
        }
    }
}

/// A compiled pattern: the token tree rooted at group 0 plus what the matcher
/// needs to know about it.
#[derive(Clone, Debug)]
pub struct Program {
    pub(crate) pattern: String,
    pub(crate) root: Token,
    pub(crate) group_count: usize,
    pub(crate) min_len: usize,
    pub(crate) syntax: Syntax,
    pub(crate) options: CompileOptions,
}

impl Program {
    /// The number of groups, counting group 0 (the whole match).
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// The minimum length of any match.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// The pattern text this program was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The root of the token tree, always a capturing group with index 0.
    pub fn root(&self) -> &Token {
        &self.root
    }
}

/// Word characters for `\w`, `\b`, `\<` and `\>`.
pub(crate) fn is_word_char(c: char) -> bool {
    regex_syntax::is_word_character(c)
}

// Case toggling only when the mapping is a single char.
pub(crate) fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

pub(crate) fn simple_lower(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

pub(crate) fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || simple_upper(a) == simple_upper(b) || simple_lower(a) == simple_lower(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(c: char) -> Token {
        Token::Char {
            ch: c,
            icase: false,
        }
    }

    #[test]
    fn test_min_len() {
        let seq = Token::Sequence(vec![ch('a'), ch('b'), Token::Start { line_sep: None }]);
        assert_eq!(seq.min_len(), 2);

        let alt = Token::Alternation(vec![ch('a'), Token::Sequence(vec![])]);
        assert_eq!(alt.min_len(), 0);

        let repeat = Token::Repeated(Box::new(Repeat {
            token: Token::Sequence(vec![ch('a'), ch('b')]),
            min: 3,
            max: None,
            stingy: false,
        }));
        assert_eq!(repeat.min_len(), 6);
    }

    #[test]
    fn test_assertions() {
        assert!(Token::End { line_sep: None }.is_assertion());
        assert!(Token::WordBoundary {
            kind: Boundary::Begin,
            negated: false
        }
        .is_assertion());
        assert!(!ch('a').is_assertion());
        assert!(!Token::BackRef {
            group: 1,
            icase: false,
            min_len: 0
        }
        .is_assertion());
    }

    #[test]
    fn test_one_of_with_range() {
        let set = Token::OneOf {
            items: vec![Token::Range {
                lo: 'a',
                hi: 'c',
                icase: false,
            }],
            negated: false,
            excludes_newline: false,
        };
        for c in ['a', 'b', 'c'] {
            assert!(set.matches_char(c));
        }
        assert!(!set.matches_char('d'));

        let negated = Token::OneOf {
            items: vec![Token::Range {
                lo: 'a',
                hi: 'c',
                icase: false,
            }],
            negated: true,
            excludes_newline: true,
        };
        assert!(negated.matches_char('d'));
        assert!(!negated.matches_char('a'));
        assert!(!negated.matches_char('\n'));
    }

    #[test]
    fn test_case_insensitive_chars() {
        let token = Token::Char {
            ch: 'k',
            icase: true,
        };
        assert!(token.matches_char('K'));
        assert!(token.matches_char('k'));
        assert!(!token.matches_char('x'));

        let range = Token::Range {
            lo: 'A',
            hi: 'F',
            icase: true,
        };
        assert!(range.matches_char('c'));
        assert!(!range.matches_char('g'));
    }

    #[test]
    fn test_any() {
        let dot = Token::Any {
            newline: false,
            null: true,
        };
        assert!(dot.matches_char('x'));
        assert!(!dot.matches_char('\n'));
        assert!(dot.matches_char('\0'));

        let posix_dot = Token::Any {
            newline: true,
            null: false,
        };
        assert!(posix_dot.matches_char('\n'));
        assert!(!posix_dot.matches_char('\0'));
    }

    #[test]
    fn test_posix_classes() {
        assert_eq!(PosixClass::from_name("alpha"), Some(PosixClass::Alpha));
        assert_eq!(PosixClass::from_name("word"), None);
        assert!(PosixClass::Xdigit.matches('F', false));
        assert!(!PosixClass::Xdigit.matches('g', false));
        assert!(PosixClass::Punct.matches('!', false));
        assert!(PosixClass::Blank.matches('\t', false));
        assert!(!PosixClass::Upper.matches('a', false));
        assert!(PosixClass::Upper.matches('a', true));
        assert!(PosixClass::Word.matches('_', false));
        for class in [PosixClass::Alnum, PosixClass::Digit] {
            assert!(class.matches('3', false));
            assert!(!class.matches('\u{663}', false));
        }
        assert!(PosixClass::Alnum.matches('é', false));
        assert!(!PosixClass::Word.matches('-', false));
    }

    #[test]
    fn test_simple_case_toggle_keeps_multi_char_mappings() {
        assert_eq!(simple_upper('a'), 'A');
        assert_eq!(simple_lower('A'), 'a');
        // 'ß' uppercases to "SS", so it stays as is
        assert_eq!(simple_upper('ß'), 'ß');
        assert!(eq_ignore_case('é', 'É'));
    }
}
