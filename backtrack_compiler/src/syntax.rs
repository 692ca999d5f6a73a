//! Syntax flag sets, compile options and execution flags.
//!
//! A [`Syntax`] decides which characters are operators when a pattern is
//! compiled. The same pattern text can mean very different things under
//! different syntaxes: `a+` is "one or more `a`" in [`Syntax::PERL5`] but the
//! two literal characters `a+` in [`Syntax::POSIX_BASIC`], which spells the
//! operator `a\+` instead.

use bitflags::bitflags;

bitflags! {
    /// The metacharacter families that are active while compiling a pattern.
    ///
    /// Flags are fixed at compile time. Combine individual flags with `|` or
    /// start from one of the presets such as [`Syntax::PERL5`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Syntax: u32 {
        /// A backslash inside a bracket expression escapes the next character.
        const BACKSLASH_ESCAPE_IN_LISTS = 1 << 0;
        /// `\+` and `\?` are operators, bare `+` and `?` are literals.
        const BK_PLUS_QM = 1 << 1;
        /// POSIX named classes such as `[[:alpha:]]` inside brackets.
        const CHAR_CLASSES = 1 << 2;
        /// `.` matches a newline.
        const DOT_NEWLINE = 1 << 3;
        /// `.` never matches the null character.
        const DOT_NOT_NULL = 1 << 4;
        /// Intervals `{m,n}` are operators.
        const INTERVALS = 1 << 5;
        /// Disables `+`, `?` and `|`.
        const LIMITED_OPS = 1 << 6;
        /// An unescaped newline separates alternatives, like `|`.
        const NEWLINE_ALT = 1 << 7;
        /// Intervals are written `{m,n}` instead of `\{m,n\}`.
        const NO_BK_BRACES = 1 << 8;
        /// Groups are written `(...)` instead of `\(...\)`.
        const NO_BK_PARENS = 1 << 9;
        /// `\1` through `\9` are literals rather than backreferences.
        const NO_BK_REFS = 1 << 10;
        /// Alternation is written `|` instead of `\|`.
        const NO_BK_VBAR = 1 << 11;
        /// A reversed range such as `[z-a]` is a compile error.
        const NO_EMPTY_RANGES = 1 << 12;
        /// An unmatched `)` is a literal instead of a compile error.
        const UNMATCHED_RIGHT_PAREN_ORD = 1 << 13;
        /// A `?` after a repeat makes it stingy.
        const STINGY_OPS = 1 << 14;
        /// `\d`, `\D`, `\s`, `\S`, `\w` and `\W` outside brackets.
        const CHAR_CLASS_ESCAPES = 1 << 15;
        /// Non-capturing groups `(?:...)`.
        const PURE_GROUPING = 1 << 16;
        /// Lookahead `(?=...)` and negative lookahead `(?!...)`.
        const LOOKAHEAD = 1 << 17;
        /// `\A`, `\Z`, `\b` and `\B`.
        const STRING_ANCHORS = 1 << 18;
        /// Comments `(?#...)`.
        const COMMENTS = 1 << 19;
        /// `\d`, `\s`, `\w` and their negations inside brackets.
        const CHAR_CLASS_ESC_IN_LISTS = 1 << 20;
        /// A negated bracket expression never matches a newline.
        const HAT_LISTS_NOT_NEWLINE = 1 << 21;
    }
}

impl Syntax {
    /// GNU Emacs: groups and alternation are spelled with a backslash and
    /// there are no intervals.
    pub const EMACS: Syntax = Syntax::empty();

    const POSIX_COMMON: Syntax = Syntax::CHAR_CLASSES
        .union(Syntax::DOT_NEWLINE)
        .union(Syntax::DOT_NOT_NULL)
        .union(Syntax::INTERVALS)
        .union(Syntax::NO_EMPTY_RANGES);

    /// POSIX basic regular expressions.
    pub const POSIX_BASIC: Syntax =
        Syntax::POSIX_COMMON.union(Syntax::BK_PLUS_QM);

    /// POSIX basic regular expressions without `\+`, `\?` and `\|`.
    pub const POSIX_MINIMAL_BASIC: Syntax =
        Syntax::POSIX_COMMON.union(Syntax::LIMITED_OPS);

    /// POSIX extended regular expressions.
    pub const POSIX_EXTENDED: Syntax = Syntax::POSIX_COMMON
        .union(Syntax::NO_BK_BRACES)
        .union(Syntax::NO_BK_PARENS)
        .union(Syntax::NO_BK_VBAR)
        .union(Syntax::UNMATCHED_RIGHT_PAREN_ORD);

    /// The `awk` dialect.
    pub const AWK: Syntax = Syntax::BACKSLASH_ESCAPE_IN_LISTS
        .union(Syntax::DOT_NOT_NULL)
        .union(Syntax::NO_BK_PARENS)
        .union(Syntax::NO_BK_REFS)
        .union(Syntax::NO_BK_VBAR)
        .union(Syntax::NO_EMPTY_RANGES)
        .union(Syntax::UNMATCHED_RIGHT_PAREN_ORD);

    /// The `grep` dialect.
    pub const GREP: Syntax = Syntax::BK_PLUS_QM
        .union(Syntax::CHAR_CLASSES)
        .union(Syntax::HAT_LISTS_NOT_NEWLINE)
        .union(Syntax::INTERVALS)
        .union(Syntax::NEWLINE_ALT);

    /// The `egrep` dialect.
    pub const EGREP: Syntax = Syntax::CHAR_CLASSES
        .union(Syntax::HAT_LISTS_NOT_NEWLINE)
        .union(Syntax::NEWLINE_ALT)
        .union(Syntax::NO_BK_PARENS)
        .union(Syntax::NO_BK_VBAR);

    /// The `ed` dialect, same as [`Syntax::POSIX_BASIC`].
    pub const ED: Syntax = Syntax::POSIX_BASIC;

    /// The `sed` dialect, same as [`Syntax::POSIX_BASIC`].
    pub const SED: Syntax = Syntax::POSIX_BASIC;

    /// Perl 4.
    pub const PERL4: Syntax = Syntax::CHAR_CLASSES
        .union(Syntax::INTERVALS)
        .union(Syntax::NO_BK_BRACES)
        .union(Syntax::NO_BK_PARENS)
        .union(Syntax::NO_BK_VBAR)
        .union(Syntax::NO_EMPTY_RANGES)
        .union(Syntax::CHAR_CLASS_ESCAPES);

    /// Perl 4 with `.` matching newlines.
    pub const PERL4_S: Syntax = Syntax::PERL4.union(Syntax::DOT_NEWLINE);

    /// Perl 5: stingy operators, lookahead, non-capturing groups, comments
    /// and string anchors on top of [`Syntax::PERL4`].
    pub const PERL5: Syntax = Syntax::PERL4
        .union(Syntax::PURE_GROUPING)
        .union(Syntax::STINGY_OPS)
        .union(Syntax::LOOKAHEAD)
        .union(Syntax::STRING_ANCHORS)
        .union(Syntax::BACKSLASH_ESCAPE_IN_LISTS)
        .union(Syntax::CHAR_CLASS_ESC_IN_LISTS)
        .union(Syntax::COMMENTS);

    /// Perl 5 with `.` matching newlines.
    pub const PERL5_S: Syntax = Syntax::PERL5.union(Syntax::DOT_NEWLINE);
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax::PERL5
    }
}

bitflags! {
    /// Flags that change how a single search treats its input.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ExecFlags: u8 {
        /// The start of the input is not the beginning of a line, so `^`
        /// and `\A` never match there.
        const NOT_BOL = 1 << 0;
        /// The end of the input is not the end of a line, so `$` and `\Z`
        /// never match there.
        const NOT_EOL = 1 << 1;
        /// The offset a search starts from is treated as the beginning of
        /// the input. Characters before it are invisible to anchors and
        /// word boundaries.
        const ANCHOR_INDEX = 1 << 2;
    }
}

/// Options that apply to a whole pattern, independent of the syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    case_insensitive: bool,
    dot_matches_new_line: bool,
    multi_line: bool,
    line_separator: String,
    nest_limit: u32,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self {
            case_insensitive: false,
            dot_matches_new_line: false,
            multi_line: false,
            line_separator: "\n".to_string(),
            nest_limit: 250,
        }
    }

    /// Literals, ranges, classes and backreferences ignore case. Only
    /// single-character case toggling is performed.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// `.` matches newlines regardless of [`Syntax::DOT_NEWLINE`].
    pub fn dot_matches_new_line(mut self, yes: bool) -> Self {
        self.dot_matches_new_line = yes;
        self
    }

    /// `^` and `$` also match next to a line separator.
    pub fn multi_line(mut self, yes: bool) -> Self {
        self.multi_line = yes;
        self
    }

    /// The text `^` and `$` recognize as a line separator in multi-line
    /// mode. Defaults to `"\n"`.
    pub fn line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    /// How deeply groups may nest before compilation fails with
    /// [`ErrorKind::NestLimitExceeded`](crate::ErrorKind::NestLimitExceeded).
    /// Defaults to 250.
    pub fn nest_limit(mut self, limit: u32) -> Self {
        self.nest_limit = limit;
        self
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_dot_matches_new_line(&self) -> bool {
        self.dot_matches_new_line
    }

    pub fn is_multi_line(&self) -> bool {
        self.multi_line
    }

    pub fn get_line_separator(&self) -> &str {
        &self.line_separator
    }

    pub fn get_nest_limit(&self) -> u32 {
        self.nest_limit
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes every metacharacter in `text` with a backslash.
///
/// The result matches `text` literally under the Perl family of syntaxes
/// ([`Syntax::PERL4`], [`Syntax::PERL5`] and their `_S` variants), where an
/// escaped punctuation character is always a literal.
pub fn escape(text: &str) -> String {
    regex_syntax::escape(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perl5_extends_perl4() {
        assert!(Syntax::PERL5.contains(Syntax::PERL4));
        assert!(Syntax::PERL5.contains(Syntax::STINGY_OPS | Syntax::LOOKAHEAD));
        assert!(!Syntax::PERL5.contains(Syntax::DOT_NEWLINE));
        assert!(Syntax::PERL5_S.contains(Syntax::DOT_NEWLINE));
        assert_eq!(Syntax::default(), Syntax::PERL5);
    }

    #[test]
    fn test_posix_basic_uses_backslashed_operators() {
        assert!(Syntax::POSIX_BASIC.contains(Syntax::BK_PLUS_QM));
        assert!(!Syntax::POSIX_BASIC.contains(Syntax::NO_BK_PARENS));
        assert!(!Syntax::POSIX_BASIC.contains(Syntax::NO_BK_BRACES));
        assert_eq!(Syntax::ED, Syntax::POSIX_BASIC);
        assert_eq!(Syntax::SED, Syntax::POSIX_BASIC);
    }

    #[test]
    fn test_compile_options_builder() {
        let options = CompileOptions::new()
            .case_insensitive(true)
            .multi_line(true)
            .line_separator("\r\n");

        assert!(options.is_case_insensitive());
        assert!(options.is_multi_line());
        assert!(!options.is_dot_matches_new_line());
        assert_eq!(options.get_line_separator(), "\r\n");
        assert_eq!(CompileOptions::default().get_line_separator(), "\n");
        assert_eq!(CompileOptions::default().get_nest_limit(), 250);
        assert_eq!(CompileOptions::new().nest_limit(8).get_nest_limit(), 8);
    }

    #[test]
    fn test_escape_quotes_operators() {
        assert_eq!(escape("a.b*c"), r"a\.b\*c");
        assert_eq!(escape("(x|y)"), r"\(x\|y\)");
        assert_eq!(escape("plain"), "plain");
    }
}
