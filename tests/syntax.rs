use anyhow::Result;
use retrack::{ErrorKind, Regex, RegexBuilder, Syntax};

fn build(pattern: &str, syntax: Syntax) -> retrack::Result<Regex> {
    RegexBuilder::new(pattern).syntax(syntax).build()
}

fn find(re: &Regex, text: &str) -> Result<Option<(usize, usize)>> {
    Ok(re.find(text)?.map(|m| (m.start(), m.end())))
}

fn kind(pattern: &str, syntax: Syntax) -> Option<ErrorKind> {
    build(pattern, syntax).err().and_then(|err| err.compile_kind())
}

#[test]
fn posix_basic() -> Result<()> {
    let re = build(r"\(ab\)\{2\}", Syntax::POSIX_BASIC)?;
    assert_eq!(find(&re, "xababx")?, Some((1, 5)));

    let re = build("a+", Syntax::POSIX_BASIC)?;
    assert_eq!(find(&re, "aa+")?, Some((1, 3)));
    let re = build(r"a\+", Syntax::POSIX_BASIC)?;
    assert_eq!(find(&re, "aa+")?, Some((0, 2)));

    let re = build("(a|b){2}", Syntax::POSIX_BASIC)?;
    assert!(re.is_full_match("(a|b){2}")?);

    let re = build(r"\(a\)\1", Syntax::POSIX_BASIC)?;
    assert!(re.is_full_match("aa")?);
    Ok(())
}

#[test]
fn posix_minimal_basic_has_no_plus_or_bar() -> Result<()> {
    let re = build(r"a\|b\+", Syntax::POSIX_MINIMAL_BASIC)?;
    assert!(re.is_full_match("a|b+")?);
    assert!(!re.is_match("b")?);
    Ok(())
}

#[test]
fn posix_extended() -> Result<()> {
    let re = build("(ab)+|c{2}", Syntax::POSIX_EXTENDED)?;
    assert_eq!(find(&re, "xababc")?, Some((1, 5)));
    assert_eq!(find(&re, "xcc")?, Some((1, 3)));

    let re = build("a)", Syntax::POSIX_EXTENDED)?;
    assert!(re.is_full_match("a)")?);

    let re = build("[[:digit:]]+", Syntax::POSIX_EXTENDED)?;
    assert_eq!(find(&re, "ab123c")?, Some((2, 5)));
    Ok(())
}

#[test]
fn dot_flags_follow_the_syntax() -> Result<()> {
    let re = build("a.b", Syntax::POSIX_EXTENDED)?;
    assert!(re.is_match("a\nb")?);
    assert!(!re.is_match("a\0b")?);

    let re = build("a.b", Syntax::PERL5)?;
    assert!(!re.is_match("a\nb")?);
    assert!(re.is_match("a\0b")?);

    let re = build("a.b", Syntax::PERL5_S)?;
    assert!(re.is_match("a\nb")?);
    Ok(())
}

#[test]
fn grep_and_egrep() -> Result<()> {
    let re = build("a\nb", Syntax::GREP)?;
    assert_eq!(find(&re, "xb")?, Some((1, 2)));

    let re = build(r"x\|y\+", Syntax::GREP)?;
    assert_eq!(find(&re, "-yy")?, Some((1, 3)));

    let re = build("[^a]", Syntax::GREP)?;
    assert!(!re.is_match("\n")?);
    assert!(re.is_match("b")?);

    let re = build("(ab)+|z", Syntax::EGREP)?;
    assert_eq!(find(&re, "abab")?, Some((0, 4)));

    // No intervals in egrep.
    let re = build("a{2}", Syntax::EGREP)?;
    assert!(re.is_full_match("a{2}")?);
    Ok(())
}

#[test]
fn negated_lists_match_newline_by_default() -> Result<()> {
    let re = build("[^a]", Syntax::PERL5)?;
    assert!(re.is_match("\n")?);
    Ok(())
}

#[test]
fn awk() -> Result<()> {
    // Backreferences are literal digits.
    let re = build(r"(a)\1", Syntax::AWK)?;
    assert!(re.is_full_match("a1")?);

    let re = build(r"[\]]", Syntax::AWK)?;
    assert!(re.is_full_match("]")?);
    Ok(())
}

#[test]
fn emacs() -> Result<()> {
    let re = build(r"\(a\|b\)+", Syntax::EMACS)?;
    assert!(re.is_full_match("abba")?);

    let re = build("(a){2}", Syntax::EMACS)?;
    assert!(re.is_full_match("(a){2}")?);

    // Reversed ranges are dropped rather than rejected.
    let re = build("[z-ax]", Syntax::EMACS)?;
    assert!(re.is_match("x")?);
    assert!(!re.is_match("m")?);
    Ok(())
}

#[test]
fn perl_lookahead() -> Result<()> {
    let re = Regex::new("foo(?=bar)")?;
    assert_eq!(find(&re, "foobaz foobar")?, Some((7, 10)));

    let re = Regex::new("foo(?!bar)")?;
    assert_eq!(find(&re, "foobar foobaz")?, Some((7, 10)));
    Ok(())
}

#[test]
fn perl_comments_and_groups() -> Result<()> {
    let re = Regex::new("a(?#any text)b")?;
    assert!(re.is_full_match("ab")?);

    let re = Regex::new("(?:ab)+(c)")?;
    let caps = re.captures("ababc")?.unwrap();
    assert_eq!(caps.len(), 2);
    assert_eq!(&caps[1], "c");
    Ok(())
}

#[test]
fn perl_stingy_repeats() -> Result<()> {
    let re = Regex::new("<.+?>")?;
    assert_eq!(re.find("<a><b>")?.map(|m| m.as_str()), Some("<a>"));

    let re = Regex::new("a{2,}?")?;
    assert_eq!(find(&re, "aaaa")?, Some((0, 2)));

    assert_eq!(kind("a*?", Syntax::PERL4), Some(ErrorKind::RepeatChained));
    assert_eq!(kind("(?:a)", Syntax::PERL4), Some(ErrorKind::RepeatNoToken));
    Ok(())
}

#[test]
fn word_boundaries_and_string_anchors() -> Result<()> {
    let re = Regex::new(r"\bcat\b")?;
    assert_eq!(find(&re, "concat cat")?, Some((7, 10)));

    let re = Regex::new(r"\Bcat")?;
    assert_eq!(find(&re, "cat concat")?, Some((7, 10)));

    let re = Regex::new(r"\<cat\>")?;
    assert_eq!(find(&re, "concat cat")?, Some((7, 10)));

    let re = Regex::new(r"\Aab\Z")?;
    assert!(re.is_match("ab")?);
    assert!(!re.is_match("xab")?);
    Ok(())
}

#[test]
fn multi_line_anchors() -> Result<()> {
    let re = RegexBuilder::new("a$").multi_line(true).build()?;
    assert_eq!(find(&re, "a\nb")?, Some((0, 1)));
    assert_eq!(find(&Regex::new("a$")?, "a\nb")?, None);

    // String anchors ignore multi-line mode.
    let re = RegexBuilder::new(r"\Ab").multi_line(true).build()?;
    assert!(!re.is_match("a\nb")?);
    Ok(())
}

#[test]
fn case_insensitive_matching() -> Result<()> {
    let re = RegexBuilder::new(r"([a-c]+)\1").case_insensitive(true).build()?;
    assert_eq!(find(&re, "xAbaB")?, Some((1, 5)));
    Ok(())
}

#[test]
fn intervals() -> Result<()> {
    let re = Regex::new("a{2}")?;
    assert_eq!(find(&re, "aaa")?, Some((0, 2)));
    let re = Regex::new("a{2,}")?;
    assert_eq!(find(&re, "aaaa")?, Some((0, 4)));
    let re = Regex::new("a{1,2}b")?;
    assert_eq!(find(&re, "aaab")?, Some((1, 4)));

    // A brace without a digit is a literal.
    let re = Regex::new("x{a}")?;
    assert!(re.is_full_match("x{a}")?);
    Ok(())
}

#[test]
fn leftmost_alternative_wins() -> Result<()> {
    let re = Regex::new("a|ab")?;
    assert_eq!(find(&re, "ab")?, Some((0, 1)));
    Ok(())
}

#[test]
fn syntax_specific_errors() {
    assert_eq!(kind("[z-a]", Syntax::PERL5), Some(ErrorKind::InvalidRange));
    assert_eq!(kind("[z-a]", Syntax::POSIX_BASIC), Some(ErrorKind::InvalidRange));
    assert_eq!(kind("a)", Syntax::PERL5), Some(ErrorKind::UnmatchedParen));
    assert_eq!(kind("[[:nope:]]", Syntax::POSIX_EXTENDED), Some(ErrorKind::UnknownClass));
    assert_eq!(kind(r"\2(a)", Syntax::PERL5), Some(ErrorKind::InvalidBackReference));
    assert_eq!(kind("a{2", Syntax::PERL5), Some(ErrorKind::UnterminatedInterval));
    assert_eq!(kind("(a*)*", Syntax::PERL5), Some(ErrorKind::RepeatEmptyToken));
    assert_eq!(kind(r"ab\", Syntax::PERL5), Some(ErrorKind::TrailingBackslash));
    assert_eq!(kind("^*", Syntax::PERL5), Some(ErrorKind::RepeatAssertion));
}
