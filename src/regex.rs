use std::borrow::Cow;
use std::fmt;
use std::ops::{Index, Range};
use std::sync::Arc;

use backtrack_compiler::{
    compile_with, CharIndexed, CharVec, CompileOptions, Config, ExecFlags, MatchResult, Matcher,
    Program, Span, Syntax,
};

use crate::error::Result;
use crate::replacer::{parse_template, Piece, Replacer};

/// A compiled regular expression.
///
/// A `Regex` can be cloned cheaply and shared between threads. All offsets it
/// reports are char offsets into the searched text; [`Match::byte_range`]
/// gives the matching byte offsets.
///
/// Every search returns a `Result`, since a search can run out of its step
/// budget (see [`RegexBuilder::step_limit`]).
#[derive(Clone)]
pub struct Regex {
    program: Arc<Program>,
    config: Config,
}

impl Regex {
    /// Compiles a pattern with Perl 5 syntax and default options.
    pub fn new(pattern: &str) -> Result<Regex> {
        RegexBuilder::new(pattern).build()
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> Result<bool> {
        Ok(self.find(text)?.is_some())
    }

    /// Whether the pattern matches all of `text`.
    pub fn is_full_match(&self, text: &str) -> Result<bool> {
        let chars = CharVec::new(text);
        let found = self.matcher().match_full(&chars, ExecFlags::empty())?;
        Ok(found.is_some())
    }

    /// The leftmost match in `text`.
    pub fn find<'h>(&self, text: &'h str) -> Result<Option<Match<'h>>> {
        self.find_at(text, 0)
    }

    /// The first match that starts at or after char offset `start`.
    ///
    /// Anchors still see the whole text, so `^` does not match at `start`
    /// unless `start` is 0.
    pub fn find_at<'h>(&self, text: &'h str, start: usize) -> Result<Option<Match<'h>>> {
        let chars = CharVec::new(text);
        let found = self.search(&chars, start)?;
        Ok(found.map(|found| Match::new(text, &chars, found.span())))
    }

    /// The groups of the leftmost match in `text`.
    pub fn captures<'h>(&self, text: &'h str) -> Result<Option<Captures<'h>>> {
        self.captures_at(text, 0)
    }

    /// The groups of the first match that starts at or after char offset
    /// `start`.
    pub fn captures_at<'h>(&self, text: &'h str, start: usize) -> Result<Option<Captures<'h>>> {
        let chars = CharVec::new(text);
        let found = self.search(&chars, start)?;
        Ok(found.map(|found| Captures::new(text, &chars, &found)))
    }

    /// An iterator over successive non-overlapping matches in `text`.
    pub fn find_iter<'r, 'h>(&'r self, text: &'h str) -> Matches<'r, 'h> {
        Matches(Searches::new(self, text))
    }

    /// An iterator over the groups of successive non-overlapping matches.
    pub fn captures_iter<'r, 'h>(&'r self, text: &'h str) -> CaptureMatches<'r, 'h> {
        CaptureMatches(Searches::new(self, text))
    }

    /// An iterator over the substrings of `text` between matches.
    pub fn split<'r, 'h>(&'r self, text: &'h str) -> Split<'r, 'h> {
        Split {
            finder: self.find_iter(text),
            last: 0,
        }
    }

    /// Replaces the leftmost match with the replacement provided.
    ///
    /// ```
    /// use retrack::Regex;
    ///
    /// let re = Regex::new(r"(\w+) (\w+)").unwrap();
    /// assert_eq!(re.replace("hello world", "$2 $1").unwrap(), "world hello");
    /// ```
    pub fn replace<'h, R: Replacer>(&self, text: &'h str, rep: R) -> Result<Cow<'h, str>> {
        self.replacen(text, 1, rep)
    }

    /// Replaces every non-overlapping match with the replacement provided.
    pub fn replace_all<'h, R: Replacer>(&self, text: &'h str, rep: R) -> Result<Cow<'h, str>> {
        self.replacen(text, 0, rep)
    }

    /// Replaces at most `limit` non-overlapping matches with the replacement
    /// provided. A `limit` of 0 replaces all of them.
    pub fn replacen<'h, R: Replacer>(
        &self,
        text: &'h str,
        limit: usize,
        mut rep: R,
    ) -> Result<Cow<'h, str>> {
        // The limit is checked before each search, so no search runs past it.
        let under_limit = |replaced: usize| limit == 0 || replaced < limit;

        if let Some(fixed) = rep.no_expansion() {
            let mut new = String::with_capacity(text.len());
            let mut last = 0;
            let mut replaced = 0;
            let mut matches = self.find_iter(text);
            while under_limit(replaced) {
                let found = match matches.next() {
                    Some(found) => found?,
                    None => break,
                };
                new.push_str(&text[last..found.byte_range().start]);
                new.push_str(&fixed);
                last = found.byte_range().end;
                replaced += 1;
            }
            if replaced == 0 {
                return Ok(Cow::Borrowed(text));
            }
            new.push_str(&text[last..]);
            return Ok(Cow::Owned(new));
        }

        let mut new = String::with_capacity(text.len());
        let mut last = 0;
        let mut replaced = 0;
        let mut captures = self.captures_iter(text);
        while under_limit(replaced) {
            let caps = match captures.next() {
                Some(caps) => caps?,
                None => break,
            };
            let whole = caps.whole();
            new.push_str(&text[last..whole.byte_range().start]);
            rep.replace_append(&caps, &mut new);
            last = whole.byte_range().end;
            replaced += 1;
        }
        if replaced == 0 {
            return Ok(Cow::Borrowed(text));
        }
        new.push_str(&text[last..]);
        Ok(Cow::Owned(new))
    }

    /// The number of groups, counting group 0 for the whole match.
    pub fn captures_len(&self) -> usize {
        self.program.group_count()
    }

    /// The minimum length in chars of any match.
    pub fn min_len(&self) -> usize {
        self.program.min_len()
    }

    /// The pattern this regex was compiled from.
    pub fn as_str(&self) -> &str {
        self.program.pattern()
    }

    /// The syntax this regex was compiled under.
    pub fn syntax(&self) -> Syntax {
        self.program.syntax()
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher::with_config(&self.program, self.config)
    }

    fn search(&self, chars: &CharVec, start: usize) -> Result<Option<MatchResult>> {
        Ok(self.matcher().search(chars, start, ExecFlags::empty())?)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Regex").field(&self.as_str()).finish()
    }
}

/// A configurable builder for a [`Regex`].
#[derive(Clone, Debug)]
pub struct RegexBuilder {
    pattern: String,
    syntax: Syntax,
    options: CompileOptions,
    config: Config,
}

impl RegexBuilder {
    /// A builder for `pattern` with Perl 5 syntax and default options.
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_string(),
            syntax: Syntax::default(),
            options: CompileOptions::default(),
            config: Config::default(),
        }
    }

    /// Compiles the pattern.
    pub fn build(&self) -> Result<Regex> {
        let program = compile_with(&self.pattern, self.syntax, &self.options)?;
        Ok(Regex {
            program: Arc::new(program),
            config: self.config,
        })
    }

    /// Selects which operators the pattern uses.
    pub fn syntax(&mut self, syntax: Syntax) -> &mut RegexBuilder {
        self.syntax = syntax;
        self
    }

    pub fn case_insensitive(&mut self, yes: bool) -> &mut RegexBuilder {
        self.options = self.options.clone().case_insensitive(yes);
        self
    }

    pub fn dot_matches_new_line(&mut self, yes: bool) -> &mut RegexBuilder {
        self.options = self.options.clone().dot_matches_new_line(yes);
        self
    }

    /// `^` and `$` also match at line separators.
    pub fn multi_line(&mut self, yes: bool) -> &mut RegexBuilder {
        self.options = self.options.clone().multi_line(yes);
        self
    }

    /// The separator recognized in multi-line mode. Defaults to `"\n"`.
    pub fn line_separator(&mut self, separator: &str) -> &mut RegexBuilder {
        self.options = self.options.clone().line_separator(separator);
        self
    }

    /// How deeply groups may nest. Patterns nested deeper fail to compile.
    /// Defaults to 250.
    pub fn nest_limit(&mut self, limit: u32) -> &mut RegexBuilder {
        self.options = self.options.clone().nest_limit(limit);
        self
    }

    /// Caps the number of match steps a single search may take. A search
    /// that exceeds it fails with an error instead of running on.
    pub fn step_limit(&mut self, limit: u64) -> &mut RegexBuilder {
        self.config = self.config.step_limit(Some(limit));
        self
    }
}

/// A single match of a regex in a haystack.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Match<'h> {
    haystack: &'h str,
    start: usize,
    end: usize,
    byte_start: usize,
    byte_end: usize,
}

impl<'h> Match<'h> {
    fn new(haystack: &'h str, chars: &CharVec, span: Span) -> Match<'h> {
        let byte = |index| chars.byte_offset(index).unwrap_or(haystack.len());
        Match {
            haystack,
            start: span.start,
            end: span.end,
            byte_start: byte(span.start),
            byte_end: byte(span.end),
        }
    }

    /// The char offset where the match starts.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The char offset just past the end of the match.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The byte offsets of the match in the haystack.
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }

    pub fn as_str(&self) -> &'h str {
        &self.haystack[self.byte_range()]
    }

    /// The length of the match in chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl<'h> fmt::Debug for Match<'h> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("string", &self.as_str())
            .finish()
    }
}

impl<'h> From<Match<'h>> for &'h str {
    fn from(m: Match<'h>) -> &'h str {
        m.as_str()
    }
}

/// The groups of a single match. Group 0 is always the whole match; other
/// groups are `None` when they did not take part in it.
#[derive(Clone, Debug)]
pub struct Captures<'h> {
    groups: Vec<Option<Match<'h>>>,
}

impl<'h> Captures<'h> {
    fn new(haystack: &'h str, chars: &CharVec, found: &MatchResult) -> Captures<'h> {
        let groups = found
            .iter()
            .map(|span| span.map(|span| Match::new(haystack, chars, span)))
            .collect();
        Captures { groups }
    }

    /// The match for group `index`, if it took part in the match.
    pub fn get(&self, index: usize) -> Option<Match<'h>> {
        self.groups.get(index).copied().flatten()
    }

    /// The number of groups, including those that did not match.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Match<'h>>> + '_ {
        self.groups.iter().copied()
    }

    /// Appends `template` to `dst` with every `$n` and `${n}` replaced by the
    /// text of group `n`, and every `$$` replaced by `$`.
    pub fn expand(&self, template: &str, dst: &mut String) {
        for piece in parse_template(template) {
            match piece {
                Piece::Literal(text) => dst.push_str(text),
                Piece::Group(index) => {
                    if let Some(m) = self.get(index) {
                        dst.push_str(m.as_str());
                    }
                }
            }
        }
    }

    fn whole(&self) -> Match<'h> {
        match self.get(0) {
            Some(m) => m,
            None => Match {
                haystack: "",
                start: 0,
                end: 0,
                byte_start: 0,
                byte_end: 0,
            },
        }
    }
}

/// Gets the text of group `index`.
///
/// # Panics
///
/// If the group did not take part in the match.
impl<'h> Index<usize> for Captures<'h> {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        self.get(index)
            .map(|m| m.as_str())
            .unwrap_or_else(|| panic!("no group at index '{}'", index))
    }
}

/// Successive non-overlapping searches over one decoded text
#[derive(Clone, Debug)]
struct Searches<'r, 'h> {
    re: &'r Regex,
    text: &'h str,
    chars: CharVec,
    /// Where the next search starts; past the end once exhausted
    next_start: usize,
    last_end: Option<usize>,
}

impl<'r, 'h> Searches<'r, 'h> {
    fn new(re: &'r Regex, text: &'h str) -> Self {
        Searches {
            re,
            text,
            chars: CharVec::new(text),
            next_start: 0,
            last_end: None,
        }
    }

    fn next_result(&mut self) -> Option<Result<MatchResult>> {
        loop {
            if self.next_start > self.chars.len() {
                return None;
            }
            let found = match self.re.search(&self.chars, self.next_start) {
                Ok(Some(found)) => found,
                Ok(None) => {
                    self.next_start = self.chars.len() + 1;
                    return None;
                }
                Err(err) => {
                    self.next_start = self.chars.len() + 1;
                    return Some(Err(err));
                }
            };
            if found.start() == found.end() {
                self.next_start = found.end() + 1;
                // No empty match right where the previous match ended.
                if self.last_end == Some(found.end()) {
                    continue;
                }
            } else {
                self.next_start = found.end();
            }
            self.last_end = Some(found.end());
            return Some(Ok(found));
        }
    }
}

/// An iterator over successive non-overlapping matches, created by
/// [`Regex::find_iter`].
#[derive(Clone, Debug)]
pub struct Matches<'r, 'h>(Searches<'r, 'h>);

impl<'r, 'h> Matches<'r, 'h> {
    pub fn text(&self) -> &'h str {
        self.0.text
    }

    pub fn regex(&self) -> &'r Regex {
        self.0.re
    }
}

impl<'r, 'h> Iterator for Matches<'r, 'h> {
    type Item = Result<Match<'h>>;

    fn next(&mut self) -> Option<Self::Item> {
        let searches = &mut self.0;
        let found = searches.next_result()?;
        Some(found.map(|found| Match::new(searches.text, &searches.chars, found.span())))
    }
}

/// An iterator over the groups of successive non-overlapping matches,
/// created by [`Regex::captures_iter`].
#[derive(Clone, Debug)]
pub struct CaptureMatches<'r, 'h>(Searches<'r, 'h>);

impl<'r, 'h> CaptureMatches<'r, 'h> {
    pub fn text(&self) -> &'h str {
        self.0.text
    }

    pub fn regex(&self) -> &'r Regex {
        self.0.re
    }
}

impl<'r, 'h> Iterator for CaptureMatches<'r, 'h> {
    type Item = Result<Captures<'h>>;

    fn next(&mut self) -> Option<Self::Item> {
        let searches = &mut self.0;
        let found = searches.next_result()?;
        Some(found.map(|found| Captures::new(searches.text, &searches.chars, &found)))
    }
}

/// An iterator over the substrings between matches, created by
/// [`Regex::split`].
#[derive(Clone, Debug)]
pub struct Split<'r, 'h> {
    finder: Matches<'r, 'h>,
    /// Byte offset where the next piece starts; past the end once exhausted
    last: usize,
}

impl<'r, 'h> Iterator for Split<'r, 'h> {
    type Item = Result<&'h str>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.finder.text();
        match self.finder.next() {
            Some(Ok(m)) => {
                let piece = &text[self.last..m.byte_range().start];
                self.last = m.byte_range().end;
                Some(Ok(piece))
            }
            Some(Err(err)) => {
                self.last = text.len() + 1;
                Some(Err(err))
            }
            None => {
                if self.last > text.len() {
                    None
                } else {
                    let piece = &text[self.last..];
                    self.last = text.len() + 1;
                    Some(Ok(piece))
                }
            }
        }
    }
}
