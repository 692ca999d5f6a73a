use crate::syntax::{CompileOptions, Syntax};
use crate::token::{Boundary, PosixClass, Program, Repeat, Token};
use crate::{CompileResult, Error, ErrorKind};

/// Compile `pattern` under `syntax` with default options.
pub fn compile(pattern: &str, syntax: Syntax) -> CompileResult<Program> {
    compile_with(pattern, syntax, &CompileOptions::default())
}

/// Compile `pattern` under `syntax` with the given options.
pub fn compile_with(
    pattern: &str,
    syntax: Syntax,
    options: &CompileOptions,
) -> CompileResult<Program> {
    Compiler::new(syntax, options.clone()).compile(pattern)
}

/// One pattern character, and whether a backslash preceded it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Unit {
    ch: char,
    bk: bool,
}

/// Compiler that turns pattern text into a token tree in a single
/// left-to-right scan
pub struct Compiler {
    syntax: Syntax,
    options: CompileOptions,
    pattern: Vec<char>,
    /// Index the next capturing group will get
    next_group: usize,
    /// Minimum length of each capturing group body once it has been closed
    group_min: Vec<Option<usize>>,
    /// Every backreference seen, with its offset, checked once all groups
    /// are known
    backrefs: Vec<(usize, usize)>,
    /// Groups currently open around the scan
    depth: u32,
}

impl Compiler {
    /// Create a new compiler
    pub fn new(syntax: Syntax, options: CompileOptions) -> Self {
        Self {
            syntax,
            options,
            pattern: Vec::new(),
            next_group: 1,
            group_min: vec![None],
            backrefs: Vec::new(),
            depth: 0,
        }
    }

    /// Compile a pattern into a program rooted at group 0
    pub fn compile(mut self, pattern: &str) -> CompileResult<Program> {
        self.pattern = pattern.chars().collect();
        let body = self.compile_expr(0, self.pattern.len())?;

        if let Some(&(_, offset)) = self
            .backrefs
            .iter()
            .find(|(group, _)| *group >= self.next_group)
        {
            debug!("backreference to an undefined group in {:?}", pattern);
            return Err(Error::new(ErrorKind::InvalidBackReference, offset));
        }

        let min_len = body.min_len();
        debug!(
            "compiled {:?} under {:?}: {} groups, minimum length {}",
            pattern, self.syntax, self.next_group, min_len
        );
        Ok(Program {
            pattern: pattern.to_string(),
            root: Token::Group {
                body: Box::new(body),
                index: Some(0),
            },
            group_count: self.next_group,
            min_len,
            syntax: self.syntax,
            options: self.options,
        })
    }

    /// Compile the chars in `start..end` into one token
    fn compile_expr(&mut self, start: usize, end: usize) -> CompileResult<Token> {
        let mut branches: Vec<Token> = Vec::new();
        let mut seq: Vec<Token> = Vec::new();
        // The most recent atom, still eligible for a repeat operator
        let mut current: Option<Token> = None;
        let icase = self.options.is_case_insensitive();
        let mut index = start;

        while index < end {
            let at = index;
            let (unit, next) = self.unit(index)?;
            index = next;

            if self.is_alternation(unit) {
                seq.extend(current.take());
                branches.push(sequence(std::mem::take(&mut seq)));
                continue;
            }

            if unit.ch == '{' && self.syntax.contains(Syntax::INTERVALS) && self.is_brace(unit) {
                match self.parse_interval(at, next, end)? {
                    Some((min, max, after)) => {
                        if max.map_or(false, |max| min > max) {
                            return Err(Error::new(ErrorKind::IntervalOrder, at));
                        }
                        current = Some(repeated(current.take(), min, max, at)?);
                        index = after;
                    }
                    None => shift(&mut seq, &mut current, Token::Char { ch: '{', icase }),
                }
                continue;
            }

            if unit.ch == '[' && !unit.bk {
                let (set, after) = self.parse_bracket(at, next, end)?;
                shift(&mut seq, &mut current, set);
                index = after;
                continue;
            }

            if self.is_open_paren(unit) {
                index = self.compile_group(at, next, end, &mut seq, &mut current)?;
                continue;
            }

            if self.is_close_paren(unit) {
                if !self.syntax.contains(Syntax::UNMATCHED_RIGHT_PAREN_ORD) {
                    return Err(Error::new(ErrorKind::UnmatchedParen, at));
                }
                shift(&mut seq, &mut current, Token::Char { ch: ')', icase });
                continue;
            }

            let token = match (unit.ch, unit.bk) {
                ('^', false) => Token::Start {
                    line_sep: self.line_separator(),
                },
                ('$', false) => Token::End {
                    line_sep: self.line_separator(),
                },
                ('.', false) => Token::Any {
                    newline: self.syntax.contains(Syntax::DOT_NEWLINE)
                        || self.options.is_dot_matches_new_line(),
                    null: !self.syntax.contains(Syntax::DOT_NOT_NULL),
                },
                ('*', false) => {
                    current = Some(repeated(current.take(), 0, None, at)?);
                    continue;
                }
                ('+', bk) if self.is_plus_qm(bk) => {
                    current = Some(repeated(current.take(), 1, None, at)?);
                    continue;
                }
                ('?', bk) if self.is_plus_qm(bk) => {
                    current = Some(self.question(current.take(), at)?);
                    continue;
                }
                (digit @ '1'..='9', true) if !self.syntax.contains(Syntax::NO_BK_REFS) => {
                    let group = digit as usize - '0' as usize;
                    self.backrefs.push((group, at));
                    Token::BackRef {
                        group,
                        icase,
                        min_len: self.group_min.get(group).copied().flatten().unwrap_or(0),
                    }
                }
                ('A', true) if self.syntax.contains(Syntax::STRING_ANCHORS) => {
                    Token::Start { line_sep: None }
                }
                ('Z', true) if self.syntax.contains(Syntax::STRING_ANCHORS) => {
                    Token::End { line_sep: None }
                }
                ('b', true) if self.syntax.contains(Syntax::STRING_ANCHORS) => {
                    Token::WordBoundary {
                        kind: Boundary::Both,
                        negated: false,
                    }
                }
                ('B', true) if self.syntax.contains(Syntax::STRING_ANCHORS) => {
                    Token::WordBoundary {
                        kind: Boundary::Both,
                        negated: true,
                    }
                }
                ('<', true) => Token::WordBoundary {
                    kind: Boundary::Begin,
                    negated: false,
                },
                ('>', true) => Token::WordBoundary {
                    kind: Boundary::End,
                    negated: false,
                },
                (c, true) if self.syntax.contains(Syntax::CHAR_CLASS_ESCAPES) && is_class_escape(c) => {
                    class_escape(c, icase)
                }
                ('n', true) => Token::Char { ch: '\n', icase: false },
                ('r', true) => Token::Char { ch: '\r', icase: false },
                ('t', true) => Token::Char { ch: '\t', icase: false },
                (ch, _) => Token::Char { ch, icase },
            };
            shift(&mut seq, &mut current, token);
        }

        seq.extend(current);
        if branches.is_empty() {
            Ok(sequence(seq))
        } else {
            branches.push(sequence(seq));
            Ok(Token::Alternation(branches))
        }
    }

    /// Handles a group opened at `at` whose contents start at `next`.
    /// Returns the index just past its closing paren.
    fn compile_group(
        &mut self,
        at: usize,
        next: usize,
        end: usize,
        seq: &mut Vec<Token>,
        current: &mut Option<Token>,
    ) -> CompileResult<usize> {
        let marker = if self.pattern.get(next) == Some(&'?') {
            self.pattern.get(next + 1).copied()
        } else {
            None
        };

        match marker {
            Some('#') if self.syntax.contains(Syntax::COMMENTS) => {
                let close = self.find_close(at, next + 2, end, false)?;
                return Ok(self.unit(close)?.1);
            }
            Some(':') if self.syntax.contains(Syntax::PURE_GROUPING) => {
                let close = self.find_close(at, next + 2, end, true)?;
                let body = self.compile_nested(at, next + 2, close)?;
                shift(
                    seq,
                    current,
                    Token::Group {
                        body: Box::new(body),
                        index: None,
                    },
                );
                return Ok(self.unit(close)?.1);
            }
            Some(c @ ('=' | '!')) if self.syntax.contains(Syntax::LOOKAHEAD) => {
                let close = self.find_close(at, next + 2, end, true)?;
                let body = self.compile_nested(at, next + 2, close)?;
                shift(
                    seq,
                    current,
                    Token::LookAhead {
                        body: Box::new(body),
                        negated: c == '!',
                    },
                );
                return Ok(self.unit(close)?.1);
            }
            _ => {}
        }

        let close = self.find_close(at, next, end, true)?;
        let group = self.next_group;
        self.next_group += 1;
        self.group_min.push(None);
        let body = self.compile_nested(at, next, close)?;
        self.group_min[group] = Some(body.min_len());
        shift(
            seq,
            current,
            Token::Group {
                body: Box::new(body),
                index: Some(group),
            },
        );
        Ok(self.unit(close)?.1)
    }

    /// Compiles the body of the group opened at `at`, one level deeper.
    fn compile_nested(&mut self, at: usize, start: usize, end: usize) -> CompileResult<Token> {
        if self.depth >= self.options.get_nest_limit() {
            return Err(Error::new(ErrorKind::NestLimitExceeded, at));
        }
        self.depth += 1;
        let body = self.compile_expr(start, end);
        self.depth -= 1;
        body
    }

    /// Finds the paren closing the group opened at `open`, scanning from
    /// `from` and tracking nested groups.
    fn find_close(
        &self,
        open: usize,
        from: usize,
        end: usize,
        skip_brackets: bool,
    ) -> CompileResult<usize> {
        let mut depth = 0usize;
        let mut index = from;
        while index < end {
            let (unit, next) = self.unit(index)?;
            if skip_brackets && unit.ch == '[' && !unit.bk {
                index = self.parse_bracket(index, next, end)?.1;
                continue;
            }
            if self.is_open_paren(unit) {
                depth += 1;
            } else if self.is_close_paren(unit) {
                if depth == 0 {
                    return Ok(index);
                }
                depth -= 1;
            }
            index = next;
        }
        Err(Error::new(ErrorKind::UnclosedGroup, open))
    }

    /// Parses a bracket expression whose `[` is at `open`. Returns the set
    /// and the index just past its `]`.
    fn parse_bracket(&self, open: usize, start: usize, end: usize) -> CompileResult<(Token, usize)> {
        let icase = self.options.is_case_insensitive();
        let unmatched = || Error::new(ErrorKind::UnmatchedBracket, open);
        let at = |i: usize| if i < end { Some(self.pattern[i]) } else { None };

        let mut index = start;
        let negated = at(index) == Some('^');
        if negated {
            index += 1;
        }

        let mut items = Vec::new();
        let mut last: Option<char> = None;
        if at(index) == Some(']') {
            last = Some(']');
            index += 1;
        }

        loop {
            let c = at(index).ok_or_else(unmatched)?;
            index += 1;
            match c {
                ']' => break,
                '-' if last.is_some() && at(index) != Some(']') => {
                    let lo = last.take().unwrap_or('-');
                    let hi = match at(index).ok_or_else(unmatched)? {
                        '\\' if self.syntax.contains(Syntax::BACKSLASH_ESCAPE_IN_LISTS) => {
                            index += 1;
                            ascii_escape(at(index).ok_or_else(unmatched)?)
                        }
                        hi => hi,
                    };
                    index += 1;
                    if lo <= hi {
                        items.push(Token::Range { lo, hi, icase });
                    } else if self.syntax.contains(Syntax::NO_EMPTY_RANGES) {
                        return Err(Error::new(ErrorKind::InvalidRange, index - 1));
                    }
                }
                '\\' if self.syntax.contains(Syntax::BACKSLASH_ESCAPE_IN_LISTS) => {
                    let escaped = at(index).ok_or_else(unmatched)?;
                    index += 1;
                    push_char(&mut items, last.take(), icase);
                    if self.syntax.contains(Syntax::CHAR_CLASS_ESC_IN_LISTS)
                        && is_class_escape(escaped)
                    {
                        items.push(class_escape(escaped, icase));
                    } else {
                        last = Some(ascii_escape(escaped));
                    }
                }
                '[' if self.syntax.contains(Syntax::CHAR_CLASSES) && at(index) == Some(':') => {
                    let name_start = index + 1;
                    let mut name_end = name_start;
                    loop {
                        match (at(name_end), at(name_end + 1)) {
                            (Some(':'), Some(']')) => break,
                            (Some(_), _) => name_end += 1,
                            (None, _) => {
                                return Err(Error::new(ErrorKind::UnterminatedClass, index - 1))
                            }
                        }
                    }
                    let name: String = self.pattern[name_start..name_end].iter().collect();
                    let class = PosixClass::from_name(&name)
                        .ok_or_else(|| Error::new(ErrorKind::UnknownClass, index - 1))?;
                    push_char(&mut items, last.take(), icase);
                    items.push(Token::Class {
                        class,
                        negated: false,
                        icase,
                    });
                    index = name_end + 2;
                }
                c => {
                    push_char(&mut items, last.replace(c), icase);
                }
            }
        }
        push_char(&mut items, last, icase);

        let set = Token::OneOf {
            items,
            negated,
            excludes_newline: negated && self.syntax.contains(Syntax::HAT_LISTS_NOT_NEWLINE),
        };
        Ok((set, index))
    }

    /// Parses the bounds of an interval whose brace is at `open`. Returns
    /// `None` when no digit follows the brace, so the brace is a literal.
    fn parse_interval(
        &self,
        open: usize,
        start: usize,
        end: usize,
    ) -> CompileResult<Option<(u32, Option<u32>, usize)>> {
        let digit_at = |i: usize| {
            if i < end {
                self.pattern[i].to_digit(10)
            } else {
                None
            }
        };
        if digit_at(start).is_none() {
            return Ok(None);
        }

        let number = |mut i: usize| -> CompileResult<(Option<u32>, usize)> {
            let mut value: Option<u32> = None;
            while let Some(d) = digit_at(i) {
                let n = value
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(d))
                    .ok_or_else(|| Error::new(ErrorKind::InvalidInterval, open))?;
                value = Some(n);
                i += 1;
            }
            Ok((value, i))
        };

        let (min, mut index) = number(start)?;
        let min = min.unwrap_or(0);
        let max = if index < end && self.pattern[index] == ',' {
            let (max, after) = number(index + 1)?;
            index = after;
            max
        } else {
            Some(min)
        };

        let unterminated = || Error::new(ErrorKind::UnterminatedInterval, open);
        if index >= end {
            return Err(unterminated());
        }
        let (unit, after) = self.unit(index)?;
        if unit.ch != '}' || !self.is_brace(unit) || after > end {
            return Err(unterminated());
        }
        Ok(Some((min, max, after)))
    }

    /// `x?` makes a repeat, or turns a preceding repeat stingy.
    fn question(&self, current: Option<Token>, at: usize) -> CompileResult<Token> {
        match current {
            Some(Token::Repeated(mut repeat)) => {
                if self.syntax.contains(Syntax::STINGY_OPS) && !repeat.stingy {
                    repeat.stingy = true;
                    Ok(Token::Repeated(repeat))
                } else {
                    Err(Error::new(ErrorKind::RepeatChained, at))
                }
            }
            current => repeated(current, 0, Some(1), at),
        }
    }

    /// Reads the unit at `index`, returning it and the index after it.
    fn unit(&self, index: usize) -> CompileResult<(Unit, usize)> {
        match self.pattern.get(index) {
            Some('\\') => match self.pattern.get(index + 1) {
                Some(&ch) => Ok((Unit { ch, bk: true }, index + 2)),
                None => Err(Error::new(ErrorKind::TrailingBackslash, index)),
            },
            Some(&ch) => Ok((Unit { ch, bk: false }, index + 1)),
            None => Err(Error::new(ErrorKind::UnclosedGroup, index)),
        }
    }

    fn is_alternation(&self, unit: Unit) -> bool {
        if self.syntax.contains(Syntax::LIMITED_OPS) {
            return false;
        }
        (unit.ch == '|' && unit.bk != self.syntax.contains(Syntax::NO_BK_VBAR))
            || (unit.ch == '\n' && !unit.bk && self.syntax.contains(Syntax::NEWLINE_ALT))
    }

    fn is_open_paren(&self, unit: Unit) -> bool {
        unit.ch == '(' && unit.bk != self.syntax.contains(Syntax::NO_BK_PARENS)
    }

    fn is_close_paren(&self, unit: Unit) -> bool {
        unit.ch == ')' && unit.bk != self.syntax.contains(Syntax::NO_BK_PARENS)
    }

    fn is_brace(&self, unit: Unit) -> bool {
        unit.bk != self.syntax.contains(Syntax::NO_BK_BRACES)
    }

    fn is_plus_qm(&self, bk: bool) -> bool {
        !self.syntax.contains(Syntax::LIMITED_OPS) && bk == self.syntax.contains(Syntax::BK_PLUS_QM)
    }

    fn line_separator(&self) -> Option<String> {
        if self.options.is_multi_line() {
            Some(self.options.get_line_separator().to_string())
        } else {
            None
        }
    }
}

/// Moves the buffered atom into the sequence and buffers `token` instead.
fn shift(seq: &mut Vec<Token>, current: &mut Option<Token>, token: Token) {
    seq.extend(current.replace(token));
}

fn sequence(mut tokens: Vec<Token>) -> Token {
    if tokens.len() == 1 {
        if let Some(token) = tokens.pop() {
            return token;
        }
    }
    Token::Sequence(tokens)
}

/// Wraps the buffered atom in a repeat, rejecting atoms that cannot repeat.
fn repeated(current: Option<Token>, min: u32, max: Option<u32>, at: usize) -> CompileResult<Token> {
    let token = match current {
        None => return Err(Error::new(ErrorKind::RepeatNoToken, at)),
        Some(Token::Repeated(_)) => return Err(Error::new(ErrorKind::RepeatChained, at)),
        Some(token) if token.is_assertion() => {
            return Err(Error::new(ErrorKind::RepeatAssertion, at))
        }
        Some(token) if max.is_none() && token.min_len() == 0 => {
            return Err(Error::new(ErrorKind::RepeatEmptyToken, at))
        }
        Some(token) => token,
    };
    Ok(Token::Repeated(Box::new(Repeat {
        token,
        min,
        max,
        stingy: false,
    })))
}

fn push_char(items: &mut Vec<Token>, ch: Option<char>, icase: bool) {
    if let Some(ch) = ch {
        items.push(Token::Char { ch, icase });
    }
}

fn is_class_escape(c: char) -> bool {
    matches!(c, 'd' | 'D' | 's' | 'S' | 'w' | 'W')
}

fn class_escape(c: char, icase: bool) -> Token {
    let class = match c.to_ascii_lowercase() {
        'd' => PosixClass::Digit,
        's' => PosixClass::Space,
        _ => PosixClass::Word,
    };
    Token::Class {
        class,
        negated: c.is_ascii_uppercase(),
        icase,
    }
}

fn ascii_escape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        c => c,
    }
}
