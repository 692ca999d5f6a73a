use std::rc::Rc;

use crate::cursor::{Cursor, Span};
use crate::input::CharIndexed;
use crate::syntax::ExecFlags;
use crate::token::{eq_ignore_case, is_word_char, Boundary, Program, Repeat, Token};
use crate::MatchError;

/// Limits that apply to a single search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of match steps per call. `None` means unlimited.
    pub step_limit: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }
}

/// The group boundaries of a successful match
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    whole: Span,
    groups: Vec<Option<Span>>,
}

impl MatchResult {
    /// The span of the whole match, group 0.
    pub fn span(&self) -> Span {
        self.whole
    }

    pub fn start(&self) -> usize {
        self.whole.start
    }

    pub fn end(&self) -> usize {
        self.whole.end
    }

    /// The number of group slots, counting group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// The span of group `index`, or `None` if it did not take part in the
    /// match.
    pub fn get(&self, index: usize) -> Option<Span> {
        self.groups.get(index).copied().flatten()
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        self.groups.iter().copied()
    }
}

/// A backtracking matcher that executes a compiled [`Program`] against input
pub struct Matcher<'p> {
    program: &'p Program,
    config: Config,
}

impl<'p> Matcher<'p> {
    /// Create a new matcher for the given program
    pub fn new(program: &'p Program) -> Self {
        Self::with_config(program, Config::default())
    }

    pub fn with_config(program: &'p Program, config: Config) -> Self {
        Self { program, config }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Try a single match that starts exactly at `start`.
    pub fn match_at<I>(
        &self,
        input: &I,
        start: usize,
        flags: ExecFlags,
    ) -> Result<Option<MatchResult>, MatchError>
    where
        I: CharIndexed + ?Sized,
    {
        if start > input.len() {
            return Ok(None);
        }
        self.exec(input, start, flags).attempt(start, Mode::First)
    }

    /// Find the first match starting at or after `start`.
    pub fn search<I>(
        &self,
        input: &I,
        start: usize,
        flags: ExecFlags,
    ) -> Result<Option<MatchResult>, MatchError>
    where
        I: CharIndexed + ?Sized,
    {
        let len = input.len();
        let min_len = self.program.min_len();
        let mut exec = self.exec(input, start, flags);
        let mut at = start;
        while at <= len && len - at >= min_len {
            trace!("attempting {:?} at offset {}", self.program.pattern(), at);
            if let Some(found) = exec.attempt(at, Mode::First)? {
                return Ok(Some(found));
            }
            at += 1;
        }
        trace!("no match for {:?} after {} steps", self.program.pattern(), exec.steps);
        Ok(None)
    }

    /// Match the whole input, backtracking until a match ends at the last
    /// char.
    pub fn match_full<I>(
        &self,
        input: &I,
        flags: ExecFlags,
    ) -> Result<Option<MatchResult>, MatchError>
    where
        I: CharIndexed + ?Sized,
    {
        self.exec(input, 0, flags).attempt(0, Mode::Whole)
    }

    fn exec<'i, I>(&self, input: &'i I, start: usize, flags: ExecFlags) -> Exec<'p, 'i, I>
    where
        I: CharIndexed + ?Sized,
    {
        let floor = if flags.contains(ExecFlags::ANCHOR_INDEX) {
            start
        } else {
            0
        };
        Exec {
            program: self.program,
            input,
            flags,
            floor,
            limit: self.config.step_limit,
            steps: 0,
        }
    }
}

/// What a continuation frame does when a path reaches it
#[derive(Clone, Copy, Debug)]
enum FrameKind<'p> {
    /// The remaining tokens of a sequence
    Seq(&'p [Token]),
    /// The end of a capturing group
    Close(usize),
}

#[derive(Debug)]
struct Frame<'p> {
    kind: FrameKind<'p>,
    next: Cont<'p>,
}

/// Everything left to match after the current token. `None` accepts.
type Cont<'p> = Option<Rc<Frame<'p>>>;

enum Work<'p> {
    /// Match one token at the cursor
    Token(&'p Token, Cursor),
    /// Hand the cursor to the continuation
    Continue(Cursor),
    /// Grow a stingy repeat one more count past `frontier`
    Grow {
        repeat: &'p Repeat,
        frontier: Vec<Cursor>,
        count: u32,
    },
}

/// A pending alternative: work to do and what follows it
struct Job<'p> {
    work: Work<'p>,
    cont: Cont<'p>,
}

enum Step {
    /// The token matched; continue from this cursor
    Next(Cursor),
    /// Nothing more on this path, either because it failed or because its
    /// alternatives were pushed as jobs
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Stop at the first accepted cursor
    First,
    /// Collect every accepted cursor, in preference order
    All,
    /// Like `First`, accepting only at the end of the input
    Whole,
}

/// The state of one call into the matcher
struct Exec<'p, 'i, I: ?Sized> {
    program: &'p Program,
    input: &'i I,
    flags: ExecFlags,
    /// Where the input begins for anchors and word boundaries
    floor: usize,
    limit: Option<u64>,
    steps: u64,
}

impl<'p, 'i, I: CharIndexed + ?Sized> Exec<'p, 'i, I> {
    fn attempt(&mut self, start: usize, mode: Mode) -> Result<Option<MatchResult>, MatchError> {
        let program: &'p Program = self.program;
        let accepted = self.run(Work::Token(&program.root, Cursor::new(start)), None, mode)?;
        let cursor = match accepted.into_iter().next() {
            Some(cursor) => cursor,
            None => return Ok(None),
        };
        let groups = cursor.snapshot(program.group_count)?;
        let whole = Span::new(start, cursor.pos());
        if groups.first().copied().flatten() != Some(whole) {
            return Err(MatchError::Internal(format!(
                "group 0 is {:?}, expected {:?}",
                groups.first(),
                whole
            )));
        }
        Ok(Some(MatchResult { whole, groups }))
    }

    fn run(&mut self, work: Work<'p>, cont: Cont<'p>, mode: Mode) -> Result<Vec<Cursor>, MatchError> {
        let mut stack = vec![Job { work, cont }];
        let mut accepted = Vec::new();

        while let Some(Job { mut work, mut cont }) = stack.pop() {
            loop {
                self.tick()?;
                let cursor = match work {
                    Work::Token(token, cursor) => match self.step(token, cursor, &cont, &mut stack)? {
                        Step::Next(cursor) => cursor,
                        Step::Stop => break,
                    },
                    Work::Continue(cursor) => cursor,
                    Work::Grow {
                        repeat,
                        frontier,
                        count,
                    } => {
                        let next = self.advance_all(repeat, &frontier, count)?;
                        self.offer(repeat, next, count + 1, &cont, &mut stack)?;
                        break;
                    }
                };

                let frame = match cont.take() {
                    Some(frame) => frame,
                    None => {
                        if mode == Mode::Whole && cursor.pos() != self.input.len() {
                            break;
                        }
                        accepted.push(cursor);
                        if mode == Mode::All {
                            break;
                        }
                        return Ok(accepted);
                    }
                };
                cont = frame.next.clone();
                work = match frame.kind {
                    FrameKind::Seq(tokens) => match tokens.split_first() {
                        Some((first, rest)) => {
                            if !rest.is_empty() {
                                cont = Some(Rc::new(Frame {
                                    kind: FrameKind::Seq(rest),
                                    next: cont,
                                }));
                            }
                            Work::Token(first, cursor)
                        }
                        None => Work::Continue(cursor),
                    },
                    FrameKind::Close(group) => Work::Continue(cursor.close(group)?),
                };
            }
        }

        Ok(accepted)
    }

    fn step(
        &mut self,
        token: &'p Token,
        cursor: Cursor,
        cont: &Cont<'p>,
        stack: &mut Vec<Job<'p>>,
    ) -> Result<Step, MatchError> {
        let step = match token {
            Token::Char { .. }
            | Token::Range { .. }
            | Token::Class { .. }
            | Token::OneOf { .. }
            | Token::Any { .. } => self.single(token, cursor),
            Token::Start { line_sep } => {
                let ok = self.at_line_start(cursor.pos(), line_sep.as_deref());
                check(ok, cursor)
            }
            Token::End { line_sep } => {
                let ok = self.at_line_end(cursor.pos(), line_sep.as_deref());
                check(ok, cursor)
            }
            Token::WordBoundary { kind, negated } => {
                let ok = self.at_word_boundary(cursor.pos(), *kind) != *negated;
                check(ok, cursor)
            }
            Token::BackRef { group, icase, .. } => self.back_ref(*group, *icase, cursor),
            Token::Sequence(tokens) => match tokens.split_first() {
                None => Step::Next(cursor),
                Some((first, rest)) => {
                    let next = if rest.is_empty() {
                        cont.clone()
                    } else {
                        Some(Rc::new(Frame {
                            kind: FrameKind::Seq(rest),
                            next: cont.clone(),
                        }))
                    };
                    stack.push(Job {
                        work: Work::Token(first, cursor),
                        cont: next,
                    });
                    Step::Stop
                }
            },
            Token::Alternation(branches) => {
                for branch in branches.iter().rev() {
                    stack.push(Job {
                        work: Work::Token(branch, cursor.clone()),
                        cont: cont.clone(),
                    });
                }
                Step::Stop
            }
            Token::Group { body, index } => {
                let (cursor, next) = match index {
                    Some(group) => (
                        cursor.open(*group),
                        Some(Rc::new(Frame {
                            kind: FrameKind::Close(*group),
                            next: cont.clone(),
                        })),
                    ),
                    None => (cursor, cont.clone()),
                };
                stack.push(Job {
                    work: Work::Token(&**body, cursor),
                    cont: next,
                });
                Step::Stop
            }
            Token::LookAhead { body, negated } => {
                // Inner bindings are dropped with the inner cursor.
                let found = !self
                    .run(Work::Token(&**body, cursor.clone()), None, Mode::First)?
                    .is_empty();
                check(found != *negated, cursor)
            }
            Token::Repeated(repeat) => {
                let repeat: &'p Repeat = repeat;
                if repeat.stingy {
                    self.offer(repeat, vec![cursor], 0, cont, stack)?;
                } else {
                    self.greedy(repeat, cursor, cont, stack)?;
                }
                Step::Stop
            }
        };
        Ok(step)
    }

    fn single(&self, token: &Token, cursor: Cursor) -> Step {
        match self.input.char_at(cursor.pos()) {
            Some(c) if token.matches_char(c) => Step::Next(cursor.advance(1)),
            _ => Step::Stop,
        }
    }

    /// Every way `token` can match once from `cursor`, most preferred first.
    fn forks(&mut self, token: &'p Token, cursor: &Cursor) -> Result<Vec<Cursor>, MatchError> {
        if token.is_single_char() {
            self.tick()?;
            return Ok(match self.single(token, cursor.clone()) {
                Step::Next(next) => vec![next],
                Step::Stop => Vec::new(),
            });
        }
        self.run(Work::Token(token, cursor.clone()), None, Mode::All)
    }

    /// The cursors reachable with one more repetition than `frontier`, which
    /// holds the cursors for `count`.
    fn advance_all(
        &mut self,
        repeat: &'p Repeat,
        frontier: &[Cursor],
        count: u32,
    ) -> Result<Vec<Cursor>, MatchError> {
        // Past the minimum an unbounded repeat must make progress.
        let guard = repeat.max.is_none() && count >= repeat.min;
        let mut next = Vec::new();
        for cursor in frontier {
            for fork in self.forks(&repeat.token, cursor)? {
                if guard && fork.pos() == cursor.pos() {
                    continue;
                }
                next.push(fork);
            }
        }
        Ok(next)
    }

    fn greedy(
        &mut self,
        repeat: &'p Repeat,
        cursor: Cursor,
        cont: &Cont<'p>,
        stack: &mut Vec<Job<'p>>,
    ) -> Result<(), MatchError> {
        let mut levels = vec![vec![cursor]];
        let mut count = 0u32;
        while repeat.max.map_or(true, |max| count < max) {
            let next = self.advance_all(repeat, &levels[count as usize], count)?;
            if next.is_empty() {
                break;
            }
            levels.push(next);
            count += 1;
        }

        // Deepest level ends up on top of the stack.
        for level in levels.into_iter().skip(repeat.min as usize) {
            for cursor in level.into_iter().rev() {
                stack.push(Job {
                    work: Work::Continue(cursor),
                    cont: cont.clone(),
                });
            }
        }
        Ok(())
    }

    /// Offers `frontier` to the continuation once `count` reaches the
    /// minimum, scheduling one more growth step behind it.
    fn offer(
        &mut self,
        repeat: &'p Repeat,
        mut frontier: Vec<Cursor>,
        mut count: u32,
        cont: &Cont<'p>,
        stack: &mut Vec<Job<'p>>,
    ) -> Result<(), MatchError> {
        while !frontier.is_empty() {
            if count >= repeat.min {
                if repeat.max.map_or(true, |max| count < max) {
                    stack.push(Job {
                        work: Work::Grow {
                            repeat,
                            frontier: frontier.clone(),
                            count,
                        },
                        cont: cont.clone(),
                    });
                }
                for cursor in frontier.into_iter().rev() {
                    stack.push(Job {
                        work: Work::Continue(cursor),
                        cont: cont.clone(),
                    });
                }
                return Ok(());
            }
            frontier = self.advance_all(repeat, &frontier, count)?;
            count += 1;
        }
        Ok(())
    }

    fn back_ref(&self, group: usize, icase: bool, cursor: Cursor) -> Step {
        let span = match cursor.group(group) {
            Some(span) => span,
            None => return Step::Stop,
        };
        let pos = cursor.pos();
        for i in 0..span.len() {
            match (self.input.char_at(span.start + i), self.input.char_at(pos + i)) {
                (Some(a), Some(b)) if a == b || (icase && eq_ignore_case(a, b)) => {}
                _ => return Step::Stop,
            }
        }
        Step::Next(cursor.advance(span.len()))
    }

    fn at_line_start(&self, pos: usize, line_sep: Option<&str>) -> bool {
        if let Some(sep) = line_sep {
            if self.preceded_by(pos, sep) {
                return true;
            }
        }
        !self.flags.contains(ExecFlags::NOT_BOL) && pos == self.floor
    }

    fn at_line_end(&self, pos: usize, line_sep: Option<&str>) -> bool {
        if let Some(sep) = line_sep {
            if self.followed_by(pos, sep) {
                return true;
            }
        }
        !self.flags.contains(ExecFlags::NOT_EOL) && pos == self.input.len()
    }

    fn preceded_by(&self, pos: usize, sep: &str) -> bool {
        let n = sep.chars().count();
        if n == 0 || pos < self.floor + n {
            return false;
        }
        sep.chars()
            .enumerate()
            .all(|(i, c)| self.input.char_at(pos - n + i) == Some(c))
    }

    fn followed_by(&self, pos: usize, sep: &str) -> bool {
        !sep.is_empty()
            && sep
                .chars()
                .enumerate()
                .all(|(i, c)| self.input.char_at(pos + i) == Some(c))
    }

    fn at_word_boundary(&self, pos: usize, kind: Boundary) -> bool {
        let before = pos > self.floor && self.input.char_at(pos - 1).map_or(false, is_word_char);
        let after = self.input.char_at(pos).map_or(false, is_word_char);
        match kind {
            Boundary::Both => before != after,
            Boundary::Begin => !before && after,
            Boundary::End => before && !after,
        }
    }

    fn tick(&mut self) -> Result<(), MatchError> {
        self.steps += 1;
        match self.limit {
            Some(limit) if self.steps > limit => {
                trace!("step limit of {} exceeded", limit);
                Err(MatchError::StepLimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}

fn check(ok: bool, cursor: Cursor) -> Step {
    if ok {
        Step::Next(cursor)
    } else {
        Step::Stop
    }
}
