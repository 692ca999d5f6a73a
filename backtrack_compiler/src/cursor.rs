//! Per-attempt match state.
//!
//! A [`Cursor`] is a position plus a persistent chain of group boundary
//! writes. Cloning a cursor is cheap and every write produces a new cursor,
//! so each backtracking branch sees only the writes made along its own path.

use std::rc::Rc;

use crate::MatchError;

/// A half-open range of char offsets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug)]
struct Mark {
    group: usize,
    start: usize,
    /// `None` while the group is still open
    end: Option<usize>,
    parent: Option<Rc<Mark>>,
}

// Unlink iteratively; a long match leaves a long chain behind.
impl Drop for Mark {
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(mark) = next {
            match Rc::try_unwrap(mark) {
                Ok(mut mark) => next = mark.parent.take(),
                Err(_) => break,
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Cursor {
    pos: usize,
    marks: Option<Rc<Mark>>,
}

impl Cursor {
    pub fn new(pos: usize) -> Self {
        Cursor { pos, marks: None }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The same bindings, `n` chars further along.
    pub fn advance(&self, n: usize) -> Cursor {
        Cursor {
            pos: self.pos + n,
            marks: self.marks.clone(),
        }
    }

    /// Records a tentative start for `group` at the current position.
    pub fn open(&self, group: usize) -> Cursor {
        self.push(group, self.pos, None)
    }

    /// Ends the latest open write for `group` at the current position.
    pub fn close(&self, group: usize) -> Result<Cursor, MatchError> {
        match self.latest(group) {
            Some(mark) if mark.end.is_none() => {
                let start = mark.start;
                Ok(self.push(group, start, Some(self.pos)))
            }
            _ => Err(MatchError::Internal(format!(
                "group {} closed at {} without being open",
                group, self.pos
            ))),
        }
    }

    /// The latest completed binding of `group`. A write that is still open,
    /// such as the group enclosing a backreference to itself, is skipped in
    /// favor of the previous completed one.
    pub fn group(&self, group: usize) -> Option<Span> {
        self.iter()
            .filter(|mark| mark.group == group)
            .find_map(|mark| mark.end.map(|end| Span::new(mark.start, end)))
    }

    /// The final group table. Groups never written are `None`.
    pub fn snapshot(&self, group_count: usize) -> Result<Vec<Option<Span>>, MatchError> {
        let mut spans = vec![None; group_count];
        let mut seen = vec![false; group_count];
        for mark in self.iter() {
            let slot = seen.get_mut(mark.group).ok_or_else(|| {
                MatchError::Internal(format!(
                    "group {} out of range for {} groups",
                    mark.group, group_count
                ))
            })?;
            if *slot {
                continue;
            }
            *slot = true;
            match mark.end {
                Some(end) => spans[mark.group] = Some(Span::new(mark.start, end)),
                None => {
                    return Err(MatchError::Internal(format!(
                        "group {} still open at acceptance",
                        mark.group
                    )))
                }
            }
        }
        Ok(spans)
    }

    fn push(&self, group: usize, start: usize, end: Option<usize>) -> Cursor {
        Cursor {
            pos: self.pos,
            marks: Some(Rc::new(Mark {
                group,
                start,
                end,
                parent: self.marks.clone(),
            })),
        }
    }

    fn latest(&self, group: usize) -> Option<&Mark> {
        self.iter().find(|mark| mark.group == group)
    }

    fn iter(&self) -> impl Iterator<Item = &Mark> {
        std::iter::successors(self.marks.as_deref(), |mark| mark.parent.as_deref())
    }
}
