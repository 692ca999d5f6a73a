/*!
This crate provides a backtracking regular expression engine with selectable
syntaxes.

Patterns are compiled into a tree of tokens and run by a backtracking matcher,
so the crate supports features that finite automata cannot, such as
backreferences and lookahead. The price is that matching can take
exponential time on some pattern and input pairs. A search can be given a
step budget with [`RegexBuilder::step_limit`], in which case it fails with an
error rather than running on.

# Example

```rust
use retrack::Regex;

let re = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
let caps = re.captures("released on 2010-03-14").unwrap().unwrap();
assert_eq!(&caps[1], "2010");
assert_eq!(caps.get(0).unwrap().start(), 12);
```

# Syntax

The default syntax is Perl 5: the usual operators, stingy repeats such as
`a*?`, non-capturing groups `(?:...)`, lookahead `(?=...)` and `(?!...)`,
comments `(?#...)`, backreferences `\1` to `\9`, the classes `\d`, `\s` and
`\w`, and the anchors `\A`, `\Z`, `\b` and `\B`.

Other dialects are available through [`Syntax`]:

```rust
use retrack::{RegexBuilder, Syntax};

let re = RegexBuilder::new(r"\(ab\)\{2\}")
    .syntax(Syntax::POSIX_BASIC)
    .build()
    .unwrap();
assert!(re.is_match("xababx").unwrap());
```

# Offsets

All offsets are char offsets into the searched text, not byte offsets.
[`Match::byte_range`] gives the byte offsets of a match.

# Crate features

* **logging** - Emits compile and search diagnostics through the `log`
  crate.
*/

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_debug_implementations)]

pub use backtrack_compiler::{escape, ErrorKind, MatchError, Syntax};

pub use crate::error::{Error, Result};
pub use crate::regex::{
    CaptureMatches, Captures, Match, Matches, Regex, RegexBuilder, Split,
};
pub use crate::replacer::{NoExpand, Replacer};

mod error;
mod regex;
mod replacer;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
