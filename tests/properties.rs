use quickcheck::{quickcheck, TestResult};
use retrack::{escape, Regex};

/// Folds arbitrary text onto the alphabet `ab` so that patterns over it
/// actually match.
fn fold(text: &str) -> String {
    text.chars()
        .map(|c| if c as u32 % 2 == 0 { 'a' } else { 'b' })
        .collect()
}

const PATTERNS: &[&str] = &["a+", "b*", "(a|b)b", "a*?b", "(ab)+", "(a)\\1", "a(?=b)"];

#[test]
fn escaped_text_matches_itself() {
    fn prop(text: String) -> TestResult {
        let re = match Regex::new(&escape(&text)) {
            Ok(re) => re,
            Err(_) => return TestResult::failed(),
        };
        TestResult::from_bool(re.is_full_match(&text).unwrap_or(false))
    }
    quickcheck(prop as fn(String) -> TestResult);
}

#[test]
fn find_agrees_with_captures() {
    fn prop(text: String) -> bool {
        let text = fold(&text);
        PATTERNS.iter().all(|pattern| {
            let Ok(re) = Regex::new(pattern) else {
                return false;
            };
            let found = re.find(&text).ok().flatten().map(|m| m.range());
            let caps = re.captures(&text).ok().flatten();
            found == caps.and_then(|caps| caps.get(0)).map(|m| m.range())
        })
    }
    quickcheck(prop as fn(String) -> bool);
}

#[test]
fn matches_are_ordered_and_disjoint() {
    fn prop(text: String) -> bool {
        let text = fold(&text);
        PATTERNS.iter().all(|pattern| {
            let Ok(re) = Regex::new(pattern) else {
                return false;
            };
            let mut last_end = 0;
            for m in re.find_iter(&text) {
                let Ok(m) = m else {
                    return false;
                };
                if m.start() < last_end || m.end() < m.start() {
                    return false;
                }
                last_end = m.end();
            }
            true
        })
    }
    quickcheck(prop as fn(String) -> bool);
}

#[test]
fn split_and_matches_rebuild_the_text() {
    fn prop(text: String) -> bool {
        let text = fold(&text);
        PATTERNS.iter().all(|pattern| {
            let Ok(re) = Regex::new(pattern) else {
                return false;
            };
            let pieces = match re.split(&text).collect::<retrack::Result<Vec<_>>>() {
                Ok(pieces) => pieces,
                Err(_) => return false,
            };
            let found: Vec<&str> = match re.find_iter(&text).collect::<retrack::Result<Vec<_>>>() {
                Ok(found) => found.into_iter().map(|m| m.as_str()).collect(),
                Err(_) => return false,
            };
            if pieces.len() != found.len() + 1 {
                return false;
            }
            let mut rebuilt = String::new();
            for (i, piece) in pieces.iter().enumerate() {
                rebuilt.push_str(piece);
                if let Some(m) = found.get(i) {
                    rebuilt.push_str(m);
                }
            }
            rebuilt == text
        })
    }
    quickcheck(prop as fn(String) -> bool);
}

#[test]
fn full_match_implies_match_at_zero() {
    fn prop(text: String) -> bool {
        let text = fold(&text);
        PATTERNS.iter().all(|pattern| {
            let Ok(re) = Regex::new(pattern) else {
                return false;
            };
            match re.is_full_match(&text) {
                Ok(true) => re.find(&text).ok().flatten().map_or(false, |m| m.start() == 0),
                Ok(false) => true,
                Err(_) => false,
            }
        })
    }
    quickcheck(prop as fn(String) -> bool);
}

#[test]
fn searches_are_deterministic() {
    fn prop(text: String) -> bool {
        let text = fold(&text);
        let spans = |pattern: &str| -> Option<Vec<(usize, usize)>> {
            let re = Regex::new(pattern).ok()?;
            re.find_iter(&text)
                .map(|m| m.map(|m| (m.start(), m.end())).ok())
                .collect()
        };
        PATTERNS.iter().all(|pattern| {
            let first = spans(pattern);
            first.is_some() && first == spans(pattern)
        })
    }
    quickcheck(prop as fn(String) -> bool);
}
