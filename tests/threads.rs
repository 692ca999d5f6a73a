use std::thread;

use once_cell::sync::Lazy;
use retrack::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\w+)\b").unwrap());

#[test]
fn shared_regex_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let text = format!("thread {} says hi", i);
                WORD.find_iter(&text).filter_map(|m| m.ok()).count()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 4);
    }
}

#[test]
fn cloned_regex_moves_into_threads() {
    let re = Regex::new("(a+)(b+)").unwrap();
    let handles: Vec<_> = (1..=3)
        .map(|n| {
            let re = re.clone();
            thread::spawn(move || {
                let text = format!("{}{}", "a".repeat(n), "b".repeat(n));
                let caps = re.captures(&text).unwrap().unwrap();
                (caps[1].len(), caps[2].len())
            })
        })
        .collect();
    for (n, handle) in (1..=3).zip(handles) {
        assert_eq!(handle.join().unwrap(), (n, n));
    }
}
