//! Integration Test: Sleep Confinement
//!
//! **Policy**: The only production wait is the reveal pause, and it lives in
//! the injectable timer so tests can drive time. Everything else waits on
//! I/O or cancellation.
//!
//! **Exceptions**: `chatty/core/src/streaming/timer.rs`, test modules.
//! `std::thread::sleep` is forbidden everywhere, tests included.

use std::fs;
use std::path::Path;

use architectural_enforcement::workspace_root;

/// Files allowed to call an async sleep outside tests
const TIMER_FILES: &[&str] = &["chatty/core/src/streaming/timer.rs"];

/// Production source trees to scan
const SOURCE_DIRS: &[&str] = &["chatty/core/src", "chatty/cli/src"];

#[test]
fn test_sleep_confined_to_reveal_timer() {
    let root = workspace_root();
    let mut violations = Vec::new();
    let mut scanned = 0;

    for dir in SOURCE_DIRS {
        let path = root.join(dir);
        assert!(path.exists(), "missing source dir {}", path.display());

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(entry.path()) else {
                continue;
            };
            scanned += 1;

            let allowed = TIMER_FILES.iter().any(|f| entry.path().ends_with(f));
            for (line_number, line) in find_sleep_calls(&content, allowed) {
                violations.push(format!(
                    "{}:{} - {}",
                    entry.path().display(),
                    line_number,
                    line.trim()
                ));
            }
        }
    }

    assert!(scanned > 0, "no source files scanned");

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found outside the reveal timer!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Pace through RevealTimer::pause; wait on I/O or cancellation otherwise");

        panic!("\nFound {} sleep violation(s).", violations.len());
    }
}

/// Return `(line_number, line)` for every forbidden sleep in `content`
///
/// When `allowed` is set, async sleeps are tolerated; blocking thread
/// sleeps never are. Code after `#[cfg(test)]` is only checked for
/// blocking sleeps.
fn find_sleep_calls(content: &str, allowed: bool) -> Vec<(usize, &str)> {
    let mut found = Vec::new();
    let mut in_tests = false;

    for (idx, line) in content.lines().enumerate() {
        let code = line.split("//").next().unwrap_or(line);

        if code.trim_start().starts_with("#[cfg(test)]") {
            in_tests = true;
        }

        if code.contains("thread::sleep(") {
            found.push((idx + 1, line));
            continue;
        }

        let is_sleep = code.contains("::sleep(") || code.contains(".sleep(");
        if is_sleep && !allowed && !in_tests {
            found.push((idx + 1, line));
        }
    }

    found
}

// =============================================================================
// Detector self-tests
// =============================================================================

#[test]
fn test_detects_sleep_in_production_code() {
    let src = "async fn poll() {\n    tokio::time::sleep(d).await;\n}\n";
    let found = find_sleep_calls(src, false);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, 2);
}

#[test]
fn test_allows_sleep_in_timer_file() {
    let src = "async fn pause(&self) {\n    tokio::time::sleep(d).await;\n}\n";
    assert!(find_sleep_calls(src, true).is_empty());
}

#[test]
fn test_ignores_comments_and_test_modules() {
    let src = "// tokio::time::sleep(d) is not used here\n\
               fn real() {}\n\
               #[cfg(test)]\n\
               mod tests {\n    async fn t() { tokio::time::sleep(d).await; }\n}\n";
    assert!(find_sleep_calls(src, false).is_empty());
}

#[test]
fn test_thread_sleep_is_always_forbidden() {
    let src = "#[cfg(test)]\nmod tests {\n    fn t() { std::thread::sleep(d); }\n}\n";
    assert_eq!(find_sleep_calls(src, true).len(), 1);
}
