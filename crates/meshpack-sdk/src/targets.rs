//! Cross-compilation target resolution.
//!
//! Maps a [`PlatformDescriptor`] to a canonical target triple by matching
//! its query string against an ordered table of wildcard patterns. A miss
//! is the normal outcome for desktop and server platforms, which build
//! with native host inference instead of an explicit `--host`.

use crate::types::PlatformDescriptor;

/// A single pattern-to-triple mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternEntry {
    /// Wildcard pattern matched against the descriptor query string.
    /// `*` matches any run of characters; everything else is literal.
    pub pattern: &'static str,
    /// Target triple consumed by the cross-compiling toolchain.
    pub triple: &'static str,
}

/// Built-in pattern table for mobile targets.
///
/// Scanned in declaration order; the first match wins. Entries must be
/// kept disjoint by convention — the resolver does not detect overlap,
/// so an overlapping addition is a latent configuration defect rather
/// than a runtime error.
pub const CROSS_TARGETS: &[PatternEntry] = &[
    PatternEntry {
        pattern: "iOS-x86-*",
        triple: "i386-apple-ios",
    },
    PatternEntry {
        pattern: "iOS-x86_64-*",
        triple: "x86_64-apple-ios",
    },
];

/// Resolves platform descriptors to cross-compilation triples.
///
/// # Example
///
/// ```
/// use meshpack_sdk::{PlatformDescriptor, TargetResolver};
///
/// let resolver = TargetResolver::default();
/// let ios = PlatformDescriptor::new("iOS", "x86", "clang");
/// assert_eq!(resolver.resolve(&ios), Some("i386-apple-ios"));
///
/// let linux = PlatformDescriptor::new("Linux", "x86_64", "gcc");
/// assert_eq!(resolver.resolve(&linux), None);
/// ```
#[derive(Debug, Clone)]
pub struct TargetResolver {
    entries: &'static [PatternEntry],
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self {
            entries: CROSS_TARGETS,
        }
    }
}

impl TargetResolver {
    /// Creates a resolver over a custom table. First match wins.
    pub fn with_table(entries: &'static [PatternEntry]) -> Self {
        Self { entries }
    }

    /// Returns the triple of the first entry whose pattern matches the
    /// descriptor's query string, or `None` when nothing matches.
    ///
    /// Pure over the table and descriptor; no side effects.
    pub fn resolve(&self, descriptor: &PlatformDescriptor) -> Option<&'static str> {
        let query = descriptor.query();
        self.entries
            .iter()
            .find(|entry| wildcard_match(entry.pattern, &query))
            .map(|entry| entry.triple)
    }
}

/// Anchored, case-sensitive `*`-wildcard match.
///
/// `*` matches any run of characters, including the empty run; every
/// other character matches itself. No character classes, no `?`. The
/// whole text must be consumed for a match.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    // Position of the last `*` seen, and where its match attempt started.
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < txt.len() {
        if pi < pat.len() && pat[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if pi < pat.len() && pat[pi] == txt[ti] {
            pi += 1;
            ti += 1;
        } else if let Some(star_pos) = star {
            // Backtrack: widen the last `*` by one character.
            pi = star_pos + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    // Only trailing stars may remain in the pattern.
    while pi < pat.len() && pat[pi] == '*' {
        pi += 1;
    }
    pi == pat.len()
}
