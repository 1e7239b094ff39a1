//! Set of users currently typing.

use std::{ops::Sub, time::Duration};

#[derive(Debug, Clone)]
struct Typer<I> {
    name: String,
    refreshed_at: I,
}

/// Users believed to be composing, in arrival order.
///
/// # Invariants
///
/// - A name appears at most once, however many "typing" signals arrive
/// - Iteration order is the order names were first inserted
///
/// Typing sets stay small (a handful of names), so entries live in a `Vec`
/// and lookups are linear scans.
#[derive(Debug, Clone)]
pub struct TyperSet<I> {
    entries: Vec<Typer<I>>,
}

impl<I> Default for TyperSet<I> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<I> TyperSet<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a "typing" signal.
    ///
    /// Returns `true` if the name was newly added. An existing entry keeps its
    /// position and only has its refresh time updated.
    pub fn insert(&mut self, name: &str, now: I) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|t| t.name == name) {
            entry.refreshed_at = now;
            return false;
        }
        self.entries.push(Typer { name: name.to_owned(), refreshed_at: now });
        true
    }

    /// Record a "stopTyping" signal. Returns `true` if the name was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| t.name != name);
        self.entries.len() != before
    }

    /// Remove every entry not refreshed within `ttl` of `now`.
    ///
    /// Returns the removed names in arrival order.
    pub fn expire(&mut self, now: I, ttl: Duration) -> Vec<String> {
        let mut expired = Vec::new();
        self.entries.retain(|t| {
            let stale = now - t.refreshed_at >= ttl;
            if stale {
                expired.push(t.name.clone());
            }
            !stale
        });
        expired
    }

    /// True if `name` is currently typing.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|t| t.name == name)
    }

    /// Names in arrival order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|t| t.name.as_str())
    }

    /// Number of typers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nobody is typing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indicator text, e.g. `"Bob is typing..."` or `"Bob, Carol are typing..."`.
    ///
    /// `None` when nobody is typing.
    pub fn indicator(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.names().collect();
        let verb = if names.len() == 1 { "is" } else { "are" };
        Some(format!("{} {verb} typing...", names.join(", ")))
    }
}
