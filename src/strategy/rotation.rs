//! Shared rotation state: the only mutable state strategies keep across
//! resolutions.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// Lock-free round-robin over a fixed list.
#[derive(Debug)]
pub struct RoundRobin<T> {
    items: Vec<T>,
    next: AtomicUsize,
}

impl<T> RoundRobin<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next: AtomicUsize::new(0),
        }
    }

    /// Next item in rotation, `None` when the list is empty.
    pub fn next(&self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.items.len();
        self.items.get(index)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// User-Agent pool with random selection that never hands out the same
/// agent twice in a row (when the pool has more than one entry).
#[derive(Debug)]
pub struct UserAgentPool {
    agents: Vec<String>,
    last: AtomicUsize,
}

impl UserAgentPool {
    /// Blank entries are dropped; an all-blank pool falls back to `fallback`.
    pub fn new(agents: &[String], fallback: &str) -> Self {
        let mut agents: Vec<String> = agents
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if agents.is_empty() {
            agents.push(fallback.to_string());
        }
        Self {
            agents,
            last: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn pick(&self) -> &str {
        let len = self.agents.len();
        if len == 1 {
            return &self.agents[0];
        }
        let previous = self.last.load(Ordering::Relaxed);
        let mut index = rand::rng().random_range(0..len);
        if index == previous {
            index = (index + 1) % len;
        }
        self.last.store(index, Ordering::Relaxed);
        &self.agents[index]
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Uniform random pick from a static list.
pub(crate) fn pick_random<'a>(items: &[&'a str]) -> Option<&'a str> {
    if items.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..items.len());
    items.get(index).copied()
}
