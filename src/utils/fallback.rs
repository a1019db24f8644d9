//! Ordered fallback chains
//!
//! A [`FallbackChain`] holds extraction strategies in priority order and
//! evaluates them lazily: the first strategy that produces a value wins and
//! the rest are never run. New fallbacks are appended with
//! [`FallbackChain::then`] without touching the existing ones.

use regex::Regex;

/// One way of extracting an `Output` from an input
pub trait Strategy<In: ?Sized> {
    type Output;

    fn attempt(&self, input: &In) -> Option<Self::Output>;
}

impl<In, Out, F> Strategy<In> for F
where
    In: ?Sized,
    F: Fn(&In) -> Option<Out>,
{
    type Output = Out;

    fn attempt(&self, input: &In) -> Option<Out> {
        self(input)
    }
}

/// Strategies tried in order until one succeeds
#[derive(Debug, Clone)]
pub struct FallbackChain<S> {
    strategies: Vec<S>,
}

impl<S> FallbackChain<S> {
    pub fn new(strategies: Vec<S>) -> Self {
        Self { strategies }
    }

    /// Append a lower-priority strategy
    #[must_use]
    pub fn then(mut self, strategy: S) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Evaluate strategies in order, returning the first success
    pub fn resolve<In>(&self, input: &In) -> Option<S::Output>
    where
        In: ?Sized,
        S: Strategy<In>,
    {
        self.strategies.iter().find_map(|s| s.attempt(input))
    }
}

impl<S> FromIterator<S> for FallbackChain<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Regex strategy yielding the first capture group (or the whole match),
/// trimmed, when it is non-empty
#[derive(Debug, Clone)]
pub struct Capture(pub Regex);

impl Strategy<str> for Capture {
    type Output = String;

    fn attempt(&self, input: &str) -> Option<String> {
        let caps = self.0.captures(input)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        let text = m.as_str().trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_success_wins_and_later_strategies_are_skipped() {
        use std::cell::Cell;

        let later_ran = Cell::new(false);
        let never: Box<dyn Fn(&str) -> Option<String> + '_> = Box::new(|_: &str| None);
        let hit: Box<dyn Fn(&str) -> Option<String> + '_> = Box::new(|s: &str| Some(s.to_uppercase()));
        let later: Box<dyn Fn(&str) -> Option<String> + '_> = Box::new(|_: &str| {
            later_ran.set(true);
            Some("late".into())
        });

        let chain = FallbackChain::new(vec![never, hit]).then(later);
        assert_eq!(chain.resolve("abc").as_deref(), Some("ABC"));
        assert!(!later_ran.get());
    }

    #[test]
    fn test_empty_chain_resolves_to_none() {
        let chain: FallbackChain<Capture> = FallbackChain::new(Vec::new());
        assert!(chain.is_empty());
        assert_eq!(chain.resolve("anything"), None);
    }

    #[test]
    fn test_capture_chain_order() {
        let chain: FallbackChain<Capture> = [r"\s-\s([^-]+)$", r",\s([^,]+)$"]
            .iter()
            .map(|p| Capture(Regex::new(p).unwrap()))
            .collect();

        assert_eq!(chain.resolve("A Smith - Lancet").as_deref(), Some("Lancet"));
        assert_eq!(chain.resolve("A Smith, Lancet").as_deref(), Some("Lancet"));
        assert_eq!(chain.resolve("A Smith"), None);
    }
}
