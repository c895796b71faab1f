//! Walking an error's `source()` chain.

use std::error::Error;
use std::fmt;

/// Iterator over an error and all of its sources, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Chain<'a> {
    /// Start at `error`.
    pub fn new(error: &'a (dyn Error + 'static)) -> Self {
        Self { next: Some(error) }
    }

    /// The innermost error of the chain.
    pub fn root(self) -> Option<&'a (dyn Error + 'static)> {
        self.last()
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Renders every error in a chain, joined with `": "`.
#[derive(Clone, Copy)]
pub struct DisplayChain<'a>(pub &'a (dyn Error + 'static));

impl fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, error) in Chain::new(self.0).enumerate() {
            if depth > 0 {
                f.write_str(": ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DisplayChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(Chain::new(self.0).map(ToString::to_string))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    struct Wrapped {
        message: &'static str,
        #[source]
        source: io::Error,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("pool warmup failed")]
    struct Outer(#[source] Wrapped);

    fn nested() -> Outer {
        Outer(Wrapped {
            message: "could not open segment",
            source: io::Error::other("disk full"),
        })
    }

    #[test]
    fn walks_from_outermost_to_root() {
        let err = nested();
        let messages: Vec<String> = Chain::new(&err).map(ToString::to_string).collect();
        assert_eq!(
            messages,
            ["pool warmup failed", "could not open segment", "disk full"]
        );
    }

    #[test]
    fn root_is_innermost() {
        let err = nested();
        let root = Chain::new(&err).root().unwrap();
        assert_eq!(root.to_string(), "disk full");
    }

    #[test]
    fn single_error_chain() {
        let err = io::Error::other("boom");
        assert_eq!(Chain::new(&err).count(), 1);
        assert_eq!(DisplayChain(&err).to_string(), "boom");
    }

    #[test]
    fn display_joins_with_colons() {
        let err = nested();
        assert_eq!(
            DisplayChain(&err).to_string(),
            "pool warmup failed: could not open segment: disk full"
        );
    }
}
