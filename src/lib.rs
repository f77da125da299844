/*!
`pathwalk` performs pattern-matched traversal of a filesystem tree: it
reports files and directories whose paths satisfy a caller-supplied set
of glob include patterns while optionally honouring the hierarchical
exclusion rules of `.gitignore`.

The crate is built from three tightly coupled engines:

- a glob compiler and matcher ([`glob`]) that turns an extended glob
  pattern into an efficient literal or regex matcher;
- an ignore-set evaluator ([`gitignore`]) that compiles the lines of an
  ignore file into a rule list and decides, for a given path, whether it
  is ignored, allow-listed, or unmentioned;
- a hierarchical walker ([`walk`]) that performs a depth-first traversal,
  maintaining a stack of ignore-set contexts and merging their verdicts
  with well-defined precedence.

# Example

```no_run
use pathwalk::WalkBuilder;
use pathwalk::handler::CollectingHandler;

let mut handler = CollectingHandler::new();
WalkBuilder::new(".")
    .add_include("*.rs")
    .build()
    .walk(&mut handler)
    .unwrap();
for path in handler.paths() {
    println!("{}", path.display());
}
```
*/

pub mod cursor;
pub mod error;
pub mod gitconfig;
pub mod gitignore;
pub mod glob;
pub mod handler;
pub mod pathutil;
pub mod repo;
pub mod walk;

pub use crate::error::Error;
pub use crate::walk::WalkBuilder;

/// The three-way verdict produced by an ignore-set (or include-matcher)
/// evaluation: a path is ignored, explicitly allow-listed (negated
/// pattern), or simply not mentioned by any rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Match<T> {
    Ignore(T),
    Allow(T),
    None,
}

impl<T> Match<T> {
    pub fn is_ignore(&self) -> bool {
        matches!(self, Match::Ignore(_))
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Match::Allow(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Match::None)
    }

    /// Map the payload, preserving which variant it came from.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Match<U> {
        match self {
            Match::Ignore(t) => Match::Ignore(f(t)),
            Match::Allow(t) => Match::Allow(f(t)),
            Match::None => Match::None,
        }
    }
}
