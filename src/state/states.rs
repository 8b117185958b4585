//! State stack - ordered set of active state names.
//!
//! Every mutation that changes membership fires the injected change
//! callback exactly once. The scene uses that callback to schedule style
//! resolution for the owning node.
//!
//! # Example
//!
//! ```ignore
//! use spark_scene::States;
//!
//! let mut states = States::new(|| println!("changed"), ["focus", "active"]);
//! states.toggle("active"); // removes, prints "changed"
//! assert!(states.has("focus"));
//! ```

use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Inline storage for the handful of states a node usually carries.
pub type StateList = SmallVec<[CompactString; 4]>;

// =============================================================================
// Initial state
// =============================================================================

/// Accepted shapes for an initial state set.
#[derive(Debug, Clone, PartialEq)]
pub enum StateInit {
    List(Vec<CompactString>),
    Single(CompactString),
    /// Name to flag; only entries flagged `true` become active.
    Map(Vec<(CompactString, bool)>),
}

impl StateInit {
    fn into_names(self) -> StateList {
        let names: Vec<CompactString> = match self {
            Self::List(list) => list,
            Self::Single(name) => vec![name],
            Self::Map(entries) => entries
                .into_iter()
                .filter(|(_, on)| *on)
                .map(|(name, _)| name)
                .collect(),
        };

        let mut out = StateList::new();
        for name in names {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

impl Default for StateInit {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<&str> for StateInit {
    fn from(v: &str) -> Self {
        Self::Single(v.into())
    }
}

impl From<Vec<CompactString>> for StateInit {
    fn from(v: Vec<CompactString>) -> Self {
        Self::List(v)
    }
}

impl From<&[CompactString]> for StateInit {
    fn from(v: &[CompactString]) -> Self {
        Self::List(v.to_vec())
    }
}

impl From<Vec<&str>> for StateInit {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(CompactString::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for StateInit {
    fn from(v: [&str; N]) -> Self {
        Self::List(v.into_iter().map(CompactString::from).collect())
    }
}

impl<const N: usize> From<[(&str, bool); N]> for StateInit {
    fn from(v: [(&str, bool); N]) -> Self {
        Self::Map(v.into_iter().map(|(k, on)| (CompactString::from(k), on)).collect())
    }
}

impl From<IndexMap<CompactString, bool>> for StateInit {
    fn from(v: IndexMap<CompactString, bool>) -> Self {
        Self::Map(v.into_iter().collect())
    }
}

// =============================================================================
// States
// =============================================================================

/// Ordered, duplicate-free set of active state names.
#[derive(Clone, Default)]
pub struct States {
    names: StateList,
    on_change: Option<Rc<dyn Fn()>>,
}

impl States {
    /// Create a stack that reports changes to `on_change`.
    pub fn new(on_change: impl Fn() + 'static, initial: impl Into<StateInit>) -> Self {
        Self {
            names: initial.into().into_names(),
            on_change: Some(Rc::new(on_change)),
        }
    }

    /// Create a stack with no change callback.
    pub fn detached(initial: impl Into<StateInit>) -> Self {
        Self {
            names: initial.into().into_names(),
            on_change: None,
        }
    }

    fn notify(&self) {
        if let Some(cb) = &self.on_change {
            cb();
        }
    }

    pub fn has(&self, state: &str) -> bool {
        self.names.iter().any(|s| s.as_str() == state)
    }

    /// Alias of [`States::has`].
    pub fn is(&self, state: &str) -> bool {
        self.has(state)
    }

    /// Append `state`. Returns false (and stays silent) if already active.
    pub fn add(&mut self, state: &str) -> bool {
        if self.has(state) {
            return false;
        }
        self.names.push(state.into());
        self.notify();
        true
    }

    /// Remove `state`. Returns false (and stays silent) if not active.
    pub fn remove(&mut self, state: &str) -> bool {
        match self.names.iter().position(|s| s.as_str() == state) {
            Some(i) => {
                self.names.remove(i);
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Add if absent, remove otherwise.
    pub fn toggle(&mut self, state: &str) {
        if self.has(state) {
            self.remove(state);
        } else {
            self.add(state);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn as_slice(&self) -> &[CompactString] {
        &self.names
    }

    /// Copy of the active names, detached from any callback.
    pub fn to_vec(&self) -> Vec<CompactString> {
        self.names.to_vec()
    }
}

impl fmt::Debug for States {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.iter()).finish()
    }
}

impl PartialEq for States {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}
