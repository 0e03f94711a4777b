use serde::{Deserialize, Serialize};

/// A query or entry scope. Forms a strict partial order:
/// session < project < org < global.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scope {
    Global,
    Org { id: String },
    Project { id: String },
    Session { id: String },
}

impl Scope {
    /// Rank in the partial order, lower is more specific. Used to sort a
    /// resolved chain and to compute the scope-proximity scoring term.
    pub fn rank(&self) -> u8 {
        match self {
            Scope::Session { .. } => 0,
            Scope::Project { .. } => 1,
            Scope::Org { .. } => 2,
            Scope::Global => 3,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Org { id } | Scope::Project { id } | Scope::Session { id } => Some(id),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Org { .. } => "org",
            Scope::Project { .. } => "project",
            Scope::Session { .. } => "session",
        }
    }
}

/// An ordered scope chain, most specific first, as produced by the Scope
/// Resolver: `[s0, s1, ..., s_global]`.
pub type ScopeChain = Vec<Scope>;

/// Position-weighted proximity fraction `(N - i) / N` for an entry's scope
/// within a resolved chain, where `i` is the entry's position. Returns `None`
/// when the chain has at most one member or when the
/// entry's scope is not a member of the chain.
pub fn scope_proximity(chain: &ScopeChain, entry_scope: &Scope) -> Option<f64> {
    let n = chain.len();
    if n <= 1 {
        return None;
    }
    chain
        .iter()
        .position(|s| s == entry_scope)
        .map(|i| ((n - i) as f64) / (n as f64))
}
