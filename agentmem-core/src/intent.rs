use serde::{Deserialize, Serialize};

/// Coarse category of a query, used to steer Phase-2 reweighting and the
/// hybrid alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Lookup,
    HowTo,
    Debug,
    Explore,
    Compare,
    Configure,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Lookup,
        Intent::HowTo,
        Intent::Debug,
        Intent::Explore,
        Intent::Compare,
        Intent::Configure,
        Intent::Unknown,
    ];

    /// Default hybrid-blend alpha per intent, used unless the
    /// request overrides it with `hybridAlpha`.
    pub fn default_hybrid_alpha(&self) -> f64 {
        match self {
            Intent::Lookup => 0.5,
            Intent::HowTo => 0.7,
            Intent::Debug => 0.6,
            Intent::Explore => 0.8,
            Intent::Compare => 0.75,
            Intent::Configure => 0.6,
            Intent::Unknown => 0.5,
        }
    }
}

impl Default for Intent {
    fn default() -> Self {
        Intent::Unknown
    }
}
