/// Categorical energy level shared by movement and dimmer patterns.
///
/// Each pattern looks up its own numbers for a level; nothing is computed from
/// the level directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Barely-there motion.
    #[serde(alias = "low")]
    Subtle,
    /// Everyday default.
    #[default]
    Smooth,
    /// Large, readable gestures.
    #[serde(alias = "high")]
    Dramatic,
    /// Peak energy.
    Intense,
}

impl Intensity {
    /// All levels in increasing energy.
    pub const ALL: [Intensity; 4] = [
        Intensity::Subtle,
        Intensity::Smooth,
        Intensity::Dramatic,
        Intensity::Intense,
    ];

    /// Row index into per-pattern lookup tables.
    pub fn index(self) -> usize {
        match self {
            Self::Subtle => 0,
            Self::Smooth => 1,
            Self::Dramatic => 2,
            Self::Intense => 3,
        }
    }
}
