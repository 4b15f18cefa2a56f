use std::fmt;

use serde::{Deserialize, Serialize};

/// The four fixed participants of a campaign run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleName {
    ContentWriter,
    GraphicDesigner,
    DataAnalyst,
    BrandManager,
}

impl RoleName {
    /// Handoff order, starting from the initial role.
    pub const ALL: [RoleName; 4] = [
        RoleName::ContentWriter,
        RoleName::GraphicDesigner,
        RoleName::DataAnalyst,
        RoleName::BrandManager,
    ];

    pub const INITIAL: RoleName = RoleName::ContentWriter;

    /// Label stamped on every message this role appends.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            RoleName::ContentWriter => "ContentWriter",
            RoleName::GraphicDesigner => "GraphicDesigner",
            RoleName::DataAnalyst => "DataAnalyst",
            RoleName::BrandManager => "BrandManager",
        }
    }

    /// Where the conversation goes after a non-terminal turn.
    pub fn default_next(&self) -> RoleName {
        match self {
            RoleName::ContentWriter => RoleName::GraphicDesigner,
            RoleName::GraphicDesigner => RoleName::DataAnalyst,
            RoleName::DataAnalyst => RoleName::BrandManager,
            RoleName::BrandManager => RoleName::ContentWriter,
        }
    }

    /// Only the Brand Manager may end a run.
    pub fn has_terminal_authority(&self) -> bool {
        matches!(self, RoleName::BrandManager)
    }

    fn index(&self) -> usize {
        match self {
            RoleName::ContentWriter => 0,
            RoleName::GraphicDesigner => 1,
            RoleName::DataAnalyst => 2,
            RoleName::BrandManager => 3,
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Fixed-size table keyed by role. Every role has exactly one slot, so a
/// lookup can never miss.
pub struct RoleTable<T> {
    slots: [T; 4],
}

impl<T> RoleTable<T> {
    pub fn try_from_fn(
        mut build: impl FnMut(RoleName) -> anyhow::Result<T>,
    ) -> anyhow::Result<Self> {
        let [first, second, third, fourth] = RoleName::ALL;
        Ok(Self {
            slots: [build(first)?, build(second)?, build(third)?, build(fourth)?],
        })
    }

    pub fn get(&self, role: RoleName) -> &T {
        &self.slots[role.index()]
    }
}
