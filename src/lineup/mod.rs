// Lineup construction: roster slots, the optimizer seam, and the builder.

pub mod builder;
pub mod optimizer;
pub mod solver;

use std::fmt;

use crate::pool::{PlayerRow, Position};

// ---------------------------------------------------------------------------
// Roster slots
// ---------------------------------------------------------------------------

/// A slot in the 9-man contest roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterSlot {
    Qb,
    Rb,
    Wr,
    Te,
    Flex,
    Dst,
}

/// The contest roster template, in display order.
pub const SLOT_TEMPLATE: [RosterSlot; 9] = [
    RosterSlot::Qb,
    RosterSlot::Rb,
    RosterSlot::Rb,
    RosterSlot::Wr,
    RosterSlot::Wr,
    RosterSlot::Wr,
    RosterSlot::Te,
    RosterSlot::Flex,
    RosterSlot::Dst,
];

impl RosterSlot {
    /// Whether a player with this position may fill the slot.
    pub fn accepts(&self, position: Position) -> bool {
        match self {
            RosterSlot::Qb => position == Position::Quarterback,
            RosterSlot::Rb => position == Position::RunningBack,
            RosterSlot::Wr => position == Position::WideReceiver,
            RosterSlot::Te => position == Position::TightEnd,
            RosterSlot::Flex => position.is_pass_catcher(),
            RosterSlot::Dst => position == Position::Defense,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            RosterSlot::Qb => "QB",
            RosterSlot::Rb => "RB",
            RosterSlot::Wr => "WR",
            RosterSlot::Te => "TE",
            RosterSlot::Flex => "FLEX",
            RosterSlot::Dst => "DST",
        }
    }
}

impl fmt::Display for RosterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Lineups
// ---------------------------------------------------------------------------

/// One complete lineup: the roster template filled slot by slot.
#[derive(Debug, Clone)]
pub struct Lineup {
    pub slots: Vec<(RosterSlot, PlayerRow)>,
}

impl Lineup {
    pub fn total_salary(&self) -> u32 {
        self.slots.iter().map(|(_, p)| p.salary).sum()
    }

    pub fn total_projection(&self) -> f64 {
        self.slots.iter().map(|(_, p)| p.adjusted_projection).sum()
    }

    /// The sorted player-id set, used to detect duplicate lineups.
    pub fn id_key(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .slots
            .iter()
            .map(|(_, p)| p.unique_id.clone())
            .collect();
        ids.sort();
        ids
    }
}
