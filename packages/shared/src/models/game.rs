use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value stored in `Turn` once a game is over.
pub const TERMINAL_TURN: &str = "N/A";

/// Value stored in `Result` when nobody won.
pub const TIE_RESULT: &str = "Tie";

/// Coarse lifecycle stage of a game, encoded as the prefix of `StatusDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pending,
    InProgress,
    Finished,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Pending, Phase::InProgress, Phase::Finished];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pending => "PENDING",
            Phase::InProgress => "IN_PROGRESS",
            Phase::Finished => "FINISHED",
        }
    }

    /// The sort key prefix for this phase, e.g. `IN_PROGRESS_`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Phase::Pending => "PENDING_",
            Phase::InProgress => "IN_PROGRESS_",
            Phase::Finished => "FINISHED_",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePhaseError(pub String);

impl fmt::Display for ParsePhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown game phase: {}", self.0)
    }
}

impl std::error::Error for ParsePhaseError {}

impl FromStr for Phase {
    type Err = ParsePhaseError;

    /// Accepts the bare name (`IN_PROGRESS`) or the prefix form (`IN_PROGRESS_`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix('_').unwrap_or(s);
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParsePhaseError(s.to_string()))
    }
}

/// `<PHASE>_<timestamp>`. Doubles as the state tag and the recency sort key,
/// so ordering is plain string ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusDate(String);

impl StatusDate {
    pub fn new(phase: Phase, timestamp: &str) -> Self {
        StatusDate(format!("{}{}", phase.prefix(), timestamp))
    }

    /// Phase tag, matched on the known prefixes. Splitting on `_` would break
    /// `IN_PROGRESS`.
    pub fn phase(&self) -> Option<Phase> {
        Phase::ALL
            .into_iter()
            .find(|phase| self.0.starts_with(phase.prefix()))
    }

    pub fn timestamp(&self) -> &str {
        match self.phase() {
            Some(phase) => &self.0[phase.prefix().len()..],
            None => &self.0,
        }
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StatusDate {
    fn from(value: String) -> Self {
        StatusDate(value)
    }
}

impl From<&str> for StatusDate {
    fn from(value: &str) -> Self {
        StatusDate(value.to_string())
    }
}

impl fmt::Display for StatusDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    X,
    O,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::X => "X",
            Marker::O => "O",
        }
    }

    pub fn opposite(&self) -> Marker {
        match self {
            Marker::X => Marker::O,
            Marker::O => Marker::X,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board positions, row-major. The variant name is the stored attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    TopLeft,
    TopMiddle,
    TopRight,
    MiddleLeft,
    MiddleMiddle,
    MiddleRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
}

impl Cell {
    pub const ALL: [Cell; 9] = [
        Cell::TopLeft,
        Cell::TopMiddle,
        Cell::TopRight,
        Cell::MiddleLeft,
        Cell::MiddleMiddle,
        Cell::MiddleRight,
        Cell::BottomLeft,
        Cell::BottomMiddle,
        Cell::BottomRight,
    ];

    pub fn attribute_name(&self) -> &'static str {
        match self {
            Cell::TopLeft => "TopLeft",
            Cell::TopMiddle => "TopMiddle",
            Cell::TopRight => "TopRight",
            Cell::MiddleLeft => "MiddleLeft",
            Cell::MiddleMiddle => "MiddleMiddle",
            Cell::MiddleRight => "MiddleRight",
            Cell::BottomLeft => "BottomLeft",
            Cell::BottomMiddle => "BottomMiddle",
            Cell::BottomRight => "BottomRight",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Cell> {
        Cell::ALL.get(index).copied()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellError(pub String);

impl fmt::Display for ParseCellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown board cell: {}", self.0)
    }
}

impl std::error::Error for ParseCellError {}

impl FromStr for Cell {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cell::ALL
            .into_iter()
            .find(|cell| cell.attribute_name() == s)
            .ok_or_else(|| ParseCellError(s.to_string()))
    }
}

/// One row of the Games table. Board cells and `Result` stay absent until
/// written, which is what the conditional writes key off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(rename = "GameId")]
    pub game_id: String,
    #[serde(rename = "HostId")]
    pub host_id: String,
    #[serde(rename = "OpponentId")]
    pub opponent_id: String,
    #[serde(rename = "OUser")]
    pub o_user: String,
    #[serde(rename = "Turn")]
    pub turn: String,
    #[serde(rename = "StatusDate")]
    pub status_date: StatusDate,
    #[serde(rename = "TopLeft", default, skip_serializing_if = "Option::is_none")]
    pub top_left: Option<Marker>,
    #[serde(rename = "TopMiddle", default, skip_serializing_if = "Option::is_none")]
    pub top_middle: Option<Marker>,
    #[serde(rename = "TopRight", default, skip_serializing_if = "Option::is_none")]
    pub top_right: Option<Marker>,
    #[serde(rename = "MiddleLeft", default, skip_serializing_if = "Option::is_none")]
    pub middle_left: Option<Marker>,
    #[serde(rename = "MiddleMiddle", default, skip_serializing_if = "Option::is_none")]
    pub middle_middle: Option<Marker>,
    #[serde(rename = "MiddleRight", default, skip_serializing_if = "Option::is_none")]
    pub middle_right: Option<Marker>,
    #[serde(rename = "BottomLeft", default, skip_serializing_if = "Option::is_none")]
    pub bottom_left: Option<Marker>,
    #[serde(rename = "BottomMiddle", default, skip_serializing_if = "Option::is_none")]
    pub bottom_middle: Option<Marker>,
    #[serde(rename = "BottomRight", default, skip_serializing_if = "Option::is_none")]
    pub bottom_right: Option<Marker>,
    #[serde(rename = "Result", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl GameRecord {
    /// A fresh invite: the invitee holds the turn and the host plays `O`.
    pub fn new_invite(game_id: &str, host_id: &str, invitee_id: &str, timestamp: &str) -> Self {
        GameRecord {
            game_id: game_id.to_string(),
            host_id: host_id.to_string(),
            opponent_id: invitee_id.to_string(),
            o_user: host_id.to_string(),
            turn: invitee_id.to_string(),
            status_date: StatusDate::new(Phase::Pending, timestamp),
            top_left: None,
            top_middle: None,
            top_right: None,
            middle_left: None,
            middle_middle: None,
            middle_right: None,
            bottom_left: None,
            bottom_middle: None,
            bottom_right: None,
            result: None,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        self.status_date.phase()
    }

    pub fn is_participant(&self, player_id: &str) -> bool {
        self.host_id == player_id || self.opponent_id == player_id
    }

    pub fn marker_for(&self, player_id: &str) -> Marker {
        if self.o_user == player_id {
            Marker::O
        } else {
            Marker::X
        }
    }

    /// The host when `player_id` is the opponent, otherwise the opponent.
    pub fn other_player(&self, player_id: &str) -> &str {
        if player_id == self.opponent_id {
            &self.host_id
        } else {
            &self.opponent_id
        }
    }

    pub fn cell(&self, cell: Cell) -> Option<Marker> {
        match cell {
            Cell::TopLeft => self.top_left,
            Cell::TopMiddle => self.top_middle,
            Cell::TopRight => self.top_right,
            Cell::MiddleLeft => self.middle_left,
            Cell::MiddleMiddle => self.middle_middle,
            Cell::MiddleRight => self.middle_right,
            Cell::BottomLeft => self.bottom_left,
            Cell::BottomMiddle => self.bottom_middle,
            Cell::BottomRight => self.bottom_right,
        }
    }

    pub fn cell_mut(&mut self, cell: Cell) -> &mut Option<Marker> {
        match cell {
            Cell::TopLeft => &mut self.top_left,
            Cell::TopMiddle => &mut self.top_middle,
            Cell::TopRight => &mut self.top_right,
            Cell::MiddleLeft => &mut self.middle_left,
            Cell::MiddleMiddle => &mut self.middle_middle,
            Cell::MiddleRight => &mut self.middle_right,
            Cell::BottomLeft => &mut self.bottom_left,
            Cell::BottomMiddle => &mut self.bottom_middle,
            Cell::BottomRight => &mut self.bottom_right,
        }
    }

    pub fn occupied_cells(&self) -> usize {
        Cell::ALL
            .iter()
            .filter(|cell| self.cell(**cell).is_some())
            .count()
    }
}
