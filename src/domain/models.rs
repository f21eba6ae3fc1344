use rusqlite::types::{FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// What a single entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Team,
    Doubles,
    Singles,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Team => "team",
            EntryKind::Doubles => "doubles",
            EntryKind::Singles => "singles",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "team" => Some(EntryKind::Team),
            "doubles" => Some(EntryKind::Doubles),
            "singles" => Some(EntryKind::Singles),
            _ => None,
        }
    }
}

/// Match format of a tournament. Team formats pit rosters against each
/// other through 3 or 5 child matches per bracket node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    Singles,
    Doubles,
    Team3,
    Team5,
}

impl TournamentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentFormat::Singles => "singles",
            TournamentFormat::Doubles => "doubles",
            TournamentFormat::Team3 => "team3",
            TournamentFormat::Team5 => "team5",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "singles" => Some(TournamentFormat::Singles),
            "doubles" => Some(TournamentFormat::Doubles),
            "team3" => Some(TournamentFormat::Team3),
            "team5" => Some(TournamentFormat::Team5),
            _ => None,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, TournamentFormat::Team3 | TournamentFormat::Team5)
    }

    pub fn children_per_match(&self) -> Option<usize> {
        match self {
            TournamentFormat::Team3 => Some(3),
            TournamentFormat::Team5 => Some(5),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    InProgress,
    Paused,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::InProgress => "inprogress",
            MatchStatus::Paused => "paused",
            MatchStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MatchStatus::Pending),
            "inprogress" => Some(MatchStatus::InProgress),
            "paused" => Some(MatchStatus::Paused),
            "finished" => Some(MatchStatus::Finished),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    TeamMatch,
    IndividualMatch,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::TeamMatch => "team_match",
            MatchKind::IndividualMatch => "individual_match",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "team_match" => Some(MatchKind::TeamMatch),
            "individual_match" => Some(MatchKind::IndividualMatch),
            _ => None,
        }
    }
}

/// Where a match slot draws its occupant from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    Entry,
    Winner,
    Loser,
    Bye,
}

impl SlotSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotSource::Entry => "entry",
            SlotSource::Winner => "winner",
            SlotSource::Loser => "loser",
            SlotSource::Bye => "bye",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(SlotSource::Entry),
            "winner" => Some(SlotSource::Winner),
            "loser" => Some(SlotSource::Loser),
            "bye" => Some(SlotSource::Bye),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    #[serde(rename = "A_score")]
    AScore,
    #[serde(rename = "B_score")]
    BScore,
}

impl PointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointKind::AScore => "A_score",
            PointKind::BScore => "B_score",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A_score" => Some(PointKind::AScore),
            "B_score" => Some(PointKind::BScore),
            _ => None,
        }
    }
}

/// How a finished match was decided. Anything but `Normal` is a walkover
/// and never blocks draw regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinningReason {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "RETIRE")]
    Retire,
    #[serde(rename = "DEFAULT")]
    Default,
}

impl WinningReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WinningReason::Normal => "NORMAL",
            WinningReason::Retire => "RETIRE",
            WinningReason::Default => "DEFAULT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NORMAL" => Some(WinningReason::Normal),
            "RETIRE" => Some(WinningReason::Retire),
            "DEFAULT" => Some(WinningReason::Default),
            _ => None,
        }
    }
}

/// Umpire assignment at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UmpirePolicy {
    None,
    Rotate,
}

impl UmpirePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(UmpirePolicy::None),
            "rotate" => Some(UmpirePolicy::Rotate),
            _ => None,
        }
    }
}

/// Result of a successful draw generation.
#[derive(Debug, Clone)]
pub struct DrawSummary {
    pub phase_id: i64,
    pub entry_count: usize,
    pub bracket_size: usize,
    pub bye_count: usize,
    pub round_count: u32,
    pub match_count: usize,
    pub recommended_seeds: usize,
}

fn parse_column<T>(value: ValueRef<'_>, parse: fn(&str) -> Option<T>) -> FromSqlResult<T> {
    let s = value.as_str()?;
    parse(s).ok_or_else(|| FromSqlError::Other(format!("unrecognized value: {s}").into()))
}

macro_rules! sql_text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl rusqlite::types::FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                parse_column(value, Self::parse)
            }
        }
    };
}

sql_text_enum!(EntryKind);
sql_text_enum!(TournamentFormat);
sql_text_enum!(MatchStatus);
sql_text_enum!(MatchKind);
sql_text_enum!(SlotSource);
sql_text_enum!(PointKind);
sql_text_enum!(WinningReason);
