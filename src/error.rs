use crate::{coord::Coord, room::RoomId, symbol::Symbol};

use thiserror::Error;

/// A generation attempt produced an unusable layout. These are caught by the generator's retry
/// loop; only `NoValidEntrance`, `ExhaustedRetries` and `Cancelled` ever reach the caller.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GenerationFailure {
    #[error("not fully connected")]
    NotConnected,
    #[error("no valid entrance")]
    NoValidEntrance,
    #[error("no legal expansion after growing {grown} of {wanted} rooms")]
    NoLegalExpansion { grown: usize, wanted: usize },
    #[error("no room can hold the key for lock {lock}")]
    NoKeyRoom { lock: usize },
    #[error("lock before key: {unreached} rooms can't be reached by collecting symbols")]
    LockBeforeKey { unreached: usize },
    #[error("exhausted retries after {attempts} attempts")]
    ExhaustedRetries { attempts: usize },
    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: usize },
}

/// Misuse of the API. Never retried.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ContractError {
    #[error("duplicate room id {0}")]
    DuplicateRoomId(RoomId),
    #[error("room ids must be dense: expected {expected}, found {found}")]
    SparseRoomId { expected: RoomId, found: RoomId },
    #[error("unknown room {0}")]
    UnknownRoom(RoomId),
    #[error("coordinate {0} is already taken by room {1}")]
    CoordinateTaken(Coord, RoomId),
    #[error("coordinate {0} was never colored")]
    NotColored(Coord),
    #[error("constraints must allow at least one room")]
    ZeroMaxRooms,
    #[error("inverted bounds: min {min} lies beyond max {max}")]
    InvertedBounds { min: Coord, max: Coord },
    #[error("space map of {width}x{height} cells exceeds {max} cells")]
    MapTooLarge { width: u64, height: u64, max: usize },
    #[error("coordinate {0} is outside the space map")]
    OutOfBounds(Coord),
    #[error("malformed layout: {0}")]
    MalformedLayout(String),
    #[error("rooms {0} and {1} are not adjacent")]
    NotAdjacent(RoomId, RoomId),
    #[error("room {0} lists more than one edge to room {1}")]
    DuplicateEdge(RoomId, RoomId),
    #[error("parent or depth of room {0} contradicts its edges")]
    BadParent(RoomId),
    #[error("no edge between rooms {0} and {1}")]
    MissingEdge(RoomId, RoomId),
    #[error("edge between rooms {from} and {to} is already locked by {symbol}")]
    AlreadyLocked {
        from: RoomId,
        to: RoomId,
        symbol: Symbol,
    },
    #[error("room {room} already holds {symbol}")]
    RoomOccupied { room: RoomId, symbol: Symbol },
    #[error("{kind} budget exhausted")]
    BudgetExhausted { kind: &'static str },
    #[error("the graph already has an entrance")]
    EntranceAlreadySet,
    #[error("the graph has no entrance")]
    MissingEntrance,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationFailure),
    #[error("contract violation: {0}")]
    Contract(#[from] ContractError),
    #[error("bad dungeon spec: {0}")]
    Config(String),
}
