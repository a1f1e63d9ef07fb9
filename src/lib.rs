pub mod color_map;
pub mod constraints;
pub mod coord;
pub mod error;
pub mod generator;
pub mod graph;
pub mod map_types;
pub mod room;
pub mod sampling;
pub mod space_map;
pub mod symbol;

pub use color_map::Color;
pub use constraints::{Constraints, Limits, ShapeRule};
pub use coord::Coord;
pub use error::{ContractError, Error, GenerationFailure};
pub use generator::{Attempt, Dungeon, Generator, Lock};
pub use room::{Edge, Room, RoomGraph, RoomId};
pub use space_map::SpaceMap;
pub use symbol::{Symbol, SymbolKind};

/// Implement this to turn a generated dungeon into tiles, nodes or whatever your scene is made of.
pub trait LayoutEncoder {
    /// `lock_level` counts how many rounds of collecting symbols it takes to enter `room`.
    fn encode_room(&mut self, room: &Room, lock_level: Color);

    /// Called once for each pair of linked rooms. `lock` is the symbol needed to pass, if any.
    fn encode_door(&mut self, from: &Room, to: &Room, lock: Option<Symbol>);
}
