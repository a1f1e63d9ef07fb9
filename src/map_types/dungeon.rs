use crate::{
    constraints::{Constraints, Limits, ShapeRule},
    error::{ContractError, Error},
    generator::{Dungeon, Generator},
    sampling::small_rng,
    space_map::SpaceMap,
};

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;

pub const MAX_GENERATE_TRIES: usize = 200;

fn default_max_retries() -> usize {
    MAX_GENERATE_TRIES
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum LayoutSpec {
    /// Every cell is free.
    Open { width: u32, height: u32 },
    /// Rows of `#` (occupied) and `.` (free), top row first.
    Rows(Vec<String>),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DungeonMapSpec {
    pub seed: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    pub layout: LayoutSpec,
    pub limits: Limits,
    #[serde(default)]
    pub shape_rule: ShapeRule,
}

impl DungeonMapSpec {
    pub fn from_ron(text: &str) -> Result<Self, Error> {
        ron::de::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_ron(&self) -> Result<String, Error> {
        ron::ser::to_string_pretty(self, PrettyConfig::new()).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn space_map(&self) -> Result<SpaceMap, ContractError> {
        match &self.layout {
            LayoutSpec::Open { width, height } => SpaceMap::with_size(*width, *height),
            LayoutSpec::Rows(rows) => SpaceMap::from_layout(rows),
        }
    }

    pub fn constraints(&self) -> Result<Constraints, ContractError> {
        Constraints::new(self.space_map()?, self.limits, self.shape_rule)
    }

    pub fn generate(&self) -> Result<Dungeon, Error> {
        self.generate_cancellable(None)
    }

    /// Like `generate`, but stops between attempts once `cancel` is set.
    pub fn generate_cancellable(&self, cancel: Option<&AtomicBool>) -> Result<Dungeon, Error> {
        log::debug!("Generating dungeon map with seed {}", self.seed);

        let constraints = self.constraints()?;
        let mut rng = small_rng(self.seed);

        Generator::new(&constraints).generate(&mut rng, self.max_retries, cancel)
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
