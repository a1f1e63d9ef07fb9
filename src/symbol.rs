use crate::error::ContractError;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum SymbolKind {
    Key,
    /// `gates` is the number of edges the switch opens.
    Switch { gates: u32 },
    Goal,
}

/// A collectible token. Keys and switches open locked edges; the goal marks the end of the
/// dungeon.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Symbol {
    id: u32,
    kind: SymbolKind,
}

impl Symbol {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_key(&self) -> bool {
        self.kind == SymbolKind::Key
    }

    pub fn is_switch(&self) -> bool {
        matches!(self.kind, SymbolKind::Switch { .. })
    }

    pub fn is_goal(&self) -> bool {
        self.kind == SymbolKind::Goal
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SymbolKind::Key => write!(f, "key#{}", self.id),
            SymbolKind::Switch { gates } => write!(f, "switch#{} ({} gates)", self.id, gates),
            SymbolKind::Goal => write!(f, "goal#{}", self.id),
        }
    }
}

/// Issues the symbols of one generation run, keeping keys and switches within budget.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    max_keys: usize,
    max_switches: usize,
    issued: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new(max_keys: usize, max_switches: usize) -> Self {
        SymbolTable {
            max_keys,
            max_switches,
            issued: Vec::new(),
        }
    }

    fn issue(&mut self, kind: SymbolKind) -> Symbol {
        let symbol = Symbol {
            id: self.issued.len() as u32,
            kind,
        };
        self.issued.push(symbol);

        symbol
    }

    pub fn new_key(&mut self) -> Result<Symbol, ContractError> {
        if self.remaining_key_budget() == 0 {
            return Err(ContractError::BudgetExhausted { kind: "key" });
        }

        Ok(self.issue(SymbolKind::Key))
    }

    pub fn new_switch(&mut self, gates: u32) -> Result<Symbol, ContractError> {
        if self.remaining_switch_budget() == 0 {
            return Err(ContractError::BudgetExhausted { kind: "switch" });
        }

        Ok(self.issue(SymbolKind::Switch { gates }))
    }

    pub fn new_goal(&mut self) -> Symbol {
        self.issue(SymbolKind::Goal)
    }

    pub fn keys_issued(&self) -> usize {
        self.issued.iter().filter(|s| s.is_key()).count()
    }

    pub fn switches_issued(&self) -> usize {
        self.issued.iter().filter(|s| s.is_switch()).count()
    }

    pub fn remaining_key_budget(&self) -> usize {
        self.max_keys.saturating_sub(self.keys_issued())
    }

    pub fn remaining_switch_budget(&self) -> usize {
        self.max_switches.saturating_sub(self.switches_issued())
    }

    pub fn issued(&self) -> &[Symbol] {
        &self.issued
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
