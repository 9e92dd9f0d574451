use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interned symbol handle. Only meaningful against the `SymbolTable` that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Linker-visible expression: an optional symbol plus a constant addend.
/// With `symbol == None` this is a plain constant expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub symbol: Option<SymbolId>,
    pub addend: i64,
}

impl Expr {
    pub fn constant(addend: i64) -> Self {
        Self {
            symbol: None,
            addend,
        }
    }

    pub fn symbol(symbol: SymbolId) -> Self {
        Self {
            symbol: Some(symbol),
            addend: 0,
        }
    }

    pub fn symbol_plus(symbol: SymbolId, addend: i64) -> Self {
        Self {
            symbol: Some(symbol),
            addend,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.symbol.is_none()
    }
}

/// Symbol interner. Owned by the caller and passed explicitly wherever
/// expressions are built or printed; the encoder itself never creates symbols.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = SymbolId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
