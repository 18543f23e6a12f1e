use std::collections::HashMap;
use std::rc::Rc;

use asm_core::source::SourceToken;


/// A symbol bound during the first pass: either a label defined in this
/// unit (with its memory address) or a name declared `.extern` (with no
/// address of its own — §4.2's entry/extern resolution, Design Note 2
/// ("Symbol table as first-class structure") adopted in place of a linear
/// scan over the line-record vector).
#[derive(Debug, Clone)]
pub enum Symbol {
    Local {
        address: usize,
        token: Rc<SourceToken>,
        is_entry: bool,
    },
    Extern {
        token: Rc<SourceToken>,
    },
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { symbols: HashMap::new() }
    }

    /// Declare a label at `address`. Returns the previous definition, if
    /// any, so the caller can diagnose the duplicate (§12 decision 1).
    pub fn declare_local(&mut self, name: String, address: usize, token: Rc<SourceToken>) -> Option<Symbol> {
        self.symbols.insert(name, Symbol::Local { address, token, is_entry: false })
    }

    /// Declare `name` as an externally-defined symbol. Returns the previous
    /// definition, if any — a prior local definition is a conflict
    /// (invariant 2: no symbol is both entry-eligible here and extern).
    pub fn declare_extern(&mut self, name: String, token: Rc<SourceToken>) -> Option<Symbol> {
        self.symbols.insert(name, Symbol::Extern { token })
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Mark `name` as an entry point. Returns `Err(())` if `name` is not a
    /// local symbol in this table (either undeclared, or declared extern).
    pub fn mark_entry(&mut self, name: &str) -> Result<(), ()> {
        match self.symbols.get_mut(name) {
            Some(Symbol::Local { is_entry, .. }) => {
                *is_entry = true;
                Ok(())
            }
            _ => Err(()),
        }
    }

    /// Every locally defined symbol marked as an entry, in insertion-order-
    /// independent (symbol, address) pairs for `.ent` emission.
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.symbols.iter().filter_map(|(name, symbol)| match symbol {
            Symbol::Local { address, is_entry: true, .. } => Some((name.as_str(), *address)),
            _ => None,
        })
    }
}
