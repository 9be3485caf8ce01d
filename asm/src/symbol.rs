use arch::obj::{ObjSymbol, SymKind};
use indexmap::IndexMap;

use crate::error::Error;
use crate::token::Pos;

#[derive(Debug, Clone)]
pub struct SymEntry {
    pub kind: SymKind,
    /// `None` until the defining label is seen. Externs stay `None`.
    pub addr: Option<u16>,
    pub pos: Pos,
}

/// The module's symbol table. Insertion order assigns the object-file
/// `idx` of each symbol, so relocations can reference symbols by their
/// position here.
#[derive(Debug, Default)]
pub struct SymTab {
    syms: IndexMap<String, SymEntry>,
}

impl SymTab {
    pub fn new() -> SymTab {
        SymTab::default()
    }

    /// A label definition at `addr`.
    pub fn define(&mut self, name: &str, addr: u16, pos: &Pos) -> Result<(), Error> {
        match self.syms.get_mut(name) {
            None => self.insert(name, SymKind::Local, Some(addr), pos),
            Some(entry) => match entry.kind {
                SymKind::Extern => Err(Error::RedefinedExtern {
                    pos: pos.clone(),
                    name: name.to_string(),
                }),
                _ if entry.addr.is_some() => Err(Error::Redefined {
                    pos: pos.clone(),
                    name: name.to_string(),
                }),
                // A pre-declared global placeholder: fill the address,
                // keep the kind.
                _ => {
                    entry.addr = Some(addr);
                    Ok(())
                }
            },
        }
    }

    /// `.global name` — export, whether declared before or after the
    /// defining label.
    pub fn declare_global(&mut self, name: &str, pos: &Pos) -> Result<(), Error> {
        match self.syms.get_mut(name) {
            None => self.insert(name, SymKind::Global, None, pos),
            Some(entry) => match entry.kind {
                SymKind::Extern => Err(Error::RedefinedExtern {
                    pos: pos.clone(),
                    name: name.to_string(),
                }),
                _ => {
                    entry.kind = SymKind::Global;
                    Ok(())
                }
            },
        }
    }

    /// `.extern name` — defined elsewhere, resolved by the linker.
    pub fn declare_extern(&mut self, name: &str, pos: &Pos) -> Result<(), Error> {
        match self.syms.get(name) {
            None => self.insert(name, SymKind::Extern, None, pos),
            Some(entry) if entry.kind == SymKind::Extern => Ok(()),
            Some(_) => Err(Error::ExternRedecl {
                pos: pos.clone(),
                name: name.to_string(),
            }),
        }
    }

    fn insert(&mut self, name: &str, kind: SymKind, addr: Option<u16>, pos: &Pos) -> Result<(), Error> {
        if self.syms.len() >= usize::from(u16::MAX) {
            return Err(Error::TooManySymbols);
        }
        self.syms.insert(
            name.to_string(),
            SymEntry {
                kind,
                addr,
                pos: pos.clone(),
            },
        );
        Ok(())
    }

    /// Object-file index of a symbol, for relocations.
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.syms.get_index_of(name).map(|i| i as u16)
    }

    /// Fails if any local or global symbol never received an address.
    pub fn check_resolved(&self) -> Result<(), Error> {
        for (name, entry) in &self.syms {
            if entry.kind != SymKind::Extern && entry.addr.is_none() {
                return Err(Error::Undefined {
                    pos: entry.pos.clone(),
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// The object-file symbol records, in index order.
    pub fn to_symbols(&self) -> Vec<ObjSymbol> {
        self.syms
            .iter()
            .enumerate()
            .map(|(i, (name, entry))| ObjSymbol {
                kind: entry.kind,
                idx: i as u16,
                addr: entry.addr.unwrap_or(0),
                label: name.clone(),
            })
            .collect()
    }
}
