use arch::codec::FormatError;
use arch::exe::Image;
use arch::obj::{ObjectFile, SymKind};
use arch::{ENTRY_SYMBOL, MEM_SIZE};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("global symbol `{0}` already defined")]
    DuplicateGlobal(String),

    #[error("symbol `{0}` is not defined")]
    Unresolved(String),

    #[error("`_start` entry point is not defined")]
    NoEntry,

    #[error("linked image exceeds the address space")]
    ImageTooLarge,

    #[error("symbol `{0}` address overflows the address space")]
    SymbolOverflow(String),

    #[error("relocation at {0:#06X} outside module code")]
    RelocOutOfRange(u16),

    #[error("{0}: bad object file: {1}")]
    BadObject(String, #[source] FormatError),

    #[error("failed to read {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("failed to write {0}")]
    FileWrite(String, #[source] std::io::Error),
}

/// One ingested object file, rebased to its final position.
struct Module {
    obj: ObjectFile,
    base: u16,
}

/// Where a global lives: which module, which symbol record.
struct GlobalRef {
    module: usize,
    symidx: u16,
}

/// Links the given modules, in order, into an executable image.
/// Command-line order defines each module's base offset.
pub fn link(objects: Vec<ObjectFile>) -> Result<Image, LinkError> {
    let mut modules: Vec<Module> = Vec::with_capacity(objects.len());
    let mut globals: IndexMap<String, GlobalRef> = IndexMap::new();
    let mut end: usize = 0;

    // Ingest: rebase symbol addresses and register globals.
    for (midx, mut obj) in objects.into_iter().enumerate() {
        let base = end;
        end += obj.code.len();
        if end > MEM_SIZE {
            return Err(LinkError::ImageTooLarge);
        }
        let base = base as u16;

        for sym in &mut obj.symbols {
            if sym.kind != SymKind::Extern {
                sym.addr = sym
                    .addr
                    .checked_add(base)
                    .ok_or_else(|| LinkError::SymbolOverflow(sym.label.clone()))?;
            }
            if sym.kind == SymKind::Global {
                if globals.contains_key(&sym.label) {
                    return Err(LinkError::DuplicateGlobal(sym.label.clone()));
                }
                globals.insert(
                    sym.label.clone(),
                    GlobalRef {
                        module: midx,
                        symidx: sym.idx,
                    },
                );
            }
        }

        modules.push(Module { obj, base });
    }

    // Lay the code segments end to end.
    let mut code: Vec<u8> = Vec::with_capacity(end);
    for module in &modules {
        code.extend_from_slice(&module.obj.code);
    }

    // Patch: every relocation overwrites exactly the two bytes of its
    // placeholder with the referenced symbol's final address.
    for module in &modules {
        for rel in &module.obj.relocs {
            if usize::from(rel.loc) + 2 > module.obj.code.len() {
                return Err(LinkError::RelocOutOfRange(rel.loc));
            }
            let sym = &module.obj.symbols[rel.symidx as usize];
            let addr = match sym.kind {
                SymKind::Extern => {
                    let gref = globals
                        .get(&sym.label)
                        .ok_or_else(|| LinkError::Unresolved(sym.label.clone()))?;
                    modules[gref.module].obj.symbols[gref.symidx as usize].addr
                }
                _ => sym.addr,
            };

            let at = usize::from(module.base) + usize::from(rel.loc);
            let bytes = addr.to_le_bytes();
            code[at] = bytes[0];
            code[at + 1] = bytes[1];
        }
    }

    let entry = globals.get(ENTRY_SYMBOL).ok_or(LinkError::NoEntry)?;
    let entry = modules[entry.module].obj.symbols[entry.symidx as usize].addr;

    Ok(Image { entry, code })
}

/// Reads, links and returns the image for a list of object-file paths.
pub fn link_files(paths: &[String]) -> Result<Image, LinkError> {
    let mut objects = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes =
            std::fs::read(path).map_err(|e| LinkError::FileRead(path.clone(), e))?;
        let obj = ObjectFile::from_bytes(&bytes)
            .map_err(|e| LinkError::BadObject(path.clone(), e))?;
        objects.push(obj);
    }
    link(objects)
}
