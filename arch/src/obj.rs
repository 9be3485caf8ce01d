//! The relocatable object format, the contract between assembler and
//! linker. All integers little-endian, sections contiguous:
//!
//! ```text
//! Header    : nsyms:u16, nrels:u16, ncode:u16
//! Code      : ncode bytes
//! Symbols   : nsyms x { kind:u8, idx:u16, addr:u16, nlabel:u16, label:nlabel bytes }
//! Relocs    : nrels x { loc:u16, symidx:u16 }
//! ```

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::codec::{put_u16, FormatError, Reader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SymKind {
    Local = 0,
    Global = 1,
    Extern = 2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjSymbol {
    pub kind: SymKind,
    pub idx: u16,
    /// Address within the module's code segment. Meaningless for
    /// `Extern` (written as 0).
    pub addr: u16,
    pub label: String,
}

/// A promise to overwrite the two bytes at `loc` with the final address
/// of symbol `symidx`, little-endian, at link time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reloc {
    pub loc: u16,
    pub symidx: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectFile {
    pub code: Vec<u8>,
    /// In `idx` order.
    pub symbols: Vec<ObjSymbol>,
    pub relocs: Vec<Reloc>,
}

impl ObjectFile {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(6 + self.code.len());
        put_u16(&mut buf, self.symbols.len() as u16);
        put_u16(&mut buf, self.relocs.len() as u16);
        put_u16(&mut buf, self.code.len() as u16);
        buf.extend_from_slice(&self.code);
        for sym in &self.symbols {
            buf.push(u8::from(sym.kind));
            put_u16(&mut buf, sym.idx);
            put_u16(&mut buf, sym.addr);
            put_u16(&mut buf, sym.label.len() as u16);
            buf.extend_from_slice(sym.label.as_bytes());
        }
        for rel in &self.relocs {
            put_u16(&mut buf, rel.loc);
            put_u16(&mut buf, rel.symidx);
        }
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ObjectFile, FormatError> {
        let mut r = Reader::new(bytes);
        let nsyms = r.u16()?;
        let nrels = r.u16()?;
        let ncode = r.u16()?;

        let code = r.bytes(ncode as usize)?.to_vec();

        // Records carry their own index and may legally arrive in any
        // order; place them by it.
        let mut slots: Vec<Option<ObjSymbol>> = vec![None; nsyms as usize];
        for _ in 0..nsyms {
            let kind = r.u8()?;
            let kind = SymKind::try_from(kind).map_err(|_| FormatError::BadSymKind(kind))?;
            let idx = r.u16()?;
            let addr = r.u16()?;
            let nlabel = r.u16()?;
            let label = std::str::from_utf8(r.bytes(nlabel as usize)?)
                .map_err(|_| FormatError::BadLabel)?
                .to_string();

            let slot = slots
                .get_mut(idx as usize)
                .ok_or(FormatError::BadSymIndex(idx))?;
            if slot.is_some() {
                return Err(FormatError::DupSymIndex(idx));
            }
            *slot = Some(ObjSymbol {
                kind,
                idx,
                addr,
                label,
            });
        }
        // Every slot is filled: nsyms records with unique in-range
        // indices leave no gaps.
        let symbols = slots.into_iter().flatten().collect();

        let mut relocs = Vec::with_capacity(nrels as usize);
        for _ in 0..nrels {
            let loc = r.u16()?;
            let symidx = r.u16()?;
            if symidx >= nsyms {
                return Err(FormatError::BadRelocSym(symidx));
            }
            relocs.push(Reloc { loc, symidx });
        }

        r.finish()?;
        Ok(ObjectFile {
            code,
            symbols,
            relocs,
        })
    }
}
