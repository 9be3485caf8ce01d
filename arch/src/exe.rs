//! The executable image format, the contract between linker and VM:
//! `entry:u16, ncode:u16, code:ncode bytes`, little-endian.

use crate::codec::{put_u16, FormatError, Reader};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    /// Final address of `_start`.
    pub entry: u16,
    pub code: Vec<u8>,
}

impl Image {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.code.len());
        put_u16(&mut buf, self.entry);
        put_u16(&mut buf, self.code.len() as u16);
        buf.extend_from_slice(&self.code);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Image, FormatError> {
        let mut r = Reader::new(bytes);
        let entry = r.u16()?;
        let ncode = r.u16()?;
        let code = r.bytes(ncode as usize)?.to_vec();
        r.finish()?;
        Ok(Image { entry, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let img = Image {
            entry: 0x0002,
            code: vec![1, 2, 3],
        };
        assert_eq!(Image::from_bytes(&img.to_bytes()), Ok(img));
    }

    #[test]
    fn halt_only_image() {
        let img = Image {
            entry: 0,
            code: vec![0x00],
        };
        assert_eq!(img.to_bytes(), [0, 0, 1, 0, 0x00]);
    }

    #[test]
    fn length_mismatch_rejected() {
        assert_eq!(
            Image::from_bytes(&[0, 0, 2, 0, 0xAA]),
            Err(FormatError::Truncated)
        );
        assert_eq!(
            Image::from_bytes(&[0, 0, 1, 0, 0xAA, 0xBB]),
            Err(FormatError::TrailingBytes)
        );
    }
}
