//! Object-graph blob: a typed, versioned binary image of one value.
//!
//! ```text
//! magic    2 bytes  "OG"
//! type id  u16 BE length + UTF-8
//! version  u8
//! fields   in the order the type writes them:
//!            string  u32 BE length + UTF-8
//!            bool    1 byte, 0 or 1
//!            tag     u16 BE length + UTF-8
//! ```
//!
//! The header is checked before any field is read. Bytes left over after
//! the last field make the blob corrupt.

use bytes::{Buf, BufMut};
use recserde_api::SerdeError;

const MAGIC: [u8; 2] = *b"OG";

/// A type that can be written as an object-graph blob.
pub trait BlobType: Sized {
    /// Type identity embedded in every blob of this type.
    const TYPE_ID: &'static str;
    const VERSION: u8;

    fn write_fields(&self, w: &mut BlobWriter) -> Result<(), SerdeError>;

    fn read_fields(r: &mut BlobReader<'_>) -> Result<Self, SerdeError>;
}

pub fn encode<T: BlobType>(value: &T) -> Result<Vec<u8>, SerdeError> {
    let mut w = BlobWriter::default();
    w.buf.put_slice(&MAGIC);
    w.put_tag(T::TYPE_ID)?;
    w.buf.put_u8(T::VERSION);
    value.write_fields(&mut w)?;
    Ok(w.buf)
}

pub fn decode<T: BlobType>(bytes: &[u8]) -> Result<T, SerdeError> {
    let mut r = BlobReader { buf: bytes };

    if r.take(MAGIC.len(), "magic")? != MAGIC {
        return Err(SerdeError::corrupt("not an object-graph blob"));
    }
    let type_id = r.read_tag("type id")?;
    if type_id != T::TYPE_ID {
        return Err(SerdeError::unknown_type(format!(
            "blob holds '{type_id}', expected '{}'",
            T::TYPE_ID
        )));
    }
    let version = r.read_u8("version")?;
    if version != T::VERSION {
        return Err(SerdeError::unknown_type(format!(
            "'{type_id}' version {version} is not supported (expected {})",
            T::VERSION
        )));
    }

    let value = T::read_fields(&mut r)?;
    if r.buf.has_remaining() {
        return Err(SerdeError::corrupt(format!(
            "{} trailing bytes after '{type_id}'",
            r.buf.remaining()
        )));
    }
    Ok(value)
}

// ═══════════════════════════════════════════════════════════════
//  Writer / Reader
// ═══════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct BlobWriter {
    buf: Vec<u8>,
}

impl BlobWriter {
    pub fn put_str(&mut self, s: &str) -> Result<(), SerdeError> {
        let len = u32::try_from(s.len())
            .map_err(|_| SerdeError::schema(format!("string of {} bytes is too long", s.len())))?;
        self.buf.put_u32(len);
        self.buf.put_slice(s.as_bytes());
        Ok(())
    }

    pub fn put_bool(&mut self, b: bool) {
        self.buf.put_u8(u8::from(b));
    }

    pub fn put_tag(&mut self, tag: &str) -> Result<(), SerdeError> {
        let len = u16::try_from(tag.len())
            .map_err(|_| SerdeError::schema(format!("tag of {} bytes is too long", tag.len())))?;
        self.buf.put_u16(len);
        self.buf.put_slice(tag.as_bytes());
        Ok(())
    }
}

/// Bounds-checked cursor. Every read fails with `Corrupt` instead of
/// running past the end of the buffer.
pub struct BlobReader<'a> {
    buf: &'a [u8],
}

impl<'a> BlobReader<'a> {
    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], SerdeError> {
        if self.buf.remaining() < n {
            return Err(SerdeError::corrupt(format!(
                "truncated {what}: need {n} bytes, have {}",
                self.buf.remaining()
            )));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn read_u8(&mut self, what: &str) -> Result<u8, SerdeError> {
        if !self.buf.has_remaining() {
            return Err(SerdeError::corrupt(format!("truncated {what}")));
        }
        Ok(self.buf.get_u8())
    }

    fn read_utf8(&mut self, len: usize, what: &str) -> Result<&'a str, SerdeError> {
        let raw = self.take(len, what)?;
        std::str::from_utf8(raw).map_err(|e| SerdeError::corrupt(format!("{what}: {e}")))
    }

    pub fn read_str(&mut self, what: &str) -> Result<String, SerdeError> {
        let len = u32::from_be_bytes([
            self.read_u8(what)?,
            self.read_u8(what)?,
            self.read_u8(what)?,
            self.read_u8(what)?,
        ]);
        Ok(self.read_utf8(len as usize, what)?.to_string())
    }

    pub fn read_bool(&mut self, what: &str) -> Result<bool, SerdeError> {
        match self.read_u8(what)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerdeError::corrupt(format!("{what}: invalid bool byte {other:#04x}"))),
        }
    }

    pub fn read_tag(&mut self, what: &str) -> Result<&'a str, SerdeError> {
        let len = u16::from_be_bytes([self.read_u8(what)?, self.read_u8(what)?]);
        self.read_utf8(len as usize, what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recserde_api::ErrorKind;

    #[derive(Debug, PartialEq)]
    struct Point {
        label: String,
        visible: bool,
    }

    impl BlobType for Point {
        const TYPE_ID: &'static str = "geo.Point";
        const VERSION: u8 = 3;

        fn write_fields(&self, w: &mut BlobWriter) -> Result<(), SerdeError> {
            w.put_str(&self.label)?;
            w.put_bool(self.visible);
            Ok(())
        }

        fn read_fields(r: &mut BlobReader<'_>) -> Result<Self, SerdeError> {
            Ok(Point {
                label: r.read_str("label")?,
                visible: r.read_bool("visible")?,
            })
        }
    }

    struct Other;

    impl BlobType for Other {
        const TYPE_ID: &'static str = "geo.Other";
        const VERSION: u8 = 3;

        fn write_fields(&self, _w: &mut BlobWriter) -> Result<(), SerdeError> {
            Ok(())
        }

        fn read_fields(_r: &mut BlobReader<'_>) -> Result<Self, SerdeError> {
            Ok(Other)
        }
    }

    fn point() -> Point {
        Point { label: "a".into(), visible: true }
    }

    #[test]
    fn layout() {
        let bytes = encode(&point()).unwrap();
        let mut expected = b"OG".to_vec();
        expected.extend([0, 9]);
        expected.extend(b"geo.Point");
        expected.push(3);
        expected.extend([0, 0, 0, 1, b'a', 1]);
        assert_eq!(bytes, expected);
        assert_eq!(decode::<Point>(&bytes).unwrap(), point());
    }

    #[test]
    fn foreign_type_is_rejected_before_fields() {
        let bytes = encode(&Other).unwrap();
        let err = decode::<Point>(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
        assert!(err.message().contains("'geo.Other'"));
    }

    #[test]
    fn other_version_is_rejected() {
        let mut bytes = encode(&point()).unwrap();
        bytes[2 + 2 + "geo.Point".len()] = 4;
        let err = decode::<Point>(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
    }

    #[test]
    fn structural_defects_are_corrupt() {
        let bytes = encode(&point()).unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        let mut bad_bool = bytes.clone();
        *bad_bool.last_mut().unwrap() = 7;
        let mut trailing = bytes.clone();
        trailing.push(0);

        for broken in [bad_magic, bad_bool, trailing, vec![], vec![0; 32]] {
            let err = decode::<Point>(&broken).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Corrupt, "{broken:?}");
        }
        for cut in 0..bytes.len() {
            let err = decode::<Point>(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Corrupt, "cut at {cut}");
        }
    }

    #[test]
    fn huge_length_prefix_does_not_overread() {
        let mut bytes = encode(&point()).unwrap();
        let at = 2 + 2 + "geo.Point".len() + 1;
        bytes[at..at + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        let err = decode::<Point>(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }
}
