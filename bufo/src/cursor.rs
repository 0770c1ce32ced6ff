use std::ops::Range;

use crate::{
    codec::{
        decode_int,
        encode_int,
        string,
        IntType,
        Integer,
    },
    error::check_range,
    hexdump::Hexdump,
    Endianness,
    Error,
    Storage,
};

/// What a [`ByteCursor`] is constructed from.
#[derive(Clone, Debug, derive_more::From)]
pub enum Source {
    /// Allocate zero-filled storage with this many bytes. Must be positive.
    ByteCount(usize),

    /// Take ownership of these bytes.
    Bytes(Vec<u8>),

    /// Share the bytes of an existing storage handle.
    Alias(Storage),

    /// Allocate storage with one byte per UTF-16 code unit and write the
    /// units into it, as [`ByteCursor::write_raw_string`] does.
    Text(String),
}

impl<'a> From<&'a [u8]> for Source {
    #[inline]
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Source {
    #[inline]
    fn from(value: [u8; N]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl<'a> From<&'a str> for Source {
    #[inline]
    fn from(value: &'a str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl<'a> From<&'a ByteCursor> for Source {
    #[inline]
    fn from(value: &'a ByteCursor) -> Self {
        Self::Alias(value.storage.clone())
    }
}

/// Where [`ByteCursor::write_bytes`] copies from.
#[derive(Clone, Copy, Debug, derive_more::From)]
pub enum CopySource<'a> {
    Bytes(&'a [u8]),
    Storage(&'a Storage),

    /// Another cursor. The copy starts at its current offset by default, and
    /// doesn't move it.
    Cursor(&'a ByteCursor),
}

impl<'a> From<&'a Vec<u8>> for CopySource<'a> {
    #[inline]
    fn from(value: &'a Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for CopySource<'a> {
    #[inline]
    fn from(value: &'a [u8; N]) -> Self {
        Self::Bytes(value)
    }
}

/// Result of a dynamically typed integer read.
///
/// A read of a single value yields [`Ints::One`], a read of more than one
/// value yields [`Ints::Many`].
#[derive(Clone, Debug, PartialEq, Eq, derive_more::From)]
pub enum Ints {
    One(i64),
    Many(Vec<i64>),
}

impl Ints {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<i64> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// A cursor over fixed-length byte storage.
///
/// The cursor tracks the offset of the next read or write, the offset right
/// after the last write, and a default [`Endianness`] for multi-byte
/// integers. Every read and write is bounds-checked before anything is
/// modified: on error the cursor and its bytes are left untouched.
///
/// Cloning a cursor (or constructing one from [`Source::Alias`]) shares the
/// underlying bytes, see [`Storage`].
///
/// # Example
///
/// ```
/// # use bufo::{ByteCursor, Endianness};
/// let mut cursor = ByteCursor::new(8usize).unwrap();
/// cursor.write_u16(0x1234).unwrap();
/// cursor.write_with(0x1234u16, Endianness::Big).unwrap();
/// cursor.seek(0).unwrap();
/// assert_eq!(cursor.read_u8_many(4).unwrap(), [0x34, 0x12, 0x12, 0x34]);
/// ```
#[derive(Clone, Debug)]
pub struct ByteCursor {
    storage: Storage,
    offset: usize,
    last_write_offset: usize,
    endianness: Endianness,
}

impl ByteCursor {
    /// Creates a little endian cursor.
    #[inline]
    pub fn new(source: impl Into<Source>) -> Result<Self, Error> {
        Self::with_endianness(source, Endianness::default())
    }

    pub fn with_endianness(
        source: impl Into<Source>,
        endianness: Endianness,
    ) -> Result<Self, Error> {
        let cursor = match source.into() {
            Source::ByteCount(0) => {
                return Err(Error::Construction("byte count must be positive"));
            }
            Source::ByteCount(length) => Self::wrap(Storage::zeroed(length), endianness),
            Source::Bytes(bytes) => Self::wrap(bytes.into(), endianness),
            Source::Alias(storage) => Self::wrap(storage, endianness),
            Source::Text(text) => {
                let bytes = string::encode_raw(&text);
                let mut cursor = Self::wrap(Storage::zeroed(bytes.len()), endianness);
                cursor.write_all(bytes.as_slice())?;
                cursor
            }
        };

        tracing::trace!(
            length = cursor.byte_length(),
            %endianness,
            handles = cursor.storage.handle_count(),
            "new cursor"
        );

        Ok(cursor)
    }

    #[inline]
    fn wrap(storage: Storage, endianness: Endianness) -> Self {
        Self {
            storage,
            offset: 0,
            last_write_offset: 0,
            endianness,
        }
    }

    /// Total length of the storage.
    #[inline]
    pub fn byte_length(&self) -> usize {
        self.storage.len()
    }

    /// Bytes between the offset and the end of the storage.
    #[inline]
    pub fn remaining_bytes(&self) -> usize {
        self.byte_length() - self.offset
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Offset right after the last completed write, or `0` if nothing was
    /// written yet.
    #[inline]
    pub fn last_write_offset(&self) -> usize {
        self.last_write_offset
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    #[inline]
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Sets the default endianness from its numeric code
    /// ([`ENDIAN_LITTLE`](crate::ENDIAN_LITTLE) or
    /// [`ENDIAN_BIG`](crate::ENDIAN_BIG)).
    pub fn set_endianness_code(&mut self, code: u8) -> Result<(), Error> {
        self.endianness = code.try_into()?;
        Ok(())
    }

    /// The underlying storage. Clone it to keep a handle that aliases this
    /// cursor's bytes.
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub fn into_storage(self) -> Storage {
        self.storage
    }

    /// Replaces the underlying storage.
    ///
    /// The offset and last write offset are kept, but clamped to the length of
    /// the new storage.
    pub fn set_storage(&mut self, storage: Storage) {
        let length = storage.len();
        self.storage = storage;
        self.offset = self.offset.min(length);
        self.last_write_offset = self.last_write_offset.min(length);
    }

    /// Hexdump of the whole storage.
    pub fn hexdump(&self) -> Result<Hexdump<Vec<u8>>, Error> {
        let bytes = self.storage.checked_bytes("hexdump")?;
        Ok(Hexdump::new(bytes.to_vec()))
    }

    /// Sets the absolute offset.
    ///
    /// A negative `target` seeks backwards from the end: `seek(-k)` is
    /// `seek(byte_length - k)`.
    ///
    /// Fails if `|target| >= byte_length`. Note that this rejects
    /// `seek(byte_length)` although the end is a valid offset otherwise.
    pub fn seek(&mut self, target: isize) -> Result<(), Error> {
        let length = self.byte_length();
        let magnitude = target.unsigned_abs();
        if magnitude >= length {
            return Err(Error::offset_out_of_bounds("seek", target, length));
        }

        self.offset = if target < 0 {
            length - magnitude
        }
        else {
            magnitude
        };

        Ok(())
    }

    /// Moves the offset by `delta` bytes.
    ///
    /// Fails if the new offset would be negative or `>= byte_length`.
    pub fn move_by(&mut self, delta: isize) -> Result<(), Error> {
        let length = self.byte_length();
        let candidate = isize::try_from(self.offset)
            .ok()
            .and_then(|offset| offset.checked_add(delta));

        match candidate {
            Some(offset) if offset >= 0 && (offset as usize) < length => {
                self.offset = offset as usize;
                Ok(())
            }
            _ => {
                Err(Error::offset_out_of_bounds(
                    "move",
                    candidate.unwrap_or(delta),
                    length,
                ))
            }
        }
    }

    #[inline]
    fn range(&self, operation: &'static str, length: usize) -> Result<Range<usize>, Error> {
        check_range(operation, self.offset, length, self.byte_length())
    }

    fn span(
        &self,
        operation: &'static str,
        ty: IntType,
        count: usize,
    ) -> Result<Range<usize>, Error> {
        let length = ty.size().checked_mul(count).ok_or_else(|| {
            Error::range_out_of_bounds(operation, self.offset, usize::MAX, self.byte_length())
        })?;
        self.range(operation, length)
    }

    #[inline]
    fn commit_write(&mut self, end: usize) {
        self.offset = end;
        self.last_write_offset = end;
    }

    fn read_one(&mut self, ty: IntType, endianness: Endianness) -> Result<i64, Error> {
        let range = self.range("read", ty.size())?;
        let value = decode_int(
            &self.storage.checked_bytes("read")?,
            range.start,
            ty,
            endianness,
        )?;
        self.offset = range.end;
        Ok(value)
    }

    fn read_values(
        &mut self,
        ty: IntType,
        count: usize,
        endianness: Endianness,
    ) -> Result<Vec<i64>, Error> {
        let range = self.span("read", ty, count)?;
        let values = {
            let bytes = self.storage.checked_bytes("read")?;
            range
                .clone()
                .step_by(ty.size())
                .map(|offset| decode_int(&bytes, offset, ty, endianness))
                .collect::<Result<Vec<_>, _>>()?
        };
        self.offset = range.end;
        Ok(values)
    }

    fn write_values(
        &mut self,
        ty: IntType,
        values: impl ExactSizeIterator<Item = i64>,
        endianness: Endianness,
    ) -> Result<(), Error> {
        let range = self.span("write", ty, values.len())?;
        {
            let mut bytes = self.storage.checked_bytes_mut("write")?;
            for (offset, value) in range.clone().step_by(ty.size()).zip(values) {
                encode_int(&mut bytes, offset, ty, endianness, value)?;
            }
        }
        self.commit_write(range.end);
        Ok(())
    }

    /// Reads one integer using the default endianness.
    #[inline]
    pub fn read<T: Integer>(&mut self) -> Result<T, Error> {
        self.read_with(self.endianness)
    }

    /// Reads one integer using the given endianness.
    #[inline]
    pub fn read_with<T: Integer>(&mut self, endianness: Endianness) -> Result<T, Error> {
        Ok(T::from_i64(self.read_one(T::TYPE, endianness)?))
    }

    /// Reads `count` consecutive integers using the default endianness.
    #[inline]
    pub fn read_many<T: Integer>(&mut self, count: usize) -> Result<Vec<T>, Error> {
        self.read_many_with(count, self.endianness)
    }

    pub fn read_many_with<T: Integer>(
        &mut self,
        count: usize,
        endianness: Endianness,
    ) -> Result<Vec<T>, Error> {
        Ok(self
            .read_values(T::TYPE, count, endianness)?
            .into_iter()
            .map(T::from_i64)
            .collect())
    }

    /// Writes one integer using the default endianness.
    #[inline]
    pub fn write<T: Integer>(&mut self, value: T) -> Result<(), Error> {
        self.write_with(value, self.endianness)
    }

    #[inline]
    pub fn write_with<T: Integer>(&mut self, value: T, endianness: Endianness) -> Result<(), Error> {
        self.write_values(T::TYPE, std::iter::once(value.to_i64()), endianness)
    }

    /// Writes `values` consecutively using the default endianness.
    #[inline]
    pub fn write_all<T: Integer>(&mut self, values: &[T]) -> Result<(), Error> {
        self.write_all_with(values, self.endianness)
    }

    pub fn write_all_with<T: Integer>(
        &mut self,
        values: &[T],
        endianness: Endianness,
    ) -> Result<(), Error> {
        self.write_values(
            T::TYPE,
            values.iter().map(|value| value.to_i64()),
            endianness,
        )
    }

    /// Reads integers of a type only known at runtime.
    ///
    /// `count` defaults to one. A count of `0` is treated as `1`. Uses the
    /// default endianness unless one is given.
    pub fn read_int(
        &mut self,
        ty: IntType,
        count: Option<usize>,
        endianness: Option<Endianness>,
    ) -> Result<Ints, Error> {
        let endianness = endianness.unwrap_or(self.endianness);
        match count {
            None | Some(0) | Some(1) => Ok(Ints::One(self.read_one(ty, endianness)?)),
            Some(count) => Ok(Ints::Many(self.read_values(ty, count, endianness)?)),
        }
    }

    /// Writes integers of a type only known at runtime.
    ///
    /// Values are truncated to the width of `ty`.
    pub fn write_int(
        &mut self,
        ty: IntType,
        values: impl Into<Ints>,
        endianness: Option<Endianness>,
    ) -> Result<(), Error> {
        let endianness = endianness.unwrap_or(self.endianness);
        match values.into() {
            Ints::One(value) => self.write_values(ty, std::iter::once(value), endianness),
            Ints::Many(values) => self.write_values(ty, values.into_iter(), endianness),
        }
    }

    /// Reads `length` bytes, or all remaining bytes, into a new [`Vec`].
    pub fn read_bytes(&mut self, length: Option<usize>) -> Result<Vec<u8>, Error> {
        let length = length.unwrap_or_else(|| self.remaining_bytes());
        let range = self.range("read_bytes", length)?;
        let bytes = self.storage.checked_bytes("read_bytes")?[range.clone()].to_vec();
        self.offset = range.end;
        Ok(bytes)
    }

    /// Reads `length` bytes, or all remaining bytes, into a new cursor.
    ///
    /// The new cursor owns a copy of the bytes, starts at offset `0` and is
    /// little endian.
    pub fn read_sub_cursor(&mut self, length: Option<usize>) -> Result<ByteCursor, Error> {
        let bytes = self.read_bytes(length)?;
        Ok(Self::wrap(bytes.into(), Endianness::default()))
    }

    /// Reads the payload of a string. Without a `length` a `u32` length prefix
    /// is read first.
    fn read_string_bytes(
        &mut self,
        operation: &'static str,
        length: Option<usize>,
    ) -> Result<Vec<u8>, Error> {
        let start = self.offset;
        let length = match length {
            Some(length) => length,
            None => self.read::<u32>()? as usize,
        };

        let range = match self.range(operation, length) {
            Ok(range) => range,
            Err(e) => {
                self.offset = start;
                return Err(e);
            }
        };
        let bytes = match self.storage.checked_bytes(operation) {
            Ok(bytes) => bytes[range.clone()].to_vec(),
            Err(e) => {
                self.offset = start;
                return Err(e);
            }
        };
        self.offset = range.end;
        Ok(bytes)
    }

    fn write_string_bytes(
        &mut self,
        operation: &'static str,
        payload: &[u8],
        with_length_prefix: bool,
    ) -> Result<(), Error> {
        if with_length_prefix {
            let prefix = u32::try_from(payload.len()).map_err(|_| {
                Error::range_out_of_bounds(
                    operation,
                    self.offset,
                    payload.len(),
                    self.byte_length(),
                )
            })?;
            // check prefix and payload together, so a failed write leaves
            // nothing behind
            self.range(operation, payload.len().saturating_add(4))?;
            self.storage.check_writable(operation)?;
            self.write(prefix)?;
        }
        self.write_from_slice(operation, payload)
    }

    fn write_from_slice(&mut self, operation: &'static str, source: &[u8]) -> Result<(), Error> {
        let range = self.range(operation, source.len())?;
        self.storage.checked_bytes_mut(operation)?[range.clone()].copy_from_slice(source);
        self.commit_write(range.end);
        Ok(())
    }

    /// Reads a string with one character per byte (ISO-8859-1).
    ///
    /// Without a `length` a `u32` length prefix is read first.
    pub fn read_raw_string(&mut self, length: Option<usize>) -> Result<String, Error> {
        let bytes = self.read_string_bytes("read_raw_string", length)?;
        Ok(string::decode_raw(&bytes))
    }

    /// Writes each UTF-16 code unit of `value` as one byte, optionally
    /// prefixed with the unit count as `u32`.
    ///
    /// Units above `0xff` are truncated to their lowest byte.
    pub fn write_raw_string(&mut self, value: &str, with_length_prefix: bool) -> Result<(), Error> {
        let payload = string::encode_raw(value);
        self.write_string_bytes("write_raw_string", &payload, with_length_prefix)
    }

    /// Reads a UTF-8 string of `length` bytes.
    ///
    /// Without a `length` a `u32` length prefix is read first. See
    /// [`decode_utf8_units`](crate::codec::string::decode_utf8_units) for how
    /// the bytes are decoded.
    pub fn read_utf8_string(&mut self, length: Option<usize>) -> Result<String, Error> {
        let bytes = self.read_string_bytes("read_utf8_string", length)?;
        Ok(string::decode_utf8(&bytes))
    }

    /// Like [`read_utf8_string`](Self::read_utf8_string), but returns the
    /// decoded UTF-16 code units, including unpaired surrogates.
    pub fn read_utf8_units(&mut self, length: Option<usize>) -> Result<Vec<u16>, Error> {
        let bytes = self.read_string_bytes("read_utf8_units", length)?;
        Ok(string::decode_utf8_units(&bytes))
    }

    /// Writes `value` as UTF-8, optionally prefixed with its byte length as
    /// `u32`.
    pub fn write_utf8_string(
        &mut self,
        value: &str,
        with_length_prefix: bool,
    ) -> Result<(), Error> {
        let payload = string::encode_utf8(value);
        self.write_string_bytes("write_utf8_string", &payload, with_length_prefix)
    }

    /// Copies bytes from `source` to the current offset.
    ///
    /// For a [`CopySource::Cursor`], `source_offset` defaults to the offset of
    /// that cursor, otherwise to `0`. `count` defaults to all bytes from
    /// `source_offset` to the end of the source. The source's own offset is
    /// never changed.
    ///
    /// Fails with [`Error::Borrowed`] if `source` borrows from this cursor's
    /// storage through [`Storage::bytes`]. Pass the [`Storage`] handle itself
    /// instead.
    pub fn write_bytes<'a>(
        &mut self,
        source: impl Into<CopySource<'a>>,
        source_offset: Option<usize>,
        count: Option<usize>,
    ) -> Result<(), Error> {
        let (storage, source_offset) = match source.into() {
            CopySource::Bytes(bytes) => {
                return self.copy_from(bytes, source_offset.unwrap_or(0), count);
            }
            CopySource::Storage(storage) => (storage, source_offset.unwrap_or(0)),
            CopySource::Cursor(cursor) => {
                (&cursor.storage, source_offset.unwrap_or(cursor.offset))
            }
        };

        if storage.ptr_eq(&self.storage) {
            let length = self.byte_length();
            let count = count.unwrap_or_else(|| length.saturating_sub(source_offset));
            let source_range = check_range("write_bytes", source_offset, count, length)?;
            let destination = self.range("write_bytes", count)?;
            self.storage
                .checked_bytes_mut("write_bytes")?
                .copy_within(source_range, destination.start);
            self.commit_write(destination.end);
            Ok(())
        }
        else {
            let bytes = storage.checked_bytes("write_bytes")?;
            self.copy_from(&bytes, source_offset, count)
        }
    }

    fn copy_from(
        &mut self,
        source: &[u8],
        source_offset: usize,
        count: Option<usize>,
    ) -> Result<(), Error> {
        let count = count.unwrap_or_else(|| source.len().saturating_sub(source_offset));
        let source_range = check_range("write_bytes", source_offset, count, source.len())?;
        self.write_from_slice("write_bytes", &source[source_range])
    }

    /// Reads `count` bytes, or all remaining bytes, and writes them to
    /// `writer`. Returns the number of bytes written.
    ///
    /// The offset only moves if writing succeeded.
    pub fn to_writer(
        &mut self,
        mut writer: impl std::io::Write,
        count: Option<usize>,
    ) -> Result<usize, Error> {
        let start = self.offset;
        let bytes = self.read_bytes(count)?;
        if let Err(e) = writer.write_all(&bytes).and_then(|()| writer.flush()) {
            self.offset = start;
            return Err(e.into());
        }
        Ok(bytes.len())
    }

    /// Reads `count` bytes, or all remaining bytes, and writes them to a new
    /// file at `path`. Returns the number of bytes written.
    #[cfg(feature = "fs")]
    pub fn to_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
        count: Option<usize>,
    ) -> Result<usize, Error> {
        let path = path.as_ref();
        self.range("to_file", count.unwrap_or_else(|| self.remaining_bytes()))?;
        let file = std::fs::File::create(path)?;
        let written = self.to_writer(std::io::BufWriter::new(file), count)?;
        tracing::debug!(path = %path.display(), written, "exported bytes");
        Ok(written)
    }

    /// Always fails, since this crate was built without the `fs` feature.
    #[cfg(not(feature = "fs"))]
    pub fn to_file(
        &mut self,
        _path: impl AsRef<std::path::Path>,
        _count: Option<usize>,
    ) -> Result<usize, Error> {
        Err(Error::UnsupportedEnvironment {
            operation: "to_file",
            reason: "built without file system support",
        })
    }
}

macro_rules! impl_int_methods {
    {
        $(
            $ty:ty => $read:ident, $read_many:ident, $write:ident;
        )*
    } => {
        impl ByteCursor {
            $(
                #[doc = concat!("Reads one `", stringify!($ty), "` using the default endianness.")]
                #[inline]
                pub fn $read(&mut self) -> Result<$ty, Error> {
                    self.read::<$ty>()
                }

                #[doc = concat!("Reads `count` consecutive `", stringify!($ty), "`s using the default endianness.")]
                #[inline]
                pub fn $read_many(&mut self, count: usize) -> Result<Vec<$ty>, Error> {
                    self.read_many::<$ty>(count)
                }

                #[doc = concat!("Writes one `", stringify!($ty), "` using the default endianness.")]
                #[inline]
                pub fn $write(&mut self, value: $ty) -> Result<(), Error> {
                    self.write::<$ty>(value)
                }
            )*
        }
    };
}

impl_int_methods! {
    i8 => read_i8, read_i8_many, write_i8;
    u8 => read_u8, read_u8_many, write_u8;
    i16 => read_i16, read_i16_many, write_i16;
    u16 => read_u16, read_u16_many, write_u16;
    i32 => read_i32, read_i32_many, write_i32;
    u32 => read_u32, read_u32_many, write_u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: [u8; 10] = [0xff, 0xd2, 0xce, 0xfe, 0x6f, 0x57, 0x6f, 0x72, 0x6c, 0x64];

    fn cursor() -> ByteCursor {
        ByteCursor::new(RAW).unwrap()
    }

    #[test]
    fn fresh_cursor_is_at_start() {
        let cursor = ByteCursor::new(16usize).unwrap();
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.last_write_offset(), 0);
        assert_eq!(cursor.byte_length(), 16);
        assert_eq!(cursor.remaining_bytes(), 16);
        assert_eq!(cursor.endianness(), Endianness::Little);
    }

    #[test]
    fn zero_byte_count_is_rejected() {
        assert!(matches!(
            ByteCursor::new(0usize),
            Err(Error::Construction(_))
        ));
    }

    #[test]
    fn empty_bytes_are_accepted() {
        let cursor = ByteCursor::new(Vec::<u8>::new()).unwrap();
        assert_eq!(cursor.byte_length(), 0);
        assert_eq!(cursor.remaining_bytes(), 0);
    }

    #[test]
    fn text_seed_writes_one_byte_per_char() {
        let mut cursor = ByteCursor::new("Frogs").unwrap();
        assert_eq!(cursor.byte_length(), 5);
        assert_eq!(cursor.offset(), 5);
        assert_eq!(cursor.last_write_offset(), 5);
        assert_eq!(*cursor.storage().bytes(), *b"Frogs");
        cursor.seek(0).unwrap();
        assert!(cursor.read_raw_string(None).unwrap_err().is_bounds());
        assert_eq!(cursor.read_raw_string(Some(5)).unwrap(), "Frogs");
    }

    #[test]
    fn alias_shares_bytes() {
        let mut a = ByteCursor::new(4usize).unwrap();
        let mut b = ByteCursor::new(&a).unwrap();
        b.write_u8(0x42).unwrap();
        assert_eq!(a.read_u8().unwrap(), 0x42);
        assert_eq!(a.last_write_offset(), 0);
        assert!(a.storage().ptr_eq(b.storage()));

        a.write_u8(0x43).unwrap();
        b.seek(1).unwrap();
        assert_eq!(b.read_u8().unwrap(), 0x43);
    }

    #[test]
    fn storage_handle_aliases_wrapped_bytes() {
        let storage = Storage::from(vec![0u8; 2]);
        let mut cursor = ByteCursor::new(storage.clone()).unwrap();
        cursor.write_u16(0xbeef).unwrap();
        assert_eq!(*storage.bytes(), [0xef, 0xbe]);
    }

    #[test]
    fn reads_advance_offset_but_not_last_write_offset() {
        let mut cursor = cursor();
        for (i, byte) in RAW.iter().enumerate() {
            assert_eq!(cursor.read_u8().unwrap(), *byte);
            assert_eq!(cursor.offset(), i + 1);
            assert_eq!(cursor.remaining_bytes(), RAW.len() - i - 1);
            assert_eq!(cursor.last_write_offset(), 0);
        }
        assert!(cursor.read_u8().unwrap_err().is_bounds());
    }

    #[test]
    fn seek_and_move() {
        let mut cursor = cursor();
        cursor.read_bytes(None).unwrap();
        assert_eq!(cursor.offset(), 10);

        cursor.move_by(-5).unwrap();
        assert_eq!(cursor.offset(), 5);
        cursor.move_by(4).unwrap();
        assert_eq!(cursor.offset(), 9);
        cursor.seek(-7).unwrap();
        assert_eq!(cursor.offset(), 3);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn seek_rejects_length() {
        let mut cursor = cursor();
        cursor.seek(4).unwrap();
        assert!(cursor.seek(10).unwrap_err().is_bounds());
        assert!(cursor.seek(-10).unwrap_err().is_bounds());
        assert!(cursor.seek(isize::MIN).unwrap_err().is_bounds());
        assert_eq!(cursor.offset(), 4);
        cursor.seek(9).unwrap();
        cursor.seek(-9).unwrap();
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn move_rejects_out_of_bounds() {
        let mut cursor = cursor();
        cursor.seek(3).unwrap();
        assert!(cursor.move_by(-4).unwrap_err().is_bounds());
        assert!(cursor.move_by(7).unwrap_err().is_bounds());
        assert!(cursor.move_by(isize::MAX).unwrap_err().is_bounds());
        assert_eq!(cursor.offset(), 3);
        cursor.move_by(-3).unwrap();
        assert_eq!(cursor.offset(), 0);
        cursor.move_by(9).unwrap();
        assert_eq!(cursor.offset(), 9);
    }

    #[test]
    fn read_little_endian() {
        let mut cursor = cursor();
        assert_eq!(cursor.read_u8().unwrap(), 255);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_i8().unwrap(), -1);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_u16().unwrap(), 54015);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_i16().unwrap(), -11521);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_u32().unwrap(), 4274967295);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_i32().unwrap(), -20000001);
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn read_with_per_call_big_endian() {
        let mut cursor = cursor();
        assert_eq!(cursor.read_with::<u16>(Endianness::Big).unwrap(), 65490);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_with::<i16>(Endianness::Big).unwrap(), -46);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_with::<u32>(Endianness::Big).unwrap(), 4292005630);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_with::<i32>(Endianness::Big).unwrap(), -2961666);
        assert_eq!(cursor.endianness(), Endianness::Little);
    }

    #[test]
    fn read_with_default_big_endian() {
        let mut cursor = ByteCursor::with_endianness(RAW, Endianness::Big).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 255);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_u16().unwrap(), 65490);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_i32().unwrap(), -2961666);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_with::<u16>(Endianness::Little).unwrap(), 54015);
    }

    #[test]
    fn set_endianness_code() {
        let mut cursor = cursor();
        cursor.set_endianness_code(crate::ENDIAN_BIG).unwrap();
        assert_eq!(cursor.read_u16().unwrap(), 65490);
        assert!(matches!(
            cursor.set_endianness_code(3),
            Err(Error::Configuration(_))
        ));
        assert_eq!(cursor.endianness(), Endianness::Big);
    }

    #[test]
    fn read_many() {
        let mut cursor = ByteCursor::with_endianness(RAW, Endianness::Big).unwrap();
        assert_eq!(cursor.read_u8_many(10).unwrap(), RAW);
        cursor.seek(0).unwrap();
        assert_eq!(
            cursor.read_u16_many(5).unwrap(),
            [65490, 52990, 28503, 28530, 27748]
        );
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_u32_many(2).unwrap(), [4292005630, 1868001138]);
        assert_eq!(cursor.offset(), 8);
    }

    #[test]
    fn read_many_checks_bounds_up_front() {
        let mut cursor = cursor();
        cursor.seek(2).unwrap();
        assert!(cursor.read_u32_many(2).unwrap_err().is_bounds());
        assert_eq!(cursor.offset(), 2);
        assert!(cursor.read_u16_many(usize::MAX).unwrap_err().is_bounds());
        assert_eq!(cursor.read_u16_many(0).unwrap(), Vec::<u16>::new());
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn read_int_distinguishes_one_and_many() {
        let mut cursor = cursor();
        assert_eq!(cursor.read_int(IntType::U8, None, None).unwrap(), Ints::One(255));
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_int(IntType::I8, Some(1), None).unwrap(), Ints::One(-1));
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_int(IntType::U8, Some(0), None).unwrap(), Ints::One(255));
        assert_eq!(cursor.offset(), 1);
        cursor.seek(0).unwrap();
        assert_eq!(
            cursor
                .read_int(IntType::U16, Some(2), Some(Endianness::Big))
                .unwrap(),
            Ints::Many(vec![65490, 52990])
        );
    }

    #[test]
    fn write_and_read_back() {
        let mut cursor = cursor();
        cursor.write_u8(0x48).unwrap();
        assert_eq!(cursor.last_write_offset(), 1);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 0x48);

        cursor.seek(1).unwrap();
        cursor.write_all(&[0x65u8, 0x6c, 0x6c]).unwrap();
        assert_eq!(cursor.offset(), 4);
        assert_eq!(cursor.last_write_offset(), 4);
        cursor.seek(1).unwrap();
        assert_eq!(cursor.read_u8_many(3).unwrap(), [0x65, 0x6c, 0x6c]);
        assert_eq!(cursor.last_write_offset(), 4);
    }

    #[test]
    fn write_with_endianness() {
        let mut cursor = ByteCursor::new(8usize).unwrap();
        cursor.write_with(-2i16, Endianness::Big).unwrap();
        cursor.write_i16(-2).unwrap();
        cursor.write_all_with(&[1u16], Endianness::Big).unwrap();
        cursor.write_int(IntType::U16, 1i64, None).unwrap();
        assert_eq!(
            *cursor.storage().bytes(),
            [0xff, 0xfe, 0xfe, 0xff, 0x00, 0x01, 0x01, 0x00]
        );
        assert_eq!(cursor.last_write_offset(), 8);
    }

    #[test]
    fn failed_write_changes_nothing() {
        let mut cursor = ByteCursor::new(6usize).unwrap();
        cursor.seek(2).unwrap();
        assert!(cursor.write_all(&[1u16, 2, 3]).unwrap_err().is_bounds());
        assert!(cursor
            .write_int(IntType::U32, vec![1i64, 2], None)
            .unwrap_err()
            .is_bounds());
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.last_write_offset(), 0);
        assert_eq!(*cursor.storage().bytes(), [0; 6]);
    }

    #[test]
    fn strings() {
        let mut cursor = ByteCursor::new(b"HelloWorld".as_slice()).unwrap();
        assert_eq!(cursor.read_raw_string(Some(5)).unwrap(), "Hello");
        assert_eq!(cursor.read_raw_string(Some(5)).unwrap(), "World");

        cursor.seek(0).unwrap();
        cursor.write_raw_string("Frogs", false).unwrap();
        assert_eq!(cursor.last_write_offset(), 5);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_raw_string(Some(10)).unwrap(), "FrogsWorld");

        cursor.seek(0).unwrap();
        cursor.write_raw_string("Buzzzz", true).unwrap();
        assert_eq!(cursor.last_write_offset(), 10);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_u32().unwrap(), 6);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_raw_string(None).unwrap(), "Buzzzz");

        cursor.seek(0).unwrap();
        cursor.write_utf8_string("\u{3053}", true).unwrap();
        assert_eq!(cursor.offset(), 7);
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_utf8_string(None).unwrap(), "\u{3053}");
    }

    #[test]
    fn zero_length_string() {
        let mut cursor = cursor();
        assert_eq!(cursor.read_raw_string(Some(0)).unwrap(), "");
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn string_with_bad_prefix_keeps_offset() {
        let mut cursor = ByteCursor::new(8usize).unwrap();
        cursor.write_u32(100).unwrap();
        cursor.seek(0).unwrap();
        assert!(cursor.read_utf8_string(None).unwrap_err().is_bounds());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn prefixed_string_that_does_not_fit_writes_nothing() {
        let mut cursor = ByteCursor::new(6usize).unwrap();
        assert!(cursor
            .write_raw_string("abc", true)
            .unwrap_err()
            .is_bounds());
        assert_eq!(cursor.offset(), 0);
        assert_eq!(*cursor.storage().bytes(), [0; 6]);
    }

    #[test]
    fn utf8_units_keep_surrogates() {
        let mut cursor = ByteCursor::new([0xf0u8, 0xa0, 0x80, 0x80]).unwrap();
        assert_eq!(cursor.read_utf8_units(Some(4)).unwrap(), [0xd840, 0xdc00]);
    }

    #[test]
    fn read_bytes_and_sub_cursor() {
        let mut cursor = ByteCursor::with_endianness(RAW, Endianness::Big).unwrap();
        cursor.seek(4).unwrap();
        let mut sub = cursor.read_sub_cursor(Some(6)).unwrap();
        assert_eq!(cursor.offset(), 10);
        assert_eq!(sub.offset(), 0);
        assert_eq!(sub.byte_length(), 6);
        assert_eq!(sub.endianness(), Endianness::Little);
        assert!(sub.read_raw_string(None).unwrap_err().is_bounds());
        assert_eq!(sub.read_raw_string(Some(6)).unwrap(), "oWorld");

        // the sub cursor owns a copy
        assert!(!sub.storage().ptr_eq(cursor.storage()));

        cursor.seek(-2).unwrap();
        assert_eq!(cursor.read_bytes(None).unwrap(), [0x6c, 0x64]);
        assert_eq!(cursor.read_bytes(None).unwrap(), Vec::<u8>::new());
        assert!(cursor.read_bytes(Some(1)).unwrap_err().is_bounds());
        assert_eq!(cursor.last_write_offset(), 0);
    }

    #[test]
    fn write_bytes_from_slice() {
        let mut cursor = ByteCursor::new(6usize).unwrap();
        cursor.move_by(1).unwrap();
        cursor.write_bytes(b"abcd", Some(1), Some(2)).unwrap();
        assert_eq!(cursor.offset(), 3);
        assert_eq!(cursor.last_write_offset(), 3);
        cursor.write_bytes(&vec![1u8, 2, 3], None, None).unwrap();
        assert_eq!(*cursor.storage().bytes(), [0, b'b', b'c', 1, 2, 3]);
        assert!(cursor.write_bytes(b"x", None, None).unwrap_err().is_bounds());
        cursor.seek(0).unwrap();
        assert!(cursor
            .write_bytes(b"abcd", Some(3), Some(2))
            .unwrap_err()
            .is_bounds());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn write_bytes_from_cursor() {
        let mut source = cursor();
        source.seek(4).unwrap();

        let mut cursor = ByteCursor::new(9usize).unwrap();
        cursor.write_bytes(&source, None, Some(3)).unwrap();
        assert_eq!(cursor.offset(), 3);
        assert_eq!(cursor.last_write_offset(), 3);
        assert_eq!(source.offset(), 4);

        // rest of the source, from its offset
        cursor.write_bytes(&source, None, None).unwrap();
        assert_eq!(cursor.offset(), 9);
        assert_eq!(source.offset(), 4);
        assert_eq!(*cursor.storage().bytes(), *b"oWooWorld");

        cursor.seek(0).unwrap();
        cursor.write_bytes(&source, Some(0), Some(1)).unwrap();
        assert_eq!(cursor.storage().bytes()[0], 0xff);
    }

    #[test]
    fn write_bytes_within_same_storage() {
        let mut cursor = ByteCursor::new(b"abcdef".as_slice()).unwrap();
        let alias = ByteCursor::new(&cursor).unwrap();
        cursor.seek(2).unwrap();
        cursor.write_bytes(&alias, None, Some(4)).unwrap();
        assert_eq!(*cursor.storage().bytes(), *b"ababcd");
        assert_eq!(cursor.offset(), 6);

        let storage = cursor.storage().clone();
        cursor.seek(0).unwrap();
        cursor.write_bytes(&storage, Some(4), None).unwrap();
        assert_eq!(*cursor.storage().bytes(), *b"cdabcd");
    }

    #[test]
    fn set_storage_clamps_offsets() {
        let mut cursor = ByteCursor::new(8usize).unwrap();
        cursor.write_all(&[1u32, 2]).unwrap();
        cursor.set_storage(Storage::zeroed(3));
        assert_eq!(cursor.offset(), 3);
        assert_eq!(cursor.last_write_offset(), 3);
        assert_eq!(cursor.remaining_bytes(), 0);
    }

    #[test]
    fn to_writer_reads_bytes() {
        let mut cursor = cursor();
        cursor.seek(4).unwrap();
        let mut out = Vec::new();
        assert_eq!(cursor.to_writer(&mut out, Some(2)).unwrap(), 2);
        assert_eq!(out, [0x6f, 0x57]);
        assert_eq!(cursor.offset(), 6);
    }

    struct BrokenPipe;

    impl std::io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_to_writer_keeps_offset() {
        let mut cursor = cursor();
        cursor.seek(4).unwrap();
        assert!(matches!(
            cursor.to_writer(BrokenPipe, None),
            Err(Error::Io(_))
        ));
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn copy_from_borrowed_own_bytes_fails() {
        let mut cursor = ByteCursor::new(b"abcd".as_slice()).unwrap();
        let storage = cursor.storage().clone();

        let bytes = storage.bytes();
        assert!(matches!(
            cursor.write_bytes(&bytes[..2], None, None),
            Err(Error::Borrowed {
                operation: "write_bytes"
            })
        ));
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.last_write_offset(), 0);
        assert_eq!(cursor.byte_length(), 4);
        // shared borrows don't get in the way of reads
        assert_eq!(cursor.read_u8().unwrap(), b'a');
        drop(bytes);

        let bytes = storage.bytes_mut();
        assert!(matches!(cursor.read_u8(), Err(Error::Borrowed { .. })));
        assert!(matches!(cursor.hexdump(), Err(Error::Borrowed { .. })));
        cursor.seek(0).unwrap();
        assert!(matches!(
            cursor.write_raw_string("", true),
            Err(Error::Borrowed { .. })
        ));
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.last_write_offset(), 0);
        drop(bytes);

        cursor.write_bytes(&storage, Some(2), Some(2)).unwrap();
        assert_eq!(*cursor.storage().bytes(), *b"cdcd");
    }

    #[test]
    fn text_seed_counts_utf16_units() {
        let cursor = ByteCursor::new("a\u{1f438}").unwrap();
        assert_eq!(cursor.byte_length(), 3);
        assert_eq!(*cursor.storage().bytes(), [0x61, 0x3d, 0x38]);
    }

    #[test]
    fn into_storage_keeps_bytes() {
        let mut cursor = ByteCursor::new(4usize).unwrap();
        cursor.write_u16(0x0102).unwrap();
        let storage = cursor.into_storage();
        assert!(storage == [0x02u8, 0x01, 0, 0][..]);
        assert_eq!(storage.handle_count(), 1);
    }

    #[test]
    fn ints_into_vec() {
        assert_eq!(Ints::One(7).into_vec(), [7]);
        assert_eq!(Ints::from(vec![1i64, 2]).into_vec(), [1, 2]);
        assert!(Ints::Many(vec![]).is_empty());
    }

    #[test]
    fn hexdump_shows_whole_storage() {
        let mut cursor = cursor();
        cursor.seek(4).unwrap();
        assert_eq!(
            format!("{:?}", cursor.hexdump().unwrap()),
            "0000  ff d2 ce fe 6f 57 6f 72 6c 64                    ....oWorld"
        );
    }
}
