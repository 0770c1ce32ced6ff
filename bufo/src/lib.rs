//! `bufo` - a cursor over a fixed-size byte buffer.
//!
//! [`ByteCursor`] wraps fixed-length [`Storage`] and reads and writes
//! integers (8, 16 and 32 bits, signed and unsigned), strings and raw bytes
//! at a tracked offset. Multi-byte integers use the cursor's default
//! [`Endianness`] unless a call specifies one.
//!
//! ```
//! # use bufo::{ByteCursor, Endianness};
//! let mut cursor = ByteCursor::new(16usize).unwrap();
//! cursor.write_raw_string("Buzzzz", true).unwrap();
//! cursor.write_with(-2i16, Endianness::Big).unwrap();
//!
//! cursor.seek(0).unwrap();
//! assert_eq!(cursor.read_raw_string(None).unwrap(), "Buzzzz");
//! assert_eq!(cursor.read_with::<i16>(Endianness::Big).unwrap(), -2);
//! assert_eq!(cursor.offset(), cursor.last_write_offset());
//! ```

pub mod codec;
mod cursor;
mod endianness;
mod error;
pub mod hexdump;
mod storage;

pub use self::{
    codec::{
        IntType,
        Integer,
    },
    cursor::{
        ByteCursor,
        CopySource,
        Ints,
        Source,
    },
    endianness::{
        Endianness,
        ENDIAN_BIG,
        ENDIAN_LITTLE,
    },
    error::{
        Error,
        Requested,
    },
    hexdump::{
        hexdump,
        Hexdump,
    },
    storage::Storage,
};
