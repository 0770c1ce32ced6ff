use std::{
    fmt::Display,
    str::FromStr,
};

use crate::{
    error::check_range,
    Endianness,
    Error,
};

/// The fixed-width integer types supported by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
}

impl IntType {
    pub const ALL: [IntType; 6] = [
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
    ];

    /// Size in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 => 4,
        }
    }

    #[inline]
    pub const fn bits(&self) -> usize {
        self.size() * 8
    }

    #[inline]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32)
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
        }
    }
}

impl Display for IntType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown integer type: {0:?}")]
pub struct UnknownIntType(pub String);

impl FromStr for IntType {
    type Err = UnknownIntType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownIntType(s.to_owned()))
    }
}

/// Decodes an integer of type `ty` at `offset`.
///
/// Signed types are decoded as two's complement. The result is widened to
/// `i64`, which holds every value of every supported type.
pub fn decode_int(
    bytes: &[u8],
    offset: usize,
    ty: IntType,
    endianness: Endianness,
) -> Result<i64, Error> {
    let range = check_range("decode", offset, ty.size(), bytes.len())?;
    let b = &bytes[range];

    let value = match (ty, endianness) {
        (IntType::I8, _) => b[0] as i8 as i64,
        (IntType::U8, _) => b[0] as i64,
        (IntType::I16, Endianness::Little) => i16::from_le_bytes([b[0], b[1]]) as i64,
        (IntType::I16, Endianness::Big) => i16::from_be_bytes([b[0], b[1]]) as i64,
        (IntType::U16, Endianness::Little) => u16::from_le_bytes([b[0], b[1]]) as i64,
        (IntType::U16, Endianness::Big) => u16::from_be_bytes([b[0], b[1]]) as i64,
        (IntType::I32, Endianness::Little) => i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64,
        (IntType::I32, Endianness::Big) => i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as i64,
        (IntType::U32, Endianness::Little) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64,
        (IntType::U32, Endianness::Big) => u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as i64,
    };

    Ok(value)
}

/// Encodes `value` as an integer of type `ty` at `offset`.
///
/// `value` is truncated to the width of `ty`, so `-1` written as [`IntType::U8`]
/// becomes `0xff`.
pub fn encode_int(
    bytes: &mut [u8],
    offset: usize,
    ty: IntType,
    endianness: Endianness,
    value: i64,
) -> Result<(), Error> {
    let range = check_range("encode", offset, ty.size(), bytes.len())?;
    let dest = &mut bytes[range];

    match (ty.size(), endianness) {
        (1, _) => dest[0] = value as u8,
        (2, Endianness::Little) => dest.copy_from_slice(&(value as u16).to_le_bytes()),
        (2, Endianness::Big) => dest.copy_from_slice(&(value as u16).to_be_bytes()),
        (_, Endianness::Little) => dest.copy_from_slice(&(value as u32).to_le_bytes()),
        (_, Endianness::Big) => dest.copy_from_slice(&(value as u32).to_be_bytes()),
    }

    Ok(())
}

mod sealed {
    pub trait Sealed {}
}

/// Rust integer types that map to an [`IntType`].
///
/// This trait is sealed. It is implemented for `i8`, `u8`, `i16`, `u16`,
/// `i32` and `u32`.
pub trait Integer: sealed::Sealed + Copy + Sized {
    const TYPE: IntType;

    /// Narrows a value produced by [`decode_int`]. Truncates if out of range.
    fn from_i64(value: i64) -> Self;

    fn to_i64(self) -> i64;
}

macro_rules! impl_integer {
    {
        $(
            $ty:ty => $int_type:ident;
        )*
    } => {
        $(
            impl sealed::Sealed for $ty {}

            impl Integer for $ty {
                const TYPE: IntType = IntType::$int_type;

                #[inline]
                fn from_i64(value: i64) -> Self {
                    value as $ty
                }

                #[inline]
                fn to_i64(self) -> i64 {
                    self as i64
                }
            }
        )*
    };
}

impl_integer! {
    i8 => I8;
    u8 => U8;
    i16 => I16;
    u16 => U16;
    i32 => I32;
    u32 => U32;
}
