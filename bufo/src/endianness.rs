//! [Endianness](https://en.wikipedia.org/wiki/Endianness)

use std::{
    fmt::Display,
    str::FromStr,
};

use crate::Error;

/// Numeric code for little endian byte order.
pub const ENDIAN_LITTLE: u8 = 0x1;

/// Numeric code for big endian byte order.
pub const ENDIAN_BIG: u8 = 0x2;

/// Byte order used to encode and decode multi-byte integers.
///
/// A [`ByteCursor`](crate::ByteCursor) has a default endianness which can be
/// overridden per call. Single-byte values are not affected by it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Network byte order.
    ///
    /// This is always big endian.
    pub const NETWORK: Self = Self::Big;

    /// System native byte order.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        }
        else {
            Self::Little
        }
    }

    /// Returns the numeric code of this endianness ([`ENDIAN_LITTLE`] or
    /// [`ENDIAN_BIG`]).
    #[inline]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Little => ENDIAN_LITTLE,
            Self::Big => ENDIAN_BIG,
        }
    }
}

impl TryFrom<u8> for Endianness {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            ENDIAN_LITTLE => Ok(Self::Little),
            ENDIAN_BIG => Ok(Self::Big),
            _ => Err(Error::Configuration(format!("{value:#x}"))),
        }
    }
}

impl FromStr for Endianness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Self::Little),
            "big" | "be" | "network" => Ok(Self::Big),
            "native" => Ok(Self::native()),
            _ => Err(Error::Configuration(format!("{s:?}"))),
        }
    }
}

impl Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Little => write!(f, "little"),
            Self::Big => write!(f, "big"),
        }
    }
}
