//! Stateless encoders and decoders the cursor is built on.

mod int;
pub mod string;

pub use self::int::{
    decode_int,
    encode_int,
    IntType,
    Integer,
    UnknownIntType,
};
