//! Raw (one byte per character) and UTF-8 string codecs.
//!
//! Decoded strings are produced as UTF-16 code units first, which is the
//! representation the UTF-8 decoder works in. [`units_to_string`] turns them
//! into a [`String`].

/// Decodes bytes as one character per byte (ISO-8859-1).
pub fn decode_raw(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

/// Encodes each UTF-16 code unit of `s` as a single byte.
///
/// Units above `0xff` don't fit into a byte and are truncated to their lowest
/// 8 bits. This is not validated. Characters outside the BMP take two bytes,
/// one per surrogate.
pub fn encode_raw(s: &str) -> Vec<u8> {
    s.encode_utf16().map(|unit| unit as u8).collect()
}

/// Decodes UTF-8 bytes into UTF-16 code units.
///
/// The lead byte selects the sequence length:
///
/// - `c1 < 128`: one byte.
/// - `191 < c1 < 224`: two bytes.
/// - `239 < c1 < 365`: four bytes, emitted as a surrogate pair. For a byte
///   this is every lead byte from `0xf0` up to `0xff`, including the ones
///   that are never valid UTF-8.
/// - anything else: three bytes. This includes stray continuation bytes.
///
/// Continuation bytes are not validated. Missing continuation bytes at the end
/// of the input read as `0`.
pub fn decode_utf8_units(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let mut next = || {
            let b = bytes.get(pos).copied().map_or(0, i32::from);
            pos += 1;
            b
        };

        let c1 = next();

        if c1 < 128 {
            out.push(c1 as u16);
        }
        else if c1 > 191 && c1 < 224 {
            let c2 = next();
            out.push(((c1 & 31) << 6 | c2 & 63) as u16);
        }
        else if c1 > 239 && c1 < 365 {
            let c2 = next();
            let c3 = next();
            let c4 = next();
            let u = ((c1 & 7) << 18 | (c2 & 63) << 12 | (c3 & 63) << 6 | c4 & 63) - 0x10000;
            // `u` is negative for overlong sequences. The arithmetic shift and
            // the truncation to 16 bits are part of the format.
            out.push((0xd800 + (u >> 10)) as u16);
            out.push((0xdc00 + (u & 1023)) as u16);
        }
        else {
            let c2 = next();
            let c3 = next();
            out.push(((c1 & 15) << 12 | (c2 & 63) << 6 | c3 & 63) as u16);
        }
    }

    out
}

/// Encodes UTF-16 code units as UTF-8.
///
/// A high surrogate followed by a low surrogate is combined into one 4-byte
/// sequence. Unpaired surrogates are encoded like any other 3-byte code unit.
pub fn encode_utf8_units(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;

    while i < units.len() {
        let mut c = u32::from(units[i]);

        if c < 0x80 {
            out.push(c as u8);
        }
        else if c < 0x800 {
            out.push((c >> 6) as u8 | 0xc0);
            out.push((c & 63) as u8 | 0x80);
        }
        else if is_high_surrogate(c)
            && units
                .get(i + 1)
                .is_some_and(|next| is_low_surrogate(u32::from(*next)))
        {
            i += 1;
            c = 0x10000 + ((c & 0x3ff) << 10) + (u32::from(units[i]) & 0x3ff);
            out.push((c >> 18) as u8 | 0xf0);
            out.push(((c >> 12) & 63) as u8 | 0x80);
            out.push(((c >> 6) & 63) as u8 | 0x80);
            out.push((c & 63) as u8 | 0x80);
        }
        else {
            out.push((c >> 12) as u8 | 0xe0);
            out.push(((c >> 6) & 63) as u8 | 0x80);
            out.push((c & 63) as u8 | 0x80);
        }

        i += 1;
    }

    out
}

/// Decodes UTF-8 bytes into a [`String`].
///
/// Unpaired surrogates produced by [`decode_utf8_units`] are replaced with
/// `U+FFFD`.
#[inline]
pub fn decode_utf8(bytes: &[u8]) -> String {
    units_to_string(&decode_utf8_units(bytes))
}

/// Encodes `s` as UTF-8.
#[inline]
pub fn encode_utf8(s: &str) -> Vec<u8> {
    let units = s.encode_utf16().collect::<Vec<_>>();
    encode_utf8_units(&units)
}

#[inline]
pub fn units_to_string(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

#[inline]
fn is_high_surrogate(c: u32) -> bool {
    c & 0xfc00 == 0xd800
}

#[inline]
fn is_low_surrogate(c: u32) -> bool {
    c & 0xfc00 == 0xdc00
}
