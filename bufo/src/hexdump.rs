use std::fmt::{
    Debug,
    Display,
    Write as _,
};

const BYTES_PER_LINE: usize = 16;

#[inline]
pub fn hexdump<B>(buf: B) -> Hexdump<B> {
    Hexdump::new(buf)
}

/// Formats bytes as lines of offset, hex bytes and printable ASCII.
pub struct Hexdump<B> {
    buf: B,
    config: Config,
}

impl<B> Hexdump<B> {
    #[inline]
    pub fn new(buf: B) -> Self {
        Self::with_config(buf, Default::default())
    }

    #[inline]
    pub fn with_config(buf: B, config: Config) -> Self {
        Self { buf, config }
    }
}

impl<B: AsRef<[u8]>> Display for Hexdump<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.buf.as_ref();
        let mut lines = Lines::new(bytes, &self.config);

        if self.config.header {
            writeln!(f, "Hexdump: {} bytes", bytes.len())?;
        }

        if let Some(line) = lines.next() {
            write!(f, "{line}")?;
        }

        for line in lines {
            write!(f, "\n{line}")?;
        }

        if self.config.trailing_newline {
            writeln!(f)?;
        }

        Ok(())
    }
}

impl<B: AsRef<[u8]>> Debug for Hexdump<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex = Hexdump {
            buf: self.buf.as_ref(),
            config: Config {
                offset: self.config.offset,
                trailing_newline: false,
                at_least_one_line: false,
                header: false,
            },
        };
        Display::fmt(&hex, f)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Offset printed for the first byte.
    pub offset: usize,
    pub trailing_newline: bool,
    /// Print an (empty) line for an empty buffer.
    pub at_least_one_line: bool,
    pub header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            offset: 0,
            trailing_newline: true,
            at_least_one_line: true,
            header: true,
        }
    }
}

pub struct Lines<'b> {
    chunks: std::slice::Chunks<'b, u8>,
    pad_offset_to: usize,
    offset: usize,
    emit_empty_line: bool,
}

impl<'b> Lines<'b> {
    pub fn new(bytes: &'b [u8], config: &Config) -> Self {
        let pad_offset_to = std::cmp::max(num_hex_digits(config.offset + bytes.len()), 4);
        Self {
            chunks: bytes.chunks(BYTES_PER_LINE),
            pad_offset_to,
            offset: config.offset,
            emit_empty_line: config.at_least_one_line && bytes.is_empty(),
        }
    }
}

impl<'b> Iterator for Lines<'b> {
    type Item = Line<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = match self.chunks.next() {
            Some(chunk) => chunk,
            None if self.emit_empty_line => &[],
            None => return None,
        };
        self.emit_empty_line = false;

        let offset = self.offset;
        self.offset += bytes.len();

        Some(Line {
            bytes,
            offset,
            pad_offset_to: self.pad_offset_to,
        })
    }
}

pub struct Line<'b> {
    pub bytes: &'b [u8],
    pub offset: usize,
    pub pad_offset_to: usize,
}

impl<'b> Display for Line<'b> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // print offset
        for _ in 0..(self.pad_offset_to - num_hex_digits(self.offset)) {
            write!(f, "0")?;
        }
        write!(f, "{:x} ", self.offset)?;

        if !self.bytes.is_empty() {
            // print bytes
            for b in self.bytes {
                write!(f, " {b:02x}")?;
            }

            // pad bytes
            for _ in self.bytes.len()..BYTES_PER_LINE {
                write!(f, "   ")?;
            }
            write!(f, "  ")?;

            // print chars
            for b in self.bytes {
                if b.is_ascii() && !b.is_ascii_control() {
                    f.write_char((*b).into())?;
                }
                else {
                    write!(f, ".")?;
                }
            }
        }

        Ok(())
    }
}

fn num_hex_digits(mut num: usize) -> usize {
    if num == 0 {
        1
    }
    else {
        let mut d = 0usize;
        while num != 0 {
            d += 1;
            num >>= 4;
        }
        d
    }
}
