use std::path::{
    Path,
    PathBuf,
};

use bufo::{
    hexdump,
    ByteCursor,
    Endianness,
    Hexdump,
    IntType,
    Ints,
};
use clap::{
    Args as ClapArgs,
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Error,
    WrapErr,
};

use crate::config::Config;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a hexdump.
    Dump {
        #[command(flatten)]
        input: Input,

        /// Number of bytes to dump. Defaults to all remaining bytes.
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Read one or more integers.
    Read {
        #[command(flatten)]
        input: Input,

        /// Integer type: u8, i8, u16, i16, u32 or i32.
        #[arg(short = 't', long = "type")]
        ty: IntType,

        #[arg(short, long)]
        count: Option<usize>,
    },

    /// Read a string.
    String {
        #[command(flatten)]
        input: Input,

        /// Decode as UTF-8 instead of one character per byte.
        #[arg(long)]
        utf8: bool,

        /// Byte length of the string. If omitted, a u32 length prefix is read.
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Copy bytes into a new file.
    Extract {
        #[command(flatten)]
        input: Input,

        output: PathBuf,

        /// Number of bytes to copy. Defaults to all remaining bytes.
        #[arg(short, long)]
        length: Option<usize>,
    },
}

#[derive(Debug, ClapArgs)]
pub struct Input {
    file: PathBuf,

    /// Offset to start at. Negative values count from the end of the file.
    #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
    offset: isize,
}

#[derive(Debug, ClapArgs)]
pub struct Options {
    /// Directory containing `bufo.toml`.
    #[arg(short = 'C', long, env = "BUFO_CONFIG")]
    config: Option<PathBuf>,

    /// Use big endian byte order.
    #[arg(long, conflicts_with = "little")]
    big: bool,

    /// Use little endian byte order.
    #[arg(long)]
    little: bool,
}

impl Options {
    fn endianness(&self) -> Option<Endianness> {
        match (self.big, self.little) {
            (true, _) => Some(Endianness::Big),
            (_, true) => Some(Endianness::Little),
            _ => None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Command,
}

pub struct App {
    config: Config,
    endianness: Endianness,
}

impl App {
    pub fn new(options: Options) -> Result<Self, Error> {
        let config = Config::open(options.config.as_ref())?;
        let endianness = options
            .endianness()
            .unwrap_or(config.config.endianness);
        tracing::debug!(config = %config.path.display(), %endianness);
        Ok(Self { config, endianness })
    }

    pub fn run(&self, command: Command) -> Result<(), Error> {
        match command {
            Command::Dump { input, length } => {
                let mut cursor = self.open(&input)?;
                let offset = cursor.offset();
                let bytes = cursor.read_bytes(length)?;
                let config = hexdump::Config {
                    offset,
                    trailing_newline: self.config.config.hexdump.trailing_newline,
                    at_least_one_line: true,
                    header: self.config.config.hexdump.header,
                };
                print!("{}", Hexdump::with_config(bytes, config));
            }
            Command::Read { input, ty, count } => {
                let mut cursor = self.open(&input)?;
                match cursor.read_int(ty, count, None)? {
                    Ints::One(value) => println!("{value}"),
                    Ints::Many(values) => {
                        for value in values {
                            println!("{value}");
                        }
                    }
                }
            }
            Command::String {
                input,
                utf8,
                length,
            } => {
                let mut cursor = self.open(&input)?;
                let s = if utf8 {
                    cursor.read_utf8_string(length)?
                }
                else {
                    cursor.read_raw_string(length)?
                };
                println!("{s}");
            }
            Command::Extract {
                input,
                output,
                length,
            } => {
                let mut cursor = self.open(&input)?;
                let written = cursor
                    .to_file(&output, length)
                    .wrap_err_with(|| format!("Failed to write {}", output.display()))?;
                tracing::info!("{written} bytes written to: {}", output.display());
            }
        }

        Ok(())
    }

    fn open(&self, input: &Input) -> Result<ByteCursor, Error> {
        open_file(&input.file, input.offset, self.endianness)
    }
}

/// Loads `path` into a cursor and seeks to `offset`.
pub fn open_file(path: &Path, offset: isize, endianness: Endianness) -> Result<ByteCursor, Error> {
    let bytes =
        std::fs::read(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let mut cursor = ByteCursor::with_endianness(bytes, endianness)?;
    if offset != 0 {
        cursor.seek(offset)?;
    }
    tracing::debug!(
        path = %path.display(),
        length = cursor.byte_length(),
        offset = cursor.offset(),
        "opened file"
    );
    Ok(cursor)
}
