//! `kexp filter`: run a dump filter over a saved `dexdump`/`oatdump` file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use kexp_config::KexpConfig;
use kexp_disasm::{DumpKind, FilterOptions, filter_dex_lines, filter_oat_lines};

use crate::error::{CliError, CliResult};

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Dump format
    #[arg(value_enum)]
    pub kind: DumpKindArg,

    /// Dump file, or `-` for stdin
    #[arg(value_name = "DUMP")]
    pub input: PathBuf,

    /// Do not hide Kotlin/Java runtime classes
    #[arg(long)]
    pub all_classes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpKindArg {
    /// `dexdump -d` output
    Dex,
    /// `oatdump` output
    Oat,
}

impl From<DumpKindArg> for DumpKind {
    fn from(arg: DumpKindArg) -> Self {
        match arg {
            DumpKindArg::Dex => DumpKind::Dex,
            DumpKindArg::Oat => DumpKind::Oat,
        }
    }
}

pub fn execute(args: FilterArgs, config: &KexpConfig) -> CliResult<()> {
    let mut options = config.filter_options();
    if args.all_classes {
        options.suppression = kexp_disasm::SuppressionPredicate::none();
    }

    let filtered = if args.input == Path::new("-") {
        filter_reader(io::stdin().lock(), args.kind.into(), &options)?
    } else {
        let file = File::open(&args.input).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => CliError::InputNotFound {
                path: args.input.clone(),
            },
            _ => CliError::Io(error),
        })?;
        filter_reader(BufReader::new(file), args.kind.into(), &options)?
    };

    io::stdout().lock().write_all(filtered.as_bytes())?;
    Ok(())
}

/// Feed the dump to the filter line by line without reading it whole.
fn filter_reader(
    reader: impl BufRead,
    kind: DumpKind,
    options: &FilterOptions,
) -> CliResult<String> {
    let mut lines = LossyLines::new(reader);
    let filtered = match kind {
        DumpKind::Dex => filter_dex_lines(&mut lines, options),
        DumpKind::Oat => filter_oat_lines(&mut lines, options),
    };
    match lines.error.take() {
        Some(error) => Err(CliError::Io(error)),
        None => Ok(filtered),
    }
}

/// Lines of a reader, invalid UTF-8 replaced with U+FFFD.
///
/// A read error ends the iteration and is kept in `error`.
struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    error: Option<io::Error>,
}

impl<R: BufRead> LossyLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            error: None,
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                Some(String::from_utf8_lossy(line).into_owned())
            }
            Err(error) => {
                self.error = Some(error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OAT: &str = "OatDexFile:
0: LMainKt; (offset=0x00000590) (type_idx=2) (Initialized) (OatClassAllCompiled)
  0: void MainKt.main() (dex_method_idx=1)
    CODE: (code_offset=0x00001020 size=4)...
      0x00001020: d65f03c0\tret
";

    #[test]
    fn reader_matches_in_memory_filter() {
        let options = FilterOptions::default();
        assert_eq!(
            filter_reader(OAT.as_bytes(), DumpKind::Oat, &options).unwrap(),
            DumpKind::Oat.filter(OAT, &options)
        );
        assert_eq!(
            filter_reader(OAT.as_bytes(), DumpKind::Oat, &options).unwrap(),
            "class MainKt\n    void MainKt.main()\n        0x00001020: ret\n"
        );
    }

    #[test]
    fn invalid_utf8_line_does_not_truncate_the_report() {
        let mut dump = b"OatDexFile:\n0: LMainKt; (offset=0x00000590) (type_idx=2)\n".to_vec();
        dump.extend_from_slice(b"  garbage \xed\xa0\x80 line\r\n");
        dump.extend_from_slice(b"  0: void MainKt.main() (dex_method_idx=1)\n");
        dump.extend_from_slice(b"    CODE: (code_offset=0x00001020 size=4)...\n");
        dump.extend_from_slice(b"      0x00001020: d65f03c0\tret\n");

        let filtered = filter_reader(dump.as_slice(), DumpKind::Oat, &FilterOptions::default());
        assert_eq!(
            filtered.unwrap(),
            "class MainKt\n    void MainKt.main()\n        0x00001020: ret\n"
        );
    }

    #[test]
    fn lossy_lines_replace_only_the_bad_bytes() {
        let lines: Vec<String> = LossyLines::new(&b"a\r\nb\xffc\nd"[..]).collect();
        assert_eq!(lines, vec!["a", "b\u{FFFD}c", "d"]);
    }

    /// Reader that fails after its first line.
    struct BrokenReader {
        served: bool,
    }

    impl io::Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("device unplugged"));
            }
            self.served = true;
            let line = b"OatDexFile:\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn read_error_is_reported() {
        let reader = BufReader::new(BrokenReader { served: false });
        let err = filter_reader(reader, DumpKind::Oat, &FilterOptions::default()).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn missing_dump_is_input_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let args = FilterArgs {
            kind: DumpKindArg::Dex,
            input: tmp.path().join("dump.txt"),
            all_classes: false,
        };
        let err = execute(args, &KexpConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::InputNotFound { .. }));
    }
}
