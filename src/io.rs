//! Input/Output structs and functions for treating files as sets of lines
use anyhow::{Context, Result};
use bstr::io::BufReadExt;
use encoding_rs_io::DecodeReaderBytesBuilder;
use memchr::memchr;
use std::borrow::Cow;
use std::{
    fs,
    fs::File,
    io,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::algebra::Set;

/// A set of lines. Lines of the first operand are borrowed from its contents;
/// lines of the second operand are owned.
pub type LineSet<'data> = Set<Cow<'data, [u8]>>;

/// Reads the whole of the file at `path`, translating UTF-16 to UTF-8 if the
/// file begins with a UTF-16 Byte Order Mark.
pub fn read_operand(path: &Path) -> Result<Vec<u8>> {
    let contents =
        fs::read(path).with_context(|| format!("Can't read file: {}", path.display()))?;
    log::debug!("read {} bytes from {}", contents.len(), path.display());
    Ok(decode_if_utf16(contents))
}

/// Decode UTF-16 to UTF-8 if we see a UTF-16 Byte Order Mark at the beginning of `candidate`.
/// Otherwise return `candidate` unchanged
pub(crate) fn decode_if_utf16(candidate: Vec<u8>) -> Vec<u8> {
    // `decode_without_bom_handling` turns malformed sequences into the Unicode
    // REPLACEMENT CHARACTER, and translates the UTF-16 BOM to a UTF-8 BOM.
    if let Some((enc, _)) = encoding_rs::Encoding::for_bom(&candidate) {
        if [encoding_rs::UTF_16LE, encoding_rs::UTF_16BE].contains(&enc) {
            let (translated, _had_malformed_sequences) =
                enc.decode_without_bom_handling(&candidate);
            return translated.into_owned().into_bytes();
        }
    }
    candidate
}

/// How the output should look: we print a Byte Order Mark if the first operand
/// had one, and end each line with the line terminator used on the first line
/// of the first operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputInfo {
    /// Byte Order Mark or empty
    pub bom: &'static [u8],
    /// `\n` or `\r\n`
    pub line_terminator: &'static [u8],
}

impl OutputInfo {
    /// Writes each of `lines`, followed by our line terminator, preceded by our
    /// Byte Order Mark.
    pub fn write_lines<'a>(
        &self,
        lines: impl IntoIterator<Item = &'a [u8]>,
        mut out: impl io::Write,
    ) -> Result<()> {
        out.write_all(self.bom)?;
        for line in lines {
            out.write_all(line)?;
            out.write_all(self.line_terminator)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Returns the `OutputInfo` for `slice`: `bom` is the (UTF-8) Byte Order Mark,
/// or the empty string if `slice` has none, and `line_terminator` is `\r\n` if
/// the first line of `slice` ends with `\r\n`, and `\n` if the first line ends
/// just with `\n` (or is the only line in the file and has no line terminator).
#[must_use]
pub fn output_info(slice: &[u8]) -> OutputInfo {
    let mut bom: &'static [u8] = b"";
    let mut line_terminator: &'static [u8] = b"\n";
    if has_bom(slice) {
        bom = BOM_BYTES;
    }
    if let Some(n) = memchr(b'\n', slice) {
        if n > 0 && slice[n - 1] == b'\r' {
            line_terminator = b"\r\n";
        }
    }
    OutputInfo { bom, line_terminator }
}

/// Returns the lines of `slice`, minus any leading Byte Order Mark, with `\n`
/// or `\r\n` line terminators removed. A final line without a terminator still
/// counts, and keeps any trailing `\r`: a `\r` is only part of a terminator
/// when a `\n` follows it. This matches `bstr`'s `for_byte_line`, so both
/// operands are split the same way.
pub fn lines_of(slice: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = strip_bom(slice);
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match memchr(b'\n', rest) {
            Some(end) => {
                let (mut line, after) = rest.split_at(end);
                rest = &after[1..];
                if let Some(&b'\r') = line.last() {
                    line = &line[..line.len() - 1];
                }
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

/// Returns the set of lines of `slice`, each borrowed from `slice`.
#[must_use]
pub fn line_set_of(slice: &[u8]) -> LineSet<'_> {
    lines_of(slice).map(Cow::Borrowed).collect()
}

/// Reads the file at `path` as a set of owned lines. Unlike `read_operand`,
/// this doesn't keep the whole file in memory, just its distinct lines.
pub fn line_set_from_path(path: &Path) -> Result<LineSet<'static>> {
    let f = File::open(path).with_context(|| format!("Can't open file: {}", path.display()))?;
    // Look at the BOM to detect UTF-16 files and convert them to UTF-8, and
    // remove the BOM before sending data to us. UTF-8 isn't enforced.
    let mut reader = BufReader::with_capacity(
        32 * 1024,
        DecodeReaderBytesBuilder::new()
            .bom_sniffing(true)
            .strip_bom(true)
            .utf8_passthru(true)
            .build(f),
    );
    let mut set = LineSet::new();
    reader
        .for_byte_line(|line| {
            if !set.contains(line) {
                set.insert(Cow::Owned(line.to_vec()));
            }
            Ok(true)
        })
        .with_context(|| format!("Error reading file: {}", path.display()))?;
    log::debug!("{} distinct lines in {}", set.len(), path.display());
    Ok(set)
}

/// Returns the file paths to use as the first and second operand. Either may
/// be absent; more than two is a usage error the argument parser rejects.
#[must_use]
pub fn first_and_second(files: &[PathBuf]) -> (Option<&Path>, Option<&Path>) {
    (files.first().map(PathBuf::as_path), files.get(1).map(PathBuf::as_path))
}

const BOM_0: u8 = b'\xEF';
const BOM_1: u8 = b'\xBB';
const BOM_2: u8 = b'\xBF';
const BOM_BYTES: &[u8] = b"\xEF\xBB\xBF";
/// Does `slice` begin with a (UTF-8) Byte Order Mark?
fn has_bom(slice: &[u8]) -> bool {
    slice.len() >= 3 && slice[0] == BOM_0 && slice[1] == BOM_1 && slice[2] == BOM_2
}

pub(crate) fn strip_bom(slice: &[u8]) -> &[u8] {
    if has_bom(slice) {
        &slice[BOM_BYTES.len()..]
    } else {
        slice
    }
}
