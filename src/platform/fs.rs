// LogLens - platform/fs.rs
//
// Filesystem helpers shared by the summary and tail paths.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Read the full content of a file as a list of lines.
///
/// Invalid UTF-8 is replaced rather than rejected. `\n` and `\r\n`
/// terminators are stripped; a final line without a terminator is kept.
pub fn read_lines_lossy(path: &Path) -> io::Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.lines().map(str::to_owned).collect())
}

/// Read at most `limit` bytes from `path` starting at byte position `offset`.
///
/// Returns fewer bytes than `limit` if the file ends first. Loops over short
/// reads so a single syscall returning early does not under-report.
pub fn read_bytes_at(path: &Path, offset: u64, limit: usize) -> io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
