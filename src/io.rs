use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use memmap2::Mmap;

/// Threshold in bytes above which we attempt to use mmap for reading.
/// Callers can override via API; this is a reasonable default.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

/// Raw lines, terminator stripped. Forward-only and consumed once.
pub type LineIter = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + Send + 'static>;

/// Decide whether to use mmap based on file size and threshold.
pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

/// Iterate lines from a file path using buffered reader (non-mmap).
pub fn iter_lines_bufread<P: AsRef<Path>>(path: P) -> io::Result<LineIter> {
    let file = File::open(&path)?;
    let reader = BufReader::new(file);
    let lines = reader.split(b'\n').map(|res| {
        res.map(|mut line| {
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            line
        })
    });
    Ok(Box::new(lines))
}

/// Iterate lines from a file path using mmap, scanning for '\n' boundaries.
/// Each returned line is copied out of the mapping.
pub fn iter_lines_mmap<P: AsRef<Path>>(path: P) -> io::Result<LineIter> {
    let file = File::open(&path)?;
    // SAFETY: the mapping is read-only; concurrent truncation of the dump by
    // another process is outside what the importer supports.
    let mmap = unsafe { Mmap::map(&file) }?;
    let iter = MmapLines { mmap, pos: 0 };
    Ok(Box::new(iter))
}

struct MmapLines {
    mmap: Mmap,
    pos: usize,
}

impl Iterator for MmapLines {
    type Item = io::Result<Vec<u8>>;
    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        if self.pos >= data.len() {
            return None;
        }
        let start = self.pos;
        if let Some(off) = memchr::memchr(b'\n', &data[self.pos..]) {
            let end = self.pos + off;
            self.pos = end + 1;
            Some(Ok(strip_cr(&data[start..end]).to_vec()))
        } else {
            // Last line without trailing newline
            self.pos = data.len();
            Some(Ok(strip_cr(&data[start..]).to_vec()))
        }
    }
}

fn strip_cr(bytes: &[u8]) -> &[u8] {
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// Choose mmap or bufread and return an iterator over lines.
pub fn iter_lines_auto<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> io::Result<LineIter> {
    let meta = std::fs::metadata(&path)?;
    // empty files cannot be mapped on every platform
    if meta.is_file() && meta.len() > 0 && should_use_mmap(meta.len(), threshold_bytes) {
        iter_lines_mmap(path)
    } else {
        iter_lines_bufread(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn collect(iter: LineIter) -> Vec<Vec<u8>> {
        iter.map(|l| l.unwrap()).collect()
    }

    #[test]
    fn bufread_and_mmap_agree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        std::fs::write(&path, b"a@b.c:1\r\n\xff\xfe\n\nlast").unwrap();
        let expected: Vec<Vec<u8>> = vec![
            b"a@b.c:1".to_vec(),
            b"\xff\xfe".to_vec(),
            Vec::new(),
            b"last".to_vec(),
        ];
        assert_eq!(collect(iter_lines_bufread(&path).unwrap()), expected);
        assert_eq!(collect(iter_lines_mmap(&path).unwrap()), expected);
        assert_eq!(collect(iter_lines_auto(&path, 1).unwrap()), expected);
    }

    #[test]
    fn trailing_newline_does_not_add_a_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        std::fs::write(&path, b"one\ntwo\n").unwrap();
        assert_eq!(collect(iter_lines_mmap(&path).unwrap()).len(), 2);
        assert_eq!(collect(iter_lines_bufread(&path).unwrap()).len(), 2);
    }

    #[test]
    fn empty_file_yields_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();
        assert!(collect(iter_lines_auto(&path, 0).unwrap()).is_empty());
    }

    #[test]
    fn mmap_threshold_decision() {
        assert!(should_use_mmap(10, 10));
        assert!(!should_use_mmap(9, 10));
    }
}
