//! System module - host, home directory and file helpers

use chrono::Local;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Block size for reading a file backwards.
const TAIL_BLOCK: u64 = 8192;

/// The current host name.
pub fn host() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }
    ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .filter_map(|p| fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// The user's home directory.
pub fn homedir() -> Option<PathBuf> {
    dirs::home_dir()
}

pub fn on_host(name: &str) -> bool {
    host() == name
}

/// A file name made unique by the system clock: `dir/base_YYYYMMDD-HHMMSS.ffffff.ext`.
///
/// Uses the home directory when `dir` is `None`.
pub fn temp_file_name(dir: Option<&Path>, base: &str, ext: &str) -> PathBuf {
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(homedir)
        .unwrap_or_else(|| PathBuf::from("."));
    let stamp = Local::now().format("%Y%m%d-%H%M%S%.6f");
    dir.join(format!("{base}_{stamp}.{ext}"))
}

/// The last `n` lines of a file, read from the end so large files stay cheap.
pub fn tail_lines(path: &Path, n: usize) -> io::Result<Vec<String>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut file = File::open(path)?;
    let size = file.seek(SeekFrom::End(0))?;

    let mut pos = size;
    let mut buf: Vec<u8> = Vec::new();
    loop {
        let newlines = buf.iter().filter(|&&b| b == b'\n').count();
        // One extra newline: the one terminating the last line
        if pos == 0 || newlines > n {
            break;
        }
        let step = TAIL_BLOCK.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))?;
        let mut block = vec![0u8; step as usize];
        file.read_exact(&mut block)?;
        block.extend_from_slice(&buf);
        buf = block;
    }

    let text = String::from_utf8_lossy(&buf);
    let lines: Vec<&str> = text.lines().collect();
    // The first line may be partial when we stopped mid-file
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|s| s.to_string()).collect())
}

/// Copy the last `n` lines of `in_file` to `out_file`.
pub fn tail_file(in_file: &Path, out_file: &Path, n: usize) -> io::Result<()> {
    let lines = tail_lines(in_file, n)?;
    let mut out = io::BufWriter::new(File::create(out_file)?);
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// Whether a file contains `needle`, reading the whole file at once (fine for small files).
pub fn string_in_file(path: &Path, needle: &str) -> io::Result<bool> {
    Ok(fs::read_to_string(path)?.contains(needle))
}

/// Whether a file contains `needle`, streaming it line by line (for large files).
///
/// Matches never span lines.
pub fn string_in_file_streaming(path: &Path, needle: &str) -> io::Result<bool> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        if line?.contains(needle) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Print `text` followed by a space and read a one-character answer from stdin.
///
/// The terminal stays in line mode: the answer is the first non-blank character of the line
/// entered, `None` for an empty line.
pub fn dialog(text: &str) -> io::Result<Option<char>> {
    let stdin = io::stdin();
    dialog_with(text, &mut stdin.lock(), &mut io::stdout())
}

/// [`dialog`] on arbitrary streams.
pub fn dialog_with<R: BufRead, W: Write>(
    text: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<char>> {
    write!(output, "{text} ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().chars().next())
}
