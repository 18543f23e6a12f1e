use std::fs;
use std::io;
use std::path::Path;

use crate::second_pass::SecondPassResult;

/// Read an input unit's source lines (§6: `.as`, ASCII, up to 255 chars a
/// line). Disk access itself is out of scope per §1; this is the thin
/// collaborator the pipeline calls into.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_string).collect())
}

pub fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)
}

/// Write the `.ob` object file: `IC DC` on the first line, then one
/// `AAAA OOOOO` line per emitted word, decimal address and octal word
/// (§4.3, §6).
pub fn write_object(path: &Path, result: &SecondPassResult) -> io::Result<()> {
    let mut content = format!("{} {}\n", result.instruction_count, result.data_count);
    for word in &result.words {
        content.push_str(&format!("{:04} {:05o}\n", word.address, word.value));
    }
    fs::write(path, content)
}

/// Write the `.ent` file: one `symbol address` pair per entry symbol.
/// Callers are expected to skip this entirely when there are no entries
/// (§6: "omit the file entirely if no entries exist").
pub fn write_entries(path: &Path, entries: &[(String, usize)]) -> io::Result<()> {
    let content: String = entries.iter().map(|(name, address)| format!("{name} {address}\n")).collect();
    fs::write(path, content)
}

/// Write the `.ext` file: one `symbol address` pair per extern use site.
/// Callers skip this when there are no externs referenced (§6).
pub fn write_externs(path: &Path, externs: &[(String, usize)]) -> io::Result<()> {
    let content: String = externs.iter().map(|(name, address)| format!("{name} {address}\n")).collect();
    fs::write(path, content)
}
