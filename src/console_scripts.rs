use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::read_optional;

/// Section of `entry_points.txt` holding console scripts.
pub const CONSOLE_SCRIPTS: &str = "console_scripts";

const ENTRY_POINTS_FILE: &str = "entry_points.txt";

/// An `entry_points.txt` document: `[section]` headers followed by
/// `name = object.reference` lines.
///
/// A key ends at the first `=` or `:`. Keys are stored lowercased, so
/// `Entry` and `entry` name the same script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct EntryPoints {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl EntryPoints {
    fn parse(path: &Path, input: &str) -> Result<Self> {
        let mut entry_points = EntryPoints::default();
        let invalid = |line: &str| Error::InvalidEntryPoints {
            path: path.to_path_buf(),
            line: line.to_string(),
        };

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| invalid(line))?;
                entry_points.section_mut(name.trim());
                continue;
            }

            let (key, value) = split_entry(line).ok_or_else(|| invalid(line))?;
            let (_, entries) = entry_points
                .sections
                .last_mut()
                .ok_or_else(|| invalid(line))?;
            entries.push((key, value.trim().to_string()));
        }

        Ok(entry_points)
    }

    fn serialize(&self) -> String {
        let mut out = String::new();
        for (name, entries) in &self.sections {
            out.push_str(&format!("[{name}]\n"));
            for (key, value) in entries {
                out.push_str(&format!("{key} = {value}\n"));
            }
            out.push('\n');
        }
        out
    }

    fn section(&self, name: &str) -> Option<&[(String, String)]> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.as_slice())
    }

    fn section_mut(&mut self, name: &str) -> &mut Vec<(String, String)> {
        let index = match self.sections.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.sections.push((name.to_string(), Vec::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index].1
    }
}

/// Split `key = value` or `key: value` at the first delimiter.
fn split_entry(line: &str) -> Option<(String, &str)> {
    let at = line.find(['=', ':'])?;
    let key = line[..at].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_lowercase(), &line[at + 1..]))
}

fn egg_info_dir(dir: &Path, package_name: &str) -> PathBuf {
    dir.join(format!("{package_name}.egg-info"))
}

/// Read the console scripts registered in `<package>.egg-info/entry_points.txt`.
///
/// Returns `None` when the egg-info directory does not exist. The map goes
/// from script name to the object reference it invokes.
pub fn get_console_scripts(
    dir: &Path,
    package_name: &str,
) -> Result<Option<BTreeMap<String, String>>> {
    let egg_dir = egg_info_dir(dir, package_name);
    if !egg_dir.is_dir() {
        return Ok(None);
    }
    let path = egg_dir.join(ENTRY_POINTS_FILE);
    let entry_points = EntryPoints::parse(&path, &read_optional(&path)?)?;
    let scripts = entry_points
        .section(CONSOLE_SCRIPTS)
        .unwrap_or_default()
        .iter()
        .cloned()
        .collect();
    Ok(Some(scripts))
}

/// Register console scripts in `<package>.egg-info/entry_points.txt`.
///
/// Scripts already present in the file keep their current target; other
/// sections of the file are preserved. Script names are lowercased. Does
/// nothing when `scripts` is empty.
pub fn add_console_scripts(
    dir: &Path,
    package_name: &str,
    scripts: &BTreeMap<String, String>,
) -> Result<()> {
    if scripts.is_empty() {
        return Ok(());
    }

    let egg_dir = egg_info_dir(dir, package_name);
    let path = egg_dir.join(ENTRY_POINTS_FILE);
    let mut entry_points = EntryPoints::parse(&path, &read_optional(&path)?)?;

    let mut merged: BTreeMap<String, String> = scripts
        .iter()
        .map(|(name, target)| (name.to_lowercase(), target.clone()))
        .collect();
    if let Some(existing) = entry_points.section(CONSOLE_SCRIPTS) {
        merged.extend(existing.iter().cloned());
    }
    *entry_points.section_mut(CONSOLE_SCRIPTS) = merged.into_iter().collect();

    std::fs::create_dir_all(&egg_dir).map_err(|e| Error::io(&egg_dir, e))?;
    std::fs::write(&path, entry_points.serialize()).map_err(|e| Error::io(&path, e))?;
    tracing::debug!(path = %path.display(), added = scripts.len(), "updated console scripts");
    Ok(())
}
