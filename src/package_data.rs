use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

/// Expand package data glob patterns into file lists.
///
/// `patterns` maps a module directory (relative to `dir`) to glob patterns
/// relative to that module. `**` matches any number of directories and hidden
/// files are included. Only regular files are kept, as paths relative to the
/// module, sorted and deduplicated. A module without matches maps to an empty
/// list.
pub fn expand_package_data_filename_patterns(
    dir: &Path,
    patterns: &BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, Vec<String>>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut package_data = BTreeMap::new();
    for (module, module_patterns) in patterns {
        let module_dir = dir.join(module);
        let base = Pattern::escape(&module_dir.to_string_lossy());
        let mut files = BTreeSet::new();

        for pattern in module_patterns {
            let full = format!("{base}/{pattern}");
            let paths = glob::glob_with(&full, options).map_err(|e| Error::InvalidPattern {
                pattern: pattern.clone(),
                message: e.msg.to_string(),
            })?;
            for entry in paths {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    Error::io(path, std::io::Error::from(e))
                })?;
                if !path.is_file() {
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(&module_dir) {
                    files.insert(relative.to_string_lossy().into_owned());
                }
            }
        }

        tracing::debug!(module = %module, files = files.len(), "expanded package data");
        package_data.insert(module.clone(), files.into_iter().collect());
    }
    Ok(package_data)
}
