//! Resolve `--input` paths/globs and `--input_list` files into a concrete,
//! ordered list of files.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static GLOB_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*?\[]").unwrap());

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("failed to read input list {}: {source}", .path.display())]
    InputList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid glob pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },
    #[error("no input files found")]
    NoFiles,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocateOptions {
    /// Fail with [`LocateError::NoFiles`] when nothing was found.
    pub fail_if_empty: bool,
}

/// Returns true if `input` contains glob metacharacters.
pub fn is_glob(input: &str) -> bool {
    GLOB_CHARS.is_match(input)
}

/// Resolve inputs and list files into an ordered list of existing files.
///
/// `inputs` are paths or glob patterns, expanded in argument order (matches of
/// a single pattern are sorted). `input_lists` are text files naming one path
/// per line; blank lines are ignored. Missing plain paths are logged and
/// skipped, directories are skipped, and duplicates keep their first position.
pub fn locate_files(
    inputs: &[String],
    input_lists: &[PathBuf],
    options: LocateOptions,
) -> Result<Vec<PathBuf>, LocateError> {
    let mut candidates = Vec::new();

    for input in inputs {
        if is_glob(input) {
            let matches = expand_glob(input)?;
            if matches.is_empty() {
                tracing::warn!(pattern = %input, "glob matched no files");
            }
            candidates.extend(matches);
        } else {
            candidates.push(PathBuf::from(input));
        }
    }

    for list in input_lists {
        candidates.extend(read_input_list(list)?);
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for path in candidates {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "input file does not exist, skipping");
            continue;
        }
        if path.is_dir() {
            tracing::debug!(path = %path.display(), "skipping directory");
            continue;
        }
        if seen.insert(dedup_key(&path)) {
            files.push(path);
        }
    }

    if files.is_empty() && options.fail_if_empty {
        return Err(LocateError::NoFiles);
    }

    Ok(files)
}

/// `./a.docx` and `a.docx` name the same file.
fn dedup_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Read a list file: one path per line, surrounding whitespace and blank
/// lines ignored.
pub fn read_input_list(path: &Path) -> Result<Vec<PathBuf>, LocateError> {
    let content = std::fs::read_to_string(path).map_err(|source| LocateError::InputList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

enum Segment {
    Literal(String),
    Pattern { regex: Regex, dotted: bool },
    Recursive,
}

/// Expand a glob pattern against the filesystem.
///
/// Supports `*`, `?` and `[...]`/`[!...]` within one path component and `**`
/// as a whole component matching zero or more directories. Entries whose
/// name starts with `.` only match components that also start with `.`.
/// A leading `./` is kept on the results. Results are sorted.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, LocateError> {
    let absolute = pattern.starts_with('/');
    let dotted_base = pattern.starts_with("./");
    let segments = pattern
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| parse_segment(pattern, s))
        .collect::<Result<Vec<_>, _>>()?;

    let base = if absolute {
        PathBuf::from("/")
    } else if dotted_base {
        PathBuf::from(".")
    } else {
        PathBuf::new()
    };

    let mut out = Vec::new();
    walk(&base, &segments, &mut out);
    out.sort();
    out.dedup();
    Ok(out)
}

fn parse_segment(pattern: &str, segment: &str) -> Result<Segment, LocateError> {
    if segment == "**" {
        return Ok(Segment::Recursive);
    }
    if !is_glob(segment) {
        return Ok(Segment::Literal(segment.to_string()));
    }
    let regex = Regex::new(&translate(segment)).map_err(|e| LocateError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Segment::Pattern {
        regex,
        dotted: segment.starts_with('.'),
    })
}

/// Translate one glob component into an anchored regex.
fn translate(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut re = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    let mut start = i + 1;
                    re.push('[');
                    if matches!(chars[start], '!' | '^') {
                        re.push('^');
                        start += 1;
                    }
                    for &c in &chars[start..end] {
                        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
                            re.push('\\');
                        }
                        re.push(c);
                    }
                    re.push(']');
                    i = end;
                }
                None => re.push_str(r"\["),
            },
            c => re.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    re.push('$');
    re
}

/// Index of the `]` closing the class opened at `open`. A `]` right after
/// the opening bracket (or its negation) is a literal member.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if j < chars.len() && matches!(chars[j], '!' | '^') {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn read_dir_names(dir: &Path) -> Vec<String> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

fn walk(base: &Path, segments: &[Segment], out: &mut Vec<PathBuf>) {
    let Some((segment, rest)) = segments.split_first() else {
        if !base.as_os_str().is_empty() && base.exists() {
            out.push(base.to_path_buf());
        }
        return;
    };

    match segment {
        Segment::Literal(name) => {
            let next = base.join(name);
            if rest.is_empty() || next.is_dir() {
                walk(&next, rest, out);
            }
        }
        Segment::Pattern { regex, dotted } => {
            for name in read_dir_names(base) {
                if name.starts_with('.') && !dotted {
                    continue;
                }
                if !regex.is_match(&name) {
                    continue;
                }
                let next = base.join(&name);
                if rest.is_empty() || next.is_dir() {
                    walk(&next, rest, out);
                }
            }
        }
        Segment::Recursive => {
            // Zero directories
            walk(base, rest, out);
            for name in read_dir_names(base) {
                if name.starts_with('.') {
                    continue;
                }
                let next = base.join(&name);
                if next.is_dir() {
                    walk(&next, segments, out);
                } else if rest.is_empty() {
                    out.push(next);
                }
            }
        }
    }
}
