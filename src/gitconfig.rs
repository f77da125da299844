//! Global-config reader (component G): the minimal subset of git's
//! config grammar needed to retrieve `core.excludesFile` and
//! `core.ignoreCase`. This is not a general-purpose config parser; every
//! other key is accepted and silently ignored.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::pathutil::expand_tilde;
use crate::Error;

const MAX_INCLUDE_DEPTH: u32 = 10;

/// The two settings this crate's walker depends on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    pub excludes_file: Option<PathBuf>,
    pub ignore_case: bool,
}

/// Parse the config file at `path`, following `include.path` directives.
/// A missing file yields the default config rather than an error — the
/// caller (component F / the walker) treats config files as an optional
/// artefact.
pub fn load(path: &Path) -> Result<GlobalConfig, Error> {
    let mut cfg = GlobalConfig::default();
    parse_file(path, 0, &mut cfg)?;
    Ok(cfg)
}

fn parse_file(path: &Path, depth: u32, cfg: &mut GlobalConfig) -> Result<(), Error> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(Error::Config(ConfigError::TooManyIncludes { limit: MAX_INCLUDE_DEPTH }));
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Ok(()), // missing/unreadable optional config: treated as absent
    };
    let entries = parse_entries(&text).map_err(Error::Config)?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    apply_entries(&entries, &base_dir, depth, cfg)
}

fn apply_entries(
    entries: &[Entry],
    base_dir: &Path,
    depth: u32,
    cfg: &mut GlobalConfig,
) -> Result<(), Error> {
    for e in entries {
        if e.section.eq_ignore_ascii_case("core") {
            if e.key.eq_ignore_ascii_case("excludesfile") {
                cfg.excludes_file = Some(PathBuf::from(expand_tilde(&e.value)));
            } else if e.key.eq_ignore_ascii_case("ignorecase") {
                cfg.ignore_case = parse_bool(&e.value)?;
            }
        } else if e.section.eq_ignore_ascii_case("include") && e.key.eq_ignore_ascii_case("path") {
            let included = resolve_include_path(base_dir, &e.value);
            parse_file(&included, depth + 1, cfg)?;
        }
    }
    Ok(())
}

fn resolve_include_path(base_dir: &Path, value: &str) -> PathBuf {
    let expanded = expand_tilde(value);
    let p = PathBuf::from(expanded);
    if p.is_absolute() {
        p
    } else {
        base_dir.join(p)
    }
}

fn parse_bool(value: &str) -> Result<bool, Error> {
    if value.is_empty() {
        return Ok(true);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::Config(ConfigError::InvalidBoolean(value.to_string()))),
    }
}

/// One `key = value` pair under a `[section "subsection"]` header.
/// `section` is case-folded for lookup; `value` preserves the original
/// case of quoted/unquoted string content.
struct Entry {
    section: String,
    key: String,
    value: String,
}

fn parse_entries(text: &str) -> Result<Vec<Entry>, ConfigError> {
    let mut entries = Vec::new();
    let mut section = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            ';' | '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '[' => {
                let (new_section, next) = parse_section_header(&chars, i)?;
                section = new_section;
                i = next;
            }
            c if is_key_start(c) => {
                let (key, next) = parse_key(&chars, i)?;
                let (value, next) = parse_value(&chars, next)?;
                entries.push(Entry { section: section.clone(), key, value });
                i = next;
            }
            _ => return Err(ConfigError::BadEntryName),
        }
    }
    Ok(entries)
}

fn is_key_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Parses `[section]` or `[section "sub"]`, returning the lowercased
/// section name (subsection case is not tracked — it's irrelevant to the
/// two keys this reader resolves) and the index just past `]`.
fn parse_section_header(chars: &[char], start: usize) -> Result<(String, usize), ConfigError> {
    let mut i = start + 1; // skip '['
    let mut name = String::new();
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '-') {
        name.push(chars[i]);
        i += 1;
    }
    if name.is_empty() {
        return Err(ConfigError::BadSectionName);
    }
    while i < chars.len() && chars[i] == ' ' {
        i += 1;
    }
    if i < chars.len() && chars[i] == '"' {
        i += 1;
        while i < chars.len() && chars[i] != '"' {
            if chars[i] == '\\' && i + 1 < chars.len() {
                i += 2;
            } else {
                i += 1;
            }
        }
        if i >= chars.len() {
            return Err(ConfigError::BadGroupHeader);
        }
        i += 1; // skip closing quote
    }
    while i < chars.len() && chars[i] != ']' && chars[i] != '\n' {
        i += 1;
    }
    if i >= chars.len() || chars[i] != ']' {
        return Err(ConfigError::BadGroupHeader);
    }
    Ok((name.to_ascii_lowercase(), i + 1))
}

fn parse_key(chars: &[char], start: usize) -> Result<(String, usize), ConfigError> {
    let mut i = start;
    let mut key = String::new();
    while i < chars.len() && is_key_char(chars[i]) {
        key.push(chars[i]);
        i += 1;
    }
    if key.is_empty() {
        return Err(ConfigError::BadEntryName);
    }
    Ok((key, i))
}

/// Parses the remainder of a config line after a key: either a bare
/// boolean shorthand (no `=`), or `= value` with quoting, escapes, and
/// backslash-newline continuation.
fn parse_value(chars: &[char], start: usize) -> Result<(String, usize), ConfigError> {
    let mut i = start;
    while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t') {
        i += 1;
    }
    if i >= chars.len() || chars[i] == '\n' || chars[i] == ';' || chars[i] == '#' {
        return Ok((String::new(), i));
    }
    if chars[i] != '=' {
        return Err(ConfigError::BadEntryDelimiter);
    }
    i += 1;
    while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t') {
        i += 1;
    }

    let mut value = String::new();
    let mut in_quotes = false;
    loop {
        if i >= chars.len() {
            if in_quotes {
                return Err(ConfigError::EofInEscape);
            }
            break;
        }
        let c = chars[i];
        if c == '\\' {
            let next = chars.get(i + 1).copied();
            match next {
                None => return Err(ConfigError::EofInEscape),
                Some('\n') => i += 2, // line continuation, no char emitted
                Some('n') => {
                    value.push('\n');
                    i += 2;
                }
                Some('t') => {
                    value.push('\t');
                    i += 2;
                }
                Some('b') => {
                    value.push('\u{8}');
                    i += 2;
                }
                Some('\\') => {
                    value.push('\\');
                    i += 2;
                }
                Some('"') => {
                    value.push('"');
                    i += 2;
                }
                Some(_) => return Err(ConfigError::BadEscape),
            }
            continue;
        }
        if c == '"' {
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if c == '\n' {
            if in_quotes {
                return Err(ConfigError::NewlineInQuotes);
            }
            break;
        }
        if !in_quotes && (c == ';' || c == '#') {
            break;
        }
        value.push(c);
        i += 1;
    }
    if !in_quotes {
        let trimmed = value.trim_end();
        value.truncate(trimmed.len());
    }
    Ok((value, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(text: &str) -> Vec<Entry> {
        parse_entries(text).unwrap()
    }

    #[test]
    fn simple_excludes_file() {
        let es = entries("[core]\nexcludesFile = /foo/bar\n");
        assert_eq!(es[0].section, "core");
        assert_eq!(es[0].key, "excludesfile");
        assert_eq!(es[0].value, "/foo/bar");
    }

    #[test]
    fn quoted_value_with_escapes() {
        let es = entries("[core]\nexcludesFile = \"a\\tb\\nc\"\n");
        assert_eq!(es[0].value, "a\tb\nc");
    }

    #[test]
    fn section_with_subsection_is_parsed() {
        let es = entries("[include \"gitdir:~/work/\"]\npath = ~/work/.gitconfig\n");
        assert_eq!(es[0].section, "include");
        assert_eq!(es[0].key, "path");
    }

    #[test]
    fn comments_are_stripped() {
        let es = entries("; leading comment\n[core]\n# another\nignoreCase = true\n");
        assert_eq!(es.len(), 1);
        assert_eq!(es[0].value, "true");
    }

    #[test]
    fn bare_key_is_true() {
        let es = entries("[core]\nignoreCase\n");
        assert_eq!(es[0].value, "");
        assert!(parse_bool(&es[0].value).unwrap());
    }

    #[test]
    fn boolean_conversions() {
        for (s, want) in [
            ("true", true),
            ("YES", true),
            ("on", true),
            ("1", true),
            ("false", false),
            ("no", false),
            ("off", false),
            ("0", false),
            ("", true),
        ] {
            assert_eq!(parse_bool(s).unwrap(), want, "{s}");
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn empty_config_yields_defaults() {
        let cfg = parse_entries("").unwrap();
        assert!(cfg.is_empty());
    }

    #[test]
    fn include_recursion_limit_is_enforced() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("a.gitconfig");
        // A config that includes itself forces unbounded recursion.
        fs::write(&path, format!("[include]\npath = {}\n", path.display())).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::TooManyIncludes { .. })));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let cfg = load(Path::new("/nonexistent/path/.gitconfig")).unwrap();
        assert_eq!(cfg, GlobalConfig::default());
    }
}
