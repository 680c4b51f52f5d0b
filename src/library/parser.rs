use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static BRACKET_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// Marker alternation is ordered most-specific first so "episode" wins over "ep"
static EPISODE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(episode|ep|e|s\d{1,2}e\d{1,2}|part)\s*\d+").unwrap());

// A bare trailing number is what "Show - 01" reduces to once separators are spaces
static TRAILING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\d{1,4}$").unwrap());

/// Reduce a filename to a comparable title fragment.
///
/// Strips the extension, `[bracketed tags]`, separator characters and
/// episode markers, in that order. Empty input yields empty output.
pub fn clean_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = BRACKET_TAGS.replace_all(&stem, "");
    let name = SEPARATORS.replace_all(&name, " ");
    let name = WHITESPACE.replace_all(&name, " ");
    let name = name.trim();

    let name = EPISODE_MARKERS.replace_all(name, "");
    let name = TRAILING_NUMBER.replace_all(&name, "");

    name.trim_matches([' ', '-', '_']).to_string()
}

/// Guess a series name from its episode filenames.
///
/// Cleans every filename and reduces the first one's word sequence to the
/// longest common word prefix across all of them (case-insensitive compare,
/// casing of the first file kept). Returns an empty string when the list is
/// empty or the files share no prefix; callers treat that as "name not
/// detected" and skip the folder.
pub fn infer_series_name<S: AsRef<str>>(episode_files: &[S]) -> String {
    let Some(first) = episode_files.first() else {
        return String::new();
    };

    let mut prefix: Vec<String> = clean_filename(first.as_ref())
        .split_whitespace()
        .map(str::to_string)
        .collect();

    for file in &episode_files[1..] {
        let cleaned = clean_filename(file.as_ref());
        let words: Vec<&str> = cleaned.split_whitespace().collect();

        let mut i = 0;
        while i < prefix.len()
            && i < words.len()
            && prefix[i].to_lowercase() == words[i].to_lowercase()
        {
            i += 1;
        }
        prefix.truncate(i);

        if prefix.is_empty() {
            break;
        }
    }

    prefix.join(" ").trim_matches([' ', '-', '_']).to_string()
}
