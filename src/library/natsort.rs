use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

/// Split a name into alternating text and digit-run chunks
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            None => in_digits = Some(digit),
            Some(prev) if prev != digit => {
                out.push(chunk(&s[start..i], prev));
                start = i;
                in_digits = Some(digit);
            }
            Some(_) => {}
        }
    }

    if let Some(prev) = in_digits {
        out.push(chunk(&s[start..], prev));
    }
    out
}

fn chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits { Chunk::Number(s) } else { Chunk::Text(s) }
}

/// Compare digit runs by numeric value without parsing: strip leading
/// zeros, shorter run is smaller, same length falls back to lexicographic.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural ordering: embedded numeric runs compare as integers, so
/// "E2" sorts before "E10". Total and deterministic for any pair.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);

    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Number(x), Chunk::Number(y)) => cmp_digits(x, y),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    // Equal prefix: fewer chunks first, then plain string order so ties
    // like "Ep002" vs "Ep2" still order deterministically
    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

pub fn natural_sort(names: &mut [String]) {
    names.sort_by(|a, b| natural_cmp(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        natural_sort(&mut names);
        names
    }

    #[test]
    fn test_numeric_runs_compare_as_integers() {
        assert_eq!(
            sorted(&["Ep2.mkv", "Ep10.mkv", "Ep1.mkv"]),
            vec!["Ep1.mkv", "Ep2.mkv", "Ep10.mkv"]
        );
    }

    #[test]
    fn test_double_digits_after_single() {
        assert_eq!(
            sorted(&["Show - 11.mkv", "Show - 2.mkv", "Show - 100.mkv"]),
            vec!["Show - 2.mkv", "Show - 11.mkv", "Show - 100.mkv"]
        );
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(natural_cmp("E02", "E2"), Ordering::Less);
        assert_eq!(natural_cmp("E02", "E10"), Ordering::Less);
        assert_eq!(natural_cmp("E010", "E2"), Ordering::Greater);
    }

    #[test]
    fn test_text_ordering_preserved() {
        assert_eq!(
            sorted(&["b.mkv", "a.mkv", "c.mkv"]),
            vec!["a.mkv", "b.mkv", "c.mkv"]
        );
    }

    #[test]
    fn test_numbers_before_text() {
        assert_eq!(
            sorted(&["Special.mkv", "01.mkv", "02.mkv"]),
            vec!["01.mkv", "02.mkv", "Special.mkv"]
        );
    }

    #[test]
    fn test_long_digit_runs() {
        // Longer than u64 would hold; comparison must not overflow
        assert_eq!(
            natural_cmp("a99999999999999999999", "a100000000000000000000"),
            Ordering::Less
        );
    }
}
