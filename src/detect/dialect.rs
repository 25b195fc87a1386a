//! Delimiter/quote sniffing over a bounded text sample.

pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
pub const QUOTE_CANDIDATES: [u8; 2] = [b'"', b'\''];

/// Lines considered per candidate pairing; keeps sniffing O(sample).
const MAX_SNIFF_LINES: usize = 32;

/// Pick the delimiter/quote pairing whose field counts are most consistent
/// across the sampled lines. Returns `None` when no candidate delimiter
/// appears at all (single-column or non-delimited input).
#[must_use]
pub fn sniff_dialect(sample: &str) -> Option<(u8, u8)> {
    let lines: Vec<&str> =
        sample.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()).take(MAX_SNIFF_LINES).collect();
    if lines.is_empty() {
        return None;
    }
    let mut best: Option<(u8, u8)> = None;
    let mut best_score = (0usize, 0usize); // (lines agreeing with modal count, modal count)
    for &delimiter in &DELIMITER_CANDIDATES {
        for &quote in &QUOTE_CANDIDATES {
            let counts: Vec<usize> =
                lines.iter().map(|l| count_outside_quotes(l, delimiter, quote)).collect();
            let Some((modal, support)) = modal_count(&counts) else { continue };
            if modal == 0 {
                continue;
            }
            // Strict improvement keeps candidate-order precedence on ties.
            if (support, modal) > best_score {
                best_score = (support, modal);
                best = Some((delimiter, quote));
            }
        }
    }
    best
}

/// Occurrences of `delimiter` outside regions enclosed by `quote`.
fn count_outside_quotes(line: &str, delimiter: u8, quote: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for &b in line.as_bytes() {
        if b == quote {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Most frequent value and its frequency; ties resolve to the value seen first.
fn modal_count(counts: &[usize]) -> Option<(usize, usize)> {
    let mut freq: Vec<(usize, usize)> = Vec::new();
    for &c in counts {
        match freq.iter_mut().find(|(v, _)| *v == c) {
            Some((_, n)) => *n += 1,
            None => freq.push((c, 1)),
        }
    }
    let mut best: Option<(usize, usize)> = None;
    for &(v, n) in &freq {
        if best.is_none_or(|(_, bn)| n > bn) {
            best = Some((v, n));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_comma() {
        assert_eq!(sniff_dialect("a,b,c\n1,2,3\n"), Some((b',', b'"')));
    }

    #[test]
    fn sniffs_semicolon() {
        assert_eq!(sniff_dialect("id;name;date\n1;a;2020-01-01\n"), Some((b';', b'"')));
    }

    #[test]
    fn sniffs_tab() {
        assert_eq!(sniff_dialect("a\tb\tc\n1\t2\t3\n"), Some((b'\t', b'"')));
    }

    #[test]
    fn sniffs_pipe() {
        assert_eq!(sniff_dialect("a|b\n1|2\n3|4\n"), Some((b'|', b'"')));
    }

    #[test]
    fn quoted_delimiters_do_not_count() {
        // Commas inside double quotes must not break the comma pairing.
        let sample = "a,b,c\n\"x,y\",2,3\n1,\"p,q\",3\n";
        assert_eq!(sniff_dialect(sample), Some((b',', b'"')));
    }

    #[test]
    fn single_quote_convention_wins_when_more_consistent() {
        let sample = "a,b\n'x,y',2\n'p,q',4\n";
        assert_eq!(sniff_dialect(sample), Some((b',', b'\'')));
    }

    #[test]
    fn no_delimiters_means_no_dialect() {
        assert_eq!(sniff_dialect("just a line\nanother line\n"), None);
        assert_eq!(sniff_dialect(""), None);
    }
}
