//! "Did you mean" suggestions for mistyped names.

/// Score `input` as a case-insensitive subsequence of `candidate`.
///
/// Input characters not found in order are skipped; each skip costs 10, each
/// character of the candidate jumped over between two matches costs 1.
/// Returns `None` when more characters are skipped than `max_skips`.
fn subsequence_score(input: &[char], candidate: &[char], max_skips: usize) -> Option<usize> {
    let mut pos = 0;
    let mut last_match: Option<usize> = None;
    let mut gaps = 0;
    let mut skips = 0;

    for &ch in input {
        match candidate[pos..].iter().position(|&c| c == ch) {
            Some(offset) => {
                let index = pos + offset;
                if let Some(last) = last_match {
                    gaps += index - last - 1;
                }
                last_match = Some(index);
                pos = index + 1;
            }
            None => {
                skips += 1;
                if skips > max_skips {
                    return None;
                }
            }
        }
    }
    Some(gaps + 10 * skips)
}

fn lower_chars(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// All candidates tied for the best score, in candidate order.
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let input = lower_chars(input);
    if input.is_empty() {
        return Vec::new();
    }
    let len = input.len();
    let max_skips = (len.saturating_sub(2)).max(len / 2).min(4);

    let scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|name| {
            subsequence_score(&input, &lower_chars(name), max_skips).map(|score| (score, name))
        })
        .collect();

    let Some(best) = scored.iter().map(|(score, _)| *score).min() else {
        return Vec::new();
    };
    scored
        .into_iter()
        .filter(|(score, _)| *score == best)
        .map(|(_, name)| name.to_string())
        .collect()
}
