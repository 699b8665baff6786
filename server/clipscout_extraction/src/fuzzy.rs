//! Fuzzy string similarity on a 0-100 scale.
//!
//! [`weighted_ratio`] combines a plain edit ratio with token-order-insensitive
//! and substring-alignment variants, taking the best scaled score:
//!
//! - lengths within 1.5×: max(ratio, 0.95 × token-sort, 0.95 × token-set)
//! - otherwise: max(ratio, s × partial, 0.95·s × partial token-sort/set),
//!   with s = 0.9, or 0.6 once one string is over 8× longer
//!
//! Inputs are normalised first (lowercased, non-alphanumerics turned into
//! spaces, trimmed). A string that normalises to nothing scores 0.

use std::collections::{BTreeSet, HashMap};

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
const FAR_PARTIAL_SCALE: f64 = 0.6;

/// Similarity of `a` and `b` in `0..=100`.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let p1 = normalize(a);
    let p2 = normalize(b);
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let (l1, l2) = (p1.chars().count(), p2.chars().count());
    let len_ratio = l1.max(l2) as f64 / l1.min(l2) as f64;
    let base = f64::from(ratio(&p1, &p2));

    let best = if len_ratio < 1.5 {
        let sort = f64::from(token_sort_ratio(&p1, &p2, false)) * UNBASE_SCALE;
        let set = f64::from(token_set_ratio(&p1, &p2, false)) * UNBASE_SCALE;
        base.max(sort).max(set)
    } else {
        let scale = if len_ratio > 8.0 {
            FAR_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        let partial = f64::from(partial_ratio(&p1, &p2)) * scale;
        let sort = f64::from(token_sort_ratio(&p1, &p2, true)) * UNBASE_SCALE * scale;
        let set = f64::from(token_set_ratio(&p1, &p2, true)) * UNBASE_SCALE * scale;
        base.max(partial).max(sort).max(set)
    };
    to_score(best)
}

/// Rounds half to even, so `66.5` scores 66.
fn to_score(x: f64) -> u8 {
    x.round_ties_even() as u8
}

/// Lowercases, maps every non-alphanumeric char to a space, and trims.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.trim().to_string()
}

/// Indel similarity `2·LCS / (|a| + |b|)` as a 0-100 score.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    percent(char_ratio(&a, &b))
}

/// Best [`ratio`] of the shorter string against equally long slices of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a == b {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let mut best = 0.0_f64;
    for (i, j, _) in matching_blocks(shorter, longer) {
        let start = j.saturating_sub(i);
        let end = (start + shorter.len()).min(longer.len());
        let r = char_ratio(shorter, &longer[start..end]);
        if r > 0.995 {
            return 100;
        }
        best = best.max(r);
    }
    percent(best)
}

fn token_sort_ratio(a: &str, b: &str, partial: bool) -> u8 {
    let x = sorted_tokens(a);
    let y = sorted_tokens(b);
    if partial {
        partial_ratio(&x, &y)
    } else {
        ratio(&x, &y)
    }
}

fn token_set_ratio(a: &str, b: &str, partial: bool) -> u8 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = ta.intersection(&tb).copied().collect::<Vec<_>>().join(" ");
    let only_a = ta.difference(&tb).copied().collect::<Vec<_>>().join(" ");
    let only_b = tb.difference(&ta).copied().collect::<Vec<_>>().join(" ");

    let combined_a = format!("{} {}", sect, only_a).trim().to_string();
    let combined_b = format!("{} {}", sect, only_b).trim().to_string();

    let score = |x: &str, y: &str| {
        if partial {
            partial_ratio(x, y)
        } else {
            ratio(x, y)
        }
    };
    score(&sect, &combined_a)
        .max(score(&sect, &combined_b))
        .max(score(&combined_a, &combined_b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn percent(fraction: f64) -> u8 {
    to_score(fraction * 100.0)
}

fn char_ratio(a: &[char], b: &[char]) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    2.0 * lcs_len(a, b) as f64 / (a.len() + b.len()) as f64
}

/// Longest-common-subsequence length, bit-parallel over `a`.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let words = a.len().div_ceil(64);
    let mut masks: HashMap<char, Vec<u64>> = HashMap::new();
    for (i, &c) in a.iter().enumerate() {
        masks.entry(c).or_insert_with(|| vec![0; words])[i / 64] |= 1 << (i % 64);
    }

    let mut v = vec![u64::MAX; words];
    for c in b {
        let Some(mask) = masks.get(c) else {
            continue;
        };
        let mut carry = 0u64;
        for w in 0..words {
            let u = v[w] & mask[w];
            let (sum, c1) = v[w].overflowing_add(u);
            let (sum, c2) = sum.overflowing_add(carry);
            carry = u64::from(c1 || c2);
            v[w] = sum | (v[w] & !mask[w]);
        }
    }

    (0..a.len()).filter(|&i| (v[i / 64] >> (i % 64)) & 1 == 0).count()
}

/// Maximal matching blocks `(i, j, len)` of `a` in `b`, sorted, plus a
/// terminating `(a.len(), b.len(), 0)`.
fn matching_blocks(a: &[char], b: &[char]) -> Vec<(usize, usize, usize)> {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        positions.entry(c).or_default().push(j);
    }

    let mut blocks = Vec::new();
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &positions, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        blocks.push((i, j, k));
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    blocks.sort_unstable();
    blocks.push((a.len(), b.len(), 0));
    blocks
}

fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = positions.get(&a[i]) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let prev = if j > 0 {
                    run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                } else {
                    0
                };
                let k = prev + 1;
                next.insert(j, k);
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        run_ending_at = next;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_rounds_half_to_even() {
        assert_eq!(to_score(66.5), 66);
        assert_eq!(to_score(67.5), 68);
        assert_eq!(to_score(66.4), 66);
        assert_eq!(to_score(66.6), 67);
        assert_eq!(to_score(70.0 * UNBASE_SCALE), 66);
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello, World! "), "hello  world");
        assert_eq!(normalize("Ünïcode—Test"), "ünïcode test");
        assert_eq!(normalize("?!..."), "");
    }

    #[test]
    fn test_lcs_len() {
        assert_eq!(lcs_len(&chars("abcbdab"), &chars("bdcaba")), 4);
        assert_eq!(lcs_len(&chars("abc"), &chars("xyz")), 0);
        assert_eq!(lcs_len(&chars("abc"), &chars("")), 0);
    }

    #[test]
    fn test_lcs_len_multiword() {
        let long = "the quick brown fox jumps over the lazy dog ".repeat(4);
        assert_eq!(lcs_len(&chars(&long), &chars(&long)), long.chars().count());
        let a = "a".repeat(70);
        let b = "a".repeat(65);
        assert_eq!(lcs_len(&chars(&a), &chars(&b)), 65);
        assert_eq!(lcs_len(&chars(&b), &chars(&a)), 65);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abc", "abc"), 100);
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("abc", ""), 0);
        // LCS 3 of 4 + 4 chars
        assert_eq!(ratio("abcd", "abce"), 75);
    }

    #[test]
    fn test_partial_ratio_substring() {
        assert_eq!(partial_ratio("ocean waves", "relaxing ocean waves at sunset"), 100);
        assert_eq!(partial_ratio("relaxing ocean waves at sunset", "ocean waves"), 100);
        assert!(partial_ratio("xyz", "relaxing ocean waves") < 50);
    }

    #[test]
    fn test_matching_blocks_terminator() {
        let blocks = matching_blocks(&chars("abxcd"), &chars("abcd"));
        assert_eq!(blocks.first(), Some(&(0, 0, 2)));
        assert_eq!(blocks.last(), Some(&(5, 4, 0)));
        let matched: usize = blocks.iter().map(|b| b.2).sum();
        assert_eq!(matched, 4);
    }

    #[test]
    fn test_weighted_ratio_identical_after_normalization() {
        assert_eq!(weighted_ratio("Hello World!", "hello world"), 100);
        // punctuation becomes a space, so internal spacing differs
        assert_eq!(weighted_ratio("Hello, World!", "hello world"), 96);
        assert_eq!(
            weighted_ratio(
                "Calm ocean\n\nFour hours of waves",
                "Calm ocean\n\nFour hours of waves!"
            ),
            100
        );
    }

    #[test]
    fn test_weighted_ratio_token_order() {
        assert_eq!(weighted_ratio("new york mets", "mets new york"), 95);
    }

    #[test]
    fn test_weighted_ratio_partial() {
        assert_eq!(
            weighted_ratio("ocean waves", "relaxing ocean waves at sunset for sleep"),
            90
        );
    }

    #[test]
    fn test_weighted_ratio_far_partial() {
        let long = format!("ocean {}", "filler words that pad the text ".repeat(3));
        assert_eq!(weighted_ratio("ocean", &long), 60);
    }

    #[test]
    fn test_weighted_ratio_unrelated() {
        assert!(weighted_ratio("mountain hiking in the alps", "cooking pasta at home") < 60);
        assert!(weighted_ratio("coral reef snorkeling", "rocket launch countdown") < 60);
    }

    #[test]
    fn test_weighted_ratio_empty() {
        assert_eq!(weighted_ratio("", "anything"), 0);
        assert_eq!(weighted_ratio("!!!", "anything"), 0);
        assert_eq!(weighted_ratio("", ""), 0);
    }

    #[test]
    fn test_weighted_ratio_in_range() {
        let samples = [
            "a",
            "ab",
            "abc abc abc",
            "The Quick Brown Fox",
            "quick fox",
            "completely different words entirely",
        ];
        for a in samples {
            for b in samples {
                assert!(weighted_ratio(a, b) <= 100);
            }
        }
    }
}
