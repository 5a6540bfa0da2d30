//! Shannon entropy over a string's character-frequency distribution, used
//! as a heuristic for token-like high-randomness secrets.

use std::collections::HashMap;

/// Bits per character. Empty input has zero entropy.
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut len = 0u32;
    for ch in text.chars() {
        *counts.entry(ch).or_insert(0) += 1;
        len += 1;
    }

    let len = f64::from(len);
    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / len;
            -p * p.log2()
        })
        .sum()
}
