//! Record identifiers.
//!
//! Most records get a random id. Records that must be unique for a pair of
//! other records (one friendship per two users) use an id derived from that
//! pair instead, so the store rejects a second one on its own.

use nanoid::nanoid;

const RECORD_ID_LENGTH: usize = 20;

/// Letters only; `I`, `O`, `i`, `k`, `l` and `o` are left out.
const RECORD_ID_ALPHABET: [char; 46] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Joins the halves of a pair id. Never produced by [`generate_record_id`].
const PAIR_SEPARATOR: char = '_';

pub fn generate_record_id() -> String {
    nanoid!(RECORD_ID_LENGTH, &RECORD_ID_ALPHABET)
}

/// Id for the unordered pair `a`, `b`.
pub fn pair_id(a: &str, b: &str) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{low}{PAIR_SEPARATOR}{high}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_use_the_alphabet() {
        let id = generate_record_id();
        assert_eq!(id.len(), RECORD_ID_LENGTH);
        assert!(id.chars().all(|c| RECORD_ID_ALPHABET.contains(&c)));
        assert!(!id.contains(PAIR_SEPARATOR));
        assert_ne!(id, generate_record_id());
    }

    #[test]
    fn pair_ids_ignore_order() {
        let (a, b) = (generate_record_id(), generate_record_id());
        assert_eq!(pair_id(&a, &b), pair_id(&b, &a));
        assert_ne!(pair_id(&a, &b), pair_id(&a, &a));
    }
}
