//! Password and passphrase generation plus a heuristic strength meter.
//!
//! Randomness is injected as any [`RngCore`]; the UI passes `OsRng`
//! (backed by `crypto.getRandomValues` on wasm) and tests pass a seeded
//! `StdRng`.

mod wordlist;

use std::collections::{HashSet, VecDeque};

use rand::RngCore;

pub use wordlist::WORDS;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>/?";
pub const CONFUSING: &str = "il1Lo0O";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;
pub const HISTORY_LIMIT: usize = 10;
const VARIETY_MIN_DISTINCT: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
    pub exclude_confusing: bool,
}

impl PasswordOptions {
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn pool(&self) -> Vec<char> {
        let classes = [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ];
        classes
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, set)| set.chars())
            .filter(|ch| !(self.exclude_confusing && CONFUSING.contains(*ch)))
            .collect()
    }
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
            exclude_confusing: false,
        }
    }
}

/// Each position is `next_u32() % pool.len()`. The slight modulo bias
/// towards the start of the pool is accepted.
pub fn generate_password<R: RngCore + ?Sized>(options: &PasswordOptions, rng: &mut R) -> String {
    let pool = options.pool();
    if pool.is_empty() {
        return String::new();
    }
    (0..options.length)
        .map(|_| pool[rng.next_u32() as usize % pool.len()])
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassphraseOptions {
    pub words: usize,
    pub separator: String,
    pub capitalize: bool,
    pub append_number: bool,
}

impl Default for PassphraseOptions {
    fn default() -> Self {
        Self {
            words: 4,
            separator: "-".to_string(),
            capitalize: true,
            append_number: false,
        }
    }
}

pub fn generate_passphrase<R: RngCore + ?Sized>(
    options: &PassphraseOptions,
    rng: &mut R,
) -> String {
    let mut parts: Vec<String> = (0..options.words)
        .map(|_| {
            let word = WORDS[rng.next_u32() as usize % WORDS.len()];
            if options.capitalize {
                let mut chars = word.chars();
                chars
                    .next()
                    .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
                    .unwrap_or_default()
            } else {
                word.to_string()
            }
        })
        .collect();
    if options.append_number {
        parts.push((rng.next_u32() % 100).to_string());
    }
    parts.join(&options.separator)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    VeryWeak,
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }

    /// Tailwind background class for the meter bar.
    pub fn color_class(self) -> &'static str {
        match self {
            Self::VeryWeak => "bg-red-500",
            Self::Weak => "bg-orange-500",
            Self::Fair => "bg-yellow-500",
            Self::Strong => "bg-lime-500",
            Self::VeryStrong => "bg-emerald-600",
        }
    }
}

pub fn strength(password: &str) -> Strength {
    let length = password.chars().count();
    if length == 0 {
        return Strength::VeryWeak;
    }

    let mut points = [8, 12, 16].iter().filter(|min| length >= **min).count();
    let classes: [fn(&char) -> bool; 4] = [
        char::is_ascii_lowercase,
        char::is_ascii_uppercase,
        char::is_ascii_digit,
        |ch| !ch.is_alphanumeric(),
    ];
    points += classes
        .iter()
        .filter(|class| password.chars().any(|ch| class(&ch)))
        .count();

    // Non-decreasing as characters are appended.
    let distinct = password.chars().collect::<HashSet<_>>().len();
    if distinct >= VARIETY_MIN_DISTINCT {
        points += 1;
    }

    let bucket = match points {
        0..=2 => Strength::VeryWeak,
        3..=4 => Strength::Weak,
        5 => Strength::Fair,
        6 => Strength::Strong,
        _ => Strength::VeryStrong,
    };
    if length < MIN_LENGTH {
        bucket.min(Strength::Weak)
    } else {
        bucket
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub value: String,
    pub strength: Strength,
}

/// Most recent first, capped at [`HISTORY_LIMIT`]. Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PasswordHistory {
    entries: VecDeque<HistoryEntry>,
}

impl PasswordHistory {
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        let strength = strength(&value);
        self.entries.push_front(HistoryEntry { value, strength });
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn password_has_requested_length() {
        let mut rng = rng();
        for length in MIN_LENGTH..=MAX_LENGTH {
            let password = generate_password(&PasswordOptions::with_length(length), &mut rng);
            assert_eq!(password.chars().count(), length);
        }
    }

    #[test]
    fn no_classes_yields_empty_password() {
        let options = PasswordOptions {
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        assert_eq!(generate_password(&options, &mut rng()), "");
    }

    #[test]
    fn confusing_characters_are_excluded() {
        let options = PasswordOptions {
            length: 128,
            symbols: false,
            exclude_confusing: true,
            ..PasswordOptions::default()
        };
        let password = generate_password(&options, &mut rng());
        assert!(!password.chars().any(|ch| CONFUSING.contains(ch)));
        assert!(password.chars().all(char::is_alphanumeric));
    }

    #[test]
    fn passphrase_shape() {
        let options = PassphraseOptions {
            words: 5,
            separator: ".".into(),
            capitalize: true,
            append_number: true,
        };
        let phrase = generate_passphrase(&options, &mut rng());
        let parts: Vec<&str> = phrase.split('.').collect();
        assert_eq!(parts.len(), 6);
        for word in &parts[..5] {
            assert!(word.chars().next().unwrap().is_ascii_uppercase());
            assert!(WORDS.contains(&word.to_lowercase().as_str()));
        }
        assert!(parts[5].parse::<u32>().unwrap() <= 99);
    }

    #[test]
    fn strength_buckets() {
        assert_eq!(strength(""), Strength::VeryWeak);
        assert_eq!(strength("aB3$"), Strength::Weak);
        assert_eq!(strength("password"), Strength::VeryWeak);
        assert_eq!(strength("passw0rd!"), Strength::Fair);
        assert_eq!(strength("aaaaaaaa"), Strength::VeryWeak);
        assert_eq!(strength("Tr0ub4dor&3x"), Strength::VeryStrong);
        assert_eq!(Strength::Fair.label(), "Fair");
    }

    #[test]
    fn strength_never_drops_as_length_grows() {
        let mixed: Vec<char> = "aB3$cD4%eF5^gH6&iJ7*kL8(mN9)oP0-qR1_sT2=uV+wX[yZ]{}!@#;:,.<>/?"
            .chars()
            .collect();
        let mut previous = Strength::VeryWeak;
        for length in 4..=mixed.len() {
            let candidate: String = mixed[..length].iter().collect();
            let current = strength(&candidate);
            assert!(current >= previous, "length {length}");
            previous = current;
        }

        let mut previous = Strength::VeryWeak;
        let pattern: Vec<char> = "Aa1!".repeat(20).chars().collect();
        for length in 1..=pattern.len() {
            let candidate: String = pattern[..length].iter().collect();
            let current = strength(&candidate);
            assert!(current >= previous, "repeated mix length {length}");
            previous = current;
        }

        let mut previous = Strength::VeryWeak;
        for length in 1..=80 {
            let current = strength(&"a".repeat(length));
            assert!(current >= previous, "repeated length {length}");
            previous = current;
        }
    }

    #[test]
    fn history_keeps_latest_ten() {
        let mut history = PasswordHistory::default();
        for index in 0..12 {
            history.push(format!("value-{index}"));
        }
        history.push("");
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries().next().unwrap().value, "value-11");
    }
}
