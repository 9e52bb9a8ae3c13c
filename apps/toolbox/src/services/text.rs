//! Text transformations and statistics.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("input is not valid Base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded bytes are not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed percent escape at byte {0}")]
    Percent(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transform {
    Upper,
    Lower,
    Title,
    Sentence,
    Camel,
    Snake,
    Kebab,
    Alternating,
    Reverse,
    TrimLines,
    CollapseWhitespace,
    RemoveDuplicateLines,
    RemoveEmptyLines,
    SortAscending,
    SortDescending,
    Base64Encode,
    Base64Decode,
    UrlEncode,
    UrlDecode,
}

impl Transform {
    pub const ALL: [Transform; 19] = [
        Self::Upper,
        Self::Lower,
        Self::Title,
        Self::Sentence,
        Self::Camel,
        Self::Snake,
        Self::Kebab,
        Self::Alternating,
        Self::Reverse,
        Self::TrimLines,
        Self::CollapseWhitespace,
        Self::RemoveDuplicateLines,
        Self::RemoveEmptyLines,
        Self::SortAscending,
        Self::SortDescending,
        Self::Base64Encode,
        Self::Base64Decode,
        Self::UrlEncode,
        Self::UrlDecode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Upper => "UPPERCASE",
            Self::Lower => "lowercase",
            Self::Title => "Title Case",
            Self::Sentence => "Sentence case",
            Self::Camel => "camelCase",
            Self::Snake => "snake_case",
            Self::Kebab => "kebab-case",
            Self::Alternating => "aLtErNaTiNg",
            Self::Reverse => "Reverse",
            Self::TrimLines => "Trim lines",
            Self::CollapseWhitespace => "Collapse spaces",
            Self::RemoveDuplicateLines => "Remove duplicate lines",
            Self::RemoveEmptyLines => "Remove empty lines",
            Self::SortAscending => "Sort A→Z",
            Self::SortDescending => "Sort Z→A",
            Self::Base64Encode => "Base64 encode",
            Self::Base64Decode => "Base64 decode",
            Self::UrlEncode => "URL encode",
            Self::UrlDecode => "URL decode",
        }
    }

    pub fn apply(self, input: &str) -> Result<String, TextError> {
        let output = match self {
            Self::Upper => input.to_uppercase(),
            Self::Lower => input.to_lowercase(),
            Self::Title => map_words(input, capitalize),
            Self::Sentence => sentence_case(input),
            Self::Camel => camel_case(input),
            Self::Snake => join_words(input, "_"),
            Self::Kebab => join_words(input, "-"),
            Self::Alternating => alternating(input),
            Self::Reverse => input.chars().rev().collect(),
            Self::TrimLines => map_lines(input, |lines| lines.map(str::trim).collect()),
            Self::CollapseWhitespace => map_lines(input, |lines| {
                lines
                    .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
                    .collect()
            }),
            Self::RemoveDuplicateLines => {
                let mut seen = std::collections::HashSet::new();
                map_lines(input, |lines| lines.filter(|line| seen.insert(*line)).collect())
            }
            Self::RemoveEmptyLines => {
                map_lines(input, |lines| lines.filter(|line| !line.trim().is_empty()).collect())
            }
            Self::SortAscending => map_lines(input, |lines| {
                let mut sorted: Vec<&str> = lines.collect();
                sorted.sort_by_key(|line| line.to_lowercase());
                sorted
            }),
            Self::SortDescending => map_lines(input, |lines| {
                let mut sorted: Vec<&str> = lines.collect();
                sorted.sort_by_key(|line| std::cmp::Reverse(line.to_lowercase()));
                sorted
            }),
            Self::Base64Encode => STANDARD.encode(input.as_bytes()),
            Self::Base64Decode => {
                let compact: String = input.chars().filter(|ch| !ch.is_whitespace()).collect();
                String::from_utf8(STANDARD.decode(compact)?)?
            }
            Self::UrlEncode => percent_encode(input),
            Self::UrlDecode => percent_decode(input)?,
        };
        Ok(output)
    }
}

fn map_lines<'a, F, R>(input: &'a str, f: F) -> String
where
    F: FnOnce(std::str::Lines<'a>) -> Vec<R>,
    R: AsRef<str>,
{
    f(input.lines())
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn map_words(input: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(input.len());
    let mut word = String::new();
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !word.is_empty() {
                out.push_str(&f(&word));
                word.clear();
            }
            out.push(ch);
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        out.push_str(&f(&word));
    }
    out
}

fn sentence_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut start = true;
    for ch in input.chars() {
        if start && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
        if matches!(ch, '.' | '!' | '?') {
            start = true;
        }
    }
    out
}

/// Splits identifiers and prose alike: `helloWorld`, `hello_world` and
/// `Hello World` all yield `["hello", "world"]`.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in input.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn join_words(input: &str, separator: &str) -> String {
    split_words(input).join(separator)
}

fn camel_case(input: &str) -> String {
    split_words(input)
        .iter()
        .enumerate()
        .map(|(index, word)| {
            if index == 0 {
                word.clone()
            } else {
                capitalize(word)
            }
        })
        .collect()
}

fn alternating(input: &str) -> String {
    let mut upper = false;
    input
        .chars()
        .map(|ch| {
            if !ch.is_alphabetic() {
                return ch.to_string();
            }
            let mapped = if upper {
                ch.to_uppercase().to_string()
            } else {
                ch.to_lowercase().to_string()
            };
            upper = !upper;
            mapped
        })
        .collect()
}

/// RFC 3986 percent-encoding; unreserved characters pass through.
pub fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Every `%` must introduce two hex digits; `+` decodes to a space.
pub fn percent_decode(input: &str) -> Result<String, TextError> {
    let bytes = input.as_bytes();
    for (index, _) in input.match_indices('%') {
        let escape = bytes.get(index + 1..index + 3);
        if !escape.is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit)) {
            return Err(TextError::Percent(index));
        }
    }
    let spaced = input.replace('+', " ");
    Ok(urlencoding::decode(&spaced)?.into_owned())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextStats {
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub words: usize,
    pub lines: usize,
    pub sentences: usize,
    pub paragraphs: usize,
}

pub fn stats(input: &str) -> TextStats {
    if input.is_empty() {
        return TextStats::default();
    }
    TextStats {
        characters: input.chars().count(),
        characters_no_spaces: input.chars().filter(|ch| !ch.is_whitespace()).count(),
        words: input.split_whitespace().count(),
        lines: input.lines().count().max(1),
        sentences: input
            .split(['.', '!', '?'])
            .filter(|part| !part.trim().is_empty())
            .count(),
        paragraphs: input
            .split("\n\n")
            .filter(|part| !part.trim().is_empty())
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(transform: Transform, input: &str) -> String {
        transform.apply(input).unwrap()
    }

    #[test]
    fn case_conversions() {
        assert_eq!(apply(Transform::Title, "hello   wORLD"), "Hello   World");
        assert_eq!(apply(Transform::Sentence, "HELLO. how ARE you? fine"), "Hello. How are you? Fine");
        assert_eq!(apply(Transform::Camel, "Hello big_world"), "helloBigWorld");
        assert_eq!(apply(Transform::Snake, "helloBigWorld"), "hello_big_world");
        assert_eq!(apply(Transform::Kebab, "Hello Big World"), "hello-big-world");
        assert_eq!(apply(Transform::Alternating, "abc d"), "aBc D");
    }

    #[test]
    fn line_operations() {
        let input = "b\n  a  \n\nb\nC";
        assert_eq!(apply(Transform::TrimLines, input), "b\na\n\nb\nC");
        assert_eq!(apply(Transform::RemoveDuplicateLines, input), "b\n  a  \n\nC");
        assert_eq!(apply(Transform::RemoveEmptyLines, input), "b\n  a  \nb\nC");
        assert_eq!(apply(Transform::SortAscending, "b\na\nC"), "a\nb\nC");
        assert_eq!(apply(Transform::SortDescending, "b\na\nC"), "C\nb\na");
        assert_eq!(apply(Transform::CollapseWhitespace, "a   b\t c"), "a b c");
    }

    #[test]
    fn base64_round_trip_and_errors() {
        let encoded = apply(Transform::Base64Encode, "héllo");
        assert_eq!(apply(Transform::Base64Decode, &encoded), "héllo");
        assert!(Transform::Base64Decode.apply("***").is_err());
    }

    #[test]
    fn percent_encoding() {
        assert_eq!(percent_encode("a b&c/é"), "a%20b%26c%2F%C3%A9");
        assert_eq!(percent_decode("a%20b+c%C3%A9").unwrap(), "a b cé");
        assert!(matches!(percent_decode("bad%2"), Err(TextError::Percent(3))));
        assert!(matches!(percent_decode("a%+Fb"), Err(TextError::Percent(1))));
        assert!(matches!(percent_decode("%-1"), Err(TextError::Percent(0))));
        assert!(matches!(percent_decode("%FF"), Err(TextError::Utf8(_))));
    }

    #[test]
    fn statistics() {
        let stats = stats("One two. Three!\n\nFour five six?");
        assert_eq!(stats.words, 6);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.sentences, 3);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(super::stats(""), TextStats::default());
    }
}
