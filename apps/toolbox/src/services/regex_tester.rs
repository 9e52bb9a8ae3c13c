use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegexError {
    #[error("{0}")]
    Compile(#[from] regex::Error),
    #[error("unknown flag `{0}`")]
    UnknownFlag(char),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub global: bool,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_all: bool,
    pub extended: bool,
}

impl RegexFlags {
    /// Parses a flag string such as `gim`.
    pub fn parse(flags: &str) -> Result<Self, RegexError> {
        let mut parsed = Self::default();
        for flag in flags.chars() {
            match flag {
                'g' => parsed.global = true,
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'x' => parsed.extended = true,
                other => return Err(RegexError::UnknownFlag(other)),
            }
        }
        Ok(parsed)
    }

    pub fn as_string(&self) -> String {
        [
            (self.global, 'g'),
            (self.case_insensitive, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
            (self.extended, 'x'),
        ]
        .into_iter()
        .filter_map(|(on, flag)| on.then_some(flag))
        .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureGroup {
    pub index: usize,
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchInfo {
    pub text: String,
    /// Character (not byte) offset into the subject.
    pub index: usize,
    pub groups: Vec<CaptureGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestOutcome {
    pub matches: Vec<MatchInfo>,
    pub replaced: Option<String>,
}

pub fn compile(pattern: &str, flags: RegexFlags) -> Result<Regex, RegexError> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_all)
        .ignore_whitespace(flags.extended)
        .build()?)
}

/// Without the `g` flag only the first match is reported and replaced.
pub fn run(
    pattern: &str,
    flags: RegexFlags,
    subject: &str,
    replacement: Option<&str>,
) -> Result<TestOutcome, RegexError> {
    let regex = compile(pattern, flags)?;
    let names: Vec<Option<&str>> = regex.capture_names().collect();
    let limit = if flags.global { usize::MAX } else { 1 };

    let matches = regex
        .captures_iter(subject)
        .take(limit)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let groups = names
                .iter()
                .enumerate()
                .skip(1)
                .map(|(index, name)| CaptureGroup {
                    index,
                    name: name.map(str::to_string),
                    value: captures.get(index).map(|m| m.as_str().to_string()),
                })
                .collect();
            Some(MatchInfo {
                text: whole.as_str().to_string(),
                index: subject[..whole.start()].chars().count(),
                groups,
            })
        })
        .collect();

    let replaced = replacement.map(|with| {
        if flags.global {
            regex.replace_all(subject, with).into_owned()
        } else {
            regex.replace(subject, with).into_owned()
        }
    });

    Ok(TestOutcome { matches, replaced })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(value: &str) -> RegexFlags {
        RegexFlags::parse(value).unwrap()
    }

    #[test]
    fn global_digits() {
        let outcome = run(r"\d+", flags("g"), "a1b22c333", None).unwrap();
        let found: Vec<(&str, usize)> = outcome
            .matches
            .iter()
            .map(|m| (m.text.as_str(), m.index))
            .collect();
        assert_eq!(found, vec![("1", 1), ("22", 3), ("333", 6)]);
    }

    #[test]
    fn without_global_only_first_match() {
        let outcome = run(r"\d+", flags(""), "a1b22", Some("#")).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.replaced.as_deref(), Some("a#b22"));
    }

    #[test]
    fn named_and_numbered_groups() {
        let outcome = run(
            r"(?P<key>\w+)=(\d+)?",
            flags("g"),
            "a=1 b=",
            Some("${key}:$2"),
        )
        .unwrap();
        let first = &outcome.matches[0];
        assert_eq!(first.groups[0].name.as_deref(), Some("key"));
        assert_eq!(first.groups[0].value.as_deref(), Some("a"));
        assert_eq!(first.groups[1].index, 2);
        assert_eq!(outcome.matches[1].groups[1].value, None);
        assert_eq!(outcome.replaced.as_deref(), Some("a:1 b:"));
    }

    #[test]
    fn flags_change_matching() {
        assert!(run("abc", flags("g"), "ABC", None).unwrap().matches.is_empty());
        assert_eq!(run("abc", flags("gi"), "ABC", None).unwrap().matches.len(), 1);
        assert_eq!(run("^b", flags("gm"), "a\nb", None).unwrap().matches.len(), 1);
        assert_eq!(run("a.b", flags("s"), "a\nb", None).unwrap().matches.len(), 1);
        assert_eq!(run("a b # comment", flags("x"), "ab", None).unwrap().matches.len(), 1);
    }

    #[test]
    fn index_counts_characters() {
        let outcome = run("x", flags("g"), "ééx", None).unwrap();
        assert_eq!(outcome.matches[0].index, 2);
    }

    #[test]
    fn errors_are_reported() {
        assert!(matches!(run("(", flags(""), "", None), Err(RegexError::Compile(_))));
        assert!(matches!(RegexFlags::parse("gz"), Err(RegexError::UnknownFlag('z'))));
        assert_eq!(flags("xig").as_string(), "gix");
    }
}
