use super::HeadersMutation;
use regex::Regex;
use std::collections::HashMap;

/// Sets a header, dropping any existing one with the same name whatever its
/// casing.
#[derive(Debug)]
pub struct SetHeaderMutation {
    name: String,
    value: String,
}

impl SetHeaderMutation {
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, value: S2) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl HeadersMutation for SetHeaderMutation {
    fn mutate(&self, headers: &mut HashMap<String, String>) {
        headers.retain(|name, _| !name.eq_ignore_ascii_case(&self.name));
        headers.insert(self.name.clone(), self.value.clone());
    }
}

#[derive(Debug)]
pub struct RemoveHeadersMutation {
    names: Vec<String>,
}

impl RemoveHeadersMutation {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(names: I) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl HeadersMutation for RemoveHeadersMutation {
    fn mutate(&self, headers: &mut HashMap<String, String>) {
        // request headers keep the caller's casing
        headers.retain(|name, _| {
            !self
                .names
                .iter()
                .any(|removed| removed.eq_ignore_ascii_case(name))
        });
    }
}

#[derive(Debug)]
pub struct RemoveHeadersRegexMutation {
    patterns: Vec<Regex>,
}

impl RemoveHeadersRegexMutation {
    pub fn new<I: IntoIterator<Item = Regex>>(patterns: I) -> Self {
        Self {
            patterns: patterns.into_iter().collect(),
        }
    }
}

impl HeadersMutation for RemoveHeadersRegexMutation {
    fn mutate(&self, headers: &mut HashMap<String, String>) {
        headers.retain(|name, _| !self.patterns.iter().any(|pattern| pattern.is_match(name)));
    }
}
