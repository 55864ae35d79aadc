// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tunables for room matching and door marks.

use serde::{Deserialize, Serialize};

/// Room matching options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Distance the element outline is grown by on every axis before the
    /// room query. Zero uses the exact bounding box.
    pub offset: f64,
    /// Stretch the outline down (or up) to the element's level elevation so
    /// elements placed above the floor still reach the room volume.
    pub project_to_level: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            offset: 1.0,
            project_to_level: true,
        }
    }
}

impl ResolveOptions {
    /// Exact bounding box, no level projection.
    pub fn exact() -> Self {
        Self {
            offset: 0.0,
            project_to_level: false,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset.max(0.0);
        self
    }

    pub fn with_project_to_level(mut self, project: bool) -> Self {
        self.project_to_level = project;
        self
    }
}

/// Door mark formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOptions {
    pub prefix: String,
    /// Placed between the room number and the suffix.
    pub separator: String,
    /// Suffixes for rooms numbering more than one door, in order.
    pub suffixes: Vec<String>,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            separator: String::new(),
            suffixes: ('A'..='Z').map(String::from).collect(),
        }
    }
}

impl MarkOptions {
    /// Suffix for the door at position `index` of a room.
    ///
    /// Past the end of the list, suffixes continue spreadsheet-style using
    /// the list entries as digits (`Z`, `AA`, `AB`, ...). An empty list
    /// falls back to 1-based numbers.
    pub fn suffix(&self, index: usize) -> String {
        let base = self.suffixes.len();
        if base == 0 {
            return (index + 1).to_string();
        }
        if index < base {
            return self.suffixes[index].clone();
        }

        let mut digits = Vec::new();
        let mut n = index + 1;
        while n > 0 {
            n -= 1;
            digits.push(self.suffixes[n % base].as_str());
            n /= base;
        }
        digits.reverse();
        digits.concat()
    }

    /// Mark for the only door of a room.
    pub fn single_mark(&self, number: &str) -> String {
        format!("{}{}", self.prefix, number)
    }

    /// Mark for the door at `index` of a room numbering several doors.
    pub fn indexed_mark(&self, number: &str, index: usize) -> String {
        format!(
            "{}{}{}{}",
            self.prefix,
            number,
            self.separator,
            self.suffix(index)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_suffixes_run_a_to_z_then_double() {
        let options = MarkOptions::default();
        assert_eq!(options.suffix(0), "A");
        assert_eq!(options.suffix(25), "Z");
        assert_eq!(options.suffix(26), "AA");
        assert_eq!(options.suffix(27), "AB");
        assert_eq!(options.suffix(26 + 26), "BA");
    }

    #[test]
    fn custom_suffixes_extend_with_their_own_digits() {
        let options = MarkOptions {
            suffixes: vec!["a".into(), "b".into()],
            ..MarkOptions::default()
        };
        assert_eq!(options.suffix(1), "b");
        assert_eq!(options.suffix(2), "aa");
        assert_eq!(options.suffix(5), "bb");
        assert_eq!(options.suffix(6), "aaa");
    }

    #[test]
    fn marks_use_prefix_and_separator() {
        let options = MarkOptions {
            prefix: "D".into(),
            separator: "-".into(),
            ..MarkOptions::default()
        };
        assert_eq!(options.single_mark("101"), "D101");
        assert_eq!(options.indexed_mark("101", 1), "D101-B");
    }

    #[test]
    fn empty_suffix_list_numbers_doors() {
        let options = MarkOptions {
            suffixes: Vec::new(),
            ..MarkOptions::default()
        };
        assert_eq!(options.indexed_mark("7", 0), "71");
    }

    #[test]
    fn negative_offset_is_clamped() {
        assert_eq!(ResolveOptions::default().with_offset(-2.0).offset, 0.0);
    }
}
