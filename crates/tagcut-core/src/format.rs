//! Render a changelog for the package index (reStructuredText with link
//! targets) and for the release host (plain bullets).

use crate::types::CommitEntry;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

/// Host used for commit and issue links when none is configured.
pub const DEFAULT_HOST: &str = "github.com";

const HEADER_LINES: [&str; 3] = [
    "Changes since last version",
    "--------------------------",
    "",
];

static ISSUE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("issue pattern is valid"));

#[derive(Debug, PartialEq, Eq, Hash)]
enum LinkKey {
    Commit(String),
    Issue(String),
}

/// Link targets in first-seen order, each key emitted once.
#[derive(Default)]
struct LinkTargets {
    seen: FxHashSet<LinkKey>,
    lines: Vec<String>,
}

impl LinkTargets {
    fn add(&mut self, key: LinkKey, line: impl FnOnce() -> String) {
        if self.seen.insert(key) {
            self.lines.push(line());
        }
    }
}

fn header() -> Vec<String> {
    HEADER_LINES.iter().map(|line| line.to_string()).collect()
}

/// Changelog for the package index long description, linking to GitHub.
pub fn format_index_changelog(changelog: &[CommitEntry], org: &str, repo: &str) -> String {
    format_index_changelog_for_host(changelog, DEFAULT_HOST, org, repo)
}

/// Changelog for the package index long description.
///
/// Each commit hash and each `#<number>` issue reference becomes a named
/// reStructuredText reference, with its target appended after the list.
pub fn format_index_changelog_for_host(
    changelog: &[CommitEntry],
    host: &str,
    org: &str,
    repo: &str,
) -> String {
    let mut output = header();
    let mut links = LinkTargets::default();

    for entry in changelog {
        let sha = entry.short_sha.as_str();
        links.add(LinkKey::Commit(sha.to_string()), || {
            format!(".. _{sha}: https://{host}/{org}/{repo}/commit/{sha}")
        });
        for captures in ISSUE_NUMBER.captures_iter(&entry.summary) {
            let number = &captures[1];
            links.add(LinkKey::Issue(number.to_string()), || {
                format!(".. _#{number}: https://{host}/{org}/{repo}/issues/{number}")
            });
        }
        let summary = ISSUE_NUMBER.replace_all(&entry.summary, "`#${1}`_");
        output.push(format!("* `{sha}`_: {summary}"));
    }

    output.push(String::new());
    output.extend(links.lines);
    output.join("\n")
}

/// Changelog for the release body; the host links hashes and issues itself.
pub fn format_release_changelog(changelog: &[CommitEntry]) -> String {
    let mut output = header();
    for entry in changelog {
        output.push(format!("* {}: {}", entry.short_sha, entry.summary));
    }
    output.push(String::new());
    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Changes since last version\n--------------------------\n\n";

    fn entries(items: &[(&str, &str)]) -> Vec<CommitEntry> {
        items
            .iter()
            .map(|(sha, summary)| CommitEntry::new(*sha, *summary))
            .collect()
    }

    #[test]
    fn empty_changelog_is_just_the_header() {
        assert_eq!(format_index_changelog(&[], "acme", "widget"), HEADER);
        assert_eq!(format_release_changelog(&[]), HEADER);
    }

    #[test]
    fn index_changelog_links_commits_and_issues() {
        let changelog = entries(&[("abc1234", "Fix bug #42"), ("def5678", "Add docs")]);
        let out = format_index_changelog(&changelog, "acme", "widget");
        let expected = format!(
            "{HEADER}* `abc1234`_: Fix bug `#42`_\n* `def5678`_: Add docs\n\n\
             .. _abc1234: https://github.com/acme/widget/commit/abc1234\n\
             .. _#42: https://github.com/acme/widget/issues/42\n\
             .. _def5678: https://github.com/acme/widget/commit/def5678"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn link_targets_are_deduplicated_in_first_seen_order() {
        let changelog = entries(&[
            ("aaa1111", "Fix #7 and #8"),
            ("bbb2222", "Follow-up for #7"),
            ("aaa1111", "Same commit twice, #8 again"),
        ]);
        let out = format_index_changelog(&changelog, "acme", "widget");

        let targets: Vec<&str> = out.lines().filter(|l| l.starts_with(".. _")).collect();
        assert_eq!(
            targets,
            vec![
                ".. _aaa1111: https://github.com/acme/widget/commit/aaa1111",
                ".. _#7: https://github.com/acme/widget/issues/7",
                ".. _#8: https://github.com/acme/widget/issues/8",
                ".. _bbb2222: https://github.com/acme/widget/commit/bbb2222",
            ]
        );
    }

    #[test]
    fn issue_rewrite_leaves_other_text_alone() {
        let changelog = entries(&[("abc1234", "Handle #123 (see notes) #not-an-issue")]);
        let out = format_index_changelog(&changelog, "acme", "widget");

        assert!(out.contains("* `abc1234`_: Handle `#123`_ (see notes) #not-an-issue\n"));
        let issue_targets = out.lines().filter(|l| l.starts_with(".. _#")).count();
        assert_eq!(issue_targets, 1);
        assert!(out.ends_with(".. _#123: https://github.com/acme/widget/issues/123"));
    }

    #[test]
    fn numeric_sha_and_issue_keep_separate_targets() {
        let changelog = entries(&[("1234567", "Fix #1234567")]);
        let out = format_index_changelog(&changelog, "acme", "widget");
        assert!(out.contains(".. _1234567: https://github.com/acme/widget/commit/1234567"));
        assert!(out.contains(".. _#1234567: https://github.com/acme/widget/issues/1234567"));
    }

    #[test]
    fn custom_host_is_used_for_links() {
        let changelog = entries(&[("abc1234", "Fix #1")]);
        let out = format_index_changelog_for_host(&changelog, "git.example.org", "acme", "widget");
        assert!(out.contains(".. _abc1234: https://git.example.org/acme/widget/commit/abc1234"));
        assert!(out.contains(".. _#1: https://git.example.org/acme/widget/issues/1"));
    }

    #[test]
    fn release_changelog_is_plain() {
        let changelog = entries(&[("abc1234", "Fix bug #42"), ("def5678", "Add docs")]);
        let out = format_release_changelog(&changelog);
        assert_eq!(
            out,
            format!("{HEADER}* abc1234: Fix bug #42\n* def5678: Add docs\n")
        );
    }
}
