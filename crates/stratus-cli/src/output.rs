//! Formatted output helpers for CLI commands.

use stratus_compose::result::{Identifiers, Slot};

/// Width of the rule printed under headings.
const RULE_WIDTH: usize = 35;

/// A title followed by a double rule.
#[must_use]
pub fn heading(title: &str) -> String {
    format!("{title}\n{}", "\u{2550}".repeat(RULE_WIDTH.max(title.chars().count())))
}

/// `+` for a realized component, `-` for an omitted one.
#[must_use]
pub const fn slot_marker(slot: &Slot) -> char {
    match slot {
        Slot::Realized { .. } => '+',
        Slot::Absent { .. } => '-',
    }
}

/// One `key: value` line per identifier, keys padded to a common width.
#[must_use]
pub fn identifier_lines(identifiers: &Identifiers) -> Vec<String> {
    let width = identifiers.keys().map(|k| k.len()).max().unwrap_or(0);
    identifiers
        .iter()
        .map(|(key, id)| format!("{key:<width$}  {id}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use stratus_common::types::ResourceId;

    use super::*;

    #[test]
    fn heading_rule_covers_long_titles() {
        let title = "x".repeat(40);
        let rendered = heading(&title);
        let rule = rendered.lines().nth(1).expect("rule line");
        assert_eq!(rule.chars().count(), 40);
    }

    #[test]
    fn markers_distinguish_slots() {
        let realized = Slot::Realized {
            identifiers: Identifiers::new(),
        };
        let absent = Slot::Absent {
            reason: "no domain".into(),
        };
        assert_eq!(slot_marker(&realized), '+');
        assert_eq!(slot_marker(&absent), '-');
    }

    #[test]
    fn identifier_lines_are_aligned() {
        let mut ids = Identifiers::new();
        let _ = ids.insert("networkId", ResourceId::new("vpc-1"));
        let _ = ids.insert("instanceId", ResourceId::new("i-1"));
        let lines = identifier_lines(&ids);
        assert_eq!(lines, vec!["instanceId  i-1", "networkId   vpc-1"]);
    }
}
