//! Locator/patcher agreement over a table of fixture documents.
//!
//! The locator's substring scan and the patcher's structural match are
//! independent mechanisms; for well-formed targets with 0, 1, or 2+
//! occurrences of the bug they must agree on whether anything is there.

use agentfix::{apply_patch, locate, primary_regions, PatchOutcome, PatchSpec};
use proptest::prelude::*;

const BUGGY_METHOD: &str = r#"    private createAgentItemFromConfig(config: AgentConfig, filePath: string): AgentItem {
        return {
            label: config.name,
            iconPath: this.getAgentIcon(config.name),
            contextValue: AGENT_CONSTANTS.CONTEXT_VALUES.AGENT_ITEM,
            filePath,
            config,
            collapsibleState: vscode.TreeItemCollapsibleState.None,
            command: {
                command: AGENT_COMMANDS.OPEN_AGENT,
                title: 'Open Agent Configuration',
                arguments: [{ label: config.name, filePath, config }]
            }
        };
    }
"#;

fn document_with_occurrences(count: usize) -> String {
    let mut doc = String::from("export class AgentManagementService {\n");
    for _ in 0..count {
        doc.push_str(BUGGY_METHOD);
        doc.push('\n');
    }
    doc.push_str("    unrelated(): void {}\n}\n");
    doc
}

#[test]
fn agreement_on_zero_one_and_many_occurrences() {
    let spec = PatchSpec::builtin();

    for count in [0usize, 1, 2, 3] {
        let doc = document_with_occurrences(count);

        let located = locate(&doc, &spec.fragment).count();
        let outcome = apply_patch(&doc, &spec);

        assert_eq!(located, count, "locator count for {count} occurrences");
        match outcome {
            PatchOutcome::Changed {
                primary_matches, ..
            } => {
                assert!(count > 0, "patcher matched an occurrence-free document");
                assert_eq!(primary_matches, count);
            }
            PatchOutcome::NoMatch => {
                assert_eq!(count, 0, "patcher missed {count} occurrence(s)");
            }
        }
    }
}

#[test]
fn multiple_occurrences_are_patched_uniformly() {
    let spec = PatchSpec::builtin();
    let doc = document_with_occurrences(2);

    match apply_patch(&doc, &spec) {
        PatchOutcome::Changed {
            content,
            primary_matches,
            ..
        } => {
            assert_eq!(primary_matches, 2);
            assert_eq!(content.matches("isRunning?: boolean").count(), 2);
            assert!(!content.contains("iconPath: this.getAgentIcon("));
        }
        PatchOutcome::NoMatch => panic!("expected matches"),
    }
}

#[test]
fn patched_document_no_longer_matches_either_component() {
    let spec = PatchSpec::builtin();
    let doc = document_with_occurrences(1);

    let patched = match apply_patch(&doc, &spec) {
        PatchOutcome::Changed { content, .. } => content,
        PatchOutcome::NoMatch => panic!("expected a match"),
    };

    assert_eq!(locate(&patched, &spec.fragment).count(), 0);
    assert!(primary_regions(&patched, &spec.primary).is_empty());
    assert_eq!(apply_patch(&patched, &spec), PatchOutcome::NoMatch);
}

proptest! {
    /// Surrounding text never leaks into or out of the replaced region.
    #[test]
    fn padding_around_fixture_is_preserved(
        prefix in "[a-z \n]{0,80}",
        suffix in "[a-z \n]{0,80}",
    ) {
        let spec = PatchSpec::builtin();
        let doc = format!("{prefix}{BUGGY_METHOD}{suffix}");

        match apply_patch(&doc, &spec) {
            PatchOutcome::Changed { content, primary_matches, .. } => {
                prop_assert_eq!(primary_matches, 1);
                prop_assert!(content.starts_with(&prefix));
                prop_assert!(content.ends_with(&suffix));
            }
            PatchOutcome::NoMatch => prop_assert!(false, "fixture should always match"),
        }
    }

    /// Documents that never contain the anchor are never patched, and the
    /// locator agrees.
    #[test]
    fn anchor_free_documents_never_match(doc in "[a-z{} \n]{0,200}") {
        let spec = PatchSpec::builtin();
        prop_assert_eq!(apply_patch(&doc, &spec), PatchOutcome::NoMatch);
        prop_assert_eq!(locate(&doc, &spec.fragment).count(), 0);
    }
}
