//! The compiled-in agent-selection fix.
//!
//! `createAgentItemFromConfig` rebuilds the tree item's icon from live
//! terminal state on every invocation, so merely selecting an active agent
//! re-evaluates (and visually toggles) its active state. The corrected
//! method takes the running state as a parameter; the call site in the list
//! refresh computes it once and passes it down.

use crate::spec::schema::{Meta, PatchSpec, StructuralRule, TextRule};

/// Locator signature of the bug: the dynamic icon lookup.
const FRAGMENT: &str = "iconPath: this.getAgentIcon(";

/// Start of the buggy method declaration.
const ANCHOR: &str =
    "private createAgentItemFromConfig(config: AgentConfig, filePath: string): AgentItem {";

/// Sub-expression that must appear inside the method body for it to count.
const MARKER: &str = "iconPath: this.getAgentIcon(config.name),";

/// Corrected method: signature gains `isRunning`, and the icon assignment is
/// keyed on that parameter instead of a live state lookup.
const REPLACEMENT: &str = "\
private createAgentItemFromConfig(config: AgentConfig, filePath: string, isRunning?: boolean): AgentItem {
        return {
            label: config.name,
            iconPath: isRunning ?
                new vscode.ThemeIcon('robot', new vscode.ThemeColor('charts.green')) :
                AGENT_CONSTANTS.DEFAULT_ICON,
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
    }";

/// Original call site in the agent list refresh.
const CALL_SITE: &str = "const agentItem = this.createAgentItemFromConfig(config, filePath);";

/// Rewritten call site: compute the running state first, then forward it.
const CALL_SITE_FIXED: &str = "const isRunning = this.isAgentRunning(config.name);
                    const agentItem = this.createAgentItemFromConfig(config, filePath, isRunning);";

impl PatchSpec {
    /// The default spec: the agent-selection fix for
    /// `agentManagementService.ts`.
    pub fn builtin() -> Self {
        PatchSpec {
            meta: Meta {
                name: "agent-selection-fix".to_string(),
                description: Some(
                    "Stop createAgentItemFromConfig from recomputing icon state during \
                     selection events"
                        .to_string(),
                ),
            },
            fragment: FRAGMENT.to_string(),
            primary: StructuralRule {
                anchor: ANCHOR.to_string(),
                marker: MARKER.to_string(),
                replacement: REPLACEMENT.to_string(),
            },
            auxiliary: vec![TextRule {
                find: CALL_SITE.to_string(),
                replace: CALL_SITE_FIXED.to_string(),
            }],
        }
    }
}
