//! Wire types exchanged with the repository-management backend.
//!
//! The backend owns every actual Git operation; the graph engine only decodes
//! the batches it is handed and emits one fire-and-forget request per user
//! action. All types round-trip through JSON.

use serde::{Deserialize, Serialize};

/// One commit as delivered by the backend, in display order (newest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDescriptor {
    pub sha: String,
    #[serde(default)]
    pub parent_shas: Vec<String>,
    #[serde(default)]
    pub child_shas: Vec<String>,
    #[serde(default)]
    pub summary: String,
    /// Pixel hint emitted by older backends. The engine derives row positions
    /// itself, so this is accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_pixel_y: Option<f64>,
}

/// Branch/tag badge assignment for a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAssignment {
    pub sha: String,
    /// Display text, e.g. "main", "origin/main", "v1.2", "* HEAD"
    pub shorthand: String,
    /// Full reference name, e.g. "refs/remotes/origin/main"
    #[serde(default)]
    pub full_name: String,
    /// "local", "remote" or "tag"; anything else renders as a generic chip
    #[serde(default)]
    pub kind: String,
}

/// Complete display-ordered graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphBatch {
    pub commits: Vec<CommitDescriptor>,
    #[serde(default)]
    pub labels: Vec<LabelAssignment>,
}

/// Prepend/prune delta after the backend observed history change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalBatch {
    #[serde(default)]
    pub added_commits: Vec<CommitDescriptor>,
    #[serde(default)]
    pub deleted_shas: Vec<String>,
}

/// Per-file entry of a commit detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    pub status: String,
}

/// Full commit information, fetched on selection. Consumed by the detail
/// view next to the graph; the graph engine itself never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDetail {
    pub sha: String,
    pub author_name: String,
    pub author_time: i64,
    pub committer_name: String,
    pub committer_time: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub changed_files: Vec<FileChange>,
}

/// Everything the backend can push to this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum InboundMessage {
    FullGraph(GraphBatch),
    IncrementalGraph(IncrementalBatch),
    CommitDetail(CommitDetail),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetLevel {
    Soft,
    Mixed,
    Hard,
}

/// One user action forwarded to the backend. Fire-and-forget: the engine
/// never waits for a reply, it arrives later as an `InboundMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum CollaboratorRequest {
    RequestCommitDetail { sha: String },
    CheckoutDetached { sha: String },
    Merge { sha: String },
    RebaseOnto { sha: String },
    CherryPick { sha: String },
    Revert { sha: String },
    Reset { sha: String, level: ResetLevel },
    CheckoutBranch {
        reference: String,
        #[serde(rename = "isRemote")]
        is_remote: bool,
    },
    CopyIdentifier { sha: String },
}

/// The fixed context menu action set for a commit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    Merge,
    RebaseOnto,
    CherryPick,
    Revert,
    CopyIdentifier,
    Reset(ResetLevel),
}

impl ContextAction {
    /// Menu order as presented to the user
    pub const ALL: [ContextAction; 8] = [
        ContextAction::Merge,
        ContextAction::RebaseOnto,
        ContextAction::CherryPick,
        ContextAction::Revert,
        ContextAction::CopyIdentifier,
        ContextAction::Reset(ResetLevel::Soft),
        ContextAction::Reset(ResetLevel::Mixed),
        ContextAction::Reset(ResetLevel::Hard),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContextAction::Merge => "Merge into current branch",
            ContextAction::RebaseOnto => "Rebase current branch onto here",
            ContextAction::CherryPick => "Cherry-pick commit",
            ContextAction::Revert => "Revert commit",
            ContextAction::CopyIdentifier => "Copy SHA",
            ContextAction::Reset(ResetLevel::Soft) => "Soft reset to here",
            ContextAction::Reset(ResetLevel::Mixed) => "Mixed reset to here",
            ContextAction::Reset(ResetLevel::Hard) => "Hard reset to here",
        }
    }

    /// The request this action sends for the given commit
    pub fn request(&self, sha: &str) -> CollaboratorRequest {
        let sha = sha.to_string();
        match self {
            ContextAction::Merge => CollaboratorRequest::Merge { sha },
            ContextAction::RebaseOnto => CollaboratorRequest::RebaseOnto { sha },
            ContextAction::CherryPick => CollaboratorRequest::CherryPick { sha },
            ContextAction::Revert => CollaboratorRequest::Revert { sha },
            ContextAction::CopyIdentifier => CollaboratorRequest::CopyIdentifier { sha },
            ContextAction::Reset(level) => CollaboratorRequest::Reset { sha, level: *level },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_descriptor_accepts_minimal_json() {
        let c: CommitDescriptor = serde_json::from_str(r#"{"sha": "abc123"}"#)
            .expect("minimal descriptor should parse");
        assert_eq!(c.sha, "abc123");
        assert!(c.parent_shas.is_empty());
        assert!(c.child_shas.is_empty());
        assert_eq!(c.row_pixel_y, None);
    }

    #[test]
    fn test_commit_descriptor_accepts_legacy_pixel_hint() {
        let c: CommitDescriptor = serde_json::from_str(
            r#"{"sha": "abc", "parentShas": ["def"], "rowPixelY": 44.0}"#,
        )
        .expect("descriptor with pixel hint should parse");
        assert_eq!(c.parent_shas, vec!["def".to_string()]);
        assert_eq!(c.row_pixel_y, Some(44.0));
    }

    #[test]
    fn test_outbound_wire_names() {
        let req = CollaboratorRequest::CherryPick { sha: "abc".into() };
        let json = serde_json::to_string(&req).expect("serialize");
        assert_eq!(json, r#"{"op":"cherry-pick","sha":"abc"}"#);

        let req = CollaboratorRequest::Reset {
            sha: "abc".into(),
            level: ResetLevel::Mixed,
        };
        let json = serde_json::to_string(&req).expect("serialize");
        assert_eq!(json, r#"{"op":"reset","sha":"abc","level":"mixed"}"#);

        let req = CollaboratorRequest::CheckoutBranch {
            reference: "refs/remotes/origin/main".into(),
            is_remote: true,
        };
        let json = serde_json::to_string(&req).expect("serialize");
        assert!(json.contains(r#""op":"checkout-branch""#));
        assert!(json.contains(r#""isRemote":true"#));
    }

    #[test]
    fn test_inbound_envelope_round_trip() {
        let msg = InboundMessage::IncrementalGraph(IncrementalBatch {
            added_commits: vec![CommitDescriptor {
                sha: "new1".into(),
                parent_shas: vec!["old1".into()],
                child_shas: vec![],
                summary: "fix".into(),
                row_pixel_y: None,
            }],
            deleted_shas: vec!["gone".into()],
        });
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains(r#""event":"incremental-graph""#));
        let back: InboundMessage = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, msg);
    }

    #[test]
    fn test_context_action_set_is_complete() {
        assert_eq!(ContextAction::ALL.len(), 8);
        let resets = ContextAction::ALL
            .iter()
            .filter(|a| matches!(a, ContextAction::Reset(_)))
            .count();
        assert_eq!(resets, 3);
        // Every action maps to a distinct request
        let reqs: Vec<_> = ContextAction::ALL.iter().map(|a| a.request("s")).collect();
        for (i, a) in reqs.iter().enumerate() {
            for b in reqs.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
