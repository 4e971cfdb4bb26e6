//! Sectioned document merging.
//!
//! Activates only on `Diverged`. The document is partitioned into
//! comparable sections on both sides; one-sided changes are taken verbatim,
//! sections differing on both sides are delegated to the pluggable
//! [`MergeStrategy`]. The strategy being absent, failing, or insufficiently
//! confident routes the ENTIRE document to conflict marking: the engine
//! never silently prefers one side.

use crate::config::SyncConfig;
use marksync_core::{split_sections, Section};

/// A proposed merge for one section, with the strategy's confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeProposal {
    /// Proposed merged section text.
    pub text: String,
    /// Strategy confidence in `[0, 1]`.
    pub confidence: f32,
}

/// External collaborator proposing merges for sections changed on both
/// sides.
///
/// Models the natural-language reasoning step as a bounded, testable
/// contract. Returning `None` means the strategy cannot propose a merge for
/// this section.
pub trait MergeStrategy: Send + Sync {
    /// Proposes a merged text for a section that diverged on both sides.
    fn propose(&self, section_id: &str, remote_text: &str, local_text: &str)
        -> Option<MergeProposal>;
}

/// External approval gate for a proposed merged document.
///
/// A merge is proposed, never silently committed: the merged document is
/// written only after `approve` returns true.
pub trait MergeApprover: Send + Sync {
    /// Decides whether the merged document may be applied.
    fn approve(&self, merged: &str) -> bool;
}

/// Outcome of a merge attempt over a diverged document.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// All sections resolved; the merged document awaits approval.
    Merged {
        /// The merged document text.
        text: String,
    },
    /// At least one section could not be confidently resolved; the whole
    /// document must be conflict-marked.
    Conflict {
        /// Section ids that blocked the merge.
        blocked_sections: Vec<String>,
    },
}

/// Merges a diverged document section by section.
///
/// Sections present on only one side are taken verbatim from that side;
/// identical sections pass through; sections differing on both sides go to
/// the strategy. Output follows remote section order, with local-only
/// sections inserted after their local predecessor.
pub fn merge_documents(
    remote: &str,
    local: &str,
    strategy: Option<&dyn MergeStrategy>,
    config: &SyncConfig,
) -> MergeOutcome {
    let remote_sections = split_sections(remote);
    let local_sections = split_sections(local);

    let mut blocked: Vec<String> = Vec::new();
    let mut out_ids: Vec<String> = Vec::new();
    let mut out_texts: Vec<String> = Vec::new();

    for section in &remote_sections {
        match find(&local_sections, &section.id) {
            None => {
                // Changed (or added) only in remote.
                out_ids.push(section.id.clone());
                out_texts.push(section.text.clone());
            }
            Some(local_section) if texts_match(section, local_section) => {
                out_ids.push(section.id.clone());
                out_texts.push(section.text.clone());
            }
            Some(local_section) => {
                // Divergent variants exist on both sides: delegate.
                match propose(strategy, section, local_section, config) {
                    Some(text) => {
                        out_ids.push(section.id.clone());
                        out_texts.push(text);
                    }
                    None => blocked.push(section.id.clone()),
                }
            }
        }
    }

    // Local-only sections keep their place relative to their local
    // predecessor.
    for (idx, section) in local_sections.iter().enumerate() {
        if find(&remote_sections, &section.id).is_some() {
            continue;
        }
        let insert_at = local_sections[..idx]
            .iter()
            .rev()
            .find_map(|prev| out_ids.iter().position(|id| *id == prev.id).map(|p| p + 1))
            .unwrap_or(0);
        out_ids.insert(insert_at, section.id.clone());
        out_texts.insert(insert_at, section.text.clone());
    }

    if !blocked.is_empty() {
        tracing::info!(?blocked, "merge blocked; routing document to conflict");
        return MergeOutcome::Conflict {
            blocked_sections: blocked,
        };
    }

    MergeOutcome::Merged {
        text: out_texts.concat(),
    }
}

fn find<'a>(sections: &'a [Section], id: &str) -> Option<&'a Section> {
    sections.iter().find(|s| s.id == id)
}

fn texts_match(a: &Section, b: &Section) -> bool {
    a.text.trim_end() == b.text.trim_end()
}

fn propose(
    strategy: Option<&dyn MergeStrategy>,
    remote: &Section,
    local: &Section,
    config: &SyncConfig,
) -> Option<String> {
    let proposal = strategy?.propose(&remote.id, &remote.text, &local.text)?;
    if proposal.confidence < config.min_confidence {
        tracing::debug!(
            section = %remote.id,
            confidence = proposal.confidence,
            threshold = config.min_confidence,
            "merge proposal below confidence threshold"
        );
        return None;
    }
    Some(proposal.text)
}
