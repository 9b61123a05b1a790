//! Document review workflow.
//!
//! A loan's documents are grouped into stages (application, verification,
//! approval, disbursement). Officers approve, reject or send documents back
//! for revision; every decision that carries a message is appended to the
//! document's comment thread. Stage progress is derived, never stored.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Review state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Waiting for review
    #[default]
    Pending,
    /// Accepted by an officer
    Approved,
    /// Refused
    Rejected,
    /// Sent back to the borrower
    RevisionRequired,
}

impl DocumentStatus {
    /// Name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RevisionRequired => "revision_required",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a stage needs the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRequirement {
    /// Must be approved
    #[default]
    Required,
    /// Nice to have
    Optional,
}

/// What a comment records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// Plain remark
    Comment,
    /// Note left with an approval
    Approval,
    /// Reason for a rejection
    Rejection,
    /// What the borrower must fix
    RevisionRequest,
}

/// The officer acting on documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    /// Display name
    pub name: String,
    /// Job title
    pub role: String,
}

/// One entry in a document's comment thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentComment {
    /// `comment-<millis>`, unique within a workflow
    pub id: String,
    /// Reviewer name
    pub author_name: String,
    /// Reviewer role
    pub author_role: String,
    /// Comment text
    pub message: String,
    /// When it was written
    pub timestamp: DateTime<Utc>,
    /// What the comment records
    #[serde(rename = "type")]
    pub kind: CommentKind,
}

/// A document under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDocument {
    /// Document id
    pub id: String,
    /// Display name
    pub name: String,
    /// Required or optional
    #[serde(rename = "type")]
    pub requirement: DocumentRequirement,
    /// Review state
    pub status: DocumentStatus,
    /// Size in bytes, once uploaded
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Upload revision, starting at 1
    pub version: u32,
    /// Upload time
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Time of the latest approval
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Time of the latest rejection
    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
    /// Comment thread, oldest first
    #[serde(default)]
    pub comments: Vec<DocumentComment>,
}

impl ReviewDocument {
    /// A pending, not yet uploaded document.
    pub fn new(id: impl Into<String>, name: impl Into<String>, requirement: DocumentRequirement) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            requirement,
            status: DocumentStatus::Pending,
            file_size: None,
            version: 1,
            uploaded_at: None,
            approved_at: None,
            rejected_at: None,
            comments: Vec::new(),
        }
    }
}

/// The documents of one loan stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDocuments {
    /// Stage key, e.g. `application`
    pub stage: String,
    /// Heading shown for the stage
    pub stage_title: String,
    /// Documents in display order
    pub documents: Vec<ReviewDocument>,
}

impl StageDocuments {
    /// Share of approved documents in percent, 0 for an empty stage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_percentage(&self) -> f64 {
        if self.documents.is_empty() {
            return 0.0;
        }
        let approved = self
            .documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Approved)
            .count();
        approved as f64 / self.documents.len() as f64 * 100.0
    }

    /// A stage is complete when it has documents and all are approved.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.documents.is_empty()
            && self
                .documents
                .iter()
                .all(|d| d.status == DocumentStatus::Approved)
    }

    /// Derived progress of this stage.
    #[must_use]
    pub fn progress(&self) -> StageProgress {
        StageProgress {
            stage: self.stage.clone(),
            completion_percentage: self.completion_percentage(),
            is_completed: self.is_completed(),
        }
    }
}

/// Progress summary of a stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    /// Stage key
    pub stage: String,
    /// Approved share in percent
    pub completion_percentage: f64,
    /// All documents approved
    pub is_completed: bool,
}

/// Which documents the sidebar lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    /// Every document
    #[default]
    All,
    /// Documents in one state
    Only(DocumentStatus),
}

impl StatusFilter {
    /// Whether a document in `status` passes.
    #[must_use]
    pub fn admits(self, status: DocumentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(s) => s == status,
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if value == "all" {
            return Ok(Self::All);
        }
        [
            DocumentStatus::Pending,
            DocumentStatus::Approved,
            DocumentStatus::Rejected,
            DocumentStatus::RevisionRequired,
        ]
        .into_iter()
        .find(|s| s.as_str() == value)
        .map(Self::Only)
        .ok_or_else(|| format!("unknown document status filter `{value}`"))
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(s) => s.as_str().to_string(),
        }
    }
}

/// Review state of one loan's documents, acted on by one reviewer.
#[derive(Debug, Clone)]
pub struct DocumentWorkflow {
    stages: Vec<StageDocuments>,
    reviewer: Reviewer,
    last_comment_millis: i64,
}

impl DocumentWorkflow {
    /// Starts reviewing `stages` as `reviewer`.
    #[must_use]
    pub const fn new(stages: Vec<StageDocuments>, reviewer: Reviewer) -> Self {
        Self {
            stages,
            reviewer,
            last_comment_millis: 0,
        }
    }

    /// All stages with their documents.
    #[must_use]
    pub fn stages(&self) -> &[StageDocuments] {
        &self.stages
    }

    /// Looks a document up by id.
    #[must_use]
    pub fn document(&self, id: &str) -> Option<&ReviewDocument> {
        self.stages
            .iter()
            .flat_map(|s| s.documents.iter())
            .find(|d| d.id == id)
    }

    /// Approves a document, keeping the note if one is given.
    pub fn approve(
        &mut self,
        id: &str,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&ReviewDocument> {
        let note = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| (CommentKind::Approval, c));
        self.review(id, Some(DocumentStatus::Approved), note, now)
    }

    /// Rejects a document. The reason is mandatory.
    pub fn reject(&mut self, id: &str, comment: &str, now: DateTime<Utc>) -> Result<&ReviewDocument> {
        let reason = non_empty(comment, "reject")?;
        self.review(
            id,
            Some(DocumentStatus::Rejected),
            Some((CommentKind::Rejection, reason)),
            now,
        )
    }

    /// Sends a document back for revision. The request text is mandatory.
    pub fn request_revision(
        &mut self,
        id: &str,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<&ReviewDocument> {
        let request = non_empty(comment, "request revision of")?;
        self.review(
            id,
            Some(DocumentStatus::RevisionRequired),
            Some((CommentKind::RevisionRequest, request)),
            now,
        )
    }

    /// Adds a plain comment without changing the status.
    pub fn add_comment(&mut self, id: &str, comment: &str, now: DateTime<Utc>) -> Result<&ReviewDocument> {
        let text = non_empty(comment, "comment on")?;
        self.review(id, None, Some((CommentKind::Comment, text)), now)
    }

    /// Approves every selected document that is not approved yet. Unknown
    /// ids are skipped. Returns how many documents changed.
    pub fn bulk_approve(&mut self, ids: &[String], now: DateTime<Utc>) -> usize {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut changed = 0;
        for doc in self
            .stages
            .iter_mut()
            .flat_map(|s| s.documents.iter_mut())
            .filter(|d| wanted.contains(d.id.as_str()))
        {
            if doc.status == DocumentStatus::Approved {
                continue;
            }
            doc.status = DocumentStatus::Approved;
            doc.approved_at = Some(now);
            changed += 1;
        }
        info!("Bulk approved {changed} document(s)");
        changed
    }

    /// Stages with only the documents `filter` admits; stages left empty
    /// are dropped.
    #[must_use]
    pub fn filtered(&self, filter: StatusFilter) -> Vec<StageDocuments> {
        self.stages
            .iter()
            .map(|stage| StageDocuments {
                stage: stage.stage.clone(),
                stage_title: stage.stage_title.clone(),
                documents: stage
                    .documents
                    .iter()
                    .filter(|d| filter.admits(d.status))
                    .cloned()
                    .collect(),
            })
            .filter(|stage| !stage.documents.is_empty())
            .collect()
    }

    /// Progress of every stage, in stage order.
    #[must_use]
    pub fn progress(&self) -> Vec<StageProgress> {
        self.stages.iter().map(StageDocuments::progress).collect()
    }

    fn review(
        &mut self,
        id: &str,
        status: Option<DocumentStatus>,
        comment: Option<(CommentKind, &str)>,
        now: DateTime<Utc>,
    ) -> Result<&ReviewDocument> {
        let (stage_idx, doc_idx) = self
            .position(id)
            .ok_or_else(|| Error::DocumentNotFound { id: id.to_string() })?;
        let comment = comment.map(|(kind, message)| self.new_comment(kind, message, now));

        let doc = &mut self.stages[stage_idx].documents[doc_idx];
        if let Some(status) = status {
            match status {
                DocumentStatus::Approved => doc.approved_at = Some(now),
                DocumentStatus::Rejected => doc.rejected_at = Some(now),
                DocumentStatus::Pending | DocumentStatus::RevisionRequired => {}
            }
            info!("Document {} marked {status}", doc.id);
            doc.status = status;
        }
        if let Some(comment) = comment {
            debug!("Comment {} added to document {}", comment.id, doc.id);
            doc.comments.push(comment);
        }
        Ok(&self.stages[stage_idx].documents[doc_idx])
    }

    fn position(&self, id: &str) -> Option<(usize, usize)> {
        self.stages.iter().enumerate().find_map(|(si, stage)| {
            stage
                .documents
                .iter()
                .position(|d| d.id == id)
                .map(|di| (si, di))
        })
    }

    fn new_comment(&mut self, kind: CommentKind, message: &str, now: DateTime<Utc>) -> DocumentComment {
        let millis = now.timestamp_millis().max(self.last_comment_millis + 1);
        self.last_comment_millis = millis;
        DocumentComment {
            id: format!("comment-{millis}"),
            author_name: self.reviewer.name.clone(),
            author_role: self.reviewer.role.clone(),
            message: message.to_string(),
            timestamp: now,
            kind,
        }
    }
}

fn non_empty<'a>(comment: &'a str, action: &'static str) -> Result<&'a str> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(Error::CommentRequired { action });
    }
    Ok(trimmed)
}
