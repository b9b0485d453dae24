//! The closed set of actions the evaluator decides on.

use std::fmt;

use modera_core::PostPermissionLevel;
use serde::{Deserialize, Serialize};

/// An action a requester wants to perform.
///
/// Closed enum on purpose: adding an action forces every classification
/// method below (and the evaluator's exhaustive matches) to be revisited
/// at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateArticle,
    EditArticle,
    SoftDeleteArticle,
    CreateComment,
    EditComment,
    DeleteComment,
    RateContent,
    ReadContent,
    /// Render an audit verdict on content under review.
    Audit,
    /// Admin tooling: bans, restores, archives, standing changes.
    Admin,
}

impl Action {
    /// Content-write actions: the ones a ban blocks. Audit and admin
    /// actions are role-gated, not standing-gated, so a banned admin
    /// keeps their powers.
    pub fn is_content_write(&self) -> bool {
        matches!(
            self,
            Action::CreateArticle
                | Action::EditArticle
                | Action::SoftDeleteArticle
                | Action::CreateComment
                | Action::EditComment
                | Action::DeleteComment
                | Action::RateContent
        )
    }

    /// Creation-type actions produce a new record rather than touching an
    /// existing one, so the ownership rule never applies. Commenting on
    /// and rating someone else's article is the whole point.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Action::CreateArticle | Action::CreateComment | Action::RateContent
        )
    }

    /// The minimum effective permission level, where one is required.
    /// Only creation-type actions are level-gated; edits and deletes are
    /// governed by ownership instead.
    pub fn required_level(&self) -> Option<PostPermissionLevel> {
        match self {
            Action::CreateArticle => Some(PostPermissionLevel::Full),
            Action::CreateComment | Action::RateContent => Some(PostPermissionLevel::Limited),
            _ => None,
        }
    }

    /// Whether this action operates on a specific existing content item.
    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            Action::EditArticle
                | Action::SoftDeleteArticle
                | Action::EditComment
                | Action::DeleteComment
                | Action::RateContent
                | Action::ReadContent
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::CreateArticle => "create_article",
            Action::EditArticle => "edit_article",
            Action::SoftDeleteArticle => "soft_delete_article",
            Action::CreateComment => "create_comment",
            Action::EditComment => "edit_comment",
            Action::DeleteComment => "delete_comment",
            Action::RateContent => "rate_content",
            Action::ReadContent => "read_content",
            Action::Audit => "audit",
            Action::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_classification() {
        assert!(Action::CreateArticle.is_content_write());
        assert!(Action::RateContent.is_content_write());
        assert!(!Action::ReadContent.is_content_write());
        assert!(!Action::Audit.is_content_write());
        assert!(!Action::Admin.is_content_write());
    }

    #[test]
    fn test_creation_exempt_from_ownership() {
        assert!(Action::CreateComment.is_creation());
        assert!(Action::RateContent.is_creation());
        assert!(!Action::EditComment.is_creation());
    }

    #[test]
    fn test_required_levels() {
        assert_eq!(
            Action::CreateArticle.required_level(),
            Some(PostPermissionLevel::Full)
        );
        assert_eq!(
            Action::CreateComment.required_level(),
            Some(PostPermissionLevel::Limited)
        );
        assert_eq!(Action::EditArticle.required_level(), None);
    }
}
