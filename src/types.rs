// src/types.rs

use std::fmt;

use tracing::Span;

use crate::version::ToolVersion;

/// Workspace used when the project doesn't name one.
pub const DEFAULT_WORKSPACE: &str = "default";

/// The user who triggered the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

/// Repository the pull request targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repo {
    /// `owner/name`.
    pub full_name: String,
    pub owner: String,
    pub name: String,
}

impl Repo {
    /// Split an `owner/name` string. Owners may contain spaces (Bitbucket
    /// Server) but never `/`.
    pub fn from_full_name(full_name: &str) -> Self {
        let (owner, name) = full_name.split_once('/').unwrap_or(("", full_name));
        Self {
            full_name: full_name.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequest {
    pub num: u64,
}

/// Everything a single plan step needs to know about who/what/where.
///
/// Built by the caller and never mutated here.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub workspace: String,
    pub project_name: String,
    /// Overrides the runner's default terraform version when set.
    pub terraform_version: Option<ToolVersion>,
    pub user: User,
    pub base_repo: Repo,
    pub pull: PullRequest,
    /// Extra args from the pull request comment, already shell-escaped.
    pub escaped_comment_args: Vec<String>,
}

impl ExecutionContext {
    /// Span that every log line of one invocation is emitted under.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "plan",
            repo = %self.base_repo.full_name,
            pull = self.pull.num,
            workspace = %self.workspace,
            project = %self.project_name,
        )
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            workspace: DEFAULT_WORKSPACE.to_string(),
            project_name: String::new(),
            terraform_version: None,
            user: User::default(),
            base_repo: Repo::default(),
            pull: PullRequest::default(),
            escaped_comment_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Pending,
    Success,
    Failed,
}

impl fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommitStatus::Pending => "pending",
            CommitStatus::Success => "success",
            CommitStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Which workflow command a status update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandName {
    Plan,
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandName::Plan => f.write_str("plan"),
        }
    }
}
