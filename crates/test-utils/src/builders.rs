#![allow(dead_code)]

use planstep::types::{ExecutionContext, PullRequest, Repo, User};
use planstep::version::ToolVersion;

/// Builder for `ExecutionContext` to simplify test setup.
///
/// Starts from the `default` workspace of `runatlantis/atlantis` PR #2
/// opened by `lkysow`.
pub struct ContextBuilder {
    ctx: ExecutionContext,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: ExecutionContext {
                user: User {
                    username: "lkysow".to_string(),
                },
                base_repo: Repo::from_full_name("runatlantis/atlantis"),
                pull: PullRequest { num: 2 },
                ..ExecutionContext::default()
            },
        }
    }

    pub fn workspace(mut self, workspace: &str) -> Self {
        self.ctx.workspace = workspace.to_string();
        self
    }

    pub fn project(mut self, name: &str) -> Self {
        self.ctx.project_name = name.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.ctx.terraform_version = Some(version.parse::<ToolVersion>().expect("valid version"));
        self
    }

    pub fn repo(mut self, full_name: &str) -> Self {
        self.ctx.base_repo = Repo::from_full_name(full_name);
        self
    }

    pub fn user(mut self, username: &str) -> Self {
        self.ctx.user.username = username.to_string();
        self
    }

    pub fn pull(mut self, num: u64) -> Self {
        self.ctx.pull.num = num;
        self
    }

    pub fn comment_arg(mut self, arg: &str) -> Self {
        self.ctx.escaped_comment_args.push(arg.to_string());
        self
    }

    pub fn build(self) -> ExecutionContext {
        self.ctx
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
