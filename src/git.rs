//! Git access for reading and amending commits
//!
//! Everything here shells out to the `git` binary. The search itself never
//! touches the repository; it only sees the bytes returned by
//! [`CommitStore::raw_content`].

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::{Deserialize, Serialize};

use crate::error::VanityError;

/// Author and committer identity of a commit.
///
/// Re-applied on amend so the rewritten object differs only in its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub author_name: String,
    pub author_email: String,
    /// Raw `<unix seconds> <tz offset>` form
    pub author_date: String,
    pub committer_name: String,
    pub committer_email: String,
    pub committer_date: String,
}

impl CommitMetadata {
    /// Environment that makes `git commit` reuse this identity.
    ///
    /// Dates get an `@` so git reads them in its object-header format
    /// instead of guessing.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("GIT_AUTHOR_NAME", self.author_name.clone()),
            ("GIT_AUTHOR_EMAIL", self.author_email.clone()),
            ("GIT_AUTHOR_DATE", format!("@{}", self.author_date)),
            ("GIT_COMMITTER_NAME", self.committer_name.clone()),
            ("GIT_COMMITTER_EMAIL", self.committer_email.clone()),
            ("GIT_COMMITTER_DATE", format!("@{}", self.committer_date)),
        ]
    }
}

/// Read and rewrite access to commits.
pub trait CommitStore {
    /// Commit object body as printed by `git cat-file commit`.
    fn raw_content(&self, commit: &str) -> Result<Vec<u8>, VanityError>;

    /// Commit message only.
    fn message(&self, commit: &str) -> Result<String, VanityError>;

    fn metadata(&self, commit: &str) -> Result<CommitMetadata, VanityError>;

    /// Replace the commit's message, keeping `metadata` for author and committer.
    fn amend(
        &self,
        commit: &str,
        message: &str,
        metadata: &CommitMetadata,
    ) -> Result<(), VanityError>;

    /// Full commit id `commit` currently points at.
    fn resolve(&self, commit: &str) -> Result<String, VanityError>;
}

/// [`CommitStore`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl AsRef<Path>) -> Self {
        Self {
            repo: repo.as_ref().to_path_buf(),
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.repo).args(args);
        cmd
    }

    fn run(&self, mut cmd: Command, args: &[&str]) -> Result<Output, VanityError> {
        let command = format!("git {}", args.join(" "));
        tracing::debug!(%command, "running git");

        let output = cmd.output().map_err(|e| VanityError::Collaborator {
            command: command.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(VanityError::Collaborator {
                command,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Run git and return raw stdout.
    fn output(&self, args: &[&str]) -> Result<Vec<u8>, VanityError> {
        self.run(self.command(args), args).map(|output| output.stdout)
    }

    /// Run git and return stdout as text without the trailing newline.
    fn output_text(&self, args: &[&str]) -> Result<String, VanityError> {
        let stdout = self.output(args)?;
        let text = String::from_utf8(stdout).map_err(|e| VanityError::Collaborator {
            command: format!("git {}", args.join(" ")),
            reason: format!("output is not UTF-8: {}", e),
        })?;
        Ok(text.trim_end_matches('\n').to_string())
    }
}

impl CommitStore for GitCli {
    fn raw_content(&self, commit: &str) -> Result<Vec<u8>, VanityError> {
        self.output(&["cat-file", "commit", commit])
    }

    fn message(&self, commit: &str) -> Result<String, VanityError> {
        // First line is `commit <id>`, the message follows
        let text = self.output_text(&["rev-list", "--max-count=1", "--format=%B", commit])?;
        let message = text.split_once('\n').map_or("", |(_, rest)| rest);
        Ok(message.trim_end_matches('\n').to_string())
    }

    fn metadata(&self, commit: &str) -> Result<CommitMetadata, VanityError> {
        let format = "--format=%an%x00%ae%x00%ad%x00%cn%x00%ce%x00%cd";
        let args = ["show", "-s", "--date=raw", format, commit];
        let text = self.output_text(&args)?;

        let fields: Vec<&str> = text.split('\0').collect();
        let [an, ae, ad, cn, ce, cd] = fields.as_slice() else {
            return Err(VanityError::Collaborator {
                command: format!("git {}", args.join(" ")),
                reason: format!("expected 6 metadata fields, got {}", fields.len()),
            });
        };

        Ok(CommitMetadata {
            author_name: an.to_string(),
            author_email: ae.to_string(),
            author_date: ad.to_string(),
            committer_name: cn.to_string(),
            committer_email: ce.to_string(),
            committer_date: cd.to_string(),
        })
    }

    fn amend(
        &self,
        commit: &str,
        message: &str,
        metadata: &CommitMetadata,
    ) -> Result<(), VanityError> {
        let target = self.resolve(commit)?;
        let head = self.resolve("HEAD")?;
        if target != head {
            return Err(VanityError::Collaborator {
                command: "git commit --amend".to_string(),
                reason: format!("{} is not HEAD; only HEAD can be amended", commit),
            });
        }

        // Staged changes would land in the amended tree
        let staged = self
            .command(&["diff", "--cached", "--quiet"])
            .status()
            .map_err(|e| VanityError::Collaborator {
                command: "git diff --cached --quiet".to_string(),
                reason: e.to_string(),
            })?;
        if !staged.success() {
            return Err(VanityError::Collaborator {
                command: "git commit --amend".to_string(),
                reason: "index has staged changes; commit or unstage them first".to_string(),
            });
        }

        let args = [
            "commit",
            "--amend",
            "--allow-empty",
            "--no-verify",
            "--no-gpg-sign",
            "--cleanup=verbatim",
            "--quiet",
            "-m",
            message,
        ];
        let mut cmd = self.command(&args);
        cmd.envs(metadata.env_vars());

        tracing::info!(commit = %target, "amending commit");
        self.run(cmd, &args[..args.len() - 1])?;
        Ok(())
    }

    fn resolve(&self, commit: &str) -> Result<String, VanityError> {
        self.output_text(&["rev-parse", "--verify", &format!("{}^{{commit}}", commit)])
    }
}
