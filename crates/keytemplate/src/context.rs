//! Build context sourced from the CI environment

/// Environment variable holding the workflow identifier.
pub const ENV_WORKFLOW_ID: &str = "CI_WORKFLOW_ID";
/// Environment variable holding the git branch name.
pub const ENV_GIT_BRANCH: &str = "CI_GIT_BRANCH";
/// Environment variable holding the git commit hash.
pub const ENV_GIT_COMMIT: &str = "CI_GIT_COMMIT";

/// Build metadata available to key templates.
///
/// Recreated per run from the surrounding environment; a variable that is
/// unset renders as an empty string rather than failing, so keys stay
/// evaluable on runners that only export a subset of the build metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    /// The workflow identifier that triggered the build.
    pub workflow: String,
    /// The git branch being built.
    pub branch: String,
    /// The git commit hash being built.
    pub commit_hash: String,
}

impl BuildContext {
    /// Read the build context from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            workflow: std::env::var(ENV_WORKFLOW_ID).unwrap_or_default(),
            branch: std::env::var(ENV_GIT_BRANCH).unwrap_or_default(),
            commit_hash: std::env::var(ENV_GIT_COMMIT).unwrap_or_default(),
        }
    }

    /// Look up a template field by its placeholder name.
    ///
    /// Returns `None` for names outside the fixed schema; an empty value is
    /// a valid `Some("")`.
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        match name {
            "Workflow" => Some(&self.workflow),
            "Branch" => Some(&self.branch),
            "CommitHash" => Some(&self.commit_hash),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_reads_all_three_variables() {
        temp_env::with_vars(
            [
                (ENV_WORKFLOW_ID, Some("primary")),
                (ENV_GIT_BRANCH, Some("main")),
                (ENV_GIT_COMMIT, Some("abc123")),
            ],
            || {
                let ctx = BuildContext::from_env();
                assert_eq!(ctx.workflow, "primary");
                assert_eq!(ctx.branch, "main");
                assert_eq!(ctx.commit_hash, "abc123");
            },
        );
    }

    #[test]
    fn from_env_defaults_missing_variables_to_empty() {
        temp_env::with_vars(
            [
                (ENV_WORKFLOW_ID, None::<&str>),
                (ENV_GIT_BRANCH, Some("feature/x")),
                (ENV_GIT_COMMIT, None),
            ],
            || {
                let ctx = BuildContext::from_env();
                assert_eq!(ctx.workflow, "");
                assert_eq!(ctx.branch, "feature/x");
                assert_eq!(ctx.commit_hash, "");
            },
        );
    }

    #[test]
    fn field_lookup_is_schema_bound() {
        let ctx = BuildContext {
            workflow: "deploy".into(),
            branch: String::new(),
            commit_hash: "f00d".into(),
        };
        assert_eq!(ctx.field("Workflow"), Some("deploy"));
        assert_eq!(ctx.field("Branch"), Some(""));
        assert_eq!(ctx.field("CommitHash"), Some("f00d"));
        assert_eq!(ctx.field("branch"), None);
        assert_eq!(ctx.field("Commit"), None);
    }
}
