use std::fmt;

use tracing::warn;

use crate::document::{Guid, LocalId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    UnknownComponentType,
    UnsupportedComponent,
    MissingTransform,
    MissingRecord,
    UnresolvedReference,
    MalformedOverride,
    UnsupportedOverride,
    MultipleMaterials,
    MeshLookupFailed,
    UnknownScript,
    InvalidHierarchy,
    IgnoredModelOverride,
    RootOrderMismatch,
}

/// Non-fatal problem found while resolving. The offending record or override
/// was skipped; resolution carried on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub code: IssueCode,
    pub local_id: LocalId,
    /// Template being instanced when the issue was found; `None` at scene level.
    pub template: Option<Guid>,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.template {
            Some(template) => write!(
                f,
                "{:?}: {} (local_id={}, template={})",
                self.code, self.message, self.local_id, template
            ),
            None => write!(
                f,
                "{:?}: {} (local_id={})",
                self.code, self.message, self.local_id
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    issues: Vec<Issue>,
    scopes: Vec<Guid>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, code: IssueCode, local_id: LocalId, message: impl Into<String>) {
        let issue = Issue {
            code,
            local_id,
            template: self.scopes.last().cloned(),
            message: message.into(),
        };
        warn!(
            code = ?issue.code,
            local_id = issue.local_id.0,
            template = issue.template.as_ref().map(Guid::as_str).unwrap_or("-"),
            message = %issue.message,
            "resolve_issue_reported"
        );
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }

    pub fn count(&self, code: IssueCode) -> usize {
        self.issues.iter().filter(|issue| issue.code == code).count()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub(crate) fn in_scope(&self, template: &Guid) -> bool {
        self.scopes.contains(template)
    }

    pub(crate) fn push_scope(&mut self, template: Guid) {
        self.scopes.push(template);
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn scope_chain(&self) -> Vec<Guid> {
        self.scopes.clone()
    }
}
