//! Normalized issue state: one record per id, three ordered id views

use std::collections::{HashMap, HashSet};
use std::fmt;

use civic_domain::{Issue, IssueId, IssuePatch, VoteTally};

/// Named projections of the issue set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueView {
    /// Global list, optionally filtered (`issues`)
    All,
    /// Issues reported by the signed-in user (`myIssues`)
    Mine,
    /// Geo-filtered issues (`nearbyIssues`)
    Nearby,
}

impl IssueView {
    pub const EVERY: [Self; 3] = [Self::All, Self::Mine, Self::Nearby];

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::All => 0,
            Self::Mine => 1,
            Self::Nearby => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "issues",
            Self::Mine => "myIssues",
            Self::Nearby => "nearbyIssues",
        }
    }
}

impl fmt::Display for IssueView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical records plus the ordered membership of each view
///
/// Every mutation touches the single record for an id, so all views that
/// list the id observe the same values. Records that no view references are
/// dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueSet {
    records: HashMap<IssueId, Issue>,
    views: [Vec<IssueId>; 3],
}

impl IssueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a view wholesale with a freshly fetched list.
    ///
    /// Duplicate ids within `issues` keep their first position. Returned
    /// records become canonical for every view.
    pub fn replace_view(&mut self, view: IssueView, issues: Vec<Issue>) {
        let mut seen = HashSet::with_capacity(issues.len());
        let mut order = Vec::with_capacity(issues.len());

        for issue in issues {
            if seen.insert(issue.id.clone()) {
                order.push(issue.id.clone());
            }
            self.records.insert(issue.id.clone(), issue);
        }

        self.views[view.index()] = order;
        self.prune();
    }

    /// Put an issue at the head of a view, moving it if already listed.
    pub fn prepend(&mut self, view: IssueView, issue: Issue) {
        let ids = &mut self.views[view.index()];
        ids.retain(|id| *id != issue.id);
        ids.insert(0, issue.id.clone());
        self.records.insert(issue.id.clone(), issue);
    }

    /// Replace the canonical record if any view lists it.
    ///
    /// Returns `false` (and stores nothing) for ids no view displays.
    pub fn refresh_record(&mut self, issue: Issue) -> bool {
        match self.records.get_mut(&issue.id) {
            Some(existing) => {
                *existing = issue;
                true
            }
            None => false,
        }
    }

    /// Merge a patch into the canonical record. Returns `true` on change.
    pub fn patch(&mut self, id: &IssueId, patch: &IssuePatch) -> bool {
        self.records.get_mut(id).is_some_and(|issue| issue.apply_patch(patch))
    }

    /// Overwrite the vote fields of the canonical record.
    pub fn set_votes(&mut self, id: &IssueId, tally: &VoteTally) -> bool {
        match self.records.get_mut(id) {
            Some(issue) => {
                issue.apply_votes(tally);
                true
            }
            None => false,
        }
    }

    /// Remove an id from every view. Absent ids are a no-op.
    pub fn remove(&mut self, id: &IssueId) -> bool {
        let mut removed = self.records.remove(id).is_some();
        for ids in &mut self.views {
            let before = ids.len();
            ids.retain(|candidate| candidate != id);
            removed |= ids.len() != before;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.records.clear();
        for ids in &mut self.views {
            ids.clear();
        }
    }

    pub fn get(&self, id: &IssueId) -> Option<&Issue> {
        self.records.get(id)
    }

    pub fn contains(&self, view: IssueView, id: &IssueId) -> bool {
        self.views[view.index()].contains(id)
    }

    pub fn len(&self, view: IssueView) -> usize {
        self.views[view.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Materialize a view in display order.
    pub fn view(&self, view: IssueView) -> Vec<Issue> {
        self.views[view.index()].iter().filter_map(|id| self.records.get(id)).cloned().collect()
    }

    pub fn ids(&self, view: IssueView) -> &[IssueId] {
        &self.views[view.index()]
    }

    fn prune(&mut self) {
        let views = &self.views;
        self.records.retain(|id, _| views.iter().any(|ids| ids.contains(id)));
    }
}
