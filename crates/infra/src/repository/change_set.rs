use codecamp_core::{Camp, Talk};

/// A record that can be staged for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Camp(Camp),
    Talk(Talk),
}

impl From<Camp> for Record {
    fn from(value: Camp) -> Self {
        Self::Camp(value)
    }
}

impl From<Talk> for Record {
    fn from(value: Talk) -> Self {
        Self::Talk(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub record: Record,
}

/// Changes staged by one request, in the order they will be applied.
///
/// Staging performs no I/O. Nothing is written until the set is handed to
/// `CampRepository::save_changes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new record. Its key is assigned on commit.
    pub fn add(&mut self, record: impl Into<Record>) {
        self.push(ChangeKind::Add, record.into());
    }

    /// Stage an overwrite of an existing record, matched by key.
    pub fn update(&mut self, record: impl Into<Record>) {
        self.push(ChangeKind::Update, record.into());
    }

    /// Stage removal of an existing record, matched by key.
    pub fn delete(&mut self, record: impl Into<Record>) {
        self.push(ChangeKind::Delete, record.into());
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    fn push(&mut self, kind: ChangeKind, record: Record) {
        self.changes.push(Change { kind, record });
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Outcome of a successful `save_changes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    rows_affected: u64,
    added: Vec<Record>,
}

impl Commit {
    pub fn new(rows_affected: u64, added: Vec<Record>) -> Self {
        Self { rows_affected, added }
    }

    /// Whether the commit affected at least one row.
    pub fn succeeded(&self) -> bool {
        self.rows_affected > 0
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Added camps, with store-assigned keys, in staging order.
    pub fn added_camps(&self) -> impl Iterator<Item = &Camp> {
        self.added.iter().filter_map(|r| match r {
            Record::Camp(c) => Some(c),
            Record::Talk(_) => None,
        })
    }

    /// Added talks, with store-assigned keys, in staging order.
    pub fn added_talks(&self) -> impl Iterator<Item = &Talk> {
        self.added.iter().filter_map(|r| match r {
            Record::Talk(t) => Some(t),
            Record::Camp(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_preserves_order() {
        let mut changes = ChangeSet::new();
        changes.add(Camp::new("A", "a"));
        changes.delete(Camp::new("B", "b"));
        changes.update(Talk::new("t", "abstract", 100));

        let kinds: Vec<_> = changes.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Add, ChangeKind::Delete, ChangeKind::Update]);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn empty_commit_did_not_succeed() {
        assert!(!Commit::default().succeeded());
        assert!(Commit::new(2, vec![]).succeeded());
    }

    #[test]
    fn commit_filters_added_records_by_kind() {
        let commit = Commit::new(
            2,
            vec![
                Record::Camp(Camp::new("A", "a")),
                Record::Talk(Talk::new("t", "abstract", 100)),
            ],
        );
        assert_eq!(commit.added_camps().count(), 1);
        assert_eq!(commit.added_talks().next().map(|t| t.title.as_str()), Some("t"));
    }
}
