use brokerdesk_core::RecordId;
use brokerdesk_domain::Resource;
use chrono::Utc;

/// Identity of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKey {
    /// Speculative entry created locally, not yet confirmed.
    Temporary(RecordId),
    /// Entry known to the data source.
    Persisted(RecordId),
}

impl EntryKey {
    /// Returns the id carried by the key.
    #[must_use]
    pub fn id(&self) -> RecordId {
        match self {
            Self::Temporary(id) | Self::Persisted(id) => *id,
        }
    }

    /// Returns whether the entry awaits confirmation.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

/// One cached record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    /// Entry identity.
    pub key: EntryKey,
    /// Record value.
    pub value: T,
}

/// Lifecycle of one optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Speculative change applied, request in flight.
    Pending,
    /// Server response reconciled into the cache.
    Committed,
    /// Snapshot restored after a failure.
    RolledBack,
}

/// Speculative change a mutation applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Inserted a temporary entry.
    Create {
        /// Locally generated id of the temporary entry.
        temporary_id: RecordId,
    },
    /// Patched a persisted entry.
    Update {
        /// Patched record.
        id: RecordId,
    },
    /// Removed a persisted entry.
    Delete {
        /// Removed record.
        id: RecordId,
    },
}

/// Handle of one mutation, holding the pre-mutation snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    kind: MutationKind,
    state: MutationState,
    snapshot: Vec<Entry<T>>,
}

impl<T> Mutation<T> {
    /// Returns the speculative change.
    #[must_use]
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> MutationState {
        self.state
    }
}

/// Cached collection supporting snapshot, speculative change, reconcile
/// and rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticCollection<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for OptimisticCollection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Resource> OptimisticCollection<T> {
    /// Wraps records fetched from the data source.
    #[must_use]
    pub fn from_records(records: Vec<T>) -> Self {
        Self {
            entries: records
                .into_iter()
                .map(|value| Entry {
                    key: EntryKey::Persisted(value.id()),
                    value,
                })
                .collect(),
        }
    }

    /// Returns the entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    /// Returns the record values in display order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.entries.iter().map(|entry| entry.value.clone()).collect()
    }

    /// Returns the entries awaiting confirmation.
    #[must_use]
    pub fn temporary_entries(&self) -> Vec<&Entry<T>> {
        self.entries
            .iter()
            .filter(|entry| entry.key.is_temporary())
            .collect()
    }

    /// Appends a temporary entry built from the draft.
    pub fn begin_create(&mut self, draft: T::Draft) -> Mutation<T> {
        let snapshot = self.entries.clone();
        let temporary_id = RecordId::new();
        self.entries.push(Entry {
            key: EntryKey::Temporary(temporary_id),
            value: T::from_draft(temporary_id, draft, Utc::now()),
        });

        Mutation {
            kind: MutationKind::Create { temporary_id },
            state: MutationState::Pending,
            snapshot,
        }
    }

    /// Applies the patch to the cached entry, if present.
    pub fn begin_update(&mut self, id: RecordId, patch: &T::Patch) -> Mutation<T> {
        let snapshot = self.entries.clone();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key.id() == id) {
            entry.value.apply_patch(patch, Utc::now());
        }

        Mutation {
            kind: MutationKind::Update { id },
            state: MutationState::Pending,
            snapshot,
        }
    }

    /// Removes the cached entry, if present.
    pub fn begin_delete(&mut self, id: RecordId) -> Mutation<T> {
        let snapshot = self.entries.clone();
        self.entries.retain(|entry| entry.key.id() != id);

        Mutation {
            kind: MutationKind::Delete { id },
            state: MutationState::Pending,
            snapshot,
        }
    }

    /// Reconciles the server's answer.
    ///
    /// Creates replace the temporary entry with the server record, never
    /// leaving two entries with the same real id. Updates replace the
    /// speculative value. `record` is `None` for deletes.
    pub fn commit(&mut self, mutation: &mut Mutation<T>, record: Option<T>) {
        if mutation.state != MutationState::Pending {
            return;
        }

        match (mutation.kind, record) {
            (MutationKind::Create { temporary_id }, Some(record)) => {
                let id = record.id();
                let position = self
                    .entries
                    .iter()
                    .position(|entry| entry.key == EntryKey::Temporary(temporary_id));
                self.entries.retain(|entry| {
                    entry.key != EntryKey::Temporary(temporary_id)
                        && entry.key != EntryKey::Persisted(id)
                });
                let replacement = Entry {
                    key: EntryKey::Persisted(id),
                    value: record,
                };
                match position {
                    Some(position) if position <= self.entries.len() => {
                        self.entries.insert(position, replacement);
                    }
                    _ => self.entries.push(replacement),
                }
            }
            (MutationKind::Update { id }, Some(record)) => {
                match self.entries.iter_mut().find(|entry| entry.key.id() == id) {
                    Some(entry) => {
                        entry.key = EntryKey::Persisted(record.id());
                        entry.value = record;
                    }
                    None => self.entries.push(Entry {
                        key: EntryKey::Persisted(record.id()),
                        value: record,
                    }),
                }
            }
            (MutationKind::Delete { id }, _) => {
                self.entries.retain(|entry| entry.key.id() != id);
            }
            (_, None) => {}
        }

        mutation.state = MutationState::Committed;
    }

    /// Restores the pre-mutation snapshot exactly.
    pub fn rollback(&mut self, mutation: &mut Mutation<T>) {
        if mutation.state != MutationState::Pending {
            return;
        }

        self.entries = mutation.snapshot.clone();
        mutation.state = MutationState::RolledBack;
    }
}
