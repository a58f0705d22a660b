use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::instrument;

use codecamp_core::{Camp, CampId, Entity, Speaker, SpeakerId, Talk, TalkId};

use super::change_set::{Change, ChangeKind, ChangeSet, Commit, Record};
use super::r#trait::{CampRepository, RepositoryError, RepositoryResult};
use crate::seed::SampleData;

/// Normalized tables: camps and talks reference each other by key only.
#[derive(Debug, Clone, Default)]
struct Tables {
    camps: BTreeMap<CampId, Camp>,
    talks: BTreeMap<TalkId, Talk>,
    speakers: BTreeMap<SpeakerId, Speaker>,
    last_camp_id: i32,
    last_talk_id: i32,
    last_speaker_id: i32,
}

impl Tables {
    fn camp_by_moniker(&self, moniker: &str) -> Option<&Camp> {
        self.camps.values().find(|c| c.moniker == moniker)
    }

    fn hydrate_talk(&self, talk: &Talk, include_speaker: bool) -> Talk {
        let mut talk = talk.clone();
        if include_speaker {
            talk.speaker = talk.speaker_id.and_then(|id| self.speakers.get(&id).cloned());
        }
        talk
    }

    fn talks_for(&self, camp_id: CampId, include_speakers: bool) -> Vec<Talk> {
        let mut talks: Vec<Talk> = self
            .talks
            .values()
            .filter(|t| t.camp_id == Some(camp_id))
            .map(|t| self.hydrate_talk(t, include_speakers))
            .collect();
        talks.sort_by(|a, b| a.title.cmp(&b.title));
        talks
    }

    fn hydrate_camp(&self, camp: &Camp, include_talks: bool) -> Camp {
        let mut camp = camp.clone();
        if include_talks {
            camp.talks = self.talks_for(camp.camp_id, true);
        }
        camp
    }

    fn camps_where(&self, pred: impl Fn(&Camp) -> bool, include_talks: bool) -> Vec<Camp> {
        let mut camps: Vec<Camp> = self
            .camps
            .values()
            .filter(|c| pred(c))
            .map(|c| self.hydrate_camp(c, include_talks))
            .collect();
        // Stable sort keeps key order among camps on the same date.
        camps.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        camps
    }

    fn check_moniker_free(&self, moniker: &str, owner: Option<CampId>) -> RepositoryResult<()> {
        match self.camp_by_moniker(moniker) {
            Some(existing) if Some(existing.camp_id) != owner => Err(RepositoryError::Conflict(
                format!("moniker '{moniker}' is already in use"),
            )),
            _ => Ok(()),
        }
    }

    fn check_talk_relations(&self, talk: &Talk) -> RepositoryResult<()> {
        if !talk.camp_id.is_some_and(|id| self.camps.contains_key(&id)) {
            return Err(RepositoryError::Constraint(
                "talk must belong to an existing camp".into(),
            ));
        }
        if !talk.speaker_id.is_some_and(|id| self.speakers.contains_key(&id)) {
            return Err(RepositoryError::Constraint(
                "talk must reference an existing speaker".into(),
            ));
        }
        Ok(())
    }

    /// Apply one change; returns the number of rows affected.
    fn apply(&mut self, change: Change, added: &mut Vec<Record>) -> RepositoryResult<u64> {
        match (change.kind, change.record) {
            (ChangeKind::Add, Record::Camp(mut camp)) => {
                self.check_moniker_free(&camp.moniker, None)?;
                self.last_camp_id += 1;
                camp.camp_id = CampId::new(self.last_camp_id);
                camp.talks.clear();
                self.camps.insert(camp.camp_id, camp.clone());
                added.push(Record::Camp(camp));
                Ok(1)
            }
            (ChangeKind::Update, Record::Camp(camp)) => {
                if !self.camps.contains_key(camp.id()) {
                    return Ok(0);
                }
                self.check_moniker_free(&camp.moniker, Some(camp.camp_id))?;
                let stored = Camp {
                    talks: Vec::new(),
                    ..camp
                };
                self.camps.insert(stored.camp_id, stored);
                Ok(1)
            }
            (ChangeKind::Delete, Record::Camp(camp)) => {
                if self.camps.remove(camp.id()).is_none() {
                    return Ok(0);
                }
                let before = self.talks.len();
                self.talks.retain(|_, t| t.camp_id != Some(camp.camp_id));
                Ok(1 + (before - self.talks.len()) as u64)
            }
            (ChangeKind::Add, Record::Talk(mut talk)) => {
                self.check_talk_relations(&talk)?;
                self.last_talk_id += 1;
                talk.talk_id = TalkId::new(self.last_talk_id);
                self.talks.insert(
                    talk.talk_id,
                    Talk {
                        speaker: None,
                        ..talk.clone()
                    },
                );
                added.push(Record::Talk(talk));
                Ok(1)
            }
            (ChangeKind::Update, Record::Talk(talk)) => {
                if !self.talks.contains_key(talk.id()) {
                    return Ok(0);
                }
                self.check_talk_relations(&talk)?;
                self.talks.insert(talk.talk_id, Talk { speaker: None, ..talk });
                Ok(1)
            }
            (ChangeKind::Delete, Record::Talk(talk)) => {
                Ok(u64::from(self.talks.remove(talk.id()).is_some()))
            }
        }
    }
}

/// In-memory repository for tests/dev.
///
/// A commit applies to a copy of the tables and swaps it in only when every
/// change succeeded, so a failed commit leaves the store untouched.
#[derive(Debug, Default)]
pub struct InMemoryCampRepository {
    tables: RwLock<Tables>,
}

impl InMemoryCampRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with `data`.
    pub fn with_data(data: SampleData) -> RepositoryResult<Self> {
        let repo = Self::new();
        repo.seed(data)?;
        Ok(repo)
    }

    /// Load `data`, assigning keys. Speakers can only enter the store this way.
    pub fn seed(&self, data: SampleData) -> RepositoryResult<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RepositoryError::Database("store lock poisoned".into()))?;

        let mut speaker_ids = Vec::with_capacity(data.speakers.len());
        for mut speaker in data.speakers {
            tables.last_speaker_id += 1;
            speaker.speaker_id = SpeakerId::new(tables.last_speaker_id);
            speaker_ids.push(speaker.speaker_id);
            tables.speakers.insert(speaker.speaker_id, speaker);
        }

        for sample in data.camps {
            tables.last_camp_id += 1;
            let camp_id = CampId::new(tables.last_camp_id);
            tables.camps.insert(
                camp_id,
                Camp {
                    camp_id,
                    talks: Vec::new(),
                    ..sample.camp
                },
            );
            for (speaker, mut talk) in sample.talks {
                tables.last_talk_id += 1;
                talk.talk_id = TalkId::new(tables.last_talk_id);
                talk.camp_id = Some(camp_id);
                talk.speaker_id = speaker_ids.get(speaker).copied();
                talk.speaker = None;
                tables.talks.insert(talk.talk_id, talk);
            }
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> RepositoryResult<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::Database("store lock poisoned".into()))?;
        Ok(f(&tables))
    }
}

#[async_trait]
impl CampRepository for InMemoryCampRepository {
    #[instrument(skip(self))]
    async fn get_all_camps(&self, include_talks: bool) -> RepositoryResult<Vec<Camp>> {
        self.read(|t| t.camps_where(|_| true, include_talks))
    }

    #[instrument(skip(self))]
    async fn get_camp(&self, moniker: &str, include_talks: bool) -> RepositoryResult<Option<Camp>> {
        self.read(|t| t.camp_by_moniker(moniker).map(|c| t.hydrate_camp(c, include_talks)))
    }

    #[instrument(skip(self))]
    async fn get_camps_by_event_date(
        &self,
        date: NaiveDate,
        include_talks: bool,
    ) -> RepositoryResult<Vec<Camp>> {
        self.read(|t| t.camps_where(|c| c.event_date == date, include_talks))
    }

    #[instrument(skip(self))]
    async fn get_talks_by_moniker(
        &self,
        moniker: &str,
        include_speakers: bool,
    ) -> RepositoryResult<Vec<Talk>> {
        self.read(|t| match t.camp_by_moniker(moniker) {
            Some(camp) => t.talks_for(camp.camp_id, include_speakers),
            None => Vec::new(),
        })
    }

    #[instrument(skip(self))]
    async fn get_talk_by_moniker(
        &self,
        moniker: &str,
        talk_id: TalkId,
        include_speaker: bool,
    ) -> RepositoryResult<Option<Talk>> {
        self.read(|t| {
            let camp = t.camp_by_moniker(moniker)?;
            t.talks
                .get(&talk_id)
                .filter(|talk| talk.camp_id == Some(camp.camp_id))
                .map(|talk| t.hydrate_talk(talk, include_speaker))
        })
    }

    #[instrument(skip(self))]
    async fn get_speakers_by_moniker(&self, moniker: &str) -> RepositoryResult<Vec<Speaker>> {
        self.read(|t| {
            let Some(camp) = t.camp_by_moniker(moniker) else {
                return Vec::new();
            };
            let mut ids: Vec<SpeakerId> = t
                .talks
                .values()
                .filter(|talk| talk.camp_id == Some(camp.camp_id))
                .filter_map(|talk| talk.speaker_id)
                .collect();
            ids.sort();
            ids.dedup();
            sorted_speakers(ids.iter().filter_map(|id| t.speakers.get(id).cloned()).collect())
        })
    }

    #[instrument(skip(self))]
    async fn get_speaker(&self, speaker_id: SpeakerId) -> RepositoryResult<Option<Speaker>> {
        self.read(|t| t.speakers.get(&speaker_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_all_speakers(&self) -> RepositoryResult<Vec<Speaker>> {
        self.read(|t| sorted_speakers(t.speakers.values().cloned().collect()))
    }

    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn save_changes(&self, changes: ChangeSet) -> RepositoryResult<Commit> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RepositoryError::Database("store lock poisoned".into()))?;

        let mut working = tables.clone();
        let mut added = Vec::new();
        let mut rows = 0;
        for change in changes {
            rows += working.apply(change, &mut added)?;
        }

        *tables = working;
        Ok(Commit::new(rows, added))
    }
}

fn sorted_speakers(mut speakers: Vec<Speaker>) -> Vec<Speaker> {
    speakers.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
    });
    speakers
}
