use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{CampId, SpeakerId, TalkId};
use crate::speaker::Speaker;

/// A talk given at a camp by one speaker.
///
/// `camp_id` and `speaker_id` are the relation keys. `speaker` is only
/// populated when the read that produced this record asked for speakers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub talk_id: TalkId,
    pub camp_id: Option<CampId>,
    pub speaker_id: Option<SpeakerId>,
    pub speaker: Option<Speaker>,
    pub title: String,
    pub r#abstract: String,
    pub level: i32,
}

impl Talk {
    pub fn new(title: impl Into<String>, r#abstract: impl Into<String>, level: i32) -> Self {
        Self {
            title: title.into(),
            r#abstract: r#abstract.into(),
            level,
            ..Self::default()
        }
    }

    /// Point this talk at its owning camp.
    pub fn assign_camp(&mut self, camp_id: CampId) {
        self.camp_id = Some(camp_id);
    }

    /// Point this talk at an already-resolved speaker.
    pub fn attach_speaker(&mut self, speaker: Speaker) {
        self.speaker_id = Some(speaker.speaker_id);
        self.speaker = Some(speaker);
    }
}

impl Entity for Talk {
    type Id = TalkId;

    fn id(&self) -> &Self::Id {
        &self.talk_id
    }

    fn is_persisted(&self) -> bool {
        self.talk_id.is_assigned()
    }
}
