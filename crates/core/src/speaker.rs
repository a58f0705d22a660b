use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::SpeakerId;

/// A person presenting talks. Read-only from the API's point of view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub speaker_id: SpeakerId,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company: Option<String>,
    pub company_url: Option<String>,
    pub blog_url: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}

impl Speaker {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }
}

impl Entity for Speaker {
    type Id = SpeakerId;

    fn id(&self) -> &Self::Id {
        &self.speaker_id
    }

    fn is_persisted(&self) -> bool {
        self.speaker_id.is_assigned()
    }
}
