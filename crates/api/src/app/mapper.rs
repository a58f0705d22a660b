//! Conversions between stored records and view models.
//!
//! | Direction | Ignored |
//! |-----------|---------|
//! | `Camp` → `CampModel` | `camp_id`; a blank location is omitted |
//! | `CampModel` → `Camp` | `talks` (talks are only created through the talk endpoints) |
//! | `Talk` → `TalkModel` | `camp_id`, `speaker_id` (the resolved `speaker` is mapped instead) |
//! | `TalkModel` → `Talk` | `talk_id`, `camp_id`, `speaker_id`, `speaker` |
//! | `Speaker` ↔ `SpeakerModel` | nothing |
//!
//! Relation fields on `Talk` are never taken from a client. Handlers set them
//! from records they resolved through the repository.

use codecamp_core::{Camp, Location, Speaker, Talk, ValueObject};

use crate::app::dto::{CampModel, LocationModel, SpeakerModel, TalkModel};

// -------------------------
// Camp
// -------------------------

pub fn camp_to_model(camp: &Camp) -> CampModel {
    CampModel {
        name: camp.name.clone(),
        moniker: camp.moniker.clone(),
        location: (!camp.location.is_blank()).then(|| location_to_model(&camp.location)),
        event_date: camp.event_date,
        length: camp.length,
        talks: camp.talks.iter().map(talk_to_model).collect(),
    }
}

/// A new, unpersisted camp.
pub fn camp_from_model(model: CampModel) -> Camp {
    let mut camp = Camp::new(String::new(), String::new());
    apply_camp_model(model, &mut camp);
    camp
}

/// Overwrite `camp` with the model's fields, keeping its key and talks.
pub fn apply_camp_model(model: CampModel, camp: &mut Camp) {
    camp.name = model.name;
    camp.moniker = model.moniker;
    camp.location = model.location.map(location_from_model).unwrap_or_default();
    camp.event_date = model.event_date;
    camp.length = model.length;
}

pub fn location_to_model(location: &Location) -> LocationModel {
    LocationModel {
        venue_name: location.venue_name.clone(),
        address1: location.address1.clone(),
        address2: location.address2.clone(),
        address3: location.address3.clone(),
        city_town: location.city_town.clone(),
        state_province: location.state_province.clone(),
        postal_code: location.postal_code.clone(),
        country: location.country.clone(),
    }
}

pub fn location_from_model(model: LocationModel) -> Location {
    Location {
        venue_name: model.venue_name,
        address1: model.address1,
        address2: model.address2,
        address3: model.address3,
        city_town: model.city_town,
        state_province: model.state_province,
        postal_code: model.postal_code,
        country: model.country,
    }
}

// -------------------------
// Talk
// -------------------------

pub fn talk_to_model(talk: &Talk) -> TalkModel {
    TalkModel {
        talk_id: talk.talk_id,
        title: talk.title.clone(),
        r#abstract: talk.r#abstract.clone(),
        level: talk.level,
        speaker: talk.speaker.as_ref().map(speaker_to_model),
    }
}

/// A new, unpersisted talk with no camp and no speaker.
pub fn talk_from_model(model: TalkModel) -> Talk {
    let mut talk = Talk::default();
    apply_talk_model(model, &mut talk);
    talk
}

/// Overwrite the talk's own fields. Key and relations are left untouched.
pub fn apply_talk_model(model: TalkModel, talk: &mut Talk) {
    talk.title = model.title;
    talk.r#abstract = model.r#abstract;
    talk.level = model.level;
}

// -------------------------
// Speaker
// -------------------------

pub fn speaker_to_model(speaker: &Speaker) -> SpeakerModel {
    SpeakerModel {
        speaker_id: speaker.speaker_id,
        first_name: speaker.first_name.clone(),
        last_name: speaker.last_name.clone(),
        middle_name: speaker.middle_name.clone(),
        company: speaker.company.clone(),
        company_url: speaker.company_url.clone(),
        blog_url: speaker.blog_url.clone(),
        twitter: speaker.twitter.clone(),
        github: speaker.github.clone(),
    }
}

pub fn speaker_from_model(model: SpeakerModel) -> Speaker {
    Speaker {
        speaker_id: model.speaker_id,
        first_name: model.first_name,
        last_name: model.last_name,
        middle_name: model.middle_name,
        company: model.company,
        company_url: model.company_url,
        blog_url: model.blog_url,
        twitter: model.twitter,
        github: model.github,
    }
}
