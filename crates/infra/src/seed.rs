//! Sample data for development stores.

use chrono::NaiveDate;

use codecamp_core::{Camp, Location, Speaker, Talk};

/// A camp together with its talks. `speaker` indexes into [`SampleData::speakers`].
#[derive(Debug, Clone)]
pub struct SampleCamp {
    pub camp: Camp,
    pub talks: Vec<(usize, Talk)>,
}

/// Records loaded into an empty store. Keys are assigned by the store.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub speakers: Vec<Speaker>,
    pub camps: Vec<SampleCamp>,
}

pub fn sample_data() -> SampleData {
    let shawn = Speaker {
        first_name: "Shawn".to_string(),
        last_name: "Wildermuth".to_string(),
        company: Some("Wilder Minds LLC".to_string()),
        company_url: Some("http://wilderminds.com".to_string()),
        blog_url: Some("http://wildermuth.com".to_string()),
        twitter: Some("shawnwildermuth".to_string()),
        github: Some("shawnwildermuth".to_string()),
        ..Speaker::default()
    };
    let resa = Speaker {
        first_name: "Resa".to_string(),
        last_name: "Wildermuth".to_string(),
        company: Some("Wilder Minds LLC".to_string()),
        company_url: Some("http://wilderminds.com".to_string()),
        blog_url: Some("http://shawnandresa.com".to_string()),
        twitter: Some("resawildermuth".to_string()),
        github: Some("resawildermuth".to_string()),
        ..Speaker::default()
    };

    let mut camp = Camp::new("Atlanta Code Camp", "ATL2018");
    camp.event_date = NaiveDate::from_ymd_opt(2018, 10, 18).unwrap_or_default();
    camp.length = 1;
    camp.location = Location {
        venue_name: Some("Atlanta Convention Center".to_string()),
        address1: Some("123 Main Street".to_string()),
        city_town: Some("Atlanta".to_string()),
        state_province: Some("GA".to_string()),
        postal_code: Some("12345".to_string()),
        country: Some("USA".to_string()),
        ..Location::default()
    };

    SampleData {
        speakers: vec![shawn, resa],
        camps: vec![SampleCamp {
            camp,
            talks: vec![
                (
                    0,
                    Talk::new(
                        "Entity Framework From Scratch",
                        "Entity Framework from scratch in an hour. Probably cover it all",
                        100,
                    ),
                ),
                (
                    1,
                    Talk::new(
                        "Writing Sample Data Made Easy",
                        "Thinking of good sample data examples is tiring.",
                        200,
                    ),
                ),
            ],
        }],
    }
}
