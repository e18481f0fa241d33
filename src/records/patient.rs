use serde::{Deserialize, Serialize};
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub doctor_id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    /// Free text; drives the vitals profile.
    pub primary_condition: String,
    pub history: String,
}
/// Roster used when no saved one exists.
pub fn demo_roster() -> Vec<Patient> {
    vec![Patient {
        id: "pat-001".into(),
        doctor_id: "doc-001".into(),
        name: "John Smith".into(),
        age: 72,
        gender: "Male".into(),
        primary_condition: "Acute Myocardial Infarction".into(),
        history: "History of hypertension, hyperlipidemia, and a 30-pack-year smoking history."
            .into(),
    }]
}
