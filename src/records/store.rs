use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::records::error::RecordError;
use crate::records::patient::{demo_roster, Patient};

/// CRUD over the patient roster plus each doctor's active patient.
pub trait PatientRepository {
    fn list(&self) -> Vec<Patient>;
    fn get(&self, id: &str) -> Option<Patient>;
    fn add(&mut self, patient: Patient) -> Result<(), RecordError>;
    fn update(&mut self, patient: Patient) -> Result<(), RecordError>;
    fn remove(&mut self, id: &str) -> Result<Patient, RecordError>;
    /// `None` clears the doctor's selection.
    fn set_active(&mut self, doctor_id: &str, patient_id: Option<&str>) -> Result<(), RecordError>;
    fn active_for(&self, doctor_id: &str) -> Option<Patient>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryPatientStore {
    patients: Vec<Patient>,
    #[serde(default)]
    active: BTreeMap<String, String>, // doctor id -> patient id
}

impl InMemoryPatientStore {
    pub fn new(patients: impl IntoIterator<Item = Patient>) -> Self {
        Self {
            patients: patients.into_iter().collect(),
            active: BTreeMap::new(),
        }
    }

    pub fn with_demo_roster() -> Self {
        Self::new(demo_roster())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.patients.iter().position(|p| p.id == id)
    }
}

impl PatientRepository for InMemoryPatientStore {
    fn list(&self) -> Vec<Patient> {
        self.patients.clone()
    }

    fn get(&self, id: &str) -> Option<Patient> {
        self.position(id).map(|idx| self.patients[idx].clone())
    }

    fn add(&mut self, patient: Patient) -> Result<(), RecordError> {
        if self.position(&patient.id).is_some() {
            return Err(RecordError::Duplicate(patient.id));
        }
        self.patients.push(patient);
        Ok(())
    }

    fn update(&mut self, patient: Patient) -> Result<(), RecordError> {
        let idx = self
            .position(&patient.id)
            .ok_or_else(|| RecordError::NotFound(patient.id.clone()))?;
        self.patients[idx] = patient;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<Patient, RecordError> {
        let idx = self
            .position(id)
            .ok_or_else(|| RecordError::NotFound(id.to_owned()))?;
        self.active.retain(|_, patient_id| patient_id != id);
        Ok(self.patients.remove(idx))
    }

    fn set_active(&mut self, doctor_id: &str, patient_id: Option<&str>) -> Result<(), RecordError> {
        match patient_id {
            None => {
                self.active.remove(doctor_id);
            }
            Some(id) => {
                if self.position(id).is_none() {
                    return Err(RecordError::NotFound(id.to_owned()));
                }
                self.active.insert(doctor_id.to_owned(), id.to_owned());
            }
        }
        Ok(())
    }

    fn active_for(&self, doctor_id: &str) -> Option<Patient> {
        self.active.get(doctor_id).and_then(|id| self.get(id))
    }
}

/// `patients.json` -> `patients.json.corrupt`
fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

/// Roster persisted as one JSON document, rewritten after every change:
/// `{"patients": [...], "active": {doctor id: patient id}}`.
pub struct JsonFilePatientStore {
    path: PathBuf,
    inner: InMemoryPatientStore,
}

impl JsonFilePatientStore {
    /// Opens the roster at `path`. A missing file is seeded with the demo
    /// roster. An unparsable document is renamed to `<path>.corrupt` and
    /// replaced by the demo roster.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let store = Self {
                path,
                inner: InMemoryPatientStore::with_demo_roster(),
            };
            store.save()?;
            info!("seeded new roster at {}", store.path.display());
            return Ok(store);
        }
        let text = fs::read_to_string(&path).map_err(|source| RecordError::Io {
            path: path.clone(),
            source,
        })?;
        match serde_json::from_str(&text) {
            Ok(inner) => Ok(Self { path, inner }),
            Err(err) => {
                let aside = corrupt_path(&path);
                warn!(
                    "roster {} is corrupt ({err}); moved to {}, using demo roster",
                    path.display(),
                    aside.display()
                );
                fs::rename(&path, &aside).map_err(|source| RecordError::Io {
                    path: aside.clone(),
                    source,
                })?;
                let store = Self {
                    path,
                    inner: InMemoryPatientStore::with_demo_roster(),
                };
                store.save()?;
                Ok(store)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(&self.inner)?;
        fs::write(&self.path, json).map_err(|source| RecordError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PatientRepository for JsonFilePatientStore {
    fn list(&self) -> Vec<Patient> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> Option<Patient> {
        self.inner.get(id)
    }

    fn add(&mut self, patient: Patient) -> Result<(), RecordError> {
        self.inner.add(patient)?;
        self.save()
    }

    fn update(&mut self, patient: Patient) -> Result<(), RecordError> {
        self.inner.update(patient)?;
        self.save()
    }

    fn remove(&mut self, id: &str) -> Result<Patient, RecordError> {
        let removed = self.inner.remove(id)?;
        self.save()?;
        Ok(removed)
    }

    fn set_active(&mut self, doctor_id: &str, patient_id: Option<&str>) -> Result<(), RecordError> {
        self.inner.set_active(doctor_id, patient_id)?;
        self.save()
    }

    fn active_for(&self, doctor_id: &str) -> Option<Patient> {
        self.inner.active_for(doctor_id)
    }
}
