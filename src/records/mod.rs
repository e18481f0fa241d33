// src/records/mod.rs
// 病人名册：内存存储用于测试，JSON 文件存储用于桌面端
pub mod error;
pub mod patient;
pub mod store;
pub use error::RecordError;
pub use patient::{demo_roster, Patient};
pub use store::{InMemoryPatientStore, JsonFilePatientStore, PatientRepository};
