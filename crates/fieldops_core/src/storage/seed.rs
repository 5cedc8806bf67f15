use crate::error::AppError;
use crate::model::{Employee, Job, JobStatus, Priority};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const SEED_ENV_VAR: &str = "FIELDOPS_SEED_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSeed {
    schema_version: u32,
    jobs: Vec<Job>,
    #[serde(default)]
    employee: Option<Employee>,
}

/// Everything a session starts from: the technician and their assigned jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub employee: Employee,
    pub jobs: Vec<Job>,
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            employee: mock_employee(),
            jobs: mock_jobs(),
        }
    }
}

pub fn seed_path_from_env() -> Option<PathBuf> {
    match std::env::var(SEED_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

/// Loads a seed fixture. A fixture without an `employee` keeps the built-in
/// technician record.
pub fn load_seed(path: &Path) -> Result<SeedData, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let stored: StoredSeed = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid seed in {}: {}", path.display(), err))
    })?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(SeedData {
        employee: stored.employee.unwrap_or_else(mock_employee),
        jobs: stored.jobs,
    })
}

pub fn load_seed_or_default(path: Option<&Path>) -> Result<SeedData, AppError> {
    match path {
        Some(path) => load_seed(path),
        None => Ok(SeedData::default()),
    }
}

pub fn mock_employee() -> Employee {
    Employee {
        name: "Ahmad Ridwan".to_string(),
        employee_id: "ISP-2024-001".to_string(),
        phone: "+62 812-3456-7890".to_string(),
        email: "ahmad.ridwan@isp.com".to_string(),
        position: "Teknisi Instalasi".to_string(),
        join_date: "15 Januari 2024".to_string(),
        area: "Jakarta Selatan".to_string(),
    }
}

pub fn mock_jobs() -> Vec<Job> {
    vec![
        Job {
            id: "JOB-001".to_string(),
            customer_name: "Budi Santoso".to_string(),
            address: "Jl. Merdeka No. 45, Jakarta Selatan".to_string(),
            phone: "+62 821-9876-5432".to_string(),
            package_type: "Paket 50 Mbps".to_string(),
            scheduled_time: "10:00 - 12:00 WIB".to_string(),
            status: JobStatus::Pending,
            priority: Priority::High,
            notes: Some("Mohon hubungi pelanggan 30 menit sebelum instalasi".to_string()),
        },
        Job {
            id: "JOB-002".to_string(),
            customer_name: "Siti Nurhaliza".to_string(),
            address: "Komplek Permata Hijau Blok C5, Jakarta Selatan".to_string(),
            phone: "+62 813-2468-1357".to_string(),
            package_type: "Paket 100 Mbps".to_string(),
            scheduled_time: "13:00 - 15:00 WIB".to_string(),
            status: JobStatus::Pending,
            priority: Priority::Medium,
            notes: None,
        },
        Job {
            id: "JOB-003".to_string(),
            customer_name: "Eko Prasetyo".to_string(),
            address: "Jl. Sudirman Kav. 12, Jakarta Pusat".to_string(),
            phone: "+62 856-7891-2345".to_string(),
            package_type: "Paket 25 Mbps".to_string(),
            scheduled_time: "15:30 - 17:00 WIB".to_string(),
            status: JobStatus::InProgress,
            priority: Priority::Low,
            notes: None,
        },
        Job {
            id: "JOB-004".to_string(),
            customer_name: "Maya Indah".to_string(),
            address: "Apartemen Green Park Tower A Lt. 15".to_string(),
            phone: "+62 877-5544-3322".to_string(),
            package_type: "Paket 75 Mbps".to_string(),
            scheduled_time: "08:00 - 10:00 WIB".to_string(),
            status: JobStatus::Completed,
            priority: Priority::Medium,
            notes: Some("Instalasi berhasil, pelanggan puas".to_string()),
        },
    ]
}
