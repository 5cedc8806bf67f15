use crate::task_form::{FormId, TaskForm};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocationStatus {
    Detecting {
        label: &'static str,
    },
    Detected {
        label: &'static str,
        latitude: String,
        longitude: String,
        address: String,
    },
    Missing {
        label: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskFormView {
    pub form: FormId,
    pub title: &'static str,
    pub job_id: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub photo_attached: bool,
    pub photo_bytes: usize,
    pub location: LocationStatus,
    pub notes: String,
    pub submit_enabled: bool,
}

impl TaskFormView {
    pub fn project(form: &TaskForm) -> Self {
        // A refresh keeps showing the detecting state until it resolves.
        let location = if form.is_getting_location() {
            LocationStatus::Detecting {
                label: "Mendeteksi lokasi...",
            }
        } else if let Some(fix) = form.location() {
            LocationStatus::Detected {
                label: "Lokasi terdeteksi",
                latitude: format!("{:.6}", fix.lat),
                longitude: format!("{:.6}", fix.lng),
                address: fix.address.clone(),
            }
        } else {
            LocationStatus::Missing {
                label: "Deteksi Lokasi",
            }
        };

        let job = form.job();
        Self {
            form: form.id(),
            title: "Form Update Tugas",
            job_id: job.id.clone(),
            customer_name: job.customer_name.clone(),
            address: job.address.clone(),
            phone: job.phone.clone(),
            photo_attached: form.photo().is_some(),
            photo_bytes: form.photo().map(str::len).unwrap_or(0),
            location,
            notes: form.notes().to_string(),
            submit_enabled: form.can_submit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationStatus, TaskFormView};
    use crate::geolocation::{FALLBACK_UNSUPPORTED_ADDRESS, GeolocationError, PositionOptions};
    use crate::storage::seed::mock_jobs;
    use crate::task_form::{FormId, TaskForm};

    #[test]
    fn new_form_shows_detecting_and_disabled_submit() {
        let (form, _) = TaskForm::open(FormId(1), mock_jobs()[0].clone(), PositionOptions::default());
        let view = TaskFormView::project(&form);

        assert_eq!(view.customer_name, "Budi Santoso");
        assert!(matches!(view.location, LocationStatus::Detecting { .. }));
        assert!(!view.submit_enabled);
        assert!(!view.photo_attached);
    }

    #[test]
    fn resolved_form_shows_fix_and_enables_submit() {
        let (mut form, request) =
            TaskForm::open(FormId(1), mock_jobs()[1].clone(), PositionOptions::default());
        form.apply_location(&request, Err(GeolocationError::Unsupported));
        form.set_photo("data:image/png;base64,AAAA".to_string());

        let view = TaskFormView::project(&form);
        match view.location {
            LocationStatus::Detected {
                label,
                ref latitude,
                ref longitude,
                ref address,
            } => {
                assert_eq!(label, "Lokasi terdeteksi");
                assert_eq!(latitude, "-6.208800");
                assert_eq!(longitude, "106.845600");
                assert_eq!(address, FALLBACK_UNSUPPORTED_ADDRESS);
            }
            other => panic!("unexpected location state: {other:?}"),
        }
        assert!(view.submit_enabled);
        assert_eq!(view.photo_bytes, "data:image/png;base64,AAAA".len());
    }
}
