use fieldops_core::config::Palette;
use fieldops_core::error::AppError;
use fieldops_core::model::{Job, Sender};
use fieldops_core::view::chat::ChatLine;
use fieldops_core::view::form::LocationStatus;
use fieldops_core::view::job_list::JobRow;
use fieldops_core::view::{
    ChatView, HeaderView, JobListView, LoginView, ProfileView, TaskFormView,
};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct JobTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Pelanggan")]
    customer: String,
    #[tabled(rename = "Alamat")]
    address: String,
    #[tabled(rename = "Jadwal")]
    schedule: String,
    #[tabled(rename = "Paket")]
    package: String,
    #[tabled(rename = "Prioritas")]
    priority: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Catatan")]
    notes: String,
}

impl From<&JobRow> for JobTableRow {
    fn from(row: &JobRow) -> Self {
        Self {
            id: row.id.clone(),
            customer: row.customer_name.clone(),
            address: row.address.clone(),
            schedule: row.scheduled_time.clone(),
            package: row.package_type.clone(),
            priority: row.priority.label,
            status: row.status.label,
            notes: row.notes.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn print_json(value: Result<serde_json::Value, serde_json::Error>) -> Result<(), AppError> {
    let value = value.map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{value}");
    Ok(())
}

pub fn print_login(view: &LoginView, palette: &Palette) {
    println!("{}", palette.accentize(view.title));
    println!("{}", view.subtitle);
    println!("{}", palette.mutedize(view.hint));
}

pub fn print_header(header: &HeaderView, username: Option<&str>, palette: &Palette) {
    let badge = header
        .pending_badge
        .map(|count| format!(" [{count}]"))
        .unwrap_or_default();
    let user = username.map(|name| format!(" - {name}")).unwrap_or_default();
    println!("{}{}{}", palette.accentize(header.title), badge, user);
}

pub fn print_job_list(view: &JobListView, palette: &Palette) {
    if let Some(banner) = view.banner.as_deref() {
        println!("{}", palette.accentize(banner));
    }

    let rows: Vec<JobTableRow> = view.rows.iter().map(JobTableRow::from).collect();
    println!("{}", Table::new(rows).with(Style::modern()));

    let chat_ids: Vec<&str> = view
        .rows
        .iter()
        .filter(|row| row.chat_action.is_some())
        .map(|row| row.id.as_str())
        .collect();
    if let Some(label) = view.rows.iter().find_map(|row| row.chat_action)
        && !chat_ids.is_empty()
    {
        println!(
            "{}",
            palette.mutedize(&format!("{label}: chat <{}>", chat_ids.join("|")))
        );
    }
}

pub fn print_profile(view: &ProfileView, palette: &Palette) {
    println!("{}", palette.accentize(&view.name));
    println!("{}", view.position);
    for field in &view.fields {
        println!("{}: {}", palette.mutedize(field.label), field.value);
    }
}

pub fn print_form(view: &TaskFormView, palette: &Palette) {
    println!("{} ({})", palette.accentize(view.title), view.job_id);
    println!("Pelanggan: {}", view.customer_name);
    println!("Alamat: {}", view.address);
    println!("Telepon: {}", view.phone);

    if view.photo_attached {
        println!("Foto: terlampir ({} bytes)", view.photo_bytes);
    } else {
        println!("Foto: {}", palette.mutedize("belum ada"));
    }

    match &view.location {
        LocationStatus::Detecting { label } | LocationStatus::Missing { label } => {
            println!("Lokasi: {}", palette.mutedize(label));
        }
        LocationStatus::Detected {
            label,
            latitude,
            longitude,
            address,
        } => {
            println!("Lokasi: {label}");
            println!("  Lat: {latitude}, Long: {longitude}");
            println!("  {address}");
        }
    }

    if !view.notes.is_empty() {
        println!("Catatan: {}", view.notes);
    }

    let submit = if view.submit_enabled {
        "siap dikirim"
    } else {
        "butuh foto dan lokasi"
    };
    println!("Selesaikan Tugas: {}", palette.mutedize(submit));
}

pub fn print_location(address: &str, palette: &Palette) {
    println!("Lokasi terdeteksi: {}", palette.accentize(address));
}

pub fn print_completed(job: &Job, palette: &Palette) {
    println!(
        "Completed job: {} ({}) {}",
        job.customer_name,
        job.id,
        palette.status(job.status, job.status.as_str())
    );
    if let Some(notes) = job.notes.as_deref() {
        println!("{notes}");
    }
}

pub fn print_chat(view: &ChatView, palette: &Palette) {
    println!("{} - {}", palette.accentize(view.title), view.status);
    println!("{}", view.job_banner);
    println!("{}", palette.mutedize(&view.dial_link));
    for line in &view.lines {
        print_chat_line(line, palette);
    }
    if view.typing {
        println!("{}", palette.mutedize("CS Support sedang mengetik..."));
    }
    if !view.draft.is_empty() {
        println!("Draft: {}", view.draft);
    }
}

pub fn print_chat_line(line: &ChatLine, palette: &Palette) {
    let speaker = match line.sender {
        Sender::Support => palette.accentize("CS Support"),
        Sender::User => "Anda".to_string(),
    };
    let ticks = line.ticks.map(|ticks| format!(" {ticks}")).unwrap_or_default();
    println!(
        "[{}] {}: {}{}",
        line.time,
        speaker,
        line.message,
        palette.mutedize(&ticks)
    );
}
