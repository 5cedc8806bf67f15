//! Read-only projections of controller state, one per screen. They carry the
//! exact labels shown to the technician and nothing that can mutate state.

pub mod chat;
pub mod form;
pub mod job_list;
pub mod profile;
pub mod session;

pub use chat::ChatView;
pub use form::TaskFormView;
pub use job_list::{HeaderView, JobListEvent, JobListView};
pub use profile::ProfileView;
pub use session::LoginView;
