mod chat;
mod employee;
mod job;
mod location;

pub use chat::{ChatMessage, Sender};
pub use employee::Employee;
pub use job::{Job, JobStatus, Priority, completion_note};
pub use location::{Coordinates, LocationFix};
