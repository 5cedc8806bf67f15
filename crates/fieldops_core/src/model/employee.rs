use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub employee_id: String,
    pub phone: String,
    pub email: String,
    pub position: String,
    pub join_date: String,
    pub area: String,
}
