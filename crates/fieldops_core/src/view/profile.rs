use crate::model::Employee;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub name: String,
    pub position: String,
    pub fields: Vec<ProfileField>,
}

impl ProfileView {
    pub fn project(employee: &Employee) -> Self {
        let field = |label, value: &String| ProfileField {
            label,
            value: value.clone(),
        };

        Self {
            name: employee.name.clone(),
            position: employee.position.clone(),
            fields: vec![
                field("ID Karyawan", &employee.employee_id),
                field("Nomor Handphone", &employee.phone),
                field("Email", &employee.email),
                field("Area Kerja", &employee.area),
                field("Tanggal Bergabung", &employee.join_date),
            ],
        }
    }
}
