use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub hint: &'static str,
}

impl Default for LoginView {
    fn default() -> Self {
        Self {
            title: "ISP Operations",
            subtitle: "Sistem Update To Work",
            hint: "Demo: username/password apa saja",
        }
    }
}
