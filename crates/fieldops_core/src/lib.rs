pub mod chat;
pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod notify;
pub mod photo;
pub mod storage;
pub mod task_form;
pub mod view;
