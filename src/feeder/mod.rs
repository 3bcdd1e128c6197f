pub mod controller;
pub mod history;
pub mod logs;
pub mod schedule;
