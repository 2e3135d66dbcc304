pub mod auth;
pub mod classes;
pub mod departments;
pub mod staff;
pub mod status;
pub mod subjects;
pub mod time_slots;
pub mod timetable;
