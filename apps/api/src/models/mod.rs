pub mod catalog;
pub mod timetable;
