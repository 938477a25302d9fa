pub mod assign;
pub mod attend;
pub mod backup;
pub mod catalog;
pub mod enroll;
pub mod face;
pub mod log;
pub mod notify;
pub mod report;
pub mod schedule;
pub mod users;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;
