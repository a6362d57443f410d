pub mod employees;
pub mod patients;
pub mod tutors;
pub mod users;
pub mod validate;
