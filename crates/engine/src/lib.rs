pub mod announcement;
pub mod dispatcher;
pub mod members;
pub mod phone;
pub mod resolver;
