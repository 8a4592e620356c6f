pub mod account;
pub mod certificates;
pub mod courses;
pub mod lessons;
pub mod payments;
pub mod progress;
pub mod quizzes;
