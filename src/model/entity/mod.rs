mod profile;
pub use profile::Profile;

mod course;
pub use course::{Course, CourseCreate};

mod lesson;
pub use lesson::{Lesson, LessonCreate};

mod enrollment;
pub use enrollment::{Enrollment, EnrollmentWithCourseRow, ProgressSnapshot};

mod lesson_progress;
pub use lesson_progress::{LessonProgress, LessonProgressUpsert};

mod quiz;
pub use quiz::{DEFAULT_PASSING_SCORE, Quiz, QuizCreate};

mod question;
pub use question::{Question, QuestionCreate, QuestionOptions};

mod quiz_attempt;
pub use quiz_attempt::{QuizAttempt, QuizAttemptAnswer, QuizAttemptAnswerCreate, QuizAttemptCreate};

mod certificate;
pub use certificate::{Certificate, CertificateCreate, CertificateSnapshotRow};

mod payment;
pub use payment::{Payment, PaymentCreate, PaymentStatus};
