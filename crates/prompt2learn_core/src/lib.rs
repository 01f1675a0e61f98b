pub mod domain;
pub mod error;
pub mod generation;
pub mod ports;
pub mod prompt;
pub mod reader;
pub mod recovery;
pub mod validator;

pub use domain::{
    Course, CourseDetail, GeneratedCourse, Lesson, NewLesson, PlanDay, PlanLesson, StudyPlan,
    User, UserCredentials,
};
pub use error::{CourseError, ErrorClass, PlanError};
pub use generation::CourseGenerator;
pub use ports::{DatabaseService, PlanGenerationService, PortError, PortResult};
pub use reader::{assemble_days, CourseReader};
pub use recovery::recover_plan_value;
pub use validator::{validate_plan, ValidationPolicy, DEFAULT_FALLBACK_TITLE};
