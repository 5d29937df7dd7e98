pub mod hod_service;
pub mod marks_service;
pub mod student_service;
pub mod subject_service;
pub mod teacher_service;

pub use hod_service::HodService;
pub use marks_service::{MarksError, MarksService};
pub use student_service::StudentService;
pub use subject_service::SubjectService;
pub use teacher_service::TeacherService;
