pub mod hod;
pub mod marks;
pub mod student;
pub mod subject;
pub mod teacher;

pub use hod::{Hod, HodPatch, NewHod};
pub use marks::{
    ClassTestInput, ClassTestMark, ExperimentInput, ExperimentMark, ExperimentUpdate, MarkTotals,
    PracticalInput, PracticalMark, SlaInput, SlaMark, SubjectMarks, CATEGORY_MAX, SUBJECT_MAX,
};
pub use student::{NewStudent, Student, StudentPatch};
pub use subject::{NewSubject, Subject, SubjectPatch};
pub use teacher::{NewTeacher, Teacher, TeacherPatch, TeacherProfile};
