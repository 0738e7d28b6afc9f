//! Resource paths, relative to the configured base address

use campus_core::EntityId;

pub const LOGIN: &str = "login/";
pub const ADMIN_EXISTS: &str = "admin-exists/";
pub const ADMIN_REGISTER: &str = "admin-register/";

pub const COURSES: &str = "courses/";
pub const SUBJECTS: &str = "subjects/";
pub const BATCHES: &str = "batches/";
pub const TEACHERS: &str = "teachers/";
pub const STUDENTS: &str = "students/";

pub const TEACHER_REGISTER: &str = "teacher_register/";
pub const STUDENT_REGISTER: &str = "student_register/";

pub fn course(id: EntityId) -> String {
    format!("courses/{}/", id)
}

/// Subjects are read, updated and deleted through their own detail route
pub fn subject(id: EntityId) -> String {
    format!("subject_detail/{}/", id)
}

pub fn batch(id: EntityId) -> String {
    format!("batches/{}/", id)
}

pub fn teacher(id: EntityId) -> String {
    format!("teachers/{}/", id)
}

pub fn student(id: EntityId) -> String {
    format!("students/{}/", id)
}

/// Teachers eligible for assignment to a batch
pub fn filtered_teachers_to_batch(batch_id: EntityId) -> String {
    format!("filtered-teachers-to-batch/{}/", batch_id)
}

pub fn add_teacher_to_batch(batch_id: EntityId) -> String {
    format!("add-teacher-to-batches/{}/", batch_id)
}

pub fn remove_teacher_in_batch(batch_id: EntityId, teacher_id: EntityId) -> String {
    format!("remove-teacher-in-batch/{}/{}/", batch_id, teacher_id)
}

pub fn remove_student_in_batch(student_id: EntityId) -> String {
    format!("remove-student-in-batch/{}/", student_id)
}
