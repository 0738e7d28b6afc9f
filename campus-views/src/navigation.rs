//! Navigation targets produced by view operations

use campus_core::{EntityId, Role};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    Home,
    Login,
    AdminRegister,
    TeacherDashboard,
    StudentDashboard,
    CourseList,
    CourseDetail(EntityId),
    SubjectList,
    BatchList,
    BatchDetail(EntityId),
    TeacherList,
    TeacherDetail(EntityId),
    StudentList,
    StudentDetail(EntityId),
}

impl Navigation {
    /// Route path of the target
    pub fn path(&self) -> String {
        match self {
            Navigation::Home => "/".to_string(),
            Navigation::Login => "/login".to_string(),
            Navigation::AdminRegister => "/admin-register".to_string(),
            Navigation::TeacherDashboard => "/teacher-dashboard".to_string(),
            Navigation::StudentDashboard => "/student-dashboard".to_string(),
            Navigation::CourseList => "/course-list".to_string(),
            Navigation::CourseDetail(id) => format!("/course-detail/{}", id),
            Navigation::SubjectList => "/subject-list".to_string(),
            Navigation::BatchList => "/batch-list".to_string(),
            Navigation::BatchDetail(id) => format!("/batch-detail/{}", id),
            Navigation::TeacherList => "/teacher-list".to_string(),
            Navigation::TeacherDetail(id) => format!("/teacher-detail/{}", id),
            Navigation::StudentList => "/student-list".to_string(),
            Navigation::StudentDetail(id) => format!("/student-detail/{}", id),
        }
    }

    /// Landing view after login
    pub fn home_for(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => Navigation::BatchList,
            Some(Role::Teacher) => Navigation::TeacherDashboard,
            Some(Role::Student) => Navigation::StudentDashboard,
            None => Navigation::Login,
        }
    }

    /// "Back" from a detail view; admins return to `list`
    pub fn back_for(role: Option<Role>, list: Navigation) -> Self {
        match role {
            Some(Role::Admin) => list,
            other => Self::home_for(other),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_navigation() {
        assert_eq!(Navigation::home_for(Some(Role::Admin)), Navigation::BatchList);
        assert_eq!(
            Navigation::back_for(Some(Role::Teacher), Navigation::StudentList),
            Navigation::TeacherDashboard
        );
        assert_eq!(
            Navigation::back_for(Some(Role::Admin), Navigation::StudentList),
            Navigation::StudentList
        );
        assert_eq!(Navigation::back_for(None, Navigation::CourseList), Navigation::Login);
    }

    #[test]
    fn test_paths() {
        assert_eq!(Navigation::CourseDetail(4).path(), "/course-detail/4");
        assert_eq!(Navigation::TeacherList.to_string(), "/teacher-list");
    }
}
