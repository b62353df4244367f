use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use kinderreportd::error::SyncError;
use kinderreportd::model::{AppSettings, StudentData};
use kinderreportd::remote::RemoteStore;

/// Scriptable in-memory remote store. Cloning shares the underlying state,
/// so tests keep a handle while the controller owns another.
#[derive(Clone, Default)]
pub struct MockRemote {
    inner: Rc<RefCell<MockRemoteState>>,
}

#[derive(Default)]
pub struct MockRemoteState {
    pub students: Vec<(String, StudentData)>,
    pub settings: Vec<(String, AppSettings)>,
    pub upsert_calls: Vec<StudentData>,
    pub delete_calls: Vec<String>,
    pub save_settings_calls: usize,
    pub fetch_students_calls: usize,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockRemote {
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    pub fn upsert_calls(&self) -> Vec<StudentData> {
        self.inner.borrow().upsert_calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.inner.borrow().delete_calls.clone()
    }

    pub fn save_settings_calls(&self) -> usize {
        self.inner.borrow().save_settings_calls
    }

    pub fn fetch_students_calls(&self) -> usize {
        self.inner.borrow().fetch_students_calls
    }

    pub fn stored_students(&self, user_id: &str) -> Vec<StudentData> {
        self.inner
            .borrow()
            .students
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn stored_settings(&self, user_id: &str) -> Option<AppSettings> {
        self.inner
            .borrow()
            .settings
            .iter()
            .find(|(owner, _)| owner == user_id)
            .map(|(_, s)| s.clone())
    }
}

impl RemoteStore for MockRemote {
    async fn fetch_students(&self, user_id: &str) -> Result<Vec<Value>, SyncError> {
        let mut state = self.inner.borrow_mut();
        state.fetch_students_calls += 1;
        Ok(state
            .students
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, s)| serde_json::to_value(s).expect("serialize student"))
            .collect())
    }

    async fn upsert_student(
        &self,
        user_id: &str,
        student: &StudentData,
    ) -> Result<(), SyncError> {
        let mut state = self.inner.borrow_mut();
        state.upsert_calls.push(student.clone());
        if state.fail_writes {
            return Err(SyncError::RemoteWriteFailed("injected failure".into()));
        }
        state.students.retain(|(_, s)| s.id != student.id);
        state.students.push((user_id.to_string(), student.clone()));
        Ok(())
    }

    async fn delete_student(&self, student_id: &str) -> Result<(), SyncError> {
        let mut state = self.inner.borrow_mut();
        state.delete_calls.push(student_id.to_string());
        if state.fail_writes {
            return Err(SyncError::RemoteWriteFailed("injected failure".into()));
        }
        state.students.retain(|(_, s)| s.id != student_id);
        Ok(())
    }

    async fn fetch_settings(&self, user_id: &str) -> Result<Option<Value>, SyncError> {
        let state = self.inner.borrow();
        Ok(state
            .settings
            .iter()
            .find(|(owner, _)| owner == user_id)
            .map(|(_, s)| serde_json::to_value(s).expect("serialize settings")))
    }

    async fn save_settings(
        &self,
        user_id: &str,
        settings: &AppSettings,
    ) -> Result<(), SyncError> {
        let mut state = self.inner.borrow_mut();
        state.save_settings_calls += 1;
        if state.fail_writes {
            return Err(SyncError::RemoteWriteFailed("injected failure".into()));
        }
        state.settings.retain(|(owner, _)| owner != user_id);
        state.settings.push((user_id.to_string(), settings.clone()));
        Ok(())
    }
}

#[allow(dead_code)]
pub fn teacher_user(id: &str) -> kinderreportd::model::User {
    kinderreportd::model::User {
        id: id.to_string(),
        name: "Test Teacher".to_string(),
        username: "teacher".to_string(),
        email: "teacher@example.com".to_string(),
        role: "teacher".to_string(),
    }
}
