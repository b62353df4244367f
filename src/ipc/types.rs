use std::path::PathBuf;

use serde::Deserialize;

use crate::local::SqliteLocal;
use crate::remarks::TemplateRemarks;
use crate::remote::SqliteRemote;
use crate::sync::SyncController;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub ctrl: Option<SyncController<SqliteLocal, SqliteRemote>>,
    pub remarks: TemplateRemarks,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            ctrl: None,
            remarks: TemplateRemarks,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
