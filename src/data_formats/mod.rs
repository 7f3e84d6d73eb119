mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::Deserialize;

use crate::models::{ArticleStatus, Role};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub status: Option<ArticleStatus>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub search: Option<String>,
}
