//! Wire types shared across commands.

use serde::{Deserialize, Serialize};

use crate::types::Team;

/// Server-supplied pagination metadata accompanying a page of records.
/// `next_page = None` signals the last page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub current_page: u32,
    pub next_page: Option<u32>,
    pub per_page: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

/// One fetchable unit: a page of teams plus its metadata.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TeamsPage {
    pub data: Vec<Team>,
    pub meta: PageMeta,
}

impl TeamsPage {
    pub fn has_next(&self) -> bool {
        self.meta.next_page.is_some()
    }
}
