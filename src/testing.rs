// src/testing.rs
// Fixtures shared by unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::FetchError;
use crate::fetch::{RawYearPayload, StatsSource};

pub const PAYLOAD_2015: &str = r#"
"RESULT", "OK"
"METADATA", "..."
"VALUE"
"tab_code","表章項目","cat01_code","人口","area_code","地域","time_code","時間軸","unit","value","annotation"
"020","人口","A1101","総人口","00000","全国","2015100000","2015年","人","127094745",""
"020","人口","A1101","総人口","01000","Hokkaido","2015100000","2015年","人","5381733",""
"020","人口","A1101","総人口","13000","Tokyo","2015100000","2015年","人","13515271",""
"#;

pub const PAYLOAD_2020: &str = r#"
"RESULT", "OK"
"METADATA", "..."

"VALUE"
"tab_code","表章項目","cat01_code","人口","area_code","地域","time_code","時間軸","unit","value","annotation"
"020","人口","A1101","総人口","00000","全国","2020100000","2020年","人","126146099",""
"020","人口","A1101","総人口","01000","Hokkaido","2020100000","2020年","人","5224614",""
"020","人口","A1101","総人口","13000","Tokyo","2020100000","2020年","人","14047594",""
"020","人口","A1201","日本人人口","13000","Tokyo","2020100000","2020年","人","13635879",""
"#;

pub const EMPTY_TABLE: &str = "\"RESULT\",\"OK\"\n\"VALUE\"\n\"tab_code\",\"cat01_code\",\"area_code\",\"time_code\",\"unit\",\"value\",\"note\"";

/// What a fake year responds with.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Status(u16),
    Empty,
}

/// `StatsSource` answering from a fixed table; unknown years get an empty table.
#[derive(Default)]
pub struct FakeSource {
    replies: HashMap<i32, Reply>,
    pub requested: Mutex<Vec<i32>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, year: i32, reply: Reply) -> Self {
        self.replies.insert(year, reply);
        self
    }

    pub fn body(self, year: i32, text: &str) -> Self {
        self.with(year, Reply::Body(text.to_string()))
    }

    pub fn census() -> Self {
        Self::new().body(2015, PAYLOAD_2015).body(2020, PAYLOAD_2020)
    }
}

#[async_trait]
impl StatsSource for FakeSource {
    async fn fetch_year(&self, year: i32) -> Result<RawYearPayload, FetchError> {
        self.requested.lock().unwrap().push(year);
        let reply = self
            .replies
            .get(&year)
            .cloned()
            .unwrap_or_else(|| Reply::Body(EMPTY_TABLE.to_string()));
        match reply {
            Reply::Body(body) => Ok(RawYearPayload { year, body }),
            Reply::Status(status) => Err(FetchError::Status { status }),
            Reply::Empty => Err(FetchError::EmptyBody),
        }
    }
}
