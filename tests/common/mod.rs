#![allow(dead_code)]

use capgains::domain::error::CapgainsError;
use capgains::ports::ledger_port::LedgerPort;

pub struct MockLedgerPort {
    pub records: Vec<String>,
    pub error: Option<String>,
}

impl MockLedgerPort {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            error: None,
        }
    }

    pub fn with_record(mut self, record: &str) -> Self {
        self.records.push(record.to_string());
        self
    }

    pub fn with_records(mut self, records: &[&str]) -> Self {
        self.records.extend(records.iter().map(|r| r.to_string()));
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl LedgerPort for MockLedgerPort {
    fn source_name(&self) -> String {
        "mock".to_string()
    }

    fn read_records(&self) -> Result<Vec<String>, CapgainsError> {
        if let Some(reason) = &self.error {
            return Err(CapgainsError::LedgerRead {
                source_name: self.source_name(),
                reason: reason.clone(),
            });
        }
        Ok(self.records.clone())
    }
}

pub fn buy(day: u32, symbol: &str, quantity: usize, price: f64) -> String {
    format!("2024-01-{day:02},{symbol},b,{quantity},{price}")
}

pub fn sell(day: u32, symbol: &str, quantity: usize, price: f64) -> String {
    format!("2024-01-{day:02},{symbol},s,{quantity},{price}")
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub const SAMPLE_LEDGER: &str = "\
2024-01-02,IBM,b,10,1
2024-01-03,ibm,s,4,5
2024-01-04,AAPL,s,5,10
2024-01-05,IBM,S,6,5
2024-01-06,aapl,B,5,2
2024-01-07,LOSS,b,10,5
2024-01-08,LOSS,s,10,1
";
