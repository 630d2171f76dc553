#![allow(dead_code)]

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A raw upload as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A resume whose text was extracted successfully. Immutable for the run.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// An upload excluded from ranking, with the reason it was excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub resume: String,
    pub reason: String,
}

/// Everything one ranking run needs; nothing is read from ambient state.
#[derive(Debug, Clone)]
pub struct ScreeningRequest {
    pub job_description: String,
    pub keywords: Vec<String>,
    pub min_experience_years: u32,
    pub documents: Vec<UploadedDocument>,
}
