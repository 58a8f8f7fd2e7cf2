//! Error types for pocket_tracker

use std::fmt;

/// Unified error type for tracker operations
#[derive(Debug)]
pub enum TrackerError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// Failed to parse JSON data
    Parse(serde_json::Error),
    /// HTTP error status code from the catalog host
    HttpStatus(reqwest::StatusCode),
    /// Database operation failed
    Database(rusqlite::Error),
    /// File I/O error
    Io(std::io::Error),
    /// Friend ID does not match the ####-####-####-#### format
    InvalidFriendId(String),
    /// Friend ID is already claimed by another account
    FriendIdTaken(String),
    /// No profile exists for the given friend ID
    ProfileNotFound(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Network(e) => write!(f, "Network error: {}", e),
            TrackerError::Parse(e) => write!(f, "Parse error: {}", e),
            TrackerError::HttpStatus(status) => write!(f, "HTTP error: {}", status),
            TrackerError::Database(e) => write!(f, "Database error: {}", e),
            TrackerError::Io(e) => write!(f, "I/O error: {}", e),
            TrackerError::InvalidFriendId(id) => {
                write!(f, "Friend ID must be in the format 9999-9999-9999-9999: {}", id)
            }
            TrackerError::FriendIdTaken(id) => {
                write!(f, "Friend ID is already in use by another user: {}", id)
            }
            TrackerError::ProfileNotFound(id) => {
                write!(f, "No profile found for friend ID: {}", id)
            }
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Network(e) => Some(e),
            TrackerError::Parse(e) => Some(e),
            TrackerError::Database(e) => Some(e),
            TrackerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Network(err)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Parse(err)
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        TrackerError::Database(err)
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Io(err)
    }
}

/// Result alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
