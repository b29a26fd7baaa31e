use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JarscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error in {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },
    #[error("Class file error in {resource}: {message}")]
    ClassFile { resource: String, message: String },
    #[error("Class {0} is already populated")]
    AlreadyPopulated(String),
    #[error("Malformed class event stream: {0}")]
    EventStream(String),
    #[error("Mapping error on line {line}: {message}")]
    Mapping { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, JarscopeError>;
