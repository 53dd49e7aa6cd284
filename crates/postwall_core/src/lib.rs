pub mod domain;
pub mod ports;

pub use domain::{EditDraft, Page, Post, Session, SubjectKey, UserProfile};
pub use ports::{BackendService, PortError, PortResult, SessionStorage};
