//! Campus API - authenticated access to the institute backend
//!
//! Provides the session store, the notification capability and the API
//! client whose interceptors tie the two together.

pub mod client;
pub mod endpoints;
pub mod event;
pub mod multipart;
pub mod notify;
pub mod session;


pub use client::{ApiClient, ApiRequest, RequestBody};
pub use event::{ApiResponse, AuthEvent, DataEvent, ErrorEvent, RequestIntent, ResponseEvent};
pub use multipart::{FormPart, MultipartPayload, NESTED_KEY_SEPARATOR};
pub use notify::{
    Notice, NoticeKind, Notifier, RecordingNotifier, NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE,
};
pub use session::{
    AuthCredentials, FileSessionStore, MemorySessionStore, SessionKey, SessionStore,
};
