pub mod event;
pub mod id;
pub mod join_request;
pub mod pagination;
pub mod permission;
pub mod session;
pub mod song;
pub mod user;

pub use event::{
    Event, EventDetails, EventFields, EventListQuery, EventSummary, TracklistItem,
};
pub use id::{generate_id, EventId, SongId, UserId};
pub use join_request::JoinRequest;
pub use pagination::{effective_page_size, next_page_token, parse_page_token};
pub use permission::{RoleFacts, RoleFactsRecord};
pub use session::{RefreshCredential, Session, TokenPair};
pub use song::{
    LinkKind, RoleAssignment, Song, SongDetails, SongFields, SongLink, SongListQuery, SongSummary,
};
pub use user::{ProfileHint, User};
