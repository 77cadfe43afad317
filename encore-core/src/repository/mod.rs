pub mod event;
pub mod join_request;
pub mod refresh_token;
pub mod role_facts;
pub mod song;
pub mod user;

pub use event::EventRepository;
pub use join_request::JoinRequestRepository;
pub use refresh_token::RefreshTokenRepository;
pub use role_facts::RoleFactsRepository;
pub use song::SongRepository;
pub use user::UserRepository;
