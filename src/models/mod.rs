pub mod requests;
pub mod responses;

pub use requests::{Credentials, CredentialsRequest, GamesQuery};
pub use responses::{MessageResponse, RegisteredUser};
