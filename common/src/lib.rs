mod activity;
mod player_id;
mod response;

pub use activity::*;
pub use player_id::*;
pub use response::*;
