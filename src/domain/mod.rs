pub mod game_type;
pub mod ids;
pub mod lobby;
pub mod operation;
pub mod player;

pub use game_type::{GameType, GameTypeInfo};
pub use ids::{GameId, PlayerId};
pub use lobby::{LobbyMetadata, LobbyStatus};
pub use operation::GameOperation;
pub use player::Player;
