pub mod economy;
pub mod map;
pub mod mobilization;
pub mod network;
pub mod railway;
pub mod route;
pub mod state;
pub mod town;
pub mod war;

pub use map::{CampaignMap, HexCoord, Region, Scenario};
pub use mobilization::{Mobilization, MobilizeOrder};
pub use route::{Army, ArmyId, ArmyStatus, CampaignEvent};
pub use state::{GameSnapshot, GameState, RegionView, RoundReport};
pub use war::Phase;
