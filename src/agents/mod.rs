pub mod roles;
pub mod specialists;
pub mod traits;

pub use roles::{RoleName, RoleTable};
pub use specialists::{build_crew, SharedAgent};
pub use traits::{AgentBehavior, AgentTurn};
