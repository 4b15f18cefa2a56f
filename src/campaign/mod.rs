pub mod brief;

pub use brief::CampaignBrief;
