use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Form fields a front end collects before a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignBrief {
    pub product_name: String,
    pub description: String,
    pub target_audience: String,
    pub region: String,
    pub budget: u64,
    /// Extra text pulled from an attached document, if any.
    pub attachment: Option<String>,
}

impl CampaignBrief {
    pub fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("product name", &self.product_name),
            ("product description", &self.description),
            ("target audience", &self.target_audience),
            ("place/region", &self.region),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();

        if !missing.is_empty() {
            bail!("Please fill all required fields: {}", missing.join(", "));
        }
        if self.budget == 0 {
            bail!("Campaign budget must be greater than zero");
        }
        Ok(())
    }

    /// Loads attachment text that was extracted ahead of time (e.g. from a PDF).
    pub fn with_attachment_file(mut self, path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read attachment {}", path.display()))?;
        self.attachment = Some(text);
        Ok(self)
    }

    /// Seed text handed to the first role.
    pub fn render(&self) -> String {
        let mut brief = format!(
            "Create a marketing campaign for a {}.\nDescription: {}\nTarget Audience: {}\nLocation: {}\nBudget: ${}\n",
            self.product_name.trim(),
            self.description.trim(),
            self.target_audience.trim(),
            self.region.trim(),
            self.budget,
        );

        if let Some(extra) = self
            .attachment
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            brief.push_str("\nAdditional Information from PDF:\n");
            brief.push_str(extra);
        }

        brief
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smart_bottle() -> CampaignBrief {
        CampaignBrief {
            product_name: "SmartBottle".to_string(),
            description: "Self-cleaning bottle that tracks hydration".to_string(),
            target_audience: "Engineering students".to_string(),
            region: "India".to_string(),
            budget: 5000,
            attachment: None,
        }
    }

    #[test]
    fn render_matches_form_layout() {
        assert_eq!(
            smart_bottle().render(),
            "Create a marketing campaign for a SmartBottle.\n\
             Description: Self-cleaning bottle that tracks hydration\n\
             Target Audience: Engineering students\n\
             Location: India\n\
             Budget: $5000\n"
        );
    }

    #[test]
    fn attachment_is_appended_only_when_present() {
        let blank = CampaignBrief {
            attachment: Some("   \n".to_string()),
            ..smart_bottle()
        };
        assert!(!blank.render().contains("Additional Information"));

        let filled = CampaignBrief {
            attachment: Some("  Launch date: March\n".to_string()),
            ..smart_bottle()
        };
        assert!(filled
            .render()
            .ends_with("Budget: $5000\n\nAdditional Information from PDF:\nLaunch date: March"));
    }

    #[test]
    fn validation_names_missing_fields() {
        let brief = CampaignBrief {
            target_audience: " ".to_string(),
            region: String::new(),
            ..smart_bottle()
        };
        let err = brief.validate().expect_err("fields missing");
        assert_eq!(
            err.to_string(),
            "Please fill all required fields: target audience, place/region"
        );
    }

    #[test]
    fn zero_budget_is_rejected() {
        let brief = CampaignBrief {
            budget: 0,
            ..smart_bottle()
        };
        assert!(brief.validate().is_err());
        assert!(smart_bottle().validate().is_ok());
    }
}
