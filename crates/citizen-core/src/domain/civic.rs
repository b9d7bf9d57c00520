//! Civic-service records: guides, blood donation, campaigns, volunteering,
//! and contact messages.

use chrono::{DateTime, NaiveDate, Utc};
use citizen_shared::constants::BLOOD_GROUPS;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const CATEGORIES: &str = "categories";
    pub const GUIDES: &str = "guides";
    pub const BLOOD_DONORS: &str = "blood_donors";
    pub const BLOOD_REQUESTS: &str = "blood_requests";
    pub const CAMPAIGNS: &str = "campaigns";
    pub const DONATIONS: &str = "donations";
    pub const VOLUNTEERS: &str = "volunteers";
    pub const CONTACT_MESSAGES: &str = "contact_messages";
}

fn validate_blood_group(value: &str) -> Result<(), ValidationError> {
    if BLOOD_GROUPS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("blood_group"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[validate(length(min = 2, max = 80))]
    pub name: String,
    #[validate(length(min = 2, max = 80))]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Step-by-step how-to for a government procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Guide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[validate(length(min = 3, max = 160))]
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub office: Option<String>,
    #[serde(default)]
    pub fee: Option<String>,
    #[serde(default)]
    pub processing_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideSuggestion {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDonor {
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,
    #[validate(custom(function = "validate_blood_group"))]
    pub blood_group: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
    #[validate(length(min = 2, max = 80))]
    pub city: String,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodDonor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub full_name: String,
    pub blood_group: String,
    pub phone: String,
    pub city: String,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl BloodDonor {
    pub fn from_registration(user_id: Uuid, form: NewDonor) -> Self {
        Self {
            id: None,
            user_id: Some(user_id),
            full_name: form.full_name.trim().to_string(),
            blood_group: form.blood_group,
            phone: form.phone.trim().to_string(),
            city: form.city.trim().to_string(),
            last_donation_date: form.last_donation_date,
            available: form.available,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BloodRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[validate(length(min = 2, max = 120))]
    pub patient_name: String,
    #[validate(custom(function = "validate_blood_group"))]
    pub blood_group: String,
    #[validate(range(min = 1, max = 10))]
    pub units: u32,
    #[validate(length(min = 2, max = 160))]
    pub hospital: String,
    #[validate(length(min = 2, max = 80))]
    pub city: String,
    #[validate(length(min = 6, max = 20))]
    pub contact_phone: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<Uuid>,
}

/// Fundraising campaign. Only verified ones are listed publicly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub goal_amount: f64,
    #[serde(default)]
    pub raised_amount: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl Campaign {
    pub fn progress_percent(&self) -> f64 {
        if self.goal_amount <= 0.0 {
            return 0.0;
        }
        (self.raised_amount / self.goal_amount * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDonation {
    #[validate(range(min = 1.0, max = 100_000_000.0))]
    pub amount: f64,
    #[validate(length(max = 120))]
    #[serde(default)]
    pub donor_name: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub campaign_id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub amount: f64,
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Volunteer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
    #[validate(length(min = 2, max = 80))]
    pub city: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 160))]
    pub subject: String,
    #[validate(length(min = 10, max = 2000))]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor(blood_group: &str) -> NewDonor {
        NewDonor {
            full_name: "Budi Santoso".into(),
            blood_group: blood_group.into(),
            phone: "08123456789".into(),
            city: "Bandung".into(),
            last_donation_date: None,
            available: true,
        }
    }

    #[test]
    fn test_blood_group_validation() {
        assert!(donor("O+").validate().is_ok());
        assert!(donor("AB-").validate().is_ok());
        assert!(donor("C+").validate().is_err());
        assert!(donor("o+").validate().is_err());
    }

    #[test]
    fn test_blood_request_units_bounds() {
        let mut request = BloodRequest {
            id: None,
            patient_name: "Siti".into(),
            blood_group: "A+".into(),
            units: 2,
            hospital: "RS Hasan Sadikin".into(),
            city: "Bandung".into(),
            contact_phone: "0221234567".into(),
            urgency: Urgency::Urgent,
            requested_by: None,
        };
        assert!(request.validate().is_ok());
        request.units = 0;
        assert!(request.validate().is_err());
        request.units = 11;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_campaign_progress() {
        let mut campaign = Campaign {
            id: Uuid::new_v4(),
            title: "Flood relief".into(),
            description: None,
            goal_amount: 1000.0,
            raised_amount: 250.0,
            verified: true,
            organizer: None,
            ends_at: None,
        };
        assert_eq!(campaign.progress_percent(), 25.0);
        campaign.raised_amount = 5000.0;
        assert_eq!(campaign.progress_percent(), 100.0);
        campaign.goal_amount = 0.0;
        assert_eq!(campaign.progress_percent(), 0.0);
    }

    #[test]
    fn test_contact_message_requires_body() {
        let message = ContactMessage {
            id: None,
            name: "Ayu".into(),
            email: "ayu@example.com".into(),
            subject: "Hours".into(),
            message: "short".into(),
            created_at: None,
        };
        assert!(message.validate().is_err());
    }
}
