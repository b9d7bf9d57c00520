// ============================================================================
// Citizen Core - Civic Services
// File: crates/citizen-core/src/services/civic_service.rs
// ============================================================================
//! Guides, blood donation, campaigns, volunteering and contact messages

use citizen_shared::constants::{BLOOD_GROUPS, DEFAULT_PAGE_SIZE, SUGGESTION_LIMIT};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::domain::tables;
use crate::domain::{
    BloodDonor, BloodRequest, Campaign, Category, ContactMessage, Donation, Guide,
    GuideSuggestion, NewDonation, NewDonor, User, Volunteer,
};
use crate::error::{BackendError, DomainError};
use crate::ports::{BackendClient, SelectQuery};

const MAX_SEARCH_LEN: usize = 80;
const MIN_SUGGEST_LEN: usize = 2;

pub struct CivicService;

impl CivicService {
    pub async fn categories(client: &dyn BackendClient) -> Result<Vec<Category>, DomainError> {
        let rows = client
            .select(&SelectQuery::from(tables::CATEGORIES).order("name", true))
            .await?;
        Ok(decode_rows(rows)?)
    }

    pub async fn search_guides(
        client: &dyn BackendClient,
        q: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Guide>, DomainError> {
        let mut query = SelectQuery::from(tables::GUIDES)
            .order("title", true)
            .limit(DEFAULT_PAGE_SIZE);
        if let Some(needle) = q.map(sanitize_search).filter(|s| !s.is_empty()) {
            query = query.ilike("title", &needle);
        }
        if let Some(slug) = category.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.eq("category_slug", slug);
        }
        Ok(decode_rows(client.select(&query).await?)?)
    }

    /// Type-ahead titles. Very short input returns nothing without asking
    /// the backend.
    pub async fn suggest_guides(
        client: &dyn BackendClient,
        q: &str,
    ) -> Result<Vec<GuideSuggestion>, DomainError> {
        let needle = sanitize_search(q);
        if needle.chars().count() < MIN_SUGGEST_LEN {
            return Ok(Vec::new());
        }
        let query = SelectQuery::from(tables::GUIDES)
            .columns("title,slug")
            .ilike("title", &needle)
            .order("title", true)
            .limit(SUGGESTION_LIMIT);
        Ok(decode_rows(client.select(&query).await?)?)
    }

    pub async fn guide_by_slug(client: &dyn BackendClient, slug: &str) -> Result<Guide, DomainError> {
        let query = SelectQuery::from(tables::GUIDES).eq("slug", slug).limit(1);
        decode_rows::<Guide>(client.select(&query).await?)?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("guide {}", slug)))
    }

    pub async fn find_donors(
        client: &dyn BackendClient,
        blood_group: Option<&str>,
        city: Option<&str>,
    ) -> Result<Vec<BloodDonor>, DomainError> {
        let mut query = SelectQuery::from(tables::BLOOD_DONORS)
            .eq("available", true)
            .order("created_at", false)
            .limit(DEFAULT_PAGE_SIZE);
        if let Some(group) = blood_group.map(str::trim).filter(|s| !s.is_empty()) {
            if !BLOOD_GROUPS.contains(&group) {
                return Err(DomainError::ValidationError(format!(
                    "unknown blood group {}",
                    group
                )));
            }
            query = query.eq("blood_group", group);
        }
        if let Some(city) = city.map(sanitize_search).filter(|s| !s.is_empty()) {
            query = query.ilike("city", &city);
        }
        Ok(decode_rows(client.select(&query).await?)?)
    }

    pub async fn register_donor(
        client: &dyn BackendClient,
        user: &User,
        form: NewDonor,
    ) -> Result<BloodDonor, DomainError> {
        form.validate()?;
        let donor = BloodDonor::from_registration(user.id, form);
        let saved = insert_one(client, tables::BLOOD_DONORS, &donor).await?;
        info!("Donor registered for user {} ({})", user.id, saved.blood_group);
        Ok(saved)
    }

    pub async fn donor_registrations(
        client: &dyn BackendClient,
        user: &User,
    ) -> Result<usize, DomainError> {
        let query = SelectQuery::from(tables::BLOOD_DONORS)
            .columns("id")
            .eq("user_id", user.id);
        Ok(client.select(&query).await?.len())
    }

    pub async fn request_blood(
        client: &dyn BackendClient,
        requester: Option<&User>,
        mut request: BloodRequest,
    ) -> Result<BloodRequest, DomainError> {
        request.validate()?;
        request.id = None;
        request.requested_by = requester.map(|u| u.id);
        let saved = insert_one(client, tables::BLOOD_REQUESTS, &request).await?;
        info!(
            "Blood request for {} unit(s) of {} in {}",
            saved.units, saved.blood_group, saved.city
        );
        Ok(saved)
    }

    pub async fn verified_campaigns(client: &dyn BackendClient) -> Result<Vec<Campaign>, DomainError> {
        let query = SelectQuery::from(tables::CAMPAIGNS)
            .eq("verified", true)
            .order("ends_at", true);
        let campaigns: Vec<Campaign> = decode_rows(client.select(&query).await?)?;
        // The backend filter is trusted but unverified rows must never leak.
        Ok(campaigns.into_iter().filter(|c| c.verified).collect())
    }

    pub async fn donate(
        client: &dyn BackendClient,
        campaign_id: Uuid,
        donor: Option<&User>,
        form: NewDonation,
    ) -> Result<Donation, DomainError> {
        form.validate()?;

        let query = SelectQuery::from(tables::CAMPAIGNS)
            .eq("id", campaign_id)
            .eq("verified", true)
            .limit(1);
        let campaign = decode_rows::<Campaign>(client.select(&query).await?)?
            .into_iter()
            .find(|c| c.verified)
            .ok_or_else(|| DomainError::NotFound(format!("campaign {}", campaign_id)))?;

        let donation = Donation {
            id: None,
            campaign_id: campaign.id,
            user_id: donor.map(|u| u.id),
            amount: form.amount,
            donor_name: form
                .donor_name
                .or_else(|| donor.map(|u| u.display_name().to_string())),
            message: form.message,
        };
        let saved = insert_one(client, tables::DONATIONS, &donation).await?;
        info!("Donation of {:.2} to campaign {}", saved.amount, campaign.id);
        Ok(saved)
    }

    pub async fn register_volunteer(
        client: &dyn BackendClient,
        user: Option<&User>,
        mut volunteer: Volunteer,
    ) -> Result<Volunteer, DomainError> {
        volunteer.validate()?;
        volunteer.id = None;
        volunteer.user_id = user.map(|u| u.id);
        volunteer.skills.retain(|s| !s.trim().is_empty());
        Ok(insert_one(client, tables::VOLUNTEERS, &volunteer).await?)
    }

    pub async fn send_contact_message(
        client: &dyn BackendClient,
        mut message: ContactMessage,
    ) -> Result<ContactMessage, DomainError> {
        message.validate()?;
        message.id = None;
        message.created_at = None;
        Ok(insert_one(client, tables::CONTACT_MESSAGES, &message).await?)
    }

    pub async fn contact_messages(
        client: &dyn BackendClient,
        limit: usize,
    ) -> Result<Vec<ContactMessage>, DomainError> {
        let query = SelectQuery::from(tables::CONTACT_MESSAGES)
            .order("created_at", false)
            .limit(limit);
        Ok(decode_rows(client.select(&query).await?)?)
    }
}

/// Strips characters with meaning in backend filter syntax.
pub fn sanitize_search(q: &str) -> String {
    q.trim()
        .chars()
        .filter(|c| !matches!(c, '*' | '%' | ',' | '(' | ')' | '"' | '\\'))
        .take(MAX_SEARCH_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, BackendError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| BackendError::Decode(e.to_string())))
        .collect()
}

/// Inserts one record and returns what the backend stored. A backend that
/// answers with no representation gets the input echoed back.
pub(crate) async fn insert_one<T>(
    client: &dyn BackendClient,
    table: &str,
    record: &T,
) -> Result<T, BackendError>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let row = serde_json::to_value(record).map_err(|e| BackendError::Decode(e.to_string()))?;
    let mut stored = client.insert(table, vec![row]).await?;
    if stored.is_empty() {
        debug!("Insert into {} returned no rows", table);
        return Ok(record.clone());
    }
    serde_json::from_value(stored.swap_remove(0)).map_err(|e| BackendError::Decode(e.to_string()))
}
