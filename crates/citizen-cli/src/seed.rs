//! Built-in guide categories and guides

use anyhow::{bail, Result};
use serde_json::Value;
use validator::Validate;

use citizen_core::domain::{tables, Category, Guide};
use citizen_core::ports::BackendClient;

#[derive(Debug, PartialEq)]
pub struct SeedReport {
    pub categories: usize,
    pub guides: usize,
}

fn category(name: &str, slug: &str, description: &str, icon: &str) -> Category {
    Category {
        id: None,
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        icon: Some(icon.to_string()),
    }
}

struct GuideSeed<'a> {
    category: &'a str,
    title: &'a str,
    slug: &'a str,
    summary: &'a str,
    steps: &'a [&'a str],
    documents: &'a [&'a str],
    office: &'a str,
    fee: &'a str,
    processing_time: &'a str,
}

impl GuideSeed<'_> {
    fn build(&self) -> Guide {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Guide {
            id: None,
            category_slug: Some(self.category.to_string()),
            title: self.title.to_string(),
            slug: self.slug.to_string(),
            summary: Some(self.summary.to_string()),
            steps: owned(self.steps),
            required_documents: owned(self.documents),
            office: Some(self.office.to_string()),
            fee: Some(self.fee.to_string()),
            processing_time: Some(self.processing_time.to_string()),
        }
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        category(
            "Identity & Civil Registry",
            "identity",
            "ID cards, family cards, birth and marriage certificates",
            "id-card",
        ),
        category(
            "Health",
            "health",
            "National health insurance and public clinics",
            "heart-pulse",
        ),
        category(
            "Transport",
            "transport",
            "Driving licences and vehicle registration",
            "car",
        ),
        category(
            "Business & Permits",
            "business",
            "Business registration and local permits",
            "briefcase",
        ),
        category(
            "Travel Documents",
            "travel",
            "Passports and travel papers",
            "plane",
        ),
    ]
}

pub fn guides() -> Vec<Guide> {
    let seeds = [
        GuideSeed {
            category: "identity",
            title: "Replacing a lost ID card",
            slug: "replace-lost-id-card",
            summary: "Get a new electronic ID card after loss or damage.",
            steps: &[
                "Report the loss at the nearest police station",
                "Bring the police report and family card to the civil registry office",
                "Have your photo and fingerprints verified",
                "Collect the new card",
            ],
            documents: &["Police loss report", "Family card (copy)"],
            office: "Civil Registry Office",
            fee: "Free",
            processing_time: "1 to 14 days",
        },
        GuideSeed {
            category: "identity",
            title: "Registering a birth",
            slug: "register-birth",
            summary: "Obtain a birth certificate for a newborn child.",
            steps: &[
                "Collect the birth letter from the hospital or midwife",
                "Fill in the birth registration form",
                "Submit the form with the parents' documents",
                "Collect the birth certificate",
            ],
            documents: &[
                "Birth letter from hospital or midwife",
                "Parents' ID cards",
                "Family card",
                "Marriage certificate",
            ],
            office: "Civil Registry Office",
            fee: "Free",
            processing_time: "Up to 7 days",
        },
        GuideSeed {
            category: "health",
            title: "Enrolling in national health insurance",
            slug: "enrol-health-insurance",
            summary: "Register yourself and your family for public health cover.",
            steps: &[
                "Choose a membership class",
                "Register online or at a health insurance branch office",
                "Pay the first monthly premium",
                "Pick a primary clinic",
            ],
            documents: &["ID card", "Family card", "Bank account details"],
            office: "Health Insurance Branch Office",
            fee: "Monthly premium by class",
            processing_time: "Active 14 days after registration",
        },
        GuideSeed {
            category: "transport",
            title: "Renewing a driving licence",
            slug: "renew-driving-licence",
            summary: "Extend a driving licence before it expires.",
            steps: &[
                "Get a health certificate",
                "Take the psychological test",
                "Submit the renewal form at the licensing office",
                "Pay the fee and collect the licence",
            ],
            documents: &["Current driving licence", "ID card", "Health certificate"],
            office: "Police Licensing Office",
            fee: "Varies by licence class",
            processing_time: "Same day",
        },
        GuideSeed {
            category: "business",
            title: "Registering a micro business",
            slug: "register-micro-business",
            summary: "Get a business identification number for a micro enterprise.",
            steps: &[
                "Create an account on the online licensing portal",
                "Fill in the business profile and activity codes",
                "Submit and download the business identification number",
            ],
            documents: &["ID card", "Tax number"],
            office: "Online Licensing Portal",
            fee: "Free",
            processing_time: "Same day",
        },
        GuideSeed {
            category: "travel",
            title: "Applying for a passport",
            slug: "apply-passport",
            summary: "Apply for a first passport or replace an expired one.",
            steps: &[
                "Book an appointment through the immigration app",
                "Bring original documents to the immigration office",
                "Complete the interview, photo and fingerprints",
                "Pay the fee and collect the passport",
            ],
            documents: &["ID card", "Family card", "Birth certificate or diploma"],
            office: "Immigration Office",
            fee: "Set by immigration tariff",
            processing_time: "3 to 4 working days",
        },
    ];
    seeds.iter().map(GuideSeed::build).collect()
}

fn to_rows<T: serde::Serialize>(records: &[T]) -> Result<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(Into::into))
        .collect()
}

pub async fn run(client: &dyn BackendClient) -> Result<SeedReport> {
    let categories = categories();
    let guides = guides();

    for category in &categories {
        category.validate()?;
    }
    for guide in &guides {
        guide.validate()?;
        let known = guide
            .category_slug
            .as_deref()
            .is_some_and(|slug| categories.iter().any(|c| c.slug == slug));
        if !known {
            bail!("guide {} has an unknown category", guide.slug);
        }
    }

    client
        .insert(tables::CATEGORIES, to_rows(&categories)?)
        .await?;
    client.insert(tables::GUIDES, to_rows(&guides)?).await?;

    Ok(SeedReport {
        categories: categories.len(),
        guides: guides.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use citizen_infrastructure::{MockBackend, MockStore};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_slugs_are_unique() {
        let slugs: HashSet<_> = guides().into_iter().map(|g| g.slug).collect();
        assert_eq!(slugs.len(), guides().len());
    }

    #[tokio::test]
    async fn test_seed_against_mock() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        let report = run(&backend).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                categories: categories().len(),
                guides: guides().len(),
            }
        );
    }
}
