//! Adoptable pets, fundraising campaigns and partner shelters.
//!
//! Listings are plain records passed through to the rendering layer. The
//! repositories are capabilities so the fixture-backed implementation can be
//! swapped for a real backend.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading listings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No record with this id.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Pet kind filter not recognised.
    #[error("Unknown pet kind: {0} (expected all, dog or cat)")]
    UnknownPetKind(String),
    /// The listing service failed.
    #[error("Listing unavailable: {0}")]
    Unavailable(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Envelope returned by listing services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    /// Whether the listing loaded.
    pub success: bool,
    /// Records.
    pub data: Vec<T>,
}

impl<T> Listing<T> {
    /// A successful listing.
    #[must_use]
    pub fn ok(data: Vec<T>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// An animal looking for a home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Age as shown to adopters ("2 years", "4 months").
    pub age: String,
    /// Breed.
    pub breed: String,
    /// Photo URL.
    pub image: String,
    /// Shelter currently caring for the pet.
    pub location: String,
    /// Temperament and needs.
    pub description: String,
    /// Whether adoption is open.
    pub for_adoption: bool,
}

const DOG_KEYWORDS: &[&str] = &["dog", "puppy", "labrador", "shepherd", "pit bull"];
const CAT_KEYWORDS: &[&str] = &["cat", "kitten", "tabby", "shorthair"];

/// Species filter for the adoption listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetKind {
    /// No filtering.
    #[default]
    All,
    /// Dogs and puppies.
    Dog,
    /// Cats and kittens.
    Cat,
}

impl PetKind {
    /// Whether a breed string belongs to this kind.
    #[must_use]
    pub fn matches_breed(self, breed: &str) -> bool {
        let breed = breed.to_lowercase();
        let keywords = match self {
            Self::All => return true,
            Self::Dog => DOG_KEYWORDS,
            Self::Cat => CAT_KEYWORDS,
        };
        keywords.iter().any(|k| breed.contains(k))
    }
}

impl FromStr for PetKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "dog" | "dogs" => Ok(Self::Dog),
            "cat" | "cats" => Ok(Self::Cat),
            other => Err(CatalogError::UnknownPetKind(other.to_string())),
        }
    }
}

impl fmt::Display for PetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Dog => "dog",
            Self::Cat => "cat",
        })
    }
}

/// Search text plus kind filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetQuery {
    /// Case-insensitive text matched against name, breed and description.
    pub search: String,
    /// Species filter.
    pub kind: PetKind,
}

impl PetQuery {
    /// Build a query.
    #[must_use]
    pub fn new(search: impl Into<String>, kind: PetKind) -> Self {
        Self {
            search: search.into(),
            kind,
        }
    }

    /// Whether `pet` passes both filters.
    #[must_use]
    pub fn matches(&self, pet: &Pet) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_match = needle.is_empty()
            || [&pet.name, &pet.breed, &pet.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        text_match && self.kind.matches_breed(&pet.breed)
    }

    /// Filter a listing, preserving order.
    #[must_use]
    pub fn apply(&self, pets: &[Pet]) -> Vec<Pet> {
        pets.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// A fundraising campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Cover image URL.
    pub image: String,
    /// What the money is for.
    pub description: String,
    /// Goal in rupees.
    pub target_amount: u64,
    /// Raised so far in rupees.
    pub raised_amount: u64,
    /// Days until the campaign closes.
    #[serde(rename = "dayLeft")]
    pub days_left: u32,
}

impl Campaign {
    /// Funded percentage, capped at 100.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // rupee amounts are far below 2^52
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount == 0 {
            return 0.0;
        }
        (self.raised_amount as f64 / self.target_amount as f64 * 100.0).min(100.0)
    }

    /// "65% Funded".
    #[must_use]
    pub fn funded_label(&self) -> String {
        format!("{:.0}% Funded", self.progress_percent())
    }

    /// "1 day left" / "12 days left".
    #[must_use]
    pub fn days_left_label(&self) -> String {
        if self.days_left == 1 {
            "1 day left".to_string()
        } else {
            format!("{} days left", self.days_left)
        }
    }

    /// Whether the goal has been reached.
    #[must_use]
    pub fn is_funded(&self) -> bool {
        self.raised_amount >= self.target_amount
    }
}

/// Format a rupee amount with thousands separators ("₹32,450").
#[must_use]
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    out.push('₹');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A partner shelter that receives injury reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    /// Identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Phone number.
    pub phone: String,
    /// Contact email.
    pub email: String,
}

/// Source of adoptable pets.
#[async_trait(?Send)]
pub trait PetRepository {
    /// All pets open for adoption.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the listing cannot be loaded.
    async fn pets_for_adoption(&self) -> CatalogResult<Vec<Pet>>;

    /// Pets matching a query.
    ///
    /// # Errors
    ///
    /// See [`PetRepository::pets_for_adoption`].
    async fn search_pets(&self, query: &PetQuery) -> CatalogResult<Vec<Pet>> {
        Ok(query.apply(&self.pets_for_adoption().await?))
    }

    /// The first `limit` pets, for the landing page.
    ///
    /// # Errors
    ///
    /// See [`PetRepository::pets_for_adoption`].
    async fn featured_pets(&self, limit: usize) -> CatalogResult<Vec<Pet>> {
        let mut pets = self.pets_for_adoption().await?;
        pets.truncate(limit);
        Ok(pets)
    }

    /// One pet by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id.
    async fn pet(&self, id: &str) -> CatalogResult<Pet> {
        self.pets_for_adoption()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

/// Source of fundraising campaigns.
#[async_trait(?Send)]
pub trait CampaignRepository {
    /// All running campaigns.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the listing cannot be loaded.
    async fn campaigns(&self) -> CatalogResult<Vec<Campaign>>;

    /// The first `limit` campaigns, for the landing page.
    ///
    /// # Errors
    ///
    /// See [`CampaignRepository::campaigns`].
    async fn featured_campaigns(&self, limit: usize) -> CatalogResult<Vec<Campaign>> {
        let mut campaigns = self.campaigns().await?;
        campaigns.truncate(limit);
        Ok(campaigns)
    }
}

/// Partner shelters notified of reports.
pub trait ShelterDirectory {
    /// Every partner shelter.
    fn shelters(&self) -> &[Shelter];
}
