use serde::Deserialize;

use super::{Listing, ListingCatalog, RoomType};

/// Minimum-nights selector mirroring the browse page's dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumNights {
    #[default]
    Any,
    Exactly(u32),
    TenOrMore,
}

impl MinimumNights {
    pub fn admits(self, nights: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(n) => nights == n,
            Self::TenOrMore => nights >= 10,
        }
    }
}

/// Multi-criteria listing filter. Empty neighborhood and room-type sets
/// select everything, matching the browse page's blank multiselects.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub min_price: u32,
    pub max_price: u32,
    pub minimum_nights: MinimumNights,
    pub neighborhoods: Vec<String>,
    pub room_types: Vec<RoomType>,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            min_price: 1,
            max_price: 3000,
            minimum_nights: MinimumNights::Any,
            neighborhoods: Vec::new(),
            room_types: Vec::new(),
        }
    }
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        // Price band: lower bound inclusive, upper bound exclusive.
        if listing.price < self.min_price || listing.price >= self.max_price {
            return false;
        }

        if !self.minimum_nights.admits(listing.minimum_nights) {
            return false;
        }

        if !self.neighborhoods.is_empty()
            && !self
                .neighborhoods
                .iter()
                .any(|n| n == &listing.neighborhood)
        {
            return false;
        }

        if !self.room_types.is_empty() && !self.room_types.contains(&listing.room_type) {
            return false;
        }

        true
    }

    pub fn apply<'a>(&self, catalog: &'a ListingCatalog) -> Vec<&'a Listing> {
        catalog
            .listings()
            .iter()
            .filter(|listing| self.matches(listing))
            .collect()
    }
}
