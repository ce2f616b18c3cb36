//! Listing catalog: loading, filtering, distances, and summary statistics.
//!
//! Everything here is read-only I/O and display support around the booking
//! engine; the engine consumes only the set of listing identifiers.

pub mod filter;
pub mod geo;
pub mod summary;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::booking::ListingId;

pub use filter::{ListingFilter, MinimumNights};
pub use geo::{haversine_miles, Coordinates, Landmark};
pub use summary::CatalogSummary;

/// Room arrangement offered by a listing, as labeled in the catalog export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "Entire home/apt")]
    EntireHomeApt,
    #[serde(rename = "Private room")]
    PrivateRoom,
    #[serde(rename = "Shared room")]
    SharedRoom,
}

impl RoomType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::EntireHomeApt => "Entire home/apt",
            Self::PrivateRoom => "Private room",
            Self::SharedRoom => "Shared room",
        }
    }

    pub const fn all() -> [Self; 3] {
        [Self::EntireHomeApt, Self::PrivateRoom, Self::SharedRoom]
    }
}

/// One catalog row. The export spells the neighborhood column the British
/// way; columns the app never uses are ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub host_name: String,
    #[serde(rename = "neighbourhood")]
    pub neighborhood: String,
    pub latitude: f64,
    pub longitude: f64,
    pub room_type: RoomType,
    pub price: u32,
    pub minimum_nights: u32,
}

impl Listing {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read the listing catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listing catalog data: {0}")]
    Csv(#[from] csv::Error),
}

/// Ordered collection of listings as loaded from the catalog export.
#[derive(Debug, Clone)]
pub struct ListingCatalog {
    listings: Vec<Listing>,
}

impl ListingCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut listings = Vec::new();
        for record in csv_reader.deserialize::<Listing>() {
            listings.push(record?);
        }

        Ok(Self { listings })
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Identifier set the availability ledger is seeded from.
    pub fn listing_ids(&self) -> BTreeSet<ListingId> {
        self.listings.iter().map(|listing| listing.id).collect()
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_CSV: &str = "\
id,name,host_name,neighbourhood,latitude,longitude,room_type,price,minimum_nights
100,Sunny studio near MIT,Simone,Area 2/MIT,42.3601,-71.0942,Entire home/apt,120,2
205,Riverside guest room,Hart,Riverside,42.3550,-71.1100,Private room,60,1
318,Porch house in Agassiz,Noor,Agassiz,42.3810,-71.1150,Entire home/apt,310,3
442,Bunk by the museum,Petra,East Cambridge,42.3680,-71.0800,Shared room,35,1
";
