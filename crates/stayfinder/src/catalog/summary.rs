use std::collections::BTreeMap;

use serde::Serialize;

use super::{Listing, RoomType};

const PRICE_BAND_LABELS: [&str; 7] = [
    "0-50", "50-100", "100-150", "150-200", "200-250", "250-300", "300+",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBandCount {
    pub band: &'static str,
    pub listings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborhoodCount {
    pub neighborhood: String,
    pub listings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomTypeShare {
    pub room_type: RoomType,
    pub listings: usize,
    pub share_percent: u32,
}

/// Aggregate counts behind the browse page's charts: listings per price
/// band, per neighborhood, and the room-type mix as whole percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub price_bands: Vec<PriceBandCount>,
    pub neighborhoods: Vec<NeighborhoodCount>,
    pub room_mix: Vec<RoomTypeShare>,
}

impl CatalogSummary {
    pub fn from_listings(listings: &[&Listing]) -> Self {
        let total = listings.len();

        let mut band_counts = [0usize; PRICE_BAND_LABELS.len()];
        let mut by_neighborhood: BTreeMap<&str, usize> = BTreeMap::new();
        let mut by_room_type: BTreeMap<RoomType, usize> = BTreeMap::new();

        for listing in listings {
            band_counts[band_position(listing.price)] += 1;
            *by_neighborhood
                .entry(listing.neighborhood.as_str())
                .or_default() += 1;
            *by_room_type.entry(listing.room_type).or_default() += 1;
        }

        let price_bands = PRICE_BAND_LABELS
            .iter()
            .copied()
            .zip(band_counts)
            .map(|(band, listings)| PriceBandCount { band, listings })
            .collect();

        let neighborhoods = by_neighborhood
            .into_iter()
            .map(|(neighborhood, listings)| NeighborhoodCount {
                neighborhood: neighborhood.to_string(),
                listings,
            })
            .collect();

        let room_mix = RoomType::all()
            .into_iter()
            .map(|room_type| {
                let listings = by_room_type.get(&room_type).copied().unwrap_or_default();
                RoomTypeShare {
                    room_type,
                    listings,
                    share_percent: share_percent(listings, total),
                }
            })
            .collect();

        Self {
            total,
            price_bands,
            neighborhoods,
            room_mix,
        }
    }
}

fn band_position(price: u32) -> usize {
    match price {
        0..=49 => 0,
        50..=99 => 1,
        100..=149 => 2,
        150..=199 => 3,
        200..=249 => 4,
        250..=299 => 5,
        _ => 6,
    }
}

fn share_percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}
