use crate::infra::{open_engine, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use stayfinder::booking::{ReservationOutcome, ReservationRequest};
use stayfinder::catalog::{
    haversine_miles, CatalogSummary, Landmark, Listing, ListingCatalog, ListingFilter,
    MinimumNights, RoomType,
};
use stayfinder::config::AppConfig;
use stayfinder::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct ListingsArgs {
    /// Minimum price per night
    #[arg(long, default_value_t = 1)]
    pub(crate) min_price: u32,
    /// Maximum price per night (exclusive)
    #[arg(long, default_value_t = 3000)]
    pub(crate) max_price: u32,
    /// Match listings with exactly this minimum-nights requirement
    /// (10 matches ten or more)
    #[arg(long)]
    pub(crate) minimum_nights: Option<u32>,
    /// Restrict to a neighborhood (repeatable)
    #[arg(long = "neighborhood")]
    pub(crate) neighborhoods: Vec<String>,
    /// Restrict to a room type (repeatable): entire, private, or shared
    #[arg(long = "room-type", value_parser = parse_room_type)]
    pub(crate) room_types: Vec<RoomType>,
    /// Custom location latitude for an extra distance column
    #[arg(long, requires = "custom_lon")]
    pub(crate) custom_lat: Option<f64>,
    /// Custom location longitude for an extra distance column
    #[arg(long, requires = "custom_lat")]
    pub(crate) custom_lon: Option<f64>,
    /// Print landmark distances for each listing
    #[arg(long)]
    pub(crate) distances: bool,
    /// Print price, neighborhood, and room-type summaries
    #[arg(long)]
    pub(crate) summary: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReserveArgs {
    /// Listing id to reserve
    #[arg(long)]
    pub(crate) listing_id: String,
    /// First night of the stay (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: NaiveDate,
    /// Last night of the stay (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) end_date: NaiveDate,
    /// Guest first name
    #[arg(long)]
    pub(crate) first_name: String,
    /// Guest last name
    #[arg(long)]
    pub(crate) last_name: String,
    /// Guest email address
    #[arg(long)]
    pub(crate) email: String,
    /// Guest phone number (10 digits)
    #[arg(long)]
    pub(crate) phone: String,
    /// Override the date the past-date rule checks against (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn parse_room_type(raw: &str) -> Result<RoomType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "entire" | "entire home/apt" => Ok(RoomType::EntireHomeApt),
        "private" | "private room" => Ok(RoomType::PrivateRoom),
        "shared" | "shared room" => Ok(RoomType::SharedRoom),
        other => Err(format!(
            "unknown room type '{other}' (expected entire, private, or shared)"
        )),
    }
}

pub(crate) fn run_listings(args: ListingsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = ListingCatalog::from_path(&config.booking.catalog_path)?;

    let minimum_nights = match args.minimum_nights {
        None => MinimumNights::Any,
        Some(n) if n >= 10 => MinimumNights::TenOrMore,
        Some(n) => MinimumNights::Exactly(n),
    };
    let filter = ListingFilter {
        min_price: args.min_price,
        max_price: args.max_price,
        minimum_nights,
        neighborhoods: args.neighborhoods,
        room_types: args.room_types,
    };

    let mut landmarks = Landmark::cambridge_defaults();
    if let (Some(latitude), Some(longitude)) = (args.custom_lat, args.custom_lon) {
        landmarks.push(Landmark::new("Custom Location", latitude, longitude));
    }

    let matched = filter.apply(&catalog);
    println!(
        "{} of {} listings match",
        matched.len(),
        catalog.len()
    );

    for listing in &matched {
        render_listing(listing);
        if args.distances {
            render_distances(listing, &landmarks);
        }
    }

    if args.summary {
        render_summary(&CatalogSummary::from_listings(&matched));
    }

    Ok(())
}

fn render_listing(listing: &Listing) {
    println!(
        "- {} | {} | {} | {} | ${}/night | min {} nights | host {}",
        listing.id,
        listing.name,
        listing.neighborhood,
        listing.room_type.label(),
        listing.price,
        listing.minimum_nights,
        listing.host_name
    );
}

fn render_distances(listing: &Listing, landmarks: &[Landmark]) {
    for landmark in landmarks {
        let miles = haversine_miles(listing.coordinates(), landmark.coordinates);
        println!("    {:.2} mi to {}", miles, landmark.name);
    }
}

fn render_summary(summary: &CatalogSummary) {
    println!("\nPrice per night");
    for band in &summary.price_bands {
        println!("- {}: {}", band.band, band.listings);
    }

    println!("\nListing neighborhoods");
    for entry in &summary.neighborhoods {
        println!("- {}: {}", entry.neighborhood, entry.listings);
    }

    println!("\nRoom types");
    for share in &summary.room_mix {
        println!(
            "- {}: {} ({}%)",
            share.room_type.label(),
            share.listings,
            share.share_percent
        );
    }
}

pub(crate) fn run_reserve(args: ReserveArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = ListingCatalog::from_path(&config.booking.catalog_path)?;
    let mut engine = open_engine(&config.booking, &catalog)?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let request = ReservationRequest {
        listing_id: args.listing_id,
        start_date: args.start_date,
        end_date: args.end_date,
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
    };

    match engine.attempt_reservation(&request, today)? {
        ReservationOutcome::Confirmed(record) => {
            println!("Reservation successful!");
            println!(
                "Listing {} reserved for {} {} from {} to {}",
                record.listing_id,
                record.first_name,
                record.last_name,
                record.start_date,
                record.end_date
            );
        }
        ReservationOutcome::Rejected(reason) => {
            println!("Reservation rejected: {reason}");
        }
        ReservationOutcome::Unavailable => {
            println!("Reservation unavailable. Please select another listing or timeframe.");
        }
    }

    Ok(())
}
