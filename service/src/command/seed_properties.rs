//! [`Command`] for seeding an empty catalogue with generated [`Property`]s.

use std::time::Duration;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use tracerr::Traced;
use tracing as log;
use xxhash_rust::xxh3;

use crate::{
    domain::{property, Property},
    infra::{database, Database},
    read::property::list::{Filter, TotalCount},
    Service,
};

use super::Command;

/// [`Command`] for seeding an empty catalogue with generated [`Property`]s.
///
/// Does nothing if at least one [`Property`] exists already. Generated values
/// are derived from the [`Property`] index only, so two seedings of the same
/// `count` produce the same catalogue (apart from IDs and timestamps).
#[derive(Clone, Copy, Debug)]
pub struct SeedProperties {
    /// Number of [`Property`]s to generate.
    pub count: u16,
}

/// Number of seeded [`Property`]s.
pub type Output = u16;

impl<Db> Command<SeedProperties> for Service<Db>
where
    Db: Database<
            Select<By<TotalCount, Filter>>,
            Ok = TotalCount,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SeedProperties,
    ) -> Result<Self::Ok, Self::Err> {
        let SeedProperties { count } = cmd;

        let existing: u64 = self
            .database()
            .execute(Select(By::new(Filter::default())))
            .await
            .map_err(tracerr::wrap!())?
            .into();
        if existing > 0 || count == 0 {
            log::debug!(
                "skipping `Property` seeding: {existing} `Property`s exist",
            );
            return Ok(0);
        }

        let now = DateTime::now();
        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        for index in 0..count {
            tx.execute(Insert(generate(index, now)))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::info!("seeded {count} `Property`s");

        Ok(count)
    }
}

/// Error of [`SeedProperties`] [`Command`] execution.
pub type ExecutionError = database::Error;

const CITIES: &[&str] = &[
    "Sydney",
    "Melbourne",
    "Brisbane",
    "Perth",
    "Adelaide",
    "Hobart",
    "Darwin",
    "Canberra",
    "Gold Coast",
    "Newcastle",
    "Sunshine Coast",
    "Wollongong",
    "Geelong",
    "Townsville",
    "Cairns",
];

const SUBURBS: &[&str] = &[
    "CBD",
    "Richmond",
    "Southbank",
    "Bondi",
    "Manly",
    "Surry Hills",
    "Paddington",
    "Newtown",
    "Parramatta",
    "Chatswood",
    "St Kilda",
    "Fitzroy",
    "South Yarra",
    "Brunswick",
    "Fortitude Valley",
];

const STREET_TYPES: &[&str] = &[
    "Street",
    "Avenue",
    "Road",
    "Boulevard",
    "Drive",
    "Lane",
    "Way",
    "Terrace",
    "Place",
    "Court",
    "Parade",
    "Crescent",
    "Esplanade",
];

const PROPERTY_TYPES: &[&str] = &[
    "Apartment",
    "House",
    "Townhouse",
    "Villa",
    "Unit",
    "Studio",
    "Penthouse",
    "Duplex",
    "Terrace",
    "Semi-detached",
    "Cottage",
];

const FEATURES: &[&str] = &[
    "Modern",
    "Renovated",
    "Luxury",
    "Spacious",
    "Stylish",
    "Charming",
];

const DESCRIPTIONS: &[&str] = &[
    "Beautifully designed property with modern amenities and a great \
     location. Open floor plan, high ceilings and premium finishes.",
    "Spacious rooms with natural light and city views. Recently renovated \
     with high-quality materials.",
    "Close to public transport, shops and dining. Perfect for professionals \
     looking for a convenient lifestyle.",
    "Family-friendly neighbourhood with schools and parks nearby. Multiple \
     living areas and a large backyard.",
    "Private and peaceful setting with easy access to all amenities, minutes \
     from the city centre.",
];

const IMAGE_URLS: &[&str] = &[
    "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800",
    "https://images.unsplash.com/photo-1600585152220-90363fe7e115?w=800",
    "https://images.unsplash.com/photo-1600566752225-ff822e1c7856?w=800",
    "https://images.unsplash.com/photo-1600210492493-0946911123ea?w=800",
    "https://images.unsplash.com/photo-1600049809665-5eb0b9a4f5fe?w=800",
    "https://images.unsplash.com/photo-1600607687939-ce8bbf269f80?w=800",
    "https://images.unsplash.com/photo-1615529328331-f8917597711f?w=800",
    "https://images.unsplash.com/photo-1600566753190-17f0baa2a6c3?w=800",
];

/// Deterministic source of pseudo-random numbers for a single [`Property`].
struct Dice {
    /// Index of the generated [`Property`].
    index: u16,

    /// Number of rolls made so far.
    rolls: u64,
}

impl Dice {
    /// Returns a number in `0..n`.
    fn roll(&mut self, n: usize) -> usize {
        let hash =
            xxh3::xxh3_64_with_seed(&self.index.to_le_bytes(), self.rolls);
        self.rolls += 1;
        let n = u64::try_from(n).unwrap_or(u64::MAX);
        usize::try_from(hash % n).unwrap_or_default()
    }

    /// Returns a number in `from..=to`.
    fn between(&mut self, from: u32, to: u32) -> u32 {
        let span = usize::try_from(to - from + 1).unwrap_or(usize::MAX);
        from + u32::try_from(self.roll(span)).unwrap_or_default()
    }

    /// Picks an element of the given `items`.
    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.roll(items.len())]
    }
}

/// Generates the [`Property`] with the provided `index`, listed relative to
/// `now`.
fn generate(index: u16, now: DateTime) -> Property {
    let mut dice = Dice { index, rolls: 0 };

    let city = dice.pick(CITIES);
    let suburb = dice.pick(SUBURBS);
    let kind = dice.pick(PROPERTY_TYPES);
    let listing_type = if index % 2 == 0 {
        property::ListingType::Sale
    } else {
        property::ListingType::Rent
    };
    let price = match listing_type {
        property::ListingType::Sale => dice.between(30, 300) * 10_000,
        property::ListingType::Rent => dice.between(6, 40) * 50,
    };
    let bedrooms = match dice.roll(10) {
        0 => 1,
        1..=3 => 2,
        4..=6 => 3,
        7 | 8 => 4,
        _ => 5,
    };
    let title = format!("{} {kind} in {suburb}", dice.pick(FEATURES));
    let address = {
        let unit = (dice.roll(10) > 7)
            .then(|| format!("Unit {}/", dice.between(1, 99)))
            .unwrap_or_default();
        format!(
            "{unit}{} Sample {}",
            dice.between(1, 999),
            dice.pick(STREET_TYPES),
        )
    };
    let images = usize::try_from(dice.between(3, 7)).unwrap_or(3);
    let first_image = dice.roll(IMAGE_URLS.len());
    let days_ago = u64::from(dice.between(1, 89));
    let description = dice.pick(DESCRIPTIONS);

    // SAFETY: Every generated text is non-empty, trimmed and short enough.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    let (title, description, address, city, suburb, kind, image_urls) = unsafe {
        (
            property::Title::new_unchecked(title),
            property::Description::new_unchecked(description),
            property::Address::new_unchecked(address),
            property::City::new_unchecked(city),
            property::Suburb::new_unchecked(suburb),
            property::Type::new_unchecked(kind),
            IMAGE_URLS
                .iter()
                .cycle()
                .skip(first_image)
                .take(images)
                .map(|url| property::ImageUrl::new_unchecked(*url))
                .collect(),
        )
    };

    Property {
        id: property::Id::new(),
        title,
        description: Some(description),
        address,
        city,
        suburb: Some(suburb),
        property_type: Some(kind),
        price: Money::from(price),
        listing_type,
        bedrooms,
        bathrooms: u16::try_from(dice.between(1, 3)).unwrap_or(1),
        car_spots: u16::try_from(dice.between(0, 2)).unwrap_or_default(),
        floor_area: Some(dice.between(50, 499)),
        year_built: u16::try_from(dice.between(1975, 2024)).ok(),
        image_urls,
        is_featured: dice.roll(10) < 3,
        created_at: (now - Duration::from_secs(days_ago * 24 * 60 * 60))
            .coerce(),
        updated_at: None,
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        read::property::list::{Filter, TotalCount},
        spec::service,
        Command as _,
    };

    use super::{generate, SeedProperties, CITIES};

    #[test]
    fn generates_deterministic_valid_properties() {
        let now = DateTime::now();
        for index in 0..200 {
            let a = generate(index, now);
            let b = generate(index, now);

            assert_eq!(a.title, b.title);
            assert_eq!(a.price, b.price);
            assert_eq!(a.city, b.city);
            assert!(CITIES.contains(&a.city.to_string().as_str()));
            assert!((1..=5).contains(&a.bedrooms));
            assert!((3..=7).contains(&a.image_urls.len()));
            assert!(a.created_at < now.coerce());
        }
    }

    #[tokio::test]
    async fn seeds_only_empty_catalogue() {
        let svc = service();

        let seeded = svc.execute(SeedProperties { count: 30 }).await.unwrap();
        assert_eq!(seeded, 30);
        let reseeded =
            svc.execute(SeedProperties { count: 30 }).await.unwrap();
        assert_eq!(reseeded, 0);

        let total: TotalCount = svc
            .database()
            .execute(common::operations::Select(
                common::operations::By::new(Filter::default()),
            ))
            .await
            .unwrap();
        assert_eq!(u64::from(total), 30);
    }
}
