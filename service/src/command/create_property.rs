//! [`Command`] for creating a new [`Property`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::property::{
    Address, City, Description, ImageUrl, ListingType, Suburb, Title, Type,
};
use crate::{
    domain::{property, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Property`].
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// [`Title`] of a new [`Property`].
    pub title: property::Title,

    /// [`Description`] of a new [`Property`].
    pub description: Option<property::Description>,

    /// [`Address`] of a new [`Property`].
    pub address: property::Address,

    /// [`City`] of a new [`Property`].
    pub city: property::City,

    /// [`Suburb`] of a new [`Property`].
    pub suburb: Option<property::Suburb>,

    /// [`Type`] of a new [`Property`].
    ///
    /// [`Type`]: struct@Type
    pub property_type: Option<property::Type>,

    /// Price of a new [`Property`].
    pub price: Money,

    /// [`ListingType`] of a new [`Property`].
    pub listing_type: property::ListingType,

    /// Number of bedrooms of a new [`Property`].
    pub bedrooms: u16,

    /// Number of bathrooms of a new [`Property`].
    pub bathrooms: u16,

    /// Number of car spots of a new [`Property`].
    pub car_spots: u16,

    /// Floor area of a new [`Property`] in square meters.
    pub floor_area: Option<u32>,

    /// Year a new [`Property`] was built.
    pub year_built: Option<u16>,

    /// [`ImageUrl`]s of a new [`Property`].
    pub image_urls: Vec<property::ImageUrl>,

    /// Indicator whether a new [`Property`] is promoted.
    pub is_featured: bool,
}

impl<Db> Command<CreateProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        let CreateProperty {
            title,
            description,
            address,
            city,
            suburb,
            property_type,
            price,
            listing_type,
            bedrooms,
            bathrooms,
            car_spots,
            floor_area,
            year_built,
            image_urls,
            is_featured,
        } = cmd;

        let property = Property {
            id: property::Id::new(),
            title,
            description,
            address,
            city,
            suburb,
            property_type,
            price,
            listing_type,
            bedrooms,
            bathrooms,
            car_spots,
            floor_area,
            year_built,
            image_urls,
            is_featured,
            created_at: DateTime::now().coerce(),
            updated_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
pub(crate) mod spec {
    use common::Money;

    use crate::{
        domain::{property, Property},
        query, spec::service, Command as _,
    };

    use super::CreateProperty;

    /// Returns a valid [`CreateProperty`] in the provided city.
    pub(crate) fn listing(city: &str, price: u32) -> CreateProperty {
        CreateProperty {
            title: property::Title::new("Sunny apartment").unwrap(),
            description: None,
            address: property::Address::new("1 Main St").unwrap(),
            city: property::City::new(city).unwrap(),
            suburb: None,
            property_type: property::Type::new("Apartment"),
            price: Money::from(price),
            listing_type: property::ListingType::Sale,
            bedrooms: 2,
            bathrooms: 1,
            car_spots: 1,
            floor_area: Some(80),
            year_built: None,
            image_urls: vec![],
            is_featured: false,
        }
    }

    #[tokio::test]
    async fn creates_property() {
        let svc = service();

        let created: Property =
            svc.execute(listing("Sydney", 650_000)).await.unwrap();
        assert!(created.updated_at.is_none());

        let found = svc
            .execute(query::property::ById::by(created.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.city.to_string(), "Sydney");
        assert_eq!(found.price, Money::from(650_000));
    }
}
