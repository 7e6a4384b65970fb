//! [`Property`]-related endpoints.

use std::str::FromStr;

use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use common::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, property},
    query::{self, properties},
    read::property::list,
    Query as _,
};

use crate::{define_error, AsError, Error, Service, Session};

/// Property listed for sale or rent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// ID of this [`Property`].
    pub id: property::Id,

    /// Title of this [`Property`].
    pub title: String,

    /// Description of this [`Property`].
    pub description: Option<String>,

    /// Street address of this [`Property`].
    pub address: String,

    /// City of this [`Property`].
    pub city: String,

    /// Suburb of this [`Property`].
    pub suburb: Option<String>,

    /// Type of this [`Property`].
    pub property_type: Option<String>,

    /// Price of this [`Property`].
    pub price: Money,

    /// Category this [`Property`] is listed in.
    pub listing_type: property::ListingType,

    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Number of bathrooms.
    pub bathrooms: u16,

    /// Number of car spots.
    pub car_spots: u16,

    /// Floor area in square meters.
    pub floor_area: Option<u32>,

    /// Year this [`Property`] was built.
    pub year_built: Option<u16>,

    /// Image URLs in display order.
    pub image_urls: Vec<String>,

    /// Indicator whether this [`Property`] is promoted.
    pub is_featured: bool,

    /// Listing time of this [`Property`].
    pub created_at: property::CreationDateTime,

    /// Last modification time of this [`Property`].
    pub updated_at: Option<property::ModificationDateTime>,
}

impl From<domain::Property> for Property {
    fn from(p: domain::Property) -> Self {
        Self {
            id: p.id,
            title: p.title.to_string(),
            description: p.description.map(|d| d.to_string()),
            address: p.address.to_string(),
            city: p.city.to_string(),
            suburb: p.suburb.map(|s| s.to_string()),
            property_type: p.property_type.map(|t| t.to_string()),
            price: p.price,
            listing_type: p.listing_type,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            car_spots: p.car_spots,
            floor_area: p.floor_area,
            year_built: p.year_built,
            image_urls: p.image_urls.iter().map(ToString::to_string).collect(),
            is_featured: p.is_featured,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Single page of [`Property`]s with its pagination metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// [`Property`]s on this [`Page`].
    pub items: Vec<Property>,

    /// 1-based number of this [`Page`].
    pub page_number: u32,

    /// Requested size of this [`Page`].
    pub page_size: u32,

    /// Total number of matching [`Property`]s.
    pub total_count: u64,

    /// Total number of pages.
    pub total_pages: u64,

    /// Indicator whether a page precedes this one.
    pub has_previous_page: bool,

    /// Indicator whether a page follows this one.
    pub has_next_page: bool,
}

impl From<list::Page> for Page {
    fn from(page: list::Page) -> Self {
        let page = page.map(Property::from);
        Self {
            page_number: page.number(),
            page_size: page.size(),
            total_count: page.total_count,
            total_pages: page.total_pages(),
            has_previous_page: page.has_previous_page(),
            has_next_page: page.has_next_page(),
            items: page.items,
        }
    }
}

/// Query string of [`search`].
///
/// Prices and dates are kept textual to report malformed values with a
/// meaningful message. Blank text criteria are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Requested page number.
    pub page_number: Option<i64>,

    /// Requested page size.
    pub page_size: Option<i64>,

    /// Field to sort by.
    pub sort_by: Option<String>,

    /// Sorting direction.
    pub sort_order: Option<String>,

    /// Inclusive lower price bound, as decimal text.
    pub price_from: Option<String>,

    /// Inclusive upper price bound, as decimal text.
    pub price_to: Option<String>,

    /// Exact number of bedrooms.
    pub bedrooms: Option<u16>,

    /// City to list in.
    pub city: Option<String>,

    /// Listing category (`Sale` or `Rent`).
    pub listing_type: Option<String>,

    /// Suburb to list in.
    pub suburb: Option<String>,

    /// Property type to list.
    pub property_type: Option<String>,

    /// Featured flag.
    pub is_featured: Option<bool>,

    /// Inclusive lower listing date bound.
    pub date_from: Option<String>,

    /// Inclusive upper listing date bound.
    pub date_to: Option<String>,

    /// Free-text search term.
    pub search_term: Option<String>,
}

impl TryFrom<SearchParams> for properties::Search {
    type Error = PropertyError;

    fn try_from(params: SearchParams) -> Result<Self, Self::Error> {
        use PropertyError as E;

        let SearchParams {
            page_number,
            page_size,
            sort_by,
            sort_order,
            price_from,
            price_to,
            bedrooms,
            city,
            listing_type,
            suburb,
            property_type,
            is_featured,
            date_from,
            date_to,
            search_term,
        } = params;

        let price = |p: Option<String>| {
            non_blank(p)
                .map(|p| Decimal::from_str(&p).map_err(|_| E::InvalidPrice))
                .transpose()
        };
        let date = |d: Option<String>| {
            non_blank(d)
                .map(|d| d.parse().map_err(|_| E::InvalidDate))
                .transpose()
        };

        Ok(Self {
            page_number,
            page_size,
            sort_by: non_blank(sort_by),
            sort_order: non_blank(sort_order),
            price_from: price(price_from)?,
            price_to: price(price_to)?,
            bedrooms,
            city: text(city, E::InvalidCity)?,
            listing_type: non_blank(listing_type)
                .map(|t| t.parse().map_err(|_| E::InvalidListingType))
                .transpose()?,
            suburb: text(suburb, E::InvalidSuburb)?,
            property_type: text(property_type, E::InvalidPropertyType)?,
            is_featured,
            date_from: date(date_from)?,
            date_to: date(date_to)?,
            search_term: non_blank(search_term),
        })
    }
}

/// Payload of a new [`Property`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    /// Title of the new [`Property`].
    pub title: String,

    /// Description of the new [`Property`].
    #[serde(default)]
    pub description: Option<String>,

    /// Street address of the new [`Property`].
    pub address: String,

    /// City of the new [`Property`].
    pub city: String,

    /// Suburb of the new [`Property`].
    #[serde(default)]
    pub suburb: Option<String>,

    /// Type of the new [`Property`].
    #[serde(default)]
    pub property_type: Option<String>,

    /// Price of the new [`Property`].
    pub price: Money,

    /// Category the new [`Property`] is listed in.
    pub listing_type: property::ListingType,

    /// Number of bedrooms.
    #[serde(default)]
    pub bedrooms: u16,

    /// Number of bathrooms.
    #[serde(default)]
    pub bathrooms: u16,

    /// Number of car spots.
    #[serde(default)]
    pub car_spots: u16,

    /// Floor area in square meters.
    #[serde(default)]
    pub floor_area: Option<u32>,

    /// Year the new [`Property`] was built.
    #[serde(default)]
    pub year_built: Option<u16>,

    /// Image URLs in display order.
    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Indicator whether the new [`Property`] is promoted.
    #[serde(default)]
    pub is_featured: bool,
}

impl TryFrom<NewProperty> for command::CreateProperty {
    type Error = PropertyError;

    fn try_from(new: NewProperty) -> Result<Self, Self::Error> {
        use PropertyError as E;

        Ok(Self {
            title: required(new.title, E::InvalidTitle)?,
            description: text(new.description, E::InvalidDescription)?,
            address: required(new.address, E::InvalidAddress)?,
            city: required(new.city, E::InvalidCity)?,
            suburb: text(new.suburb, E::InvalidSuburb)?,
            property_type: text(new.property_type, E::InvalidPropertyType)?,
            price: property::is_valid_price(new.price)
                .then_some(new.price)
                .ok_or(E::InvalidPriceAmount)?,
            listing_type: new.listing_type,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            car_spots: new.car_spots,
            floor_area: new.floor_area,
            year_built: new.year_built,
            image_urls: new
                .image_urls
                .into_iter()
                .map(|u| property::ImageUrl::new(u.trim()))
                .collect::<Option<_>>()
                .ok_or(E::InvalidImageUrl)?,
            is_featured: new.is_featured,
        })
    }
}

/// Returns the trimmed `text`, or [`None`] if it's blank.
fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty())
}

/// Parses the trimmed non-blank `value` into `T`, failing with the provided
/// `err` if it's invalid.
fn text<T: FromStr>(
    value: Option<String>,
    err: PropertyError,
) -> Result<Option<T>, PropertyError> {
    non_blank(value).map(|t| t.parse().map_err(|_| err)).transpose()
}

/// Same as [`text()`], but fails with the provided `err` on a blank `value`
/// too.
fn required<T: FromStr>(
    value: String,
    err: PropertyError,
) -> Result<T, PropertyError> {
    text(Some(value), err)?.ok_or(err)
}

/// Lists a page of [`Property`]s matching the provided criteria.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_CRITERIA` - if pagination is out of range, a range is inverted
///                        or a price is negative;
/// - `INVALID_QUERY` - if a criterion is malformed.
#[tracing::instrument(skip(service))]
pub async fn search(
    Extension(service): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, Error>,
) -> Result<Json<Page>, Error> {
    let search = properties::Search::try_from(params)?;

    service
        .execute(search)
        .await
        .map(|page| Json(page.into()))
        .map_err(AsError::into_error)
}

/// Returns the [`Property`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - if the [`Property`] doesn't exist.
#[tracing::instrument(skip(service))]
pub async fn by_id(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<property::Id>, Error>,
) -> Result<Json<Property>, Error> {
    service
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|p| Json(p.into()))
        .ok_or_else(|| PropertyError::NotExists.into())
}

/// Lists a new [`Property`].
///
/// Responds with `201 Created` and the `Location` of the new [`Property`].
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_*` - if a field of the payload is malformed.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Json(new), _): WithRejection<Json<NewProperty>, Error>,
) -> Result<impl IntoResponse, Error> {
    let cmd = command::CreateProperty::try_from(new)?;

    let property = service
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/properties/{}", property.id))],
        Json(Property::from(property)),
    ))
}

impl AsError for properties::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Pagination(_)
            | Self::NegativePrice(_)
            | Self::InvertedPriceRange
            | Self::InvertedDateRange => {
                Some(Error::bad_request("INVALID_CRITERIA", self))
            }
        }
    }
}

define_error! {
    enum PropertyError {
        #[code = "INVALID_TITLE"]
        #[status = BAD_REQUEST]
        #[message = "Title must be between 1 and 200 characters"]
        InvalidTitle,

        #[code = "INVALID_DESCRIPTION"]
        #[status = BAD_REQUEST]
        #[message = "Description must be at most 4000 characters"]
        InvalidDescription,

        #[code = "INVALID_ADDRESS"]
        #[status = BAD_REQUEST]
        #[message = "Address must be between 1 and 500 characters"]
        InvalidAddress,

        #[code = "INVALID_CITY"]
        #[status = BAD_REQUEST]
        #[message = "City must be between 1 and 100 characters"]
        InvalidCity,

        #[code = "INVALID_SUBURB"]
        #[status = BAD_REQUEST]
        #[message = "Suburb must be at most 100 characters"]
        InvalidSuburb,

        #[code = "INVALID_PROPERTY_TYPE"]
        #[status = BAD_REQUEST]
        #[message = "Property type must be at most 50 characters"]
        InvalidPropertyType,

        #[code = "INVALID_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Price must be in whole cents and below 10^16"]
        InvalidPriceAmount,

        #[code = "INVALID_IMAGE_URL"]
        #[status = BAD_REQUEST]
        #[message = "Image URLs must be absolute HTTP(S) URLs"]
        InvalidImageUrl,

        #[code = "INVALID_QUERY"]
        #[status = BAD_REQUEST]
        #[message = "Price must be a decimal number"]
        InvalidPrice,

        #[code = "INVALID_QUERY"]
        #[status = BAD_REQUEST]
        #[message = "Date must be an RFC 3339 date-time or a date"]
        InvalidDate,

        #[code = "INVALID_QUERY"]
        #[status = BAD_REQUEST]
        #[message = "Listing type must be either `Sale` or `Rent`"]
        InvalidListingType,

        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Property not found"]
        NotExists,
    }
}

#[cfg(test)]
mod spec {
    use service::{command, query::properties};

    use super::{NewProperty, PropertyError, SearchParams};

    fn new_property() -> NewProperty {
        serde_json::from_value(serde_json::json!({
            "title": "Harbour view apartment",
            "address": "12 George Street",
            "city": "Sydney",
            "suburb": "  ",
            "price": "850000.50",
            "listingType": "sale",
            "bedrooms": 2,
            "imageUrls": ["https://img.example.com/1.jpg"],
        }))
        .unwrap()
    }

    #[test]
    fn converts_search_params() {
        let params: SearchParams = serde_urlencoded::from_str(
            "pageNumber=2&priceFrom=100.5&city=%20Sydney%20&suburb=\
             &listingType=RENT&dateFrom=2024-01-01&searchTerm=%20",
        )
        .unwrap();

        let search = properties::Search::try_from(params).unwrap();

        assert_eq!(search.page_number, Some(2));
        assert_eq!(search.price_from.unwrap().to_string(), "100.5");
        assert_eq!(search.city.unwrap().to_string(), "Sydney");
        assert!(search.suburb.is_none());
        assert_eq!(
            search.listing_type,
            Some(service::domain::property::ListingType::Rent),
        );
        assert!(search.date_from.is_some());
        assert!(search.search_term.is_none());
    }

    #[test]
    fn rejects_malformed_search_params() {
        for (query, expected) in [
            ("priceTo=cheap", "Price must be a decimal number"),
            (
                "dateTo=yesterday",
                "Date must be an RFC 3339 date-time or a date",
            ),
            (
                "listingType=lease",
                "Listing type must be either `Sale` or `Rent`",
            ),
        ] {
            let params: SearchParams =
                serde_urlencoded::from_str(query).unwrap();

            let err = properties::Search::try_from(params).unwrap_err();

            assert_eq!(err.to_string(), expected, "query: {query}");
        }
    }

    #[test]
    fn converts_new_property() {
        let cmd = command::CreateProperty::try_from(new_property()).unwrap();

        assert_eq!(cmd.title.to_string(), "Harbour view apartment");
        assert_eq!(cmd.price.to_string(), "850000.5");
        assert!(cmd.suburb.is_none());
        assert_eq!(cmd.bedrooms, 2);
        assert_eq!(cmd.image_urls.len(), 1);
    }

    #[test]
    fn rejects_invalid_new_property() {
        let mut blank_title = new_property();
        blank_title.title = "   ".into();
        assert!(matches!(
            command::CreateProperty::try_from(blank_title),
            Err(PropertyError::InvalidTitle),
        ));

        let mut bad_image = new_property();
        bad_image.image_urls.push("ftp://nope".into());
        assert!(matches!(
            command::CreateProperty::try_from(bad_image),
            Err(PropertyError::InvalidImageUrl),
        ));

        for price in ["0.001", "10000000000000000"] {
            let mut bad_price = new_property();
            bad_price.price = price.parse().unwrap();
            assert!(
                matches!(
                    command::CreateProperty::try_from(bad_price),
                    Err(PropertyError::InvalidPriceAmount),
                ),
                "price: {price}",
            );
        }
    }
}
