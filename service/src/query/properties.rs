//! [`Query`] collection related to the multiple [`Property`]s.

use common::{
    operations::{By, Select},
    pagination::{self, ArgumentsError},
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Property;
use crate::{
    domain::property,
    infra::{database, Database},
    read::property::list::{
        Filter, Page, Predicate, SearchTerm, Selector, Sort, TotalCount,
    },
    Service,
};

use super::Query;

/// [`Query`] searching [`Property`]s by the provided criteria, returning a
/// single [`Page`] of them.
///
/// Every criterion is optional. Unrecognized sorting is silently replaced
/// with the default one.
#[derive(Clone, Debug, Default)]
pub struct Search {
    /// Number of the requested [`Page`], starting from `1`.
    pub page_number: Option<i64>,

    /// Maximum number of items on the requested [`Page`].
    pub page_size: Option<i64>,

    /// Name of the field to sort by (`Price` or `CreatedAt`).
    pub sort_by: Option<String>,

    /// Sorting direction (`asc` or `desc`).
    pub sort_order: Option<String>,

    /// Inclusive lower bound of the price.
    pub price_from: Option<Decimal>,

    /// Inclusive upper bound of the price.
    pub price_to: Option<Decimal>,

    /// Exact number of bedrooms.
    pub bedrooms: Option<u16>,

    /// City, matched case-insensitively.
    pub city: Option<property::City>,

    /// Listing category.
    pub listing_type: Option<property::ListingType>,

    /// Suburb, matched case-insensitively.
    pub suburb: Option<property::Suburb>,

    /// Property type, matched case-insensitively.
    pub property_type: Option<property::Type>,

    /// Featured flag.
    pub is_featured: Option<bool>,

    /// Inclusive lower bound of the listing date.
    pub date_from: Option<property::CreationDateTime>,

    /// Inclusive upper bound of the listing date.
    pub date_to: Option<property::CreationDateTime>,

    /// Free-text search term.
    pub search_term: Option<String>,
}

impl Search {
    /// Validates this [`Search`] and converts it into a [`Selector`].
    ///
    /// # Errors
    ///
    /// If pagination arguments are out of range, a price bound is negative,
    /// or a range has its bounds inverted.
    pub fn into_selector(self) -> Result<Selector, ExecutionError> {
        use ExecutionError as E;

        let Self {
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
        } = self;

        let arguments = pagination::Arguments::new(page_number, page_size)?;

        let price_from = price_from
            .map(|p| common::Money::new(p).ok_or(E::NegativePrice(p)))
            .transpose()?;
        let price_to = price_to
            .map(|p| common::Money::new(p).ok_or(E::NegativePrice(p)))
            .transpose()?;
        if let (Some(from), Some(to)) = (price_from, price_to) {
            if from > to {
                return Err(E::InvertedPriceRange);
            }
        }
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(E::InvertedDateRange);
            }
        }

        let predicates = [
            price_from.map(Predicate::PriceFrom),
            price_to.map(Predicate::PriceTo),
            bedrooms.map(Predicate::Bedrooms),
            city.map(Predicate::City),
            listing_type.map(Predicate::ListingType),
            suburb.map(Predicate::Suburb),
            property_type.map(Predicate::PropertyType),
            is_featured.map(Predicate::Featured),
            date_from.map(Predicate::CreatedFrom),
            date_to.map(Predicate::CreatedTo),
            search_term
                .as_deref()
                .and_then(SearchTerm::new)
                .map(Predicate::Search),
        ];

        Ok(Selector {
            arguments,
            filter: Filter::from(
                predicates.into_iter().flatten().collect::<Vec<_>>(),
            ),
            sort: Sort::lenient(sort_by.as_deref(), sort_order.as_deref()),
        })
    }
}

impl<Db> Query<Search> for Service<Db>
where
    Db: Database<
            Select<By<TotalCount, Filter>>,
            Ok = TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<property::Property>, Selector>>,
            Ok = Vec<property::Property>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Page;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Search) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let selector = query.into_selector().map_err(tracerr::wrap!())?;
        let arguments = selector.arguments;

        let total_count = self
            .database()
            .execute(Select(By::new(selector.filter.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let items = self
            .database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Page::new(arguments, items, total_count.into()))
    }
}

/// Error of [`Search`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Pagination arguments are out of range.
    #[display("{_0}")]
    Pagination(ArgumentsError),

    /// Price bound is negative.
    #[display("Price must be non-negative, but {_0} provided")]
    #[from(ignore)]
    NegativePrice(#[error(not(source))] Decimal),

    /// Lower price bound is greater than the upper one.
    #[display("PriceFrom cannot be greater than PriceTo")]
    InvertedPriceRange,

    /// Lower date bound is after the upper one.
    #[display("DateFrom cannot be after DateTo")]
    InvertedDateRange,
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use common::{pagination::ArgumentsError, Money};
    use rust_decimal::Decimal;

    use crate::{
        command::{create_property::spec::listing, SeedProperties},
        domain::property,
        spec::service,
        Query as _,
    };

    use super::{ExecutionError, Search};

    #[tokio::test]
    async fn count_agrees_with_pages() {
        let svc = service();
        _ = svc.execute(SeedProperties { count: 57 }).await.unwrap();

        let search = || Search {
            listing_type: Some(property::ListingType::Sale),
            page_size: Some(7),
            ..Search::default()
        };

        let first = svc.execute(search()).await.unwrap();
        assert_eq!(first.total_count, 29);
        assert_eq!(first.total_pages(), 5);
        assert!(!first.has_previous_page());
        assert!(first.has_next_page());

        let last = svc
            .execute(Search {
                page_number: Some(5),
                ..search()
            })
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.has_previous_page());
        assert!(!last.has_next_page());

        let beyond = svc
            .execute(Search {
                page_number: Some(6),
                ..search()
            })
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_count, 29);
    }

    #[tokio::test]
    async fn pages_cover_all_items_without_overlap() {
        let svc = service();
        _ = svc.execute(SeedProperties { count: 45 }).await.unwrap();

        for (sort_by, sort_order) in
            [("price", "asc"), ("price", "desc"), ("createdAt", "desc")]
        {
            let mut seen = HashSet::new();
            let mut previous = None;
            for page_number in 1..=5 {
                let page = svc
                    .execute(Search {
                        page_number: Some(page_number),
                        page_size: Some(10),
                        sort_by: Some(sort_by.into()),
                        sort_order: Some(sort_order.into()),
                        ..Search::default()
                    })
                    .await
                    .unwrap();
                for p in page.items {
                    if let Some(prev) = previous {
                        if sort_by == "price" && sort_order == "asc" {
                            assert!(prev <= p.price);
                        } else if sort_by == "price" {
                            assert!(prev >= p.price);
                        }
                    }
                    previous = Some(p.price);
                    assert!(seen.insert(p.id), "{} is repeated", p.id);
                }
            }
            assert_eq!(seen.len(), 45);
        }
    }

    #[tokio::test]
    async fn sydney_price_range() {
        let svc = service();
        _ = svc.execute(SeedProperties { count: 120 }).await.unwrap();

        let all = svc
            .execute(Search {
                page_size: Some(100),
                ..Search::default()
            })
            .await
            .unwrap();
        assert_eq!(all.total_count, 120);
        let mut everything = all.items;
        everything.extend(
            svc.execute(Search {
                page_number: Some(2),
                page_size: Some(100),
                ..Search::default()
            })
            .await
            .unwrap()
            .items,
        );
        let (min, max) = (Money::from(300_000), Money::from(600_000));
        let expected = everything
            .iter()
            .filter(|p| {
                p.city.to_string().eq_ignore_ascii_case("sydney")
                    && p.price >= min
                    && p.price <= max
            })
            .count();

        let page = svc
            .execute(Search {
                city: property::City::new("sydney"),
                price_from: Some(Decimal::from(300_000)),
                price_to: Some(Decimal::from(600_000)),
                sort_by: Some("Price".into()),
                sort_order: Some("asc".into()),
                page_size: Some(100),
                ..Search::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total_count, expected as u64);
        assert_eq!(page.items.len(), expected);
        assert!(page.items.iter().all(|p| {
            p.city.to_string() == "Sydney"
                && p.price >= min
                && p.price <= max
        }));
        assert!(page.items.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(page.number(), 1);
        assert_eq!(page.size(), 100);
    }

    #[tokio::test]
    async fn filters_by_search_term_and_featured() {
        let svc = service();
        let mut cmd = listing("Hobart", 500);
        cmd.title = property::Title::new("Waterfront castle").unwrap();
        cmd.is_featured = true;
        let castle = svc.execute(cmd).await.unwrap();
        _ = svc.execute(listing("Hobart", 600)).await.unwrap();

        let page = svc
            .execute(Search {
                search_term: Some("  CASTLE ".into()),
                ..Search::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id, castle.id);

        let featured = svc
            .execute(Search {
                is_featured: Some(true),
                ..Search::default()
            })
            .await
            .unwrap();
        assert_eq!(featured.total_count, 1);

        let blank = svc
            .execute(Search {
                search_term: Some("   ".into()),
                ..Search::default()
            })
            .await
            .unwrap();
        assert_eq!(blank.total_count, 2);
    }

    #[tokio::test]
    async fn rejects_invalid_criteria() {
        let svc = service();

        let err = svc
            .execute(Search {
                page_number: Some(0),
                ..Search::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Pagination(ArgumentsError::PageNumber(0)),
        ));

        let err = svc
            .execute(Search {
                page_size: Some(101),
                ..Search::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Pagination(ArgumentsError::PageSize(101)),
        ));

        let err = svc
            .execute(Search {
                price_from: Some(Decimal::from(10)),
                price_to: Some(Decimal::from(5)),
                ..Search::default()
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.as_ref().to_string(),
            "PriceFrom cannot be greater than PriceTo",
        );

        let err = svc
            .execute(Search {
                price_to: Some(Decimal::from(-1)),
                ..Search::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NegativePrice(_)));

        let now = common::DateTime::now();
        let err = svc
            .execute(Search {
                date_from: Some(now.coerce()),
                date_to: Some(
                    (now - std::time::Duration::from_secs(60)).coerce(),
                ),
                ..Search::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvertedDateRange));
    }

    #[tokio::test]
    async fn unknown_sort_falls_back_to_newest_first() {
        let svc = service();
        _ = svc.execute(SeedProperties { count: 20 }).await.unwrap();

        let page = svc
            .execute(Search {
                sort_by: Some("bedrooms".into()),
                sort_order: Some("sideways".into()),
                page_size: Some(20),
                ..Search::default()
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 20);
        assert!(page
            .items
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }
}
