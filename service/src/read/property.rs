//! [`Property`]-related read definitions.

#[cfg(doc)]
use crate::domain::Property;

pub mod list {
    //! [`Property`] list definitions.

    use std::cmp::Ordering;

    use common::{define_pagination, pagination::Order, Money};
    use derive_more::{From, Into};

    use crate::domain::{property, Property};

    define_pagination!(Property, Filter, Sort);

    /// Single condition a [`Property`] must satisfy to be listed.
    #[derive(Clone, Debug)]
    pub enum Predicate {
        /// Price is greater than or equal to the given [`Money`].
        PriceFrom(Money),

        /// Price is less than or equal to the given [`Money`].
        PriceTo(Money),

        /// Exact number of bedrooms.
        Bedrooms(u16),

        /// [`property::City`] equals the given one case-insensitively.
        City(property::City),

        /// Exact [`property::ListingType`].
        ListingType(property::ListingType),

        /// [`property::Suburb`] equals the given one case-insensitively.
        Suburb(property::Suburb),

        /// [`property::Type`] equals the given one case-insensitively.
        PropertyType(property::Type),

        /// Exact featured flag.
        Featured(bool),

        /// Listed at or after the given [`property::CreationDateTime`].
        CreatedFrom(property::CreationDateTime),

        /// Listed at or before the given [`property::CreationDateTime`].
        CreatedTo(property::CreationDateTime),

        /// Any [`SearchTerm`] word occurs in a text field.
        Search(SearchTerm),
    }

    impl Predicate {
        /// Checks whether the given [`Property`] satisfies this [`Predicate`].
        #[must_use]
        pub fn matches(&self, p: &Property) -> bool {
            match self {
                Self::PriceFrom(min) => p.price >= *min,
                Self::PriceTo(max) => p.price <= *max,
                Self::Bedrooms(n) => p.bedrooms == *n,
                Self::City(city) => eq_ignore_case(p.city.as_ref(), city),
                Self::ListingType(ty) => p.listing_type == *ty,
                Self::Suburb(suburb) => p
                    .suburb
                    .as_ref()
                    .is_some_and(|s| eq_ignore_case(s.as_ref(), suburb)),
                Self::PropertyType(ty) => p
                    .property_type
                    .as_ref()
                    .is_some_and(|t| eq_ignore_case(t.as_ref(), ty)),
                Self::Featured(f) => p.is_featured == *f,
                Self::CreatedFrom(from) => p.created_at >= *from,
                Self::CreatedTo(to) => p.created_at <= *to,
                Self::Search(term) => {
                    let fields: [Option<&str>; 5] = [
                        Some(p.title.as_ref()),
                        Some(p.address.as_ref()),
                        Some(p.city.as_ref()),
                        p.suburb.as_ref().map(AsRef::as_ref),
                        p.description.as_ref().map(AsRef::as_ref),
                    ];
                    fields
                        .into_iter()
                        .flatten()
                        .any(|f| term.occurs_in(f))
                }
            }
        }
    }

    /// Compares the given strings case-insensitively.
    fn eq_ignore_case(a: &str, b: impl AsRef<str>) -> bool {
        a.to_lowercase() == b.as_ref().to_lowercase()
    }

    /// Conjunction of [`Predicate`]s.
    ///
    /// Empty [`Filter`] matches every [`Property`].
    #[derive(Clone, Debug, Default, From, Into)]
    pub struct Filter(Vec<Predicate>);

    impl Filter {
        /// Adds the given [`Predicate`] to this [`Filter`].
        pub fn push(&mut self, predicate: Predicate) {
            self.0.push(predicate);
        }

        /// Returns [`Predicate`]s of this [`Filter`].
        #[must_use]
        pub fn predicates(&self) -> &[Predicate] {
            &self.0
        }

        /// Checks whether the given [`Property`] satisfies all [`Predicate`]s
        /// of this [`Filter`].
        #[must_use]
        pub fn matches(&self, property: &Property) -> bool {
            self.0.iter().all(|p| p.matches(property))
        }
    }

    /// Free-text search term.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct SearchTerm(String);

    impl SearchTerm {
        /// Creates a new [`SearchTerm`] if the given `term` contains at least
        /// one word.
        #[must_use]
        pub fn new(term: impl AsRef<str>) -> Option<Self> {
            let term = term.as_ref().trim();
            (!term.is_empty()).then(|| Self(term.to_lowercase()))
        }

        /// Returns lowercased whitespace-separated words of this
        /// [`SearchTerm`].
        pub fn words(&self) -> impl Iterator<Item = &str> {
            self.0.split_whitespace()
        }

        /// Checks whether any word of this [`SearchTerm`] occurs in the given
        /// `text` case-insensitively.
        #[must_use]
        pub fn occurs_in(&self, text: &str) -> bool {
            let text = text.to_lowercase();
            self.words().any(|w| text.contains(w))
        }
    }

    impl AsRef<str> for SearchTerm {
        fn as_ref(&self) -> &str {
            &self.0
        }
    }

    /// Field a [`Property`] list is sorted by.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub enum SortField {
        /// [`Property::price`].
        Price,

        /// [`Property::created_at`].
        #[default]
        CreatedAt,
    }

    impl SortField {
        /// Parses a [`SortField`] out of its case-insensitive name.
        ///
        /// [`None`] is returned for unknown names.
        #[must_use]
        pub fn parse(s: &str) -> Option<Self> {
            let s = s.trim();
            if s.eq_ignore_ascii_case("price") {
                Some(Self::Price)
            } else if s.eq_ignore_ascii_case("createdat") {
                Some(Self::CreatedAt)
            } else {
                None
            }
        }
    }

    /// Sorting of a [`Property`] list.
    ///
    /// Ties are broken by [`Property::id`] in the same direction, so the order
    /// is total and pages never overlap.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Sort {
        /// [`SortField`] to sort by.
        pub field: SortField,

        /// [`Order`] to sort in.
        pub order: Order,
    }

    impl Sort {
        /// Creates a new [`Sort`] out of the provided raw values, silently
        /// defaulting the unrecognized ones.
        #[must_use]
        pub fn lenient(field: Option<&str>, order: Option<&str>) -> Self {
            Self {
                field: field.and_then(SortField::parse).unwrap_or_default(),
                order: order.and_then(Order::parse).unwrap_or_default(),
            }
        }

        /// Compares the given [`Property`]s according to this [`Sort`].
        #[must_use]
        pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
            let by_field = match self.field {
                SortField::Price => a.price.cmp(&b.price),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            self.order.apply(by_field.then_with(|| a.id.cmp(&b.id)))
        }
    }

    /// Total count of [`Property`] list items.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(u64);

    #[cfg(test)]
    mod spec {
        use std::cmp::Ordering;

        use common::{pagination::Order, DateTime, Money};

        use crate::domain::{property, Property};

        use super::{Filter, Predicate, SearchTerm, Sort, SortField};

        fn property(city: &str, price: u32, bedrooms: u16) -> Property {
            Property {
                id: property::Id::new(),
                title: property::Title::new("Family home").unwrap(),
                description: Some(
                    property::Description::new("Close to the beach").unwrap(),
                ),
                address: property::Address::new("1 George St").unwrap(),
                city: property::City::new(city).unwrap(),
                suburb: property::Suburb::new("Bondi"),
                property_type: property::Type::new("House"),
                price: Money::from(price),
                listing_type: property::ListingType::Sale,
                bedrooms,
                bathrooms: 1,
                car_spots: 0,
                floor_area: None,
                year_built: None,
                image_urls: vec![],
                is_featured: false,
                created_at: DateTime::now().coerce(),
                updated_at: None,
            }
        }

        #[test]
        fn empty_filter_matches_all() {
            assert!(Filter::default().matches(&property("Perth", 1, 1)));
        }

        #[test]
        fn price_bounds_are_inclusive() {
            let filter = Filter::from(vec![
                Predicate::PriceFrom(Money::from(300_000)),
                Predicate::PriceTo(Money::from(600_000)),
            ]);

            assert!(filter.matches(&property("Sydney", 300_000, 2)));
            assert!(filter.matches(&property("Sydney", 600_000, 2)));
            assert!(!filter.matches(&property("Sydney", 299_999, 2)));
            assert!(!filter.matches(&property("Sydney", 600_001, 2)));
        }

        #[test]
        fn city_is_case_insensitive_exact() {
            let filter = Filter::from(vec![Predicate::City(
                property::City::new("sydney").unwrap(),
            )]);

            assert!(filter.matches(&property("Sydney", 1, 1)));
            assert!(filter.matches(&property("SYDNEY", 1, 1)));
            assert!(!filter.matches(&property("North Sydney", 1, 1)));
        }

        #[test]
        fn predicates_are_conjunctive() {
            let filter = Filter::from(vec![
                Predicate::City(property::City::new("Perth").unwrap()),
                Predicate::Bedrooms(3),
            ]);

            assert!(filter.matches(&property("Perth", 1, 3)));
            assert!(!filter.matches(&property("Perth", 1, 2)));
            assert!(!filter.matches(&property("Hobart", 1, 3)));
        }

        #[test]
        fn search_matches_any_word_in_any_field() {
            let p = property("Sydney", 1, 1);
            let matches = |term: &str| {
                Predicate::Search(SearchTerm::new(term).unwrap()).matches(&p)
            };

            assert!(matches("BEACH"));
            assert!(matches("castle bondi"));
            assert!(matches("geo"));
            assert!(!matches("castle moat"));
            assert!(SearchTerm::new("   ").is_none());
        }

        #[test]
        fn optional_fields_do_not_match_when_absent() {
            let mut p = property("Sydney", 1, 1);
            p.suburb = None;

            let pred =
                Predicate::Suburb(property::Suburb::new("bondi").unwrap());
            assert!(!pred.matches(&p));
        }

        #[test]
        fn sort_is_lenient() {
            assert_eq!(Sort::lenient(None, None), Sort::default());
            assert_eq!(
                Sort::lenient(Some("PRICE"), Some("asc")),
                Sort {
                    field: SortField::Price,
                    order: Order::Ascending,
                },
            );
            assert_eq!(
                Sort::lenient(Some("bedrooms"), Some("sideways")),
                Sort {
                    field: SortField::CreatedAt,
                    order: Order::Descending,
                },
            );
        }

        #[test]
        fn sort_breaks_ties_by_id() {
            let a = property("Sydney", 100, 1);
            let mut b = property("Sydney", 100, 1);
            b.created_at = a.created_at;

            let asc = Sort {
                field: SortField::Price,
                order: Order::Ascending,
            };
            let desc = Sort {
                field: SortField::Price,
                order: Order::Descending,
            };

            assert_ne!(asc.compare(&a, &b), Ordering::Equal);
            assert_eq!(asc.compare(&a, &b), desc.compare(&b, &a));
            assert_eq!(a.id.cmp(&b.id), asc.compare(&a, &b));
        }

        #[test]
        fn sort_by_price() {
            let cheap = property("Sydney", 100, 1);
            let pricey = property("Sydney", 200, 1);

            let asc = Sort::lenient(Some("price"), Some("asc"));
            assert_eq!(asc.compare(&cheap, &pricey), Ordering::Less);

            let desc = Sort::lenient(Some("price"), Some("desc"));
            assert_eq!(desc.compare(&cheap, &pricey), Ordering::Greater);
        }
    }
}
