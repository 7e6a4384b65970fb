//! [`Property`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read::property::list::{
        Filter, Predicate, Selector, SortField, TotalCount,
    },
};

/// Columns of a [`Property`] in the `properties` table aliased as `p`.
pub(super) const COLUMNS: &str = "\
    p.id, p.title, p.description, \
    p.address, p.city, p.suburb, p.property_type, \
    p.price, p.listing_type, \
    p.bedrooms, p.bathrooms, p.car_spots, \
    p.floor_area, p.year_built, \
    p.image_urls, p.is_featured, \
    p.created_at, p.updated_at";

/// Reads a [`Property`] out of the provided [`Row`] selected with [`COLUMNS`].
pub(super) fn from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        address: row.get("address"),
        city: row.get("city"),
        suburb: row.get("suburb"),
        property_type: row.get("property_type"),
        price: row.get("price"),
        listing_type: row.get("listing_type"),
        bedrooms: u16::try_from(row.get::<_, i32>("bedrooms"))
            .expect("`bedrooms` overflow"),
        bathrooms: u16::try_from(row.get::<_, i32>("bathrooms"))
            .expect("`bathrooms` overflow"),
        car_spots: u16::try_from(row.get::<_, i32>("car_spots"))
            .expect("`car_spots` overflow"),
        floor_area: row
            .get::<_, Option<i64>>("floor_area")
            .map(u32::try_from)
            .transpose()
            .expect("`floor_area` overflow"),
        year_built: row
            .get::<_, Option<i32>>("year_built")
            .map(u16::try_from)
            .transpose()
            .expect("`year_built` overflow"),
        image_urls: row.get("image_urls"),
        is_featured: row.get("is_featured"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// SQL rendering of a [`Filter`].
struct FilterSql {
    /// `WHERE` conditions joined with `AND`.
    conditions: String,

    /// Parameters referenced by the `conditions`.
    params: Vec<Box<dyn ToSql + Send + Sync>>,
}

impl FilterSql {
    /// Renders the provided [`Filter`], numbering its parameters after the
    /// `preceding` ones.
    fn new(filter: &Filter, preceding: usize) -> Self {
        let mut params: Vec<Box<dyn ToSql + Send + Sync>> = vec![];
        let mut bind = |p: Box<dyn ToSql + Send + Sync>| {
            params.push(p);
            preceding + params.len()
        };

        let conditions = filter
            .predicates()
            .iter()
            .map(|p| match p {
                Predicate::PriceFrom(min) => {
                    format!("p.price >= ${}::NUMERIC", bind(Box::new(*min)))
                }
                Predicate::PriceTo(max) => {
                    format!("p.price <= ${}::NUMERIC", bind(Box::new(*max)))
                }
                Predicate::Bedrooms(n) => format!(
                    "p.bedrooms = ${}::INT4",
                    bind(Box::new(i32::from(*n))),
                ),
                Predicate::City(city) => format!(
                    "LOWER(p.city) = LOWER(${}::VARCHAR)",
                    bind(Box::new(city.clone())),
                ),
                Predicate::ListingType(ty) => format!(
                    "p.listing_type = ${}::INT2",
                    bind(Box::new(*ty)),
                ),
                Predicate::Suburb(suburb) => format!(
                    "LOWER(p.suburb) = LOWER(${}::VARCHAR)",
                    bind(Box::new(suburb.clone())),
                ),
                Predicate::PropertyType(ty) => format!(
                    "LOWER(p.property_type) = LOWER(${}::VARCHAR)",
                    bind(Box::new(ty.clone())),
                ),
                Predicate::Featured(f) => {
                    format!("p.is_featured = ${}::BOOLEAN", bind(Box::new(*f)))
                }
                Predicate::CreatedFrom(from) => format!(
                    "p.created_at >= ${}::TIMESTAMPTZ",
                    bind(Box::new(*from)),
                ),
                Predicate::CreatedTo(to) => format!(
                    "p.created_at <= ${}::TIMESTAMPTZ",
                    bind(Box::new(*to)),
                ),
                Predicate::Search(term) => {
                    let idx =
                        bind(Box::new(FuzzPattern::new(term.as_ref())));
                    format!(
                        "(LOWER(p.title) SIMILAR TO ${idx}::VARCHAR \
                          OR LOWER(p.address) SIMILAR TO ${idx}::VARCHAR \
                          OR LOWER(p.city) SIMILAR TO ${idx}::VARCHAR \
                          OR LOWER(p.suburb) SIMILAR TO ${idx}::VARCHAR \
                          OR LOWER(p.description) SIMILAR TO ${idx}::VARCHAR)"
                    )
                }
            })
            .collect::<Vec<_>>();

        Self {
            conditions: conditions
                .iter()
                .format_with("", |c, f| f(&format_args!(" AND {c}")))
                .to_string(),
            params,
        }
    }

    /// Returns references to the parameters of this [`FilterSql`].
    fn params(&self) -> impl Iterator<Item = &(dyn ToSql + Sync)> {
        self.params.iter().map(|p| -> &(dyn ToSql + Sync) { &**p })
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties p \
             WHERE p.id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
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
            created_at,
            updated_at,
        } = property;

        let bedrooms = i32::from(bedrooms);
        let bathrooms = i32::from(bathrooms);
        let car_spots = i32::from(car_spots);
        let floor_area = floor_area.map(i64::from);
        let year_built = year_built.map(i32::from);

        const SQL: &str = "\
            INSERT INTO properties (\
                id, title, description, \
                address, city, suburb, property_type, \
                price, listing_type, \
                bedrooms, bathrooms, car_spots, \
                floor_area, year_built, \
                image_urls, is_featured, \
                created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, \
                $8::NUMERIC, $9::INT2, \
                $10::INT4, $11::INT4, $12::INT4, \
                $13::INT8, $14::INT4, \
                $15::VARCHAR[], $16::BOOLEAN, \
                $17::TIMESTAMPTZ, $18::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                address = EXCLUDED.address, \
                city = EXCLUDED.city, \
                suburb = EXCLUDED.suburb, \
                property_type = EXCLUDED.property_type, \
                price = EXCLUDED.price, \
                listing_type = EXCLUDED.listing_type, \
                bedrooms = EXCLUDED.bedrooms, \
                bathrooms = EXCLUDED.bathrooms, \
                car_spots = EXCLUDED.car_spots, \
                floor_area = EXCLUDED.floor_area, \
                year_built = EXCLUDED.year_built, \
                image_urls = EXCLUDED.image_urls, \
                is_featured = EXCLUDED.is_featured, \
                created_at = EXCLUDED.created_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &address,
                &city,
                &suburb,
                &property_type,
                &price,
                &listing_type,
                &bedrooms,
                &bathrooms,
                &car_spots,
                &floor_area,
                &year_built,
                &image_urls,
                &is_featured,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<TotalCount, Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TotalCount, Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = FilterSql::new(&by.into_inner(), 0);
        let ps = filter.params().collect::<Vec<_>>();

        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM properties p \
             WHERE true{conditions}",
            conditions = filter.conditions,
        );
        let count = self
            .query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists")
            .get::<_, i64>(0);
        Ok(TotalCount::from(u64::try_from(count).unwrap_or_default()))
    }
}

impl<C> Database<Select<By<Vec<Property>, Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Selector {
            arguments,
            filter,
            sort,
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let filter = FilterSql::new(&filter, 2);
        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        ps.extend(filter.params());

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties p \
             WHERE true{conditions} \
             ORDER BY {field} {order}, \
                      p.id {order} \
             LIMIT $1::INT8 \
             OFFSET $2::INT8",
            conditions = filter.conditions,
            field = match sort.field {
                SortField::Price => "p.price",
                SortField::CreatedAt => "p.created_at",
            },
            order = sort.order.sql(),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}
