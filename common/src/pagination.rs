//! Abstractions for page-based pagination.

use std::{cmp::Ordering, num::NonZeroU32};

use derive_more::{Display, Error};

/// Validated pagination arguments.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// 1-based number of the requested page.
    number: NonZeroU32,

    /// Maximum number of items on the requested page.
    size: NonZeroU32,
}

impl Arguments {
    /// Default page size used when none is requested.
    pub const DEFAULT_SIZE: u32 = 10;

    /// Maximum allowed page size.
    pub const MAX_SIZE: u32 = 100;

    /// Creates new [`Arguments`] out of the optionally provided page `number`
    /// and `size`.
    ///
    /// Missing `number` defaults to the first page, and missing `size`
    /// defaults to [`Arguments::DEFAULT_SIZE`].
    ///
    /// # Errors
    ///
    /// - If `number` is less than `1`.
    /// - If `size` is not in `1..=`[`Arguments::MAX_SIZE`] range.
    pub fn new(
        number: Option<i64>,
        size: Option<i64>,
    ) -> Result<Self, ArgumentsError> {
        let number = number.unwrap_or(1);
        let number = u32::try_from(number)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(ArgumentsError::PageNumber(number))?;

        let size = size.unwrap_or(Self::DEFAULT_SIZE.into());
        let size = u32::try_from(size)
            .ok()
            .filter(|s| *s <= Self::MAX_SIZE)
            .and_then(NonZeroU32::new)
            .ok_or(ArgumentsError::PageSize(size))?;

        Ok(Self { number, size })
    }

    /// Returns the 1-based number of the requested page.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number.get()
    }

    /// Returns the requested page size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size.get()
    }

    /// Returns the number of items preceding the requested page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.number.get() as u64 - 1) * self.size.get() as u64
    }

    /// Returns the maximum number of items on the requested page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size.get() as u64
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            number: NonZeroU32::MIN,
            size: NonZeroU32::new(Self::DEFAULT_SIZE)
                .unwrap_or(NonZeroU32::MIN),
        }
    }
}

/// Error of creating [`Arguments`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum ArgumentsError {
    /// Page number is out of range.
    #[display("PageNumber must be greater than 0, but {_0} provided")]
    PageNumber(#[error(not(source))] i64),

    /// Page size is out of range.
    #[display(
        "PageSize must be between 1 and {}, but {_0} provided",
        Arguments::MAX_SIZE
    )]
    PageSize(#[error(not(source))] i64),
}

/// A page of `T` items with its position in the whole result set.
#[derive(Clone, Debug)]
pub struct Page<T> {
    /// Items of this [`Page`].
    pub items: Vec<T>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,

    /// Total number of items matching the selection, across all pages.
    pub total_count: u64,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] out of the provided `items`.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = T>,
        total_count: u64,
    ) -> Self {
        Self {
            items: items.into_iter().collect(),
            arguments,
            total_count,
        }
    }

    /// Returns the 1-based number of this [`Page`].
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.arguments.number()
    }

    /// Returns the size this [`Page`] was requested with.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.arguments.size()
    }

    /// Returns the total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(self.arguments.limit())
    }

    /// Indicates whether there is a page before this one.
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.arguments.number() > 1
    }

    /// Indicates whether there is a page after this one.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        u64::from(self.arguments.number()) < self.total_pages()
    }

    /// Maps items of this [`Page`] with the provided function.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            arguments: self.arguments,
            total_count: self.total_count,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F, S> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Filter being applied to the result.
    pub filter: F,

    /// Sorting being applied to the result.
    pub sort: S,
}

/// Sorting order.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    #[default]
    Descending,
}

impl Order {
    /// Parses an [`Order`] out of the provided `asc` or `desc` string
    /// (case-insensitively).
    ///
    /// [`None`] is returned for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Descending)
        } else {
            None
        }
    }

    /// Applies this [`Order`] to the provided ascending [`Ordering`].
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty, $sort:ty) => {
        #[doc = concat!("Page of [`", stringify!($node), "`]s.")]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter, $sort>;
    };
}
