use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed). Only used together with `size`.
	#[validate(range(min = 1, max = 1_000_000))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page. Every item is returned if omitted.
	#[validate(range(min = 1, max = 100))]
	pub size: Option<i64>,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		self.size.map_or(0, |size| (self.page - 1) * size)
	}

	/// A `NULL` limit is no limit at all in PostgreSQL.
	pub fn limit(&self) -> Option<i64> {
		self.size
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}

/// A confirmation returned by actions without a resource to show.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Detail {
	pub detail: Cow<'static, str>,
}

impl Detail {
	pub fn new(detail: impl Into<Cow<'static, str>>) -> Self {
		Self {
			detail: detail.into(),
		}
	}
}

#[cfg(test)]
mod test {
	use validator::Validate;

	#[test]
	fn test_paginate_offset() {
		let mut paginate = super::Paginate {
			page: 1,
			size: Some(10),
		};

		assert_eq!(paginate.offset(), 0);

		paginate.page = 2;

		assert_eq!(paginate.offset(), 10);

		paginate.size = Some(5);

		assert_eq!(paginate.offset(), 5);

		paginate.page = 3;

		assert_eq!(paginate.offset(), 10);
	}

	#[test]
	fn test_paginate_without_size() {
		let paginate = super::Paginate { page: 4, size: None };

		assert_eq!(paginate.offset(), 0);
		assert_eq!(paginate.limit(), None);
	}

	#[test]
	fn test_paginate_bounds() {
		let paginate = super::Paginate {
			page: 1,
			size: Some(101),
		};

		assert!(paginate.validate().is_err());

		let paginate = super::Paginate { page: 0, size: None };

		assert!(paginate.validate().is_err());
	}

	#[test]
	fn test_paginate_huge_page() {
		let paginate = super::Paginate {
			page: i64::MAX,
			size: Some(100),
		};

		assert!(paginate.validate().is_err());

		let paginate = super::Paginate {
			page: 1_000_000,
			size: Some(100),
		};

		assert!(paginate.validate().is_ok());
		assert_eq!(paginate.offset(), 99_999_900);
	}
}
