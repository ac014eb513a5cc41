use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// Free-form product attributes, kept sorted by key
pub type Specifications = BTreeMap<String, String>;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;
pub const MIN_DISCOUNT: f64 = 0.0;
pub const MAX_DISCOUNT: f64 = 100.0;

/// Product document as stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub brand: String,
    pub image_url: String,
    #[serde(default)]
    pub stock: i64,
    /// Older documents spell this field `ratting`
    #[serde(default, alias = "ratting")]
    pub rating: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Specifications>,
    #[serde(rename = "createdAt", with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Current time at the millisecond precision BSON dates keep.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Timestamps are stored as BSON dates. RFC 3339 strings are also read.
mod bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson::{self, Bson};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        bson::DateTime::from_millis(value.timestamp_millis()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::DateTime(date) => DateTime::from_timestamp_millis(date.timestamp_millis())
                .ok_or_else(|| D::Error::custom("date out of range")),
            Bson::String(text) => DateTime::parse_from_rfc3339(&text)
                .map(|date| date.with_timezone(&Utc))
                .map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "expected a date, found {:?}",
                other.element_type()
            ))),
        }
    }
}

impl Product {
    /// Stamp a validated product with a fresh id and timestamps.
    pub fn new(input: NewProduct) -> Self {
        let now = now();
        Self {
            id: ObjectId::new(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            brand: input.brand,
            image_url: input.image_url,
            stock: input.stock,
            rating: input.rating,
            discount: input.discount,
            colors: input.colors,
            specifications: input.specifications,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a normalized, validated update in place.
    ///
    /// Empty `colors`/`specifications` clear the field.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = image_url;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(discount) = update.discount {
            self.discount = discount;
        }
        if let Some(colors) = update.colors {
            self.colors = Some(colors).filter(|c| !c.is_empty());
        }
        if let Some(specifications) = update.specifications {
            self.specifications = Some(specifications).filter(|s| !s.is_empty());
        }
        self.updated_at = now();
    }
}

/// Product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    /// 24-character hex ObjectId
    #[schema(example = "65f1c0ffee0ddba11adfaced")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub brand: String,
    pub image_url: String,
    pub stock: i64,
    pub rating: f64,
    pub discount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let rating = clamp_rating(&product);
        Self {
            id: product.id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            brand: product.brand,
            image_url: product.image_url,
            stock: product.stock,
            rating,
            discount: product.discount,
            colors: product.colors,
            specifications: product.specifications,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Stored data written before validation existed can hold ratings outside
/// [0, 5]; those are clamped on the way out and logged.
fn clamp_rating(product: &Product) -> f64 {
    let rating = product.rating;
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        return rating;
    }

    tracing::warn!(product_id = %product.id, rating, "Stored rating out of range, clamping");
    if rating.is_nan() {
        MIN_RATING
    } else {
        rating.clamp(MIN_RATING, MAX_RATING)
    }
}

/// Body of `DELETE /products/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteProductResponse {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
    #[serde(rename = "deletedProduct")]
    pub deleted_product: ProductResponse,
}

impl DeleteProductResponse {
    pub fn new(product: Product) -> Self {
        Self {
            message: "Product deleted successfully".to_string(),
            deleted_product: product.into(),
        }
    }
}

/// Create request body. Every field is optional at the type level so that
/// missing fields surface as validation errors rather than JSON errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(
        required(message = "Product name is required."),
        length(min = 1, code = "required", message = "Product name is required.")
    )]
    #[schema(example = "Widget")]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(
        required(message = "Product price is required."),
        range(min = 0.0, code = "min", message = "Price cannot be negative.")
    )]
    #[schema(example = 9.99)]
    pub price: Option<f64>,

    #[validate(
        required(message = "Product category is required."),
        length(min = 1, code = "required", message = "Product category is required.")
    )]
    #[schema(example = "tools")]
    pub category: Option<String>,

    #[validate(
        required(message = "Product brand is required."),
        length(min = 1, code = "required", message = "Product brand is required.")
    )]
    #[schema(example = "Acme")]
    pub brand: Option<String>,

    #[validate(
        required(message = "Product image URL is required."),
        length(min = 1, code = "required", message = "Product image URL is required.")
    )]
    #[schema(example = "http://x/y.png")]
    pub image_url: Option<String>,

    /// Defaults to 0
    #[validate(range(min = 0, code = "min", message = "Stock cannot be negative."))]
    pub stock: Option<i64>,

    /// 0 to 5, defaults to 0
    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<f64>,

    /// Percentage, 0 to 100, defaults to 0
    #[validate(custom(function = "validate_discount"))]
    pub discount: Option<f64>,

    pub colors: Option<Vec<String>>,

    pub specifications: Option<BTreeMap<String, String>>,
}

impl CreateProduct {
    /// Trim text fields and lowercase the category.
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
            category: trimmed(self.category).map(|c| c.to_lowercase()),
            brand: trimmed(self.brand),
            ..self
        }
    }
}

/// A create request that passed normalization and validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub brand: String,
    pub image_url: String,
    pub stock: i64,
    pub rating: f64,
    pub discount: f64,
    pub colors: Option<Vec<String>>,
    pub specifications: Option<Specifications>,
}

impl TryFrom<CreateProduct> for NewProduct {
    type Error = ValidationErrors;

    fn try_from(input: CreateProduct) -> Result<Self, Self::Error> {
        let input = input.normalized();
        input.validate()?;

        // Required fields are guaranteed present by `validate`.
        Ok(Self {
            name: input.name.unwrap_or_default(),
            description: input.description,
            price: input.price.unwrap_or_default(),
            category: input.category.unwrap_or_default(),
            brand: input.brand.unwrap_or_default(),
            image_url: input.image_url.unwrap_or_default(),
            stock: input.stock.unwrap_or(0),
            rating: input.rating.unwrap_or(MIN_RATING),
            discount: input.discount.unwrap_or(MIN_DISCOUNT),
            colors: input.colors.filter(|c| !c.is_empty()),
            specifications: input.specifications.filter(|s| !s.is_empty()),
        })
    }
}

/// Update request body; only fields that are present are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, code = "required", message = "Product name is required."))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0.0, code = "min", message = "Price cannot be negative."))]
    pub price: Option<f64>,

    #[validate(length(min = 1, code = "required", message = "Product category is required."))]
    pub category: Option<String>,

    #[validate(length(min = 1, code = "required", message = "Product brand is required."))]
    pub brand: Option<String>,

    #[validate(length(min = 1, code = "required", message = "Product image URL is required."))]
    pub image_url: Option<String>,

    #[validate(range(min = 0, code = "min", message = "Stock cannot be negative."))]
    pub stock: Option<i64>,

    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<f64>,

    #[validate(custom(function = "validate_discount"))]
    pub discount: Option<f64>,

    /// An empty list removes the field
    pub colors: Option<Vec<String>>,

    /// An empty map removes the field
    pub specifications: Option<BTreeMap<String, String>>,
}

impl UpdateProduct {
    /// Trim text fields and lowercase the category.
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
            category: trimmed(self.category).map(|c| c.to_lowercase()),
            brand: trimmed(self.brand),
            ..self
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn bound_error(code: &'static str, message: &'static str, value: f64) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error.add_param(Cow::Borrowed("value"), &value);
    error
}

fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if rating < MIN_RATING {
        return Err(bound_error("min", "Rating cannot be negative.", rating));
    }
    if rating > MAX_RATING {
        return Err(bound_error("max", "Rating cannot be greater than 5.", rating));
    }
    Ok(())
}

fn validate_discount(discount: f64) -> Result<(), ValidationError> {
    if discount < MIN_DISCOUNT {
        return Err(bound_error("min", "Discount cannot be negative.", discount));
    }
    if discount > MAX_DISCOUNT {
        return Err(bound_error("max", "Discount cannot be over 100%.", discount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget() -> CreateProduct {
        serde_json::from_value(json!({
            "name": "Widget",
            "price": 9.99,
            "category": "Tools",
            "brand": "Acme",
            "image_url": "http://x/y.png",
            "stock": 5
        }))
        .unwrap()
    }

    fn first_message(errors: &ValidationErrors, field: &str) -> String {
        errors.field_errors()[field][0]
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_new_product_applies_defaults_and_normalization() {
        let input = CreateProduct {
            name: Some("  Widget  ".into()),
            category: Some(" Power Tools ".into()),
            colors: Some(vec![]),
            specifications: Some(Specifications::new()),
            ..widget()
        };

        let product = NewProduct::try_from(input).unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.category, "power tools");
        assert_eq!(product.stock, 5);
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.discount, 0.0);
        assert!(product.colors.is_none());
        assert!(product.specifications.is_none());
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = NewProduct::try_from(CreateProduct::default()).unwrap_err();
        let fields = errors.field_errors();

        for field in ["name", "price", "category", "brand", "image_url"] {
            assert!(fields.contains_key(field), "expected error on {field}");
        }
        assert_eq!(first_message(&errors, "name"), "Product name is required.");
        assert_eq!(first_message(&errors, "image_url"), "Product image URL is required.");
        assert!(!fields.contains_key("stock"));
    }

    #[test]
    fn test_whitespace_only_name_is_required_error() {
        let input = CreateProduct {
            name: Some("   ".into()),
            ..widget()
        };

        let errors = NewProduct::try_from(input).unwrap_err();
        assert_eq!(first_message(&errors, "name"), "Product name is required.");
        assert_eq!(errors.field_errors()["name"][0].code, "required");
    }

    #[test]
    fn test_negative_price() {
        let input = CreateProduct {
            price: Some(-1.0),
            ..widget()
        };

        let errors = NewProduct::try_from(input).unwrap_err();
        assert_eq!(first_message(&errors, "price"), "Price cannot be negative.");
    }

    #[test]
    fn test_rating_and_discount_bounds() {
        let too_high = CreateProduct {
            rating: Some(5.5),
            discount: Some(101.0),
            ..widget()
        };
        let errors = NewProduct::try_from(too_high).unwrap_err();
        assert_eq!(first_message(&errors, "rating"), "Rating cannot be greater than 5.");
        assert_eq!(first_message(&errors, "discount"), "Discount cannot be over 100%.");

        let too_low = CreateProduct {
            rating: Some(-0.1),
            discount: Some(-5.0),
            ..widget()
        };
        let errors = NewProduct::try_from(too_low).unwrap_err();
        assert_eq!(first_message(&errors, "rating"), "Rating cannot be negative.");
        assert_eq!(first_message(&errors, "discount"), "Discount cannot be negative.");

        let edges = CreateProduct {
            rating: Some(5.0),
            discount: Some(100.0),
            ..widget()
        };
        assert!(NewProduct::try_from(edges).is_ok());
    }

    #[test]
    fn test_negative_stock() {
        let input = CreateProduct {
            stock: Some(-3),
            ..widget()
        };

        let errors = NewProduct::try_from(input).unwrap_err();
        assert_eq!(first_message(&errors, "stock"), "Stock cannot be negative.");
    }

    #[test]
    fn test_update_validation_only_checks_present_fields() {
        let update = UpdateProduct {
            stock: Some(10),
            ..Default::default()
        };
        assert!(update.normalized().validate().is_ok());

        let blank_name = UpdateProduct {
            name: Some("  ".into()),
            ..Default::default()
        }
        .normalized();
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_apply_update_preserves_untouched_fields() {
        let mut product = Product::new(NewProduct::try_from(widget()).unwrap());
        let before = product.clone();

        product.apply_update(UpdateProduct {
            stock: Some(42),
            ..Default::default()
        });

        assert_eq!(product.stock, 42);
        assert_eq!(product.name, before.name);
        assert_eq!(product.price, before.price);
        assert_eq!(product.id, before.id);
        assert_eq!(product.created_at, before.created_at);
        assert!(product.updated_at >= before.updated_at);
    }

    #[test]
    fn test_apply_update_empty_collections_clear_fields() {
        let mut product = Product::new(
            NewProduct::try_from(CreateProduct {
                colors: Some(vec!["red".into()]),
                specifications: Some(Specifications::from([("weight".into(), "1kg".into())])),
                ..widget()
            })
            .unwrap(),
        );

        product.apply_update(UpdateProduct {
            colors: Some(vec![]),
            specifications: Some(Specifications::new()),
            ..Default::default()
        });

        assert!(product.colors.is_none());
        assert!(product.specifications.is_none());
    }

    #[test]
    fn test_legacy_document_is_read() {
        let created = mongodb::bson::DateTime::from_millis(1_700_000_000_000);
        let doc = mongodb::bson::doc! {
            "_id": ObjectId::new(),
            "name": "Legacy",
            "price": 1,
            "category": "misc",
            "brand": "Old",
            "image_url": "http://x/old.png",
            "stock": 1,
            "ratting": 4,
            "createdAt": created,
            "updatedAt": created,
            "__v": 0,
        };

        let product: Product = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(product.rating, 4.0);
        assert_eq!(product.price, 1.0);
        assert_eq!(product.discount, 0.0);
        assert_eq!(product.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_string_timestamps_are_read() {
        let doc = mongodb::bson::doc! {
            "_id": ObjectId::new(),
            "name": "Text",
            "price": 2.5,
            "category": "misc",
            "brand": "Old",
            "image_url": "http://x/old.png",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T10:00:00Z",
        };

        let product: Product = mongodb::bson::from_document(doc).unwrap();
        assert!(product.updated_at > product.created_at);
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_timestamps_are_stored_as_bson_dates() {
        let product = Product::new(NewProduct::try_from(widget()).unwrap());
        let doc = mongodb::bson::to_document(&product).unwrap();

        let stored = doc.get_datetime("createdAt").unwrap();
        assert_eq!(stored.timestamp_millis(), product.created_at.timestamp_millis());
        assert!(doc.get("created_at").is_none());

        let back: Product = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_response_clamps_out_of_range_rating() {
        let mut product = Product::new(NewProduct::try_from(widget()).unwrap());
        product.rating = 7.0;

        let response = ProductResponse::from(product.clone());
        assert_eq!(response.rating, 5.0);
        assert_eq!(response.id, product.id.to_hex());
    }

    #[test]
    fn test_response_json_shape() {
        let product = Product::new(NewProduct::try_from(widget()).unwrap());
        let json = serde_json::to_value(ProductResponse::from(product)).unwrap();

        assert_eq!(json["id"].as_str().unwrap().len(), 24);
        assert_eq!(json["category"], "tools");
        assert!(json.get("colors").is_none());
        assert!(json.get("specifications").is_none());
        assert!(json.get("created_at").is_some());
    }
}
