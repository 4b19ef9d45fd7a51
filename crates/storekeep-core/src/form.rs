//! Form field buffers and synchronous validation.
//!
//! A form holds the raw strings exactly as typed; [`ProductForm::parse`]
//! and [`UserForm::parse`] coerce and validate them into a draft, or fail
//! with a [`FormError`] before any network call is made.

use thiserror::Error;

use storekeep_api::types::{Product, ProductDraft, User, UserDraft};

/// A validation failure. Always pre-network and always recoverable: the
/// form stays open with its values intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("price must be a number greater than 0")]
    InvalidPrice,

    #[error("quantity must be a non-negative whole number")]
    InvalidQuantity,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

// ── Product form ─────────────────────────────────────────────────────

/// Editable field buffers for the product form.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
    pub is_available: bool,
}

impl ProductForm {
    /// Blank form for create mode.
    pub fn blank() -> Self {
        Self {
            is_available: true,
            ..Self::default()
        }
    }

    /// Pre-populated form for edit mode.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
            is_available: product.is_available,
        }
    }

    /// Coerce and validate: name and category non-empty, price a positive
    /// number, quantity a non-negative integer.
    pub fn parse(&self) -> Result<ProductDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required("name"));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(FormError::Required("category"));
        }

        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidPrice)?;
        if price.is_nan() || price <= 0.0 {
            return Err(FormError::InvalidPrice);
        }

        let quantity: i64 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidQuantity)?;
        if quantity < 0 {
            return Err(FormError::InvalidQuantity);
        }

        Ok(ProductDraft {
            name: name.to_owned(),
            category: category.to_owned(),
            description: optional(&self.description),
            price,
            quantity,
            is_available: self.is_available,
        })
    }
}

// ── User form ────────────────────────────────────────────────────────

/// Editable field buffers for the user form.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
}

impl UserForm {
    pub fn blank() -> Self {
        Self {
            is_active: true,
            ..Self::default()
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
            is_active: user.is_active,
        }
    }

    /// Presence checks only — users have no numeric fields.
    pub fn parse(&self) -> Result<UserDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required("name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::Required("email"));
        }

        Ok(UserDraft {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: optional(&self.phone),
            address: optional(&self.address),
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            name: "Widget".into(),
            category: "Tools".into(),
            description: String::new(),
            price: "9.99".into(),
            quantity: "5".into(),
            is_available: true,
        }
    }

    #[test]
    fn valid_product_form_parses() {
        let draft = valid_form().parse().unwrap();
        assert_eq!(draft.name, "Widget");
        assert_eq!(draft.category, "Tools");
        assert!(draft.description.is_none());
        assert!((draft.price - 9.99).abs() < f64::EPSILON);
        assert_eq!(draft.quantity, 5);
        assert!(draft.is_available);
    }

    #[test]
    fn zero_price_is_rejected() {
        let mut form = valid_form();
        form.price = "0".into();
        assert_eq!(form.parse().unwrap_err(), FormError::InvalidPrice);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut form = valid_form();
        form.quantity = "-1".into();
        assert_eq!(form.parse().unwrap_err(), FormError::InvalidQuantity);
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let mut form = valid_form();
        form.price = "free".into();
        assert_eq!(form.parse().unwrap_err(), FormError::InvalidPrice);

        let mut form = valid_form();
        form.quantity = "2.5".into();
        assert_eq!(form.parse().unwrap_err(), FormError::InvalidQuantity);
    }

    #[test]
    fn blank_name_or_category_is_rejected() {
        let mut form = valid_form();
        form.name = "   ".into();
        assert_eq!(form.parse().unwrap_err(), FormError::Required("name"));

        let mut form = valid_form();
        form.category.clear();
        assert_eq!(form.parse().unwrap_err(), FormError::Required("category"));
    }

    #[test]
    fn from_product_round_trips_through_parse() {
        let product = Product {
            id: 4,
            name: "Lamp".into(),
            category: "Lighting".into(),
            description: Some("Warm white".into()),
            price: 30.0,
            quantity: 2,
            is_available: false,
        };
        let draft = ProductForm::from_product(&product).parse().unwrap();
        assert_eq!(draft.name, product.name);
        assert_eq!(draft.description.as_deref(), Some("Warm white"));
        assert!(!draft.is_available);
    }

    #[test]
    fn user_form_requires_name_and_email_only() {
        let form = UserForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: String::new(),
            address: "  ".into(),
            is_active: true,
        };
        let draft = form.parse().unwrap();
        assert!(draft.phone.is_none());
        assert!(draft.address.is_none());

        let mut missing = form.clone();
        missing.email.clear();
        assert_eq!(missing.parse().unwrap_err(), FormError::Required("email"));
    }
}
