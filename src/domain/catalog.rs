//! Products and suppliers managed alongside contacts.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EmailAddress, OrganizationId, PhoneNumber, ProductId, ProductName, Sku, SupplierId,
    SupplierName, TypeConstraintError, WebUrl,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: SupplierId,
    pub organization_id: OrganizationId,
    pub name: SupplierName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub website: Option<WebUrl>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewSupplier {
    pub organization_id: OrganizationId,
    pub name: SupplierName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub website: Option<WebUrl>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateSupplier {
    pub name: SupplierName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub website: Option<WebUrl>,
}

/// Price in minor currency units.
pub fn validate_price_cents(value: i64) -> Result<i64, TypeConstraintError> {
    if value < 0 {
        Err(TypeConstraintError::InvalidValue(
            "price cannot be negative".to_string(),
        ))
    } else {
        Ok(value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub organization_id: OrganizationId,
    pub supplier_id: Option<SupplierId>,
    pub name: ProductName,
    pub sku: Sku,
    pub price_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub organization_id: OrganizationId,
    pub supplier_id: Option<SupplierId>,
    pub name: ProductName,
    pub sku: Sku,
    pub price_cents: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateProduct {
    pub supplier_id: Option<SupplierId>,
    pub name: ProductName,
    pub sku: Sku,
    pub price_cents: i64,
}
