use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::catalog::{
    NewProduct as DomainNewProduct, NewSupplier as DomainNewSupplier, Product as DomainProduct,
    Supplier as DomainSupplier, UpdateProduct as DomainUpdateProduct,
    UpdateSupplier as DomainUpdateSupplier,
};
use crate::domain::types::{
    EmailAddress, OrganizationId, PhoneNumber, ProductId, ProductName, Sku, SupplierId,
    SupplierName, TypeConstraintError, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::suppliers)]
pub struct Supplier {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::suppliers)]
pub struct NewSupplier<'a> {
    pub organization_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::suppliers)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateSupplier<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub organization_id: i32,
    pub supplier_id: Option<i32>,
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub organization_id: i32,
    pub supplier_id: Option<i32>,
    pub name: &'a str,
    pub sku: &'a str,
    pub price_cents: i64,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateProduct<'a> {
    pub supplier_id: Option<i32>,
    pub name: &'a str,
    pub sku: &'a str,
    pub price_cents: i64,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Supplier> for DomainSupplier {
    type Error = TypeConstraintError;

    fn try_from(supplier: Supplier) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SupplierId::new(supplier.id)?,
            organization_id: OrganizationId::new(supplier.organization_id)?,
            name: SupplierName::new(supplier.name)?,
            email: supplier.email.map(EmailAddress::new).transpose()?,
            phone: supplier.phone.map(PhoneNumber::new).transpose()?,
            website: supplier.website.map(WebUrl::new).transpose()?,
            created_at: supplier.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewSupplier> for NewSupplier<'a> {
    fn from(supplier: &'a DomainNewSupplier) -> Self {
        Self {
            organization_id: supplier.organization_id.get(),
            name: supplier.name.as_str(),
            email: supplier.email.as_ref().map(EmailAddress::as_str),
            phone: supplier.phone.as_ref().map(PhoneNumber::as_str),
            website: supplier.website.as_ref().map(WebUrl::as_str),
        }
    }
}

impl<'a> From<&'a DomainUpdateSupplier> for UpdateSupplier<'a> {
    fn from(supplier: &'a DomainUpdateSupplier) -> Self {
        Self {
            name: supplier.name.as_str(),
            email: supplier.email.as_ref().map(EmailAddress::as_str),
            phone: supplier.phone.as_ref().map(PhoneNumber::as_str),
            website: supplier.website.as_ref().map(WebUrl::as_str),
        }
    }
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(product.id)?,
            organization_id: OrganizationId::new(product.organization_id)?,
            supplier_id: product.supplier_id.map(SupplierId::new).transpose()?,
            name: ProductName::new(product.name)?,
            sku: Sku::new(product.sku)?,
            price_cents: product.price_cents,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(product: &'a DomainNewProduct) -> Self {
        Self {
            organization_id: product.organization_id.get(),
            supplier_id: product.supplier_id.map(SupplierId::get),
            name: product.name.as_str(),
            sku: product.sku.as_str(),
            price_cents: product.price_cents,
        }
    }
}

impl<'a> UpdateProduct<'a> {
    pub fn new(product: &'a DomainUpdateProduct, now: NaiveDateTime) -> Self {
        Self {
            supplier_id: product.supplier_id.map(SupplierId::get),
            name: product.name.as_str(),
            sku: product.sku.as_str(),
            price_cents: product.price_cents,
            updated_at: now,
        }
    }
}
