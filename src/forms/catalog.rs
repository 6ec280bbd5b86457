use serde::Deserialize;

use crate::domain::catalog::{
    NewProduct, NewSupplier, UpdateProduct, UpdateSupplier, validate_price_cents,
};
use crate::domain::types::{
    EmailAddress, OrganizationId, PhoneNumber, ProductName, Sku, SupplierId, SupplierName, WebUrl,
};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize)]
pub struct SupplierForm {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl TryFrom<SupplierForm> for UpdateSupplier {
    type Error = FormError;

    fn try_from(form: SupplierForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: SupplierName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: non_blank(form.email)
                .map(EmailAddress::new)
                .transpose()
                .map_err(|_| FormError::InvalidEmail)?,
            phone: non_blank(form.phone)
                .map(PhoneNumber::new)
                .transpose()
                .map_err(|_| FormError::InvalidPhoneNumber)?,
            website: non_blank(form.website)
                .map(WebUrl::new)
                .transpose()
                .map_err(|_| FormError::InvalidUrl)?,
        })
    }
}

impl SupplierForm {
    pub fn into_new(self, organization_id: OrganizationId) -> Result<NewSupplier, FormError> {
        let UpdateSupplier {
            name,
            email,
            phone,
            website,
        } = UpdateSupplier::try_from(self)?;
        Ok(NewSupplier {
            organization_id,
            name,
            email,
            phone,
            website,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    #[serde(default)]
    pub supplier_id: Option<i32>,
}

impl TryFrom<ProductForm> for UpdateProduct {
    type Error = FormError;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        Ok(Self {
            supplier_id: form
                .supplier_id
                .map(SupplierId::new)
                .transpose()
                .map_err(|err| FormError::field("supplier_id", err))?,
            name: ProductName::new(form.name).map_err(|_| FormError::InvalidName)?,
            sku: Sku::new(form.sku).map_err(|err| FormError::field("sku", err))?,
            price_cents: validate_price_cents(form.price_cents)
                .map_err(|err| FormError::field("price_cents", err))?,
        })
    }
}

impl ProductForm {
    pub fn into_new(self, organization_id: OrganizationId) -> Result<NewProduct, FormError> {
        let UpdateProduct {
            supplier_id,
            name,
            sku,
            price_cents,
        } = UpdateProduct::try_from(self)?;
        Ok(NewProduct {
            organization_id,
            supplier_id,
            name,
            sku,
            price_cents,
        })
    }
}
