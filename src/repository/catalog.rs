use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::catalog::{
    NewProduct, NewSupplier, Product, Supplier, UpdateProduct, UpdateSupplier,
};
use crate::domain::types::{OrganizationId, ProductId, SupplierId};
use crate::models::catalog::{
    NewProduct as DbNewProduct, NewSupplier as DbNewSupplier, Product as DbProduct,
    Supplier as DbSupplier, UpdateProduct as DbUpdateProduct, UpdateSupplier as DbUpdateSupplier,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CatalogReader, CatalogWriter, DieselRepository, ProductListQuery};
use crate::schema::{products, suppliers};

fn filtered(query: &ProductListQuery) -> products::BoxedQuery<'static, Sqlite> {
    let mut items = products::table
        .filter(products::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(supplier_id) = query.supplier_id {
        items = items.filter(products::supplier_id.eq(supplier_id.get()));
    }
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{term}%");
        items = items.filter(products::name.like(pattern.clone()).or(products::sku.like(pattern)));
    }

    items
}

impl CatalogReader for DieselRepository {
    fn get_supplier_by_id(
        &self,
        organization_id: OrganizationId,
        id: SupplierId,
    ) -> RepositoryResult<Option<Supplier>> {
        let mut conn = self.conn()?;
        let supplier = suppliers::table
            .filter(suppliers::id.eq(id.get()))
            .filter(suppliers::organization_id.eq(organization_id.get()))
            .first::<DbSupplier>(&mut conn)
            .optional()?;

        Ok(supplier.map(Supplier::try_from).transpose()?)
    }

    fn list_suppliers(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Supplier>> {
        let mut conn = self.conn()?;
        let rows = suppliers::table
            .filter(suppliers::organization_id.eq(organization_id.get()))
            .order((suppliers::name.asc(), suppliers::id.asc()))
            .load::<DbSupplier>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Supplier::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn get_product_by_id(
        &self,
        organization_id: OrganizationId,
        id: ProductId,
    ) -> RepositoryResult<Option<Product>> {
        let mut conn = self.conn()?;
        let product = products::table
            .filter(products::id.eq(id.get()))
            .filter(products::organization_id.eq(organization_id.get()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(Product::try_from).transpose()?)
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((products::name.asc(), products::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = items
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, items))
    }
}

impl CatalogWriter for DieselRepository {
    fn create_supplier(&self, supplier: &NewSupplier) -> RepositoryResult<Supplier> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(suppliers::table)
            .values(DbNewSupplier::from(supplier))
            .get_result::<DbSupplier>(&mut conn)?;

        Ok(Supplier::try_from(created)?)
    }

    fn update_supplier(
        &self,
        organization_id: OrganizationId,
        id: SupplierId,
        updates: &UpdateSupplier,
    ) -> RepositoryResult<Supplier> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            suppliers::table
                .filter(suppliers::id.eq(id.get()))
                .filter(suppliers::organization_id.eq(organization_id.get())),
        )
        .set(DbUpdateSupplier::from(updates))
        .get_result::<DbSupplier>(&mut conn)?;

        Ok(Supplier::try_from(updated)?)
    }

    fn delete_supplier(&self, organization_id: OrganizationId, id: SupplierId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            suppliers::table
                .filter(suppliers::id.eq(id.get()))
                .filter(suppliers::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(products::table)
            .values(DbNewProduct::from(product))
            .get_result::<DbProduct>(&mut conn)?;

        Ok(Product::try_from(created)?)
    }

    fn update_product(
        &self,
        organization_id: OrganizationId,
        id: ProductId,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = diesel::update(
            products::table
                .filter(products::id.eq(id.get()))
                .filter(products::organization_id.eq(organization_id.get())),
        )
        .set(DbUpdateProduct::new(updates, now))
        .get_result::<DbProduct>(&mut conn)?;

        Ok(Product::try_from(updated)?)
    }

    fn delete_product(&self, organization_id: OrganizationId, id: ProductId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            products::table
                .filter(products::id.eq(id.get()))
                .filter(products::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
