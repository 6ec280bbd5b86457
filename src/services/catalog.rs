use crate::auth::AuthenticatedUser;
use crate::domain::catalog::{Product, Supplier, UpdateProduct, UpdateSupplier};
use crate::domain::member::MemberRole;
use crate::domain::types::{OrganizationId, ProductId, SupplierId};
use crate::dto::queries::{ProductListParams, search_term};
use crate::forms::FormError;
use crate::forms::catalog::{ProductForm, SupplierForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, normalize_page};
use crate::repository::{CatalogReader, CatalogWriter, MemberReader, ProductListQuery};
use crate::services::{ServiceError, ServiceResult, ensure_role};

pub fn list_suppliers<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Supplier>>
where
    R: MemberReader + CatalogReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    repo.list_suppliers(organization_id).map_err(|err| {
        log::error!("Failed to list suppliers: {err}");
        err.into()
    })
}

pub fn get_supplier<R>(repo: &R, user: &AuthenticatedUser, supplier_id: i32) -> ServiceResult<Supplier>
where
    R: MemberReader + CatalogReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    repo.get_supplier_by_id(organization_id, SupplierId::new(supplier_id)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_supplier<R>(repo: &R, user: &AuthenticatedUser, form: SupplierForm) -> ServiceResult<Supplier>
where
    R: MemberReader + CatalogWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let supplier = form.into_new(organization_id)?;

    let supplier = repo.create_supplier(&supplier).map_err(|err| {
        log::error!("Failed to create supplier: {err}");
        err
    })?;
    Ok(supplier)
}

pub fn update_supplier<R>(
    repo: &R,
    user: &AuthenticatedUser,
    supplier_id: i32,
    form: SupplierForm,
) -> ServiceResult<Supplier>
where
    R: MemberReader + CatalogWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let supplier_id = SupplierId::new(supplier_id)?;
    let updates = UpdateSupplier::try_from(form)?;

    let supplier = repo
        .update_supplier(organization_id, supplier_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update supplier: {err}");
            err
        })?;
    Ok(supplier)
}

/// Products of a deleted supplier are kept without a supplier.
pub fn delete_supplier<R>(repo: &R, user: &AuthenticatedUser, supplier_id: i32) -> ServiceResult<()>
where
    R: MemberReader + CatalogWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let supplier_id = SupplierId::new(supplier_id)?;

    repo.delete_supplier(organization_id, supplier_id)
        .map_err(|err| {
            log::error!("Failed to delete supplier: {err}");
            err
        })?;
    Ok(())
}

pub fn list_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ProductListParams,
) -> ServiceResult<Paginated<Product>>
where
    R: MemberReader + CatalogReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let page = normalize_page(params.page);

    let mut query = ProductListQuery::new(organization_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(supplier_id) = params.supplier_id {
        query = query.supplier(SupplierId::new(supplier_id)?);
    }
    if let Some(term) = search_term(params.search) {
        query = query.search(term);
    }

    let (total, products) = repo.list_products(query).map_err(|err| {
        log::error!("Failed to list products: {err}");
        err
    })?;
    Ok(Paginated::new(products, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_product<R>(repo: &R, user: &AuthenticatedUser, product_id: i32) -> ServiceResult<Product>
where
    R: MemberReader + CatalogReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    repo.get_product_by_id(organization_id, ProductId::new(product_id)?)?
        .ok_or(ServiceError::NotFound)
}

/// Rejects supplier references outside the organization.
fn ensure_supplier<R>(
    repo: &R,
    organization_id: OrganizationId,
    supplier_id: Option<SupplierId>,
) -> ServiceResult<()>
where
    R: CatalogReader + ?Sized,
{
    if let Some(supplier_id) = supplier_id
        && repo.get_supplier_by_id(organization_id, supplier_id)?.is_none()
    {
        return Err(FormError::field("supplier_id", "unknown supplier").into());
    }
    Ok(())
}

pub fn create_product<R>(repo: &R, user: &AuthenticatedUser, form: ProductForm) -> ServiceResult<Product>
where
    R: MemberReader + CatalogReader + CatalogWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let product = form.into_new(organization_id)?;
    ensure_supplier(repo, organization_id, product.supplier_id)?;

    let product = repo.create_product(&product).map_err(|err| {
        log::error!("Failed to create product: {err}");
        err
    })?;
    Ok(product)
}

pub fn update_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: MemberReader + CatalogReader + CatalogWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let product_id = ProductId::new(product_id)?;
    let updates = UpdateProduct::try_from(form)?;
    ensure_supplier(repo, organization_id, updates.supplier_id)?;

    let product = repo
        .update_product(organization_id, product_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update product: {err}");
            err
        })?;
    Ok(product)
}

pub fn delete_product<R>(repo: &R, user: &AuthenticatedUser, product_id: i32) -> ServiceResult<()>
where
    R: MemberReader + CatalogWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let product_id = ProductId::new(product_id)?;

    repo.delete_product(organization_id, product_id)
        .map_err(|err| {
            log::error!("Failed to delete product: {err}");
            err
        })?;
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::types::{ProductName, Sku, SupplierName};
    use crate::repository::errors::RepositoryError;
    use crate::services::test_support::{mock_for, org, user};

    fn supplier(id: i32) -> Supplier {
        Supplier {
            id: SupplierId::new(id).unwrap(),
            organization_id: org(),
            name: SupplierName::new("Parts Inc").unwrap(),
            email: None,
            phone: None,
            website: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn product_form(supplier_id: Option<i32>) -> ProductForm {
        ProductForm {
            name: "Widget".to_string(),
            sku: "W-1".to_string(),
            price_cents: 1999,
            supplier_id,
        }
    }

    fn product(id: i32) -> Product {
        let now = Utc::now().naive_utc();
        Product {
            id: ProductId::new(id).unwrap(),
            organization_id: org(),
            supplier_id: None,
            name: ProductName::new("Widget").unwrap(),
            sku: Sku::new("W-1").unwrap(),
            price_cents: 1999,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn product_supplier_must_belong_to_organization() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_supplier_by_id()
            .withf(|organization_id, _| *organization_id == org())
            .returning(|_, _| Ok(None));
        repo.expect_create_product().times(0);

        let result = create_product(&repo, &user(MemberRole::Member), product_form(Some(3)));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn product_with_known_supplier_is_created() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_supplier_by_id()
            .returning(|_, id| Ok(Some(supplier(id.get()))));
        repo.expect_create_product()
            .withf(|new| new.supplier_id == SupplierId::new(3).ok() && new.price_cents == 1999)
            .times(1)
            .returning(|new| {
                let mut created = product(1);
                created.supplier_id = new.supplier_id;
                Ok(created)
            });

        let created =
            create_product(&repo, &user(MemberRole::Member), product_form(Some(3))).unwrap();

        assert_eq!(created.supplier_id, SupplierId::new(3).ok());
    }

    #[test]
    fn duplicate_sku_is_a_conflict() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_create_product()
            .returning(|_| Err(RepositoryError::Conflict("sku already exists".into())));

        let result = create_product(&repo, &user(MemberRole::Member), product_form(None));

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn negative_price_is_rejected() {
        let repo = mock_for(MemberRole::Member);
        let mut form = product_form(None);
        form.price_cents = -1;

        let result = create_product(&repo, &user(MemberRole::Member), form);

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn products_are_filtered_by_supplier_and_search() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_list_products()
            .withf(|query| {
                query.supplier_id == SupplierId::new(2).ok()
                    && query.search.as_deref() == Some("wid")
            })
            .times(1)
            .returning(|_| Ok((1, vec![product(1)])));

        let page = list_products(
            &repo,
            &user(MemberRole::Member),
            ProductListParams {
                supplier_id: Some(2),
                search: Some(" wid ".to_string()),
                page: Some(1),
            },
        )
        .unwrap();

        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn missing_supplier_is_not_found() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_supplier_by_id().returning(|_, _| Ok(None));

        let result = get_supplier(&repo, &user(MemberRole::Member), 4);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
